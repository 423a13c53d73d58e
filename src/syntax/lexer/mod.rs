//! The Rill lexer - tokenizes source code into tokens
//!
//! Newlines are significant: a newline (or end of input) following an
//! identifier, literal, closing delimiter, `++`/`--` or one of the keywords
//! `break continue return true false undefined` is emitted as a `;` token
//! whose literal is `"\n"`.

mod comments;
mod numbers;
mod strings;

use crate::syntax::token::Token;
use crate::syntax::token_type::{TokenType, lookup_ident};

#[derive(Debug, Clone)]
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    read_position: usize,
    current_char: Option<char>,
    line: usize,
    column: usize,
    insert_semicolon: bool,
}

impl Lexer {
    pub fn new(input: impl AsRef<str>) -> Self {
        let mut lexer = Self {
            input: input.as_ref().chars().collect(),
            position: 0,
            read_position: 0,
            current_char: None,
            line: 1,
            column: 0,
            insert_semicolon: false,
        };
        lexer.read_char();
        lexer
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Token {
        loop {
            self.skip_whitespace();
            match (self.current_char, self.peek_char()) {
                (Some('/'), Some('/')) => self.skip_line_comment(),
                (Some('/'), Some('*')) => {
                    let (line, column) = (self.line, self.column);
                    match self.skip_block_comment() {
                        Some(true) if self.insert_semicolon => {
                            self.insert_semicolon = false;
                            return Token::new(TokenType::Semicolon, "\n", line, column);
                        }
                        Some(_) => {}
                        None => {
                            self.insert_semicolon = false;
                            return Token::new(
                                TokenType::Illegal,
                                "unterminated block comment",
                                line,
                                column,
                            );
                        }
                    }
                }
                _ => break,
            }
        }

        let line = self.line;
        let col = self.column;

        if self.insert_semicolon && matches!(self.current_char, None | Some('\n')) {
            self.insert_semicolon = false;
            if self.current_char.is_some() {
                self.read_char();
            }
            return Token::new(TokenType::Semicolon, "\n", line, col);
        }

        let token = match self.current_char {
            None => Token::new(TokenType::Eof, "", line, col),
            Some('"') => self.read_string(),
            Some('`') => self.read_raw_string(),
            Some('\'') => self.read_char_literal(),
            Some(ch) if ch.is_ascii_digit() => self.read_number(),
            Some('.') if self.peek_char().is_some_and(|c| c.is_ascii_digit()) => self.read_number(),
            Some(ch) if is_letter(ch) => {
                let ident = self.read_identifier();
                Token::new(lookup_ident(&ident), ident, line, col)
            }
            Some(ch) => self.read_operator(ch, line, col),
        };

        self.insert_semicolon = token.token_type.ends_statement();
        token
    }

    /// Tokenizes the whole input, including the trailing `Eof` token.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.token_type == TokenType::Eof;
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    fn read_operator(&mut self, ch: char, line: usize, col: usize) -> Token {
        let next = self.peek_char();
        let third = self.peek_nth(2);
        let (token_type, width) = match (ch, next, third) {
            ('.', Some('.'), Some('.')) => (TokenType::Ellipsis, 3),
            ('<', Some('<'), Some('=')) => (TokenType::ShlAssign, 3),
            ('>', Some('>'), Some('=')) => (TokenType::ShrAssign, 3),
            ('&', Some('^'), Some('=')) => (TokenType::AndNotAssign, 3),

            ('+', Some('+'), _) => (TokenType::Inc, 2),
            ('-', Some('-'), _) => (TokenType::Dec, 2),
            ('+', Some('='), _) => (TokenType::PlusAssign, 2),
            ('-', Some('='), _) => (TokenType::MinusAssign, 2),
            ('*', Some('='), _) => (TokenType::AsteriskAssign, 2),
            ('/', Some('='), _) => (TokenType::SlashAssign, 2),
            ('%', Some('='), _) => (TokenType::PercentAssign, 2),
            ('&', Some('='), _) => (TokenType::AmpersandAssign, 2),
            ('|', Some('='), _) => (TokenType::BarAssign, 2),
            ('^', Some('='), _) => (TokenType::CaretAssign, 2),
            ('&', Some('&'), _) => (TokenType::And, 2),
            ('|', Some('|'), _) => (TokenType::Or, 2),
            ('&', Some('^'), _) => (TokenType::AndNot, 2),
            ('<', Some('<'), _) => (TokenType::Shl, 2),
            ('>', Some('>'), _) => (TokenType::Shr, 2),
            ('=', Some('='), _) => (TokenType::Eq, 2),
            ('!', Some('='), _) => (TokenType::NotEq, 2),
            ('<', Some('='), _) => (TokenType::Lte, 2),
            ('>', Some('='), _) => (TokenType::Gte, 2),
            (':', Some('='), _) => (TokenType::Define, 2),

            ('+', _, _) => (TokenType::Plus, 1),
            ('-', _, _) => (TokenType::Minus, 1),
            ('*', _, _) => (TokenType::Asterisk, 1),
            ('/', _, _) => (TokenType::Slash, 1),
            ('%', _, _) => (TokenType::Percent, 1),
            ('&', _, _) => (TokenType::Ampersand, 1),
            ('|', _, _) => (TokenType::Bar, 1),
            ('^', _, _) => (TokenType::Caret, 1),
            ('<', _, _) => (TokenType::Lt, 1),
            ('>', _, _) => (TokenType::Gt, 1),
            ('=', _, _) => (TokenType::Assign, 1),
            ('!', _, _) => (TokenType::Bang, 1),
            (':', _, _) => (TokenType::Colon, 1),
            ('?', _, _) => (TokenType::Question, 1),
            ('.', _, _) => (TokenType::Dot, 1),
            (',', _, _) => (TokenType::Comma, 1),
            (';', _, _) => (TokenType::Semicolon, 1),
            ('(', _, _) => (TokenType::LParen, 1),
            (')', _, _) => (TokenType::RParen, 1),
            ('{', _, _) => (TokenType::LBrace, 1),
            ('}', _, _) => (TokenType::RBrace, 1),
            ('[', _, _) => (TokenType::LBracket, 1),
            (']', _, _) => (TokenType::RBracket, 1),
            _ => {
                self.read_char();
                return Token::new(TokenType::Illegal, ch.to_string(), line, col);
            }
        };

        let literal: String = self.input[self.position..self.position + width].iter().collect();
        for _ in 0..width {
            self.read_char();
        }
        Token::new(token_type, literal, line, col)
    }

    fn read_identifier(&mut self) -> String {
        let start = self.position;
        while self.current_char.is_some_and(|c| is_letter(c) || c.is_ascii_digit()) {
            self.read_char();
        }
        self.input[start..self.position].iter().collect()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char {
            match ch {
                ' ' | '\t' | '\r' => self.read_char(),
                '\n' if !self.insert_semicolon => self.read_char(),
                _ => break,
            }
        }
    }

    pub(super) fn read_char(&mut self) {
        if self.current_char == Some('\n') {
            self.line += 1;
            self.column = 0;
        }
        self.current_char = self.input.get(self.read_position).copied();
        self.position = self.read_position;
        self.read_position += 1;
        self.column += 1;
    }

    pub(super) fn peek_char(&self) -> Option<char> {
        self.input.get(self.read_position).copied()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }
}

fn is_letter(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

#[cfg(test)]
mod lexer_test;
