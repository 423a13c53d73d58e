//! String, raw string and char literals

use crate::syntax::token::Token;
use crate::syntax::token_type::TokenType;

use super::Lexer;

impl Lexer {
    pub(super) fn read_string(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        self.read_char(); // skip opening quote

        let mut value = String::new();
        loop {
            match self.current_char {
                Some('"') => {
                    self.read_char();
                    return Token::new(TokenType::String, value, line, column);
                }
                Some('\\') => match self.read_escape('"') {
                    Ok(ch) => value.push(ch),
                    Err(message) => return Token::new(TokenType::Illegal, message, line, column),
                },
                Some('\n') | None => {
                    return Token::new(TokenType::Illegal, "unterminated string", line, column);
                }
                Some(ch) => {
                    value.push(ch);
                    self.read_char();
                }
            }
        }
    }

    pub(super) fn read_raw_string(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        self.read_char(); // skip opening backtick

        let mut value = String::new();
        loop {
            match self.current_char {
                Some('`') => {
                    self.read_char();
                    return Token::new(TokenType::String, value, line, column);
                }
                Some('\r') => self.read_char(),
                Some(ch) => {
                    value.push(ch);
                    self.read_char();
                }
                None => {
                    return Token::new(TokenType::Illegal, "unterminated raw string", line, column);
                }
            }
        }
    }

    pub(super) fn read_char_literal(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        self.read_char(); // skip opening quote

        let value = match self.current_char {
            Some('\\') => match self.read_escape('\'') {
                Ok(ch) => ch,
                Err(message) => return Token::new(TokenType::Illegal, message, line, column),
            },
            Some('\'') | Some('\n') | None => {
                return Token::new(TokenType::Illegal, "illegal char literal", line, column);
            }
            Some(ch) => {
                self.read_char();
                ch
            }
        };

        if self.current_char != Some('\'') {
            return Token::new(TokenType::Illegal, "illegal char literal", line, column);
        }
        self.read_char();
        Token::new(TokenType::Char, value.to_string(), line, column)
    }

    /// Reads an escape sequence starting at the backslash.
    fn read_escape(&mut self, quote: char) -> Result<char, String> {
        self.read_char(); // consume '\\'
        let ch = self.current_char.ok_or("unterminated escape sequence")?;
        self.read_char();
        match ch {
            'n' => Ok('\n'),
            't' => Ok('\t'),
            'r' => Ok('\r'),
            '0' => Ok('\0'),
            'a' => Ok('\x07'),
            'b' => Ok('\x08'),
            'f' => Ok('\x0c'),
            'v' => Ok('\x0b'),
            '\\' => Ok('\\'),
            'x' => self.read_hex_escape(2),
            'u' => self.read_hex_escape(4),
            'U' => self.read_hex_escape(8),
            c if c == quote => Ok(c),
            other => Err(format!("unknown escape sequence: \\{}", other)),
        }
    }

    fn read_hex_escape(&mut self, digits: usize) -> Result<char, String> {
        let mut code = 0u32;
        for _ in 0..digits {
            let digit = self
                .current_char
                .and_then(|c| c.to_digit(16))
                .ok_or("malformed escape sequence")?;
            code = code * 16 + digit;
            self.read_char();
        }
        char::from_u32(code).ok_or_else(|| format!("escape sequence is invalid unicode: {code:#x}"))
    }
}
