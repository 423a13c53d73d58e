//! Integer and float literals

use crate::syntax::token::Token;
use crate::syntax::token_type::TokenType;

use super::Lexer;

impl Lexer {
    pub(super) fn read_number(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        let start = self.position;

        if self.current_char == Some('0') && matches!(self.peek_char(), Some('x' | 'X')) {
            self.read_char();
            self.read_char();
            while self.current_char.is_some_and(|c| c.is_ascii_hexdigit()) {
                self.read_char();
            }
            return Token::new(TokenType::Int, self.slice_from(start), line, column);
        }

        let mut is_float = false;
        self.read_digits();

        if self.current_char == Some('.') && self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.read_char();
            self.read_digits();
        }

        if matches!(self.current_char, Some('e' | 'E')) {
            let sign = matches!(self.peek_char(), Some('+' | '-'));
            let digit_at = if sign { self.peek_nth(2) } else { self.peek_char() };
            if digit_at.is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                self.read_char();
                if sign {
                    self.read_char();
                }
                self.read_digits();
            }
        }

        let token_type = if is_float { TokenType::Float } else { TokenType::Int };
        Token::new(token_type, self.slice_from(start), line, column)
    }

    fn read_digits(&mut self) {
        while self.current_char.is_some_and(|c| c.is_ascii_digit() || c == '_') {
            self.read_char();
        }
    }

    fn slice_from(&self, start: usize) -> String {
        self.input[start..self.position]
            .iter()
            .filter(|c| **c != '_')
            .collect()
    }
}
