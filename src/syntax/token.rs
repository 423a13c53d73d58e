use std::fmt;

use super::position::Position;
use super::token_type::TokenType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub token_type: TokenType,
    /// Source text for operators and identifiers, decoded contents for string
    /// and char literals, `"\n"` for semicolons inserted at line ends.
    pub literal: String,
    pub position: Position,
}

impl Token {
    pub fn new(token_type: TokenType, literal: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            token_type,
            literal: literal.into(),
            position: Position::new(line, column),
        }
    }

    pub fn is_inserted_semicolon(&self) -> bool {
        self.token_type == TokenType::Semicolon && self.literal == "\n"
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.token_type {
            TokenType::Ident | TokenType::Int | TokenType::Float => write!(f, "{}", self.literal),
            TokenType::String => write!(f, "{:?}", self.literal),
            TokenType::Char => write!(f, "'{}'", self.literal),
            TokenType::Semicolon if self.is_inserted_semicolon() => write!(f, "newline"),
            other => write!(f, "{}", other),
        }
    }
}
