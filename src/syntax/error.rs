use std::fmt;

use crate::syntax::position::Position;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub position: Position,
}

/// Every parse error found in one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub file: String,
    pub errors: Vec<ParseError>,
}

impl SyntaxError {
    pub fn first(&self) -> Option<&ParseError> {
        self.errors.first()
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(
                f,
                "Parse Error: {}\n\tat {}:{}",
                error.message, self.file, error.position
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for SyntaxError {}
