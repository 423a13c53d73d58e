pub mod block;
pub mod error;
pub mod expression;
pub mod lexer;
pub mod parser;
pub mod position;
pub mod precedence;
pub mod program;
pub mod statement;
pub mod token;
pub mod token_type;

pub use error::{ParseError, SyntaxError};
pub use position::Position;
