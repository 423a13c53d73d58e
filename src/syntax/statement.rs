use std::fmt;

use crate::syntax::{
    block::Block, expression::Expression, position::Position, token_type::TokenType,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Expression {
        expression: Expression,
        position: Position,
    },
    /// `name := value`
    Define {
        name: String,
        value: Expression,
        position: Position,
    },
    /// `target = value` or `target op= value`
    Assign {
        target: Expression,
        operator: TokenType,
        value: Expression,
        position: Position,
    },
    /// `target++` / `target--`
    IncDec {
        target: Expression,
        operator: TokenType,
        position: Position,
    },
    Return {
        value: Option<Expression>,
        position: Position,
    },
    Export {
        value: Expression,
        position: Position,
    },
    Break {
        position: Position,
    },
    Continue {
        position: Position,
    },
    If {
        condition: Expression,
        consequence: Block,
        /// Either a `Block` or a nested `If` for `else if`.
        alternative: Option<Box<Statement>>,
        position: Position,
    },
    For {
        init: Option<Box<Statement>>,
        condition: Option<Expression>,
        post: Option<Box<Statement>>,
        body: Block,
        position: Position,
    },
    /// `for key, value in iterable`; a single name binds the value and the
    /// key is `_`.
    ForIn {
        key: String,
        value: String,
        iterable: Expression,
        body: Block,
        position: Position,
    },
    Block(Block),
}

impl Statement {
    pub fn position(&self) -> Position {
        match self {
            Statement::Expression { position, .. }
            | Statement::Define { position, .. }
            | Statement::Assign { position, .. }
            | Statement::IncDec { position, .. }
            | Statement::Return { position, .. }
            | Statement::Export { position, .. }
            | Statement::Break { position }
            | Statement::Continue { position }
            | Statement::If { position, .. }
            | Statement::For { position, .. }
            | Statement::ForIn { position, .. } => *position,
            Statement::Block(block) => block.position,
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Expression { expression, .. } => write!(f, "{}", expression),
            Statement::Define { name, value, .. } => write!(f, "{} := {}", name, value),
            Statement::Assign {
                target,
                operator,
                value,
                ..
            } => write!(f, "{} {} {}", target, operator, value),
            Statement::IncDec {
                target, operator, ..
            } => write!(f, "{}{}", target, operator),
            Statement::Return { value, .. } => match value {
                Some(value) => write!(f, "return {}", value),
                None => write!(f, "return"),
            },
            Statement::Export { value, .. } => write!(f, "export {}", value),
            Statement::Break { .. } => write!(f, "break"),
            Statement::Continue { .. } => write!(f, "continue"),
            Statement::If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                write!(f, "if {} {}", condition, consequence)?;
                if let Some(alternative) = alternative {
                    write!(f, " else {}", alternative)?;
                }
                Ok(())
            }
            Statement::For {
                init,
                condition,
                post,
                body,
                ..
            } => {
                let init = init.as_ref().map(|s| s.to_string()).unwrap_or_default();
                let condition = condition.as_ref().map(|e| e.to_string()).unwrap_or_default();
                let post = post.as_ref().map(|s| s.to_string()).unwrap_or_default();
                write!(f, "for {}; {}; {} {}", init, condition, post, body)
            }
            Statement::ForIn {
                key,
                value,
                iterable,
                body,
                ..
            } => write!(f, "for {}, {} in {} {}", key, value, iterable, body),
            Statement::Block(block) => write!(f, "{}", block),
        }
    }
}
