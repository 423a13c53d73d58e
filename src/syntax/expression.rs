use std::fmt;

use crate::syntax::{block::Block, position::Position, token_type::TokenType};

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier {
        name: String,
        position: Position,
    },
    Integer {
        value: i64,
        position: Position,
    },
    Float {
        value: f64,
        position: Position,
    },
    Char {
        value: char,
        position: Position,
    },
    String {
        value: String,
        position: Position,
    },
    Boolean {
        value: bool,
        position: Position,
    },
    Undefined {
        position: Position,
    },
    Array {
        elements: Vec<Expression>,
        position: Position,
    },
    Map {
        pairs: Vec<(String, Expression)>,
        position: Position,
    },
    Function {
        parameters: Vec<String>,
        variadic: bool,
        body: Block,
        position: Position,
    },
    Prefix {
        operator: TokenType,
        right: Box<Expression>,
        position: Position,
    },
    Infix {
        left: Box<Expression>,
        operator: TokenType,
        right: Box<Expression>,
        position: Position,
    },
    Conditional {
        condition: Box<Expression>,
        consequence: Box<Expression>,
        alternative: Box<Expression>,
        position: Position,
    },
    Call {
        function: Box<Expression>,
        arguments: Vec<Expression>,
        spread: bool,
        position: Position,
    },
    Index {
        left: Box<Expression>,
        index: Box<Expression>,
        position: Position,
    },
    Slice {
        left: Box<Expression>,
        low: Option<Box<Expression>>,
        high: Option<Box<Expression>>,
        position: Position,
    },
    Selector {
        left: Box<Expression>,
        member: String,
        position: Position,
    },
    Import {
        name: String,
        position: Position,
    },
    Error {
        value: Box<Expression>,
        position: Position,
    },
}

impl Expression {
    /// Start of the expression. Binary, call and postfix expressions report
    /// the start of their leftmost operand.
    pub fn position(&self) -> Position {
        match self {
            Expression::Identifier { position, .. }
            | Expression::Integer { position, .. }
            | Expression::Float { position, .. }
            | Expression::Char { position, .. }
            | Expression::String { position, .. }
            | Expression::Boolean { position, .. }
            | Expression::Undefined { position }
            | Expression::Array { position, .. }
            | Expression::Map { position, .. }
            | Expression::Function { position, .. }
            | Expression::Prefix { position, .. }
            | Expression::Infix { position, .. }
            | Expression::Conditional { position, .. }
            | Expression::Call { position, .. }
            | Expression::Index { position, .. }
            | Expression::Slice { position, .. }
            | Expression::Selector { position, .. }
            | Expression::Import { position, .. }
            | Expression::Error { position, .. } => *position,
        }
    }

    /// Whether the expression can appear on the left of `=` or `op=`.
    pub fn is_assignable(&self) -> bool {
        matches!(
            self,
            Expression::Identifier { .. } | Expression::Index { .. } | Expression::Selector { .. }
        )
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier { name, .. } => write!(f, "{}", name),
            Expression::Integer { value, .. } => write!(f, "{}", value),
            Expression::Float { value, .. } => write!(f, "{}", value),
            Expression::Char { value, .. } => write!(f, "'{}'", value),
            Expression::String { value, .. } => write!(f, "{:?}", value),
            Expression::Boolean { value, .. } => write!(f, "{}", value),
            Expression::Undefined { .. } => write!(f, "undefined"),
            Expression::Array { elements, .. } => {
                write!(f, "[{}]", join(elements))
            }
            Expression::Map { pairs, .. } => {
                let rendered = pairs
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, v))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{{{}}}", rendered)
            }
            Expression::Function {
                parameters,
                variadic,
                body,
                ..
            } => {
                let mut params = parameters.clone();
                if *variadic && let Some(last) = params.last_mut() {
                    *last = format!("...{}", last);
                }
                write!(f, "func({}) {}", params.join(", "), body)
            }
            Expression::Prefix {
                operator, right, ..
            } => write!(f, "({}{})", operator, right),
            Expression::Infix {
                left,
                operator,
                right,
                ..
            } => write!(f, "({} {} {})", left, operator, right),
            Expression::Conditional {
                condition,
                consequence,
                alternative,
                ..
            } => write!(f, "({} ? {} : {})", condition, consequence, alternative),
            Expression::Call {
                function,
                arguments,
                spread,
                ..
            } => {
                let ellipsis = if *spread { "..." } else { "" };
                write!(f, "{}({}{})", function, join(arguments), ellipsis)
            }
            Expression::Index { left, index, .. } => write!(f, "({}[{}])", left, index),
            Expression::Slice {
                left, low, high, ..
            } => {
                let low = low.as_ref().map(|e| e.to_string()).unwrap_or_default();
                let high = high.as_ref().map(|e| e.to_string()).unwrap_or_default();
                write!(f, "({}[{}:{}])", left, low, high)
            }
            Expression::Selector { left, member, .. } => write!(f, "{}.{}", left, member),
            Expression::Import { name, .. } => write!(f, "import({:?})", name),
            Expression::Error { value, .. } => write!(f, "error({})", value),
        }
    }
}

fn join(expressions: &[Expression]) -> String {
    expressions
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
