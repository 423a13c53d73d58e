use std::fmt;

use crate::syntax::token_type::TokenType;

/// Operators dispatched through [`Value::binary_op`](crate::Value::binary_op)
/// and [`Object::binary_op`](crate::Object::binary_op). Equality is not an
/// operator here; it goes through `equals`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BinaryOperator {
    Add = 0,
    Sub = 1,
    Mul = 2,
    Quo = 3,
    Rem = 4,
    And = 5,
    Or = 6,
    Xor = 7,
    Shl = 8,
    Shr = 9,
    AndNot = 10,
    Less = 11,
    LessEq = 12,
    Greater = 13,
    GreaterEq = 14,
}

impl BinaryOperator {
    pub fn from_token(token_type: TokenType) -> Option<Self> {
        let op = match token_type {
            TokenType::Plus => BinaryOperator::Add,
            TokenType::Minus => BinaryOperator::Sub,
            TokenType::Asterisk => BinaryOperator::Mul,
            TokenType::Slash => BinaryOperator::Quo,
            TokenType::Percent => BinaryOperator::Rem,
            TokenType::Ampersand => BinaryOperator::And,
            TokenType::Bar => BinaryOperator::Or,
            TokenType::Caret => BinaryOperator::Xor,
            TokenType::Shl => BinaryOperator::Shl,
            TokenType::Shr => BinaryOperator::Shr,
            TokenType::AndNot => BinaryOperator::AndNot,
            TokenType::Lt => BinaryOperator::Less,
            TokenType::Lte => BinaryOperator::LessEq,
            TokenType::Gt => BinaryOperator::Greater,
            TokenType::Gte => BinaryOperator::GreaterEq,
            _ => return None,
        };
        Some(op)
    }

    pub fn from_u8(byte: u8) -> Option<Self> {
        let op = match byte {
            0 => BinaryOperator::Add,
            1 => BinaryOperator::Sub,
            2 => BinaryOperator::Mul,
            3 => BinaryOperator::Quo,
            4 => BinaryOperator::Rem,
            5 => BinaryOperator::And,
            6 => BinaryOperator::Or,
            7 => BinaryOperator::Xor,
            8 => BinaryOperator::Shl,
            9 => BinaryOperator::Shr,
            10 => BinaryOperator::AndNot,
            11 => BinaryOperator::Less,
            12 => BinaryOperator::LessEq,
            13 => BinaryOperator::Greater,
            14 => BinaryOperator::GreaterEq,
            _ => return None,
        };
        Some(op)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Quo => "/",
            BinaryOperator::Rem => "%",
            BinaryOperator::And => "&",
            BinaryOperator::Or => "|",
            BinaryOperator::Xor => "^",
            BinaryOperator::Shl => "<<",
            BinaryOperator::Shr => ">>",
            BinaryOperator::AndNot => "&^",
            BinaryOperator::Less => "<",
            BinaryOperator::LessEq => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEq => ">=",
        }
    }

    /// The operator to apply with the operands swapped, if one exists:
    /// `a op b == b op.reflected() a`.
    pub fn reflected(self) -> Option<Self> {
        match self {
            BinaryOperator::Add
            | BinaryOperator::Mul
            | BinaryOperator::And
            | BinaryOperator::Or
            | BinaryOperator::Xor => Some(self),
            BinaryOperator::Less => Some(BinaryOperator::Greater),
            BinaryOperator::Greater => Some(BinaryOperator::Less),
            BinaryOperator::LessEq => Some(BinaryOperator::GreaterEq),
            BinaryOperator::GreaterEq => Some(BinaryOperator::LessEq),
            BinaryOperator::Sub
            | BinaryOperator::Quo
            | BinaryOperator::Rem
            | BinaryOperator::Shl
            | BinaryOperator::Shr
            | BinaryOperator::AndNot => None,
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
