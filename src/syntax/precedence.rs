use std::sync::LazyLock;

use crate::syntax::token_type::TokenType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    Ternary,    // c ? a : b
    LogicalOr,  // ||
    LogicalAnd, // &&
    Compare,    // == != < <= > >=
    Sum,        // + - | ^
    Product,    // * / % << >> & &^
    Prefix,     // -x !x ^x
    Postfix,    // f(x) a[i] a.b
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpInfo {
    pub token: TokenType,
    pub precedence: Precedence,
    pub associativity: Assoc,
}

const fn left(token: TokenType, precedence: Precedence) -> OpInfo {
    OpInfo {
        token,
        precedence,
        associativity: Assoc::Left,
    }
}

// Single source of truth for infix/postfix precedence + associativity.
pub const OPERATOR_TABLE: &[OpInfo] = &[
    OpInfo {
        token: TokenType::Question,
        precedence: Precedence::Ternary,
        associativity: Assoc::Right,
    },
    left(TokenType::Or, Precedence::LogicalOr),
    left(TokenType::And, Precedence::LogicalAnd),
    left(TokenType::Eq, Precedence::Compare),
    left(TokenType::NotEq, Precedence::Compare),
    left(TokenType::Lt, Precedence::Compare),
    left(TokenType::Lte, Precedence::Compare),
    left(TokenType::Gt, Precedence::Compare),
    left(TokenType::Gte, Precedence::Compare),
    left(TokenType::Plus, Precedence::Sum),
    left(TokenType::Minus, Precedence::Sum),
    left(TokenType::Bar, Precedence::Sum),
    left(TokenType::Caret, Precedence::Sum),
    left(TokenType::Asterisk, Precedence::Product),
    left(TokenType::Slash, Precedence::Product),
    left(TokenType::Percent, Precedence::Product),
    left(TokenType::Shl, Precedence::Product),
    left(TokenType::Shr, Precedence::Product),
    left(TokenType::Ampersand, Precedence::Product),
    left(TokenType::AndNot, Precedence::Product),
    // Postfix operators handled by Pratt infix dispatch
    left(TokenType::LParen, Precedence::Postfix),
    left(TokenType::LBracket, Precedence::Postfix),
    left(TokenType::Dot, Precedence::Postfix),
];

pub static INFIX_TABLE: LazyLock<[Option<OpInfo>; TokenType::COUNT]> = LazyLock::new(|| {
    let mut table = [None; TokenType::COUNT];
    for info in OPERATOR_TABLE {
        let index = info.token.as_usize();
        debug_assert!(
            table[index].is_none(),
            "duplicate operator table entry for token {:?}",
            info.token
        );
        table[index] = Some(*info);
    }
    table
});

pub fn infix_op(token_type: TokenType) -> Option<OpInfo> {
    INFIX_TABLE[token_type.as_usize()]
}

pub fn token_precedence(token_type: TokenType) -> Precedence {
    infix_op(token_type).map_or(Precedence::Lowest, |op| op.precedence)
}

fn precedence_below(precedence: Precedence) -> Precedence {
    match precedence {
        Precedence::Lowest | Precedence::Ternary => Precedence::Lowest,
        Precedence::LogicalOr => Precedence::Ternary,
        Precedence::LogicalAnd => Precedence::LogicalOr,
        Precedence::Compare => Precedence::LogicalAnd,
        Precedence::Sum => Precedence::Compare,
        Precedence::Product => Precedence::Sum,
        Precedence::Prefix => Precedence::Product,
        Precedence::Postfix => Precedence::Prefix,
    }
}

/// Binding power used when parsing the right operand of `token_type`.
pub fn rhs_precedence_for_infix(token_type: TokenType) -> Precedence {
    match infix_op(token_type) {
        Some(OpInfo {
            precedence,
            associativity: Assoc::Right,
            ..
        }) => precedence_below(precedence),
        Some(op) => op.precedence,
        None => Precedence::Lowest,
    }
}
