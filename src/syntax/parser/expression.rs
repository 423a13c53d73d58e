use crate::syntax::{
    expression::Expression,
    precedence::{Precedence, rhs_precedence_for_infix},
    token_type::TokenType,
};

use super::Parser;

impl Parser {
    pub(super) fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        let mut left = self.parse_prefix()?;

        while !self.peek_is(TokenType::Semicolon) && precedence < self.peek_precedence() {
            self.next_token();
            left = self.parse_infix(left)?;
        }

        Some(left)
    }

    fn parse_prefix(&mut self) -> Option<Expression> {
        let position = self.current_token.position;
        let literal = self.current_token.literal.clone();

        match self.current_token.token_type {
            TokenType::Ident => Some(Expression::Identifier {
                name: literal,
                position,
            }),
            TokenType::Int => {
                let parsed = match literal.strip_prefix("0x").or(literal.strip_prefix("0X")) {
                    Some(hex) => i64::from_str_radix(hex, 16),
                    None => literal.parse::<i64>(),
                };
                match parsed {
                    Ok(value) => Some(Expression::Integer { value, position }),
                    Err(_) => {
                        self.error_at(position, format!("could not parse {} as integer", literal));
                        None
                    }
                }
            }
            TokenType::Float => match literal.parse::<f64>() {
                Ok(value) => Some(Expression::Float { value, position }),
                Err(_) => {
                    self.error_at(position, format!("could not parse {} as float", literal));
                    None
                }
            },
            TokenType::Char => {
                let value = literal.chars().next()?;
                Some(Expression::Char { value, position })
            }
            TokenType::String => Some(Expression::String {
                value: literal,
                position,
            }),
            TokenType::True | TokenType::False => Some(Expression::Boolean {
                value: self.current_is(TokenType::True),
                position,
            }),
            TokenType::Undefined => Some(Expression::Undefined { position }),
            TokenType::Bang | TokenType::Minus | TokenType::Plus | TokenType::Caret => {
                let operator = self.current_token.token_type;
                self.next_token();
                let right = self.parse_expression(Precedence::Prefix)?;
                Some(Expression::Prefix {
                    operator,
                    right: Box::new(right),
                    position,
                })
            }
            TokenType::LParen => {
                self.next_token();
                let expression = self.parse_expression(Precedence::Lowest)?;
                self.expect_peek(TokenType::RParen)?;
                Some(expression)
            }
            TokenType::LBracket => {
                let elements = self.parse_expression_list(TokenType::RBracket)?.0;
                Some(Expression::Array { elements, position })
            }
            TokenType::LBrace => self.parse_map_literal(),
            TokenType::Func => self.parse_function_literal(),
            TokenType::Import => {
                self.expect_peek(TokenType::LParen)?;
                self.expect_peek(TokenType::String)?;
                let name = self.current_token.literal.clone();
                self.expect_peek(TokenType::RParen)?;
                Some(Expression::Import { name, position })
            }
            TokenType::Error => {
                self.expect_peek(TokenType::LParen)?;
                self.next_token();
                let value = self.parse_expression(Precedence::Lowest)?;
                self.expect_peek(TokenType::RParen)?;
                Some(Expression::Error {
                    value: Box::new(value),
                    position,
                })
            }
            _ => {
                self.unexpected_current();
                None
            }
        }
    }

    fn parse_infix(&mut self, left: Expression) -> Option<Expression> {
        let position = left.position();

        match self.current_token.token_type {
            TokenType::LParen => {
                let (arguments, spread) = self.parse_expression_list(TokenType::RParen)?;
                Some(Expression::Call {
                    function: Box::new(left),
                    arguments,
                    spread,
                    position,
                })
            }
            TokenType::LBracket => self.parse_index(left),
            TokenType::Dot => {
                self.expect_peek(TokenType::Ident)?;
                Some(Expression::Selector {
                    left: Box::new(left),
                    member: self.current_token.literal.clone(),
                    position,
                })
            }
            TokenType::Question => {
                self.next_token();
                let consequence = self.parse_expression(Precedence::Lowest)?;
                self.expect_peek(TokenType::Colon)?;
                self.next_token();
                let alternative =
                    self.parse_expression(rhs_precedence_for_infix(TokenType::Question))?;
                Some(Expression::Conditional {
                    condition: Box::new(left),
                    consequence: Box::new(consequence),
                    alternative: Box::new(alternative),
                    position,
                })
            }
            operator => {
                let precedence = rhs_precedence_for_infix(operator);
                self.next_token();
                let right = self.parse_expression(precedence)?;
                Some(Expression::Infix {
                    left: Box::new(left),
                    operator,
                    right: Box::new(right),
                    position,
                })
            }
        }
    }

    /// Parses a comma separated list after an opening `(` or `[`. A trailing
    /// `...` on the last element marks a spread and is only accepted in calls.
    fn parse_expression_list(&mut self, closing: TokenType) -> Option<(Vec<Expression>, bool)> {
        let mut items = Vec::new();
        let mut spread = false;

        self.skip_peek_newlines();
        if self.peek_is(closing) {
            self.next_token();
            return Some((items, spread));
        }

        loop {
            self.next_token();
            items.push(self.parse_expression(Precedence::Lowest)?);

            if closing == TokenType::RParen && self.peek_is(TokenType::Ellipsis) {
                self.next_token();
                spread = true;
                self.skip_peek_newlines();
                self.expect_peek(closing)?;
                break;
            }

            self.skip_peek_newlines();
            if self.peek_is(TokenType::Comma) {
                self.next_token();
                self.skip_peek_newlines();
                if self.peek_is(closing) {
                    self.next_token();
                    break;
                }
                continue;
            }

            self.expect_peek(closing)?;
            break;
        }

        Some((items, spread))
    }

    fn parse_map_literal(&mut self) -> Option<Expression> {
        let position = self.current_token.position;
        let mut pairs = Vec::new();

        loop {
            self.skip_peek_newlines();
            if self.peek_is(TokenType::RBrace) {
                self.next_token();
                break;
            }

            self.next_token();
            let key = match self.current_token.token_type {
                TokenType::Ident | TokenType::String => self.current_token.literal.clone(),
                _ => {
                    self.unexpected_current();
                    return None;
                }
            };
            self.expect_peek(TokenType::Colon)?;
            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));

            self.skip_peek_newlines();
            if self.peek_is(TokenType::Comma) {
                self.next_token();
                continue;
            }
            self.expect_peek(TokenType::RBrace)?;
            break;
        }

        Some(Expression::Map { pairs, position })
    }

    fn parse_function_literal(&mut self) -> Option<Expression> {
        let position = self.current_token.position;
        self.expect_peek(TokenType::LParen)?;

        let mut parameters: Vec<String> = Vec::new();
        let mut variadic = false;

        if self.peek_is(TokenType::RParen) {
            self.next_token();
        } else {
            loop {
                self.next_token();
                if self.current_is(TokenType::Ellipsis) {
                    variadic = true;
                    self.next_token();
                }
                if !self.current_is(TokenType::Ident) {
                    self.unexpected_current();
                    return None;
                }
                let name = self.current_token.literal.clone();
                if parameters.contains(&name) {
                    let at = self.current_token.position;
                    self.error_at(at, format!("duplicate parameter '{}'", name));
                    return None;
                }
                parameters.push(name);

                if variadic {
                    self.expect_peek(TokenType::RParen)?;
                    break;
                }
                if self.peek_is(TokenType::Comma) {
                    self.next_token();
                    continue;
                }
                self.expect_peek(TokenType::RParen)?;
                break;
            }
        }

        self.expect_peek(TokenType::LBrace)?;
        let body = self.parse_block()?;

        Some(Expression::Function {
            parameters,
            variadic,
            body,
            position,
        })
    }

    fn parse_index(&mut self, left: Expression) -> Option<Expression> {
        let position = left.position();
        let left = Box::new(left);
        self.next_token();

        let mut low = None;
        if !self.current_is(TokenType::Colon) {
            let index = self.parse_expression(Precedence::Lowest)?;
            if self.peek_is(TokenType::RBracket) {
                self.next_token();
                return Some(Expression::Index {
                    left,
                    index: Box::new(index),
                    position,
                });
            }
            self.expect_peek(TokenType::Colon)?;
            low = Some(Box::new(index));
        }

        let high = if self.peek_is(TokenType::RBracket) {
            None
        } else {
            self.next_token();
            Some(Box::new(self.parse_expression(Precedence::Lowest)?))
        };
        self.expect_peek(TokenType::RBracket)?;

        Some(Expression::Slice {
            left,
            low,
            high,
            position,
        })
    }
}
