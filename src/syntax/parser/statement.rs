use crate::syntax::{
    block::Block, expression::Expression, position::Position, precedence::Precedence,
    statement::Statement, token_type::TokenType,
};

use super::Parser;

impl Parser {
    pub(super) fn parse_statement(&mut self) -> Option<Statement> {
        let position = self.current_token.position;
        match self.current_token.token_type {
            TokenType::Return => self.parse_return_statement(),
            TokenType::Export => {
                self.next_token();
                let value = self.parse_expression(Precedence::Lowest)?;
                Some(Statement::Export { value, position })
            }
            TokenType::Break => Some(Statement::Break { position }),
            TokenType::Continue => Some(Statement::Continue { position }),
            TokenType::If => self.parse_if_statement(),
            TokenType::For => self.parse_for_statement(),
            TokenType::LBrace => Some(Statement::Block(self.parse_block()?)),
            _ => self.parse_simple_statement(),
        }
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        let position = self.current_token.position;
        if matches!(
            self.peek_token.token_type,
            TokenType::Semicolon | TokenType::RBrace | TokenType::Eof
        ) {
            return Some(Statement::Return {
                value: None,
                position,
            });
        }
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        Some(Statement::Return {
            value: Some(value),
            position,
        })
    }

    /// Expression, definition, assignment or `++`/`--` statement.
    pub(super) fn parse_simple_statement(&mut self) -> Option<Statement> {
        let position = self.current_token.position;
        let expression = self.parse_expression(Precedence::Lowest)?;
        let operator = self.peek_token.token_type;

        match operator {
            TokenType::Define => {
                let Expression::Identifier { name, .. } = expression else {
                    self.error_at(position, "expected identifier on left side of ':='");
                    return None;
                };
                self.next_token();
                self.next_token();
                let value = self.parse_expression(Precedence::Lowest)?;
                Some(Statement::Define {
                    name,
                    value,
                    position,
                })
            }
            op if op.is_assignment() => {
                if !expression.is_assignable() {
                    self.error_at(position, format!("cannot assign to {}", expression));
                    return None;
                }
                self.next_token();
                self.next_token();
                let value = self.parse_expression(Precedence::Lowest)?;
                Some(Statement::Assign {
                    target: expression,
                    operator: op,
                    value,
                    position,
                })
            }
            TokenType::Inc | TokenType::Dec => {
                if !expression.is_assignable() {
                    self.error_at(position, format!("cannot assign to {}", expression));
                    return None;
                }
                self.next_token();
                Some(Statement::IncDec {
                    target: expression,
                    operator,
                    position,
                })
            }
            _ => Some(Statement::Expression {
                expression,
                position,
            }),
        }
    }

    /// Parses `{ ... }` starting at the `{`; leaves the current token on `}`.
    pub(super) fn parse_block(&mut self) -> Option<Block> {
        let position = self.current_token.position;
        let mut statements = Vec::new();
        self.next_token();

        while !self.current_is(TokenType::RBrace) {
            if self.current_is(TokenType::Eof) {
                let at = self.current_token.position;
                self.error_at(at, "expected '}', found EOF");
                return None;
            }
            if self.current_is(TokenType::Semicolon) {
                self.next_token();
                continue;
            }
            let statement = self.parse_statement()?;
            statements.push(statement);
            self.next_token();
            self.expect_statement_end(TokenType::RBrace);
        }

        Some(Block {
            statements,
            position,
        })
    }

    fn parse_if_statement(&mut self) -> Option<Statement> {
        let position = self.current_token.position;
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenType::LBrace)?;
        let consequence = self.parse_block()?;

        let alternative = if self.peek_is(TokenType::Else) {
            self.next_token();
            if self.peek_is(TokenType::If) {
                self.next_token();
                Some(Box::new(self.parse_if_statement()?))
            } else {
                self.expect_peek(TokenType::LBrace)?;
                Some(Box::new(Statement::Block(self.parse_block()?)))
            }
        } else {
            None
        };

        Some(Statement::If {
            condition,
            consequence,
            alternative,
            position,
        })
    }

    fn parse_for_statement(&mut self) -> Option<Statement> {
        let position = self.current_token.position;

        if self.peek_is(TokenType::LBrace) {
            self.next_token();
            let body = self.parse_block()?;
            return Some(Statement::For {
                init: None,
                condition: None,
                post: None,
                body,
                position,
            });
        }

        self.next_token();
        if self.current_is(TokenType::Ident)
            && (self.peek_is(TokenType::Comma) || self.peek_is(TokenType::In))
        {
            return self.parse_for_in(position);
        }

        let mut init = None;
        if !self.current_is(TokenType::Semicolon) {
            let first = self.parse_simple_statement()?;
            if !self.peek_is(TokenType::Semicolon) {
                let Statement::Expression { expression, .. } = first else {
                    self.error_at(first.position(), "expected for loop condition");
                    return None;
                };
                self.expect_peek(TokenType::LBrace)?;
                let body = self.parse_block()?;
                return Some(Statement::For {
                    init: None,
                    condition: Some(expression),
                    post: None,
                    body,
                    position,
                });
            }
            init = Some(Box::new(first));
            self.next_token();
        }

        let condition = if self.peek_is(TokenType::Semicolon) {
            None
        } else {
            self.next_token();
            Some(self.parse_expression(Precedence::Lowest)?)
        };
        self.expect_peek(TokenType::Semicolon)?;

        let post = if self.peek_is(TokenType::LBrace) {
            None
        } else {
            self.next_token();
            Some(Box::new(self.parse_simple_statement()?))
        };
        self.expect_peek(TokenType::LBrace)?;
        let body = self.parse_block()?;

        Some(Statement::For {
            init,
            condition,
            post,
            body,
            position,
        })
    }

    fn parse_for_in(&mut self, position: Position) -> Option<Statement> {
        let first = self.current_token.literal.clone();
        let (key, value) = if self.peek_is(TokenType::Comma) {
            self.next_token();
            self.expect_peek(TokenType::Ident)?;
            (first, self.current_token.literal.clone())
        } else {
            ("_".to_string(), first)
        };

        self.expect_peek(TokenType::In)?;
        self.next_token();
        let iterable = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenType::LBrace)?;
        let body = self.parse_block()?;

        Some(Statement::ForIn {
            key,
            value,
            iterable,
            body,
            position,
        })
    }
}
