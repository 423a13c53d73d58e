use crate::syntax::{
    error::{ParseError, SyntaxError},
    lexer::Lexer,
    position::Position,
    precedence::{Precedence, token_precedence},
    program::Program,
    token::Token,
    token_type::TokenType,
};

mod expression;
mod statement;

#[cfg(test)]
mod parser_test;

const MAX_ERRORS: usize = 10;

pub struct Parser {
    lexer: Lexer,
    pub(super) current_token: Token,
    pub(super) peek_token: Token,
    pub errors: Vec<ParseError>,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Self {
        let mut parser = Parser {
            lexer,
            current_token: Token::new(TokenType::Eof, "", 0, 0),
            peek_token: Token::new(TokenType::Eof, "", 0, 0),
            errors: Vec::new(),
        };
        parser.next_token();
        parser.next_token();
        parser
    }

    /// Parses a whole source file. `file` names the source in error positions.
    pub fn parse_source(source: &str, file: &str) -> Result<Program, SyntaxError> {
        let mut parser = Parser::new(Lexer::new(source));
        let program = parser.parse_program();
        if parser.errors.is_empty() {
            Ok(program)
        } else {
            Err(SyntaxError {
                file: file.to_string(),
                errors: parser.errors,
            })
        }
    }

    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::new();

        while !self.current_is(TokenType::Eof) {
            if self.current_is(TokenType::Semicolon) {
                self.next_token();
                continue;
            }
            if self.errors.len() >= MAX_ERRORS {
                break;
            }
            match self.parse_statement() {
                Some(statement) => {
                    program.statements.push(statement);
                    self.next_token();
                    self.expect_statement_end(TokenType::Eof);
                }
                None => self.synchronize(),
            }
        }

        program
    }

    pub(super) fn next_token(&mut self) {
        self.current_token = std::mem::replace(&mut self.peek_token, self.lexer.next_token());
    }

    pub(super) fn current_is(&self, token_type: TokenType) -> bool {
        self.current_token.token_type == token_type
    }

    pub(super) fn peek_is(&self, token_type: TokenType) -> bool {
        self.peek_token.token_type == token_type
    }

    pub(super) fn peek_precedence(&self) -> Precedence {
        token_precedence(self.peek_token.token_type)
    }

    pub(super) fn expect_peek(&mut self, token_type: TokenType) -> Option<()> {
        if self.peek_is(token_type) {
            self.next_token();
            Some(())
        } else {
            let found = self.peek_token.clone();
            self.error_at(
                found.position,
                format!("expected '{}', found '{}'", token_type, found),
            );
            None
        }
    }

    /// Skips semicolons inserted at line ends so literals and argument lists
    /// may span lines without trailing commas.
    pub(super) fn skip_peek_newlines(&mut self) {
        while self.peek_token.is_inserted_semicolon() {
            self.next_token();
        }
    }

    /// After a statement the current token must terminate it: `;`, the
    /// enclosing `}` or end of input.
    pub(super) fn expect_statement_end(&mut self, closing: TokenType) {
        match self.current_token.token_type {
            TokenType::Semicolon => self.next_token(),
            TokenType::Eof => {}
            t if t == closing => {}
            _ => {
                let found = self.current_token.clone();
                self.error_at(
                    found.position,
                    format!("expected ';', found '{}'", found),
                );
                self.synchronize();
            }
        }
    }

    fn synchronize(&mut self) {
        while !matches!(
            self.current_token.token_type,
            TokenType::Semicolon | TokenType::Eof
        ) {
            self.next_token();
        }
        if self.current_is(TokenType::Semicolon) {
            self.next_token();
        }
    }

    pub(super) fn error_at(&mut self, position: Position, message: impl Into<String>) {
        self.errors.push(ParseError {
            message: message.into(),
            position,
        });
    }

    pub(super) fn unexpected_current(&mut self) {
        let token = self.current_token.clone();
        let message = if token.token_type == TokenType::Illegal {
            token.literal.clone()
        } else {
            format!("unexpected '{}'", token)
        };
        self.error_at(token.position, message);
    }
}
