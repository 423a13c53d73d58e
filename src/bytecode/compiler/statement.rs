use crate::{
    bytecode::{compilation_scope::LoopScope, op_code::OpCode, symbol_scope::SymbolScope},
    runtime::{operator::BinaryOperator, value::Value},
    syntax::{
        block::Block, expression::Expression, statement::Statement,
        token_type::TokenType,
    },
};

use super::{CompileResult, Compiler};

/// Placeholder operand for jumps patched once the target is known.
const PENDING_JUMP: usize = 9999;

impl Compiler {
    pub(super) fn compile_statement(&mut self, statement: &Statement) -> CompileResult<()> {
        let saved = std::mem::replace(&mut self.position, statement.position());
        let result = self.compile_statement_inner(statement);
        self.position = saved;
        result
    }

    fn compile_statement_inner(&mut self, statement: &Statement) -> CompileResult<()> {
        match statement {
            Statement::Expression { expression, .. } => {
                self.compile_expression(expression)?;
                self.emit(OpCode::OpPop, &[])?;
            }
            Statement::Define { name, value, .. } => self.compile_define(name, value)?,
            Statement::Assign {
                target,
                operator,
                value,
                ..
            } => self.compile_assign(target, *operator, value)?,
            Statement::IncDec {
                target,
                operator,
                position,
            } => {
                let op = if *operator == TokenType::Inc {
                    TokenType::PlusAssign
                } else {
                    TokenType::MinusAssign
                };
                let one = Expression::Integer {
                    value: 1,
                    position: *position,
                };
                self.compile_assign(target, op, &one)?;
            }
            Statement::Return { value, .. } => {
                if self.scope_index == 0 {
                    return Err(self.error("return not allowed outside function"));
                }
                match value {
                    Some(value) => {
                        self.compile_expression(value)?;
                        self.emit(OpCode::OpReturnValue, &[])?;
                    }
                    None => {
                        self.emit(OpCode::OpReturn, &[])?;
                    }
                }
            }
            Statement::Export { value, .. } => {
                if self.module_scope.is_none() {
                    return Err(self.error("export not allowed outside module"));
                }
                if self.module_scope != Some(self.scope_index) {
                    return Err(self.error("export not allowed inside function"));
                }
                self.compile_expression(value)?;
                self.emit(OpCode::OpReturnValue, &[])?;
            }
            Statement::Break { .. } => {
                let pos = self.emit(OpCode::OpJump, &[PENDING_JUMP])?;
                match self.current_scope_mut().loops.last_mut() {
                    Some(loop_scope) => loop_scope.breaks.push(pos),
                    None => return Err(self.error("break not allowed outside loop")),
                }
            }
            Statement::Continue { .. } => {
                let pos = self.emit(OpCode::OpJump, &[PENDING_JUMP])?;
                match self.current_scope_mut().loops.last_mut() {
                    Some(loop_scope) => loop_scope.continues.push(pos),
                    None => return Err(self.error("continue not allowed outside loop")),
                }
            }
            Statement::If {
                condition,
                consequence,
                alternative,
                ..
            } => self.compile_if(condition, consequence, alternative.as_deref())?,
            Statement::For {
                init,
                condition,
                post,
                body,
                ..
            } => self.compile_for(init.as_deref(), condition.as_ref(), post.as_deref(), body)?,
            Statement::ForIn {
                key,
                value,
                iterable,
                body,
                ..
            } => self.compile_for_in(key, value, iterable, body)?,
            Statement::Block(block) => {
                self.enter_block();
                let result = self.compile_block(block);
                self.leave_block();
                result?;
            }
        }
        Ok(())
    }

    pub(super) fn compile_block(&mut self, block: &Block) -> CompileResult<()> {
        for statement in &block.statements {
            self.compile_statement(statement)?;
        }
        Ok(())
    }

    fn compile_scoped_block(&mut self, block: &Block) -> CompileResult<()> {
        self.enter_block();
        let result = self.compile_block(block);
        self.leave_block();
        result
    }

    fn compile_define(&mut self, name: &str, value: &Expression) -> CompileResult<()> {
        if self.symbol_table.exists_in_current_scope(name) {
            return Err(self.redeclared(name));
        }

        // Function literals see their own name, so they can recurse.
        let early = matches!(value, Expression::Function { .. })
            .then(|| self.symbol_table.define(name));

        self.compile_expression(value)?;

        let binding = match early {
            Some(binding) => binding,
            None => self.symbol_table.define(name),
        };
        self.store_symbol(&binding, true)
    }

    fn compile_assign(
        &mut self,
        target: &Expression,
        operator: TokenType,
        value: &Expression,
    ) -> CompileResult<()> {
        let binary = match operator.compound_operator() {
            Some(token) => Some(
                BinaryOperator::from_token(token)
                    .ok_or_else(|| self.error(format!("invalid assignment operator '{}'", operator)))?,
            ),
            None => None,
        };

        match target {
            Expression::Identifier { name, .. } => {
                let binding = self
                    .symbol_table
                    .resolve(name)
                    .ok_or_else(|| self.unresolved_reference(name))?;
                if binding.symbol_scope == SymbolScope::Builtin {
                    return Err(self.error(format!("cannot assign to builtin '{}'", name)));
                }
                if let Some(op) = binary {
                    self.load_symbol(&binding)?;
                    self.compile_expression(value)?;
                    self.emit(OpCode::OpBinaryOp, &[op as usize])?;
                } else {
                    self.compile_expression(value)?;
                }
                self.store_symbol(&binding, false)
            }
            Expression::Index { left, index, .. } => {
                self.compile_expression(left)?;
                self.compile_expression(index)?;
                self.compile_assigned_value(target, binary, value)?;
                self.emit(OpCode::OpSetIndex, &[])?;
                Ok(())
            }
            Expression::Selector { left, member, .. } => {
                self.compile_expression(left)?;
                self.emit_constant(Value::string(member.as_str()))?;
                self.compile_assigned_value(target, binary, value)?;
                self.emit(OpCode::OpSetIndex, &[])?;
                Ok(())
            }
            _ => Err(self.error(format!("cannot assign to {}", target))),
        }
    }

    /// Pushes the value to store into an element: either the right-hand side
    /// or `target op rhs` for compound assignment.
    fn compile_assigned_value(
        &mut self,
        target: &Expression,
        binary: Option<BinaryOperator>,
        value: &Expression,
    ) -> CompileResult<()> {
        if let Some(op) = binary {
            self.compile_expression(target)?;
            self.compile_expression(value)?;
            self.emit(OpCode::OpBinaryOp, &[op as usize])?;
        } else {
            self.compile_expression(value)?;
        }
        Ok(())
    }

    fn compile_if(
        &mut self,
        condition: &Expression,
        consequence: &Block,
        alternative: Option<&Statement>,
    ) -> CompileResult<()> {
        self.compile_expression(condition)?;
        let jump_falsy = self.emit(OpCode::OpJumpFalsy, &[PENDING_JUMP])?;

        self.compile_scoped_block(consequence)?;

        match alternative {
            Some(alternative) => {
                let jump_end = self.emit(OpCode::OpJump, &[PENDING_JUMP])?;
                let else_start = self.current_instructions_len();
                self.change_operand(jump_falsy, else_start)?;

                match alternative {
                    Statement::Block(block) => self.compile_scoped_block(block)?,
                    other => self.compile_statement(other)?,
                }

                let end = self.current_instructions_len();
                self.change_operand(jump_end, end)?;
            }
            None => {
                let end = self.current_instructions_len();
                self.change_operand(jump_falsy, end)?;
            }
        }
        Ok(())
    }

    fn compile_for(
        &mut self,
        init: Option<&Statement>,
        condition: Option<&Expression>,
        post: Option<&Statement>,
        body: &Block,
    ) -> CompileResult<()> {
        self.enter_block();
        let result = self.compile_for_inner(init, condition, post, body);
        self.leave_block();
        result
    }

    fn compile_for_inner(
        &mut self,
        init: Option<&Statement>,
        condition: Option<&Expression>,
        post: Option<&Statement>,
        body: &Block,
    ) -> CompileResult<()> {
        if let Some(init) = init {
            self.compile_statement(init)?;
        }

        let pre_condition = self.current_instructions_len();
        let exit_jump = match condition {
            Some(condition) => {
                self.compile_expression(condition)?;
                Some(self.emit(OpCode::OpJumpFalsy, &[PENDING_JUMP])?)
            }
            None => None,
        };

        self.current_scope_mut().loops.push(LoopScope::default());
        self.compile_scoped_block(body)?;
        let loop_scope = self.current_scope_mut().loops.pop().unwrap_or_default();

        let post_body = self.current_instructions_len();
        if let Some(post) = post {
            self.compile_statement(post)?;
        }
        self.emit(OpCode::OpJump, &[pre_condition])?;

        let exit = self.current_instructions_len();
        if let Some(exit_jump) = exit_jump {
            self.change_operand(exit_jump, exit)?;
        }
        self.patch_loop(&loop_scope, post_body, exit)?;
        Ok(())
    }

    fn compile_for_in(
        &mut self,
        key: &str,
        value: &str,
        iterable: &Expression,
        body: &Block,
    ) -> CompileResult<()> {
        self.enter_block();
        let result = self.compile_for_in_inner(key, value, iterable, body);
        self.leave_block();
        result
    }

    fn compile_for_in_inner(
        &mut self,
        key: &str,
        value: &str,
        iterable: &Expression,
        body: &Block,
    ) -> CompileResult<()> {
        self.compile_expression(iterable)?;
        self.emit(OpCode::OpIteratorInit, &[])?;

        // Hidden variable; ':' cannot appear in a script identifier.
        let iterator = self.symbol_table.define(":it");
        self.store_symbol(&iterator, true)?;

        let pre_condition = self.current_instructions_len();
        self.load_symbol(&iterator)?;
        self.emit(OpCode::OpIteratorNext, &[])?;
        let exit_jump = self.emit(OpCode::OpJumpFalsy, &[PENDING_JUMP])?;

        // Key and value are re-defined on every pass, so closures created in
        // the body capture that iteration's values.
        if key != "_" {
            let binding = self.symbol_table.define(key);
            self.load_symbol(&iterator)?;
            self.emit(OpCode::OpIteratorKey, &[])?;
            self.store_symbol(&binding, true)?;
        }
        if value != "_" {
            let binding = self.symbol_table.define(value);
            self.load_symbol(&iterator)?;
            self.emit(OpCode::OpIteratorValue, &[])?;
            self.store_symbol(&binding, true)?;
        }

        self.current_scope_mut().loops.push(LoopScope::default());
        self.compile_scoped_block(body)?;
        let loop_scope = self.current_scope_mut().loops.pop().unwrap_or_default();

        let post_body = self.current_instructions_len();
        self.emit(OpCode::OpJump, &[pre_condition])?;

        let exit = self.current_instructions_len();
        self.change_operand(exit_jump, exit)?;
        self.patch_loop(&loop_scope, post_body, exit)?;
        Ok(())
    }

    fn patch_loop(
        &mut self,
        loop_scope: &LoopScope,
        continue_target: usize,
        break_target: usize,
    ) -> CompileResult<()> {
        for &pos in &loop_scope.breaks {
            self.change_operand(pos, break_target)?;
        }
        for &pos in &loop_scope.continues {
            self.change_operand(pos, continue_target)?;
        }
        Ok(())
    }
}
