use std::sync::Arc;

use crate::{
    bytecode::{op_code::OpCode, symbol_scope::SymbolScope},
    runtime::{compiled_function::CompiledFunction, operator::BinaryOperator, value::Value},
    syntax::{block::Block, expression::Expression, token_type::TokenType},
};

use super::{CompileResult, Compiler};

/// Placeholder operand for jumps patched once the target is known.
const PENDING_JUMP: usize = 9999;

impl Compiler {
    pub(super) fn compile_expression(&mut self, expression: &Expression) -> CompileResult<()> {
        let saved = std::mem::replace(&mut self.position, expression.position());
        let result = self.compile_expression_inner(expression);
        self.position = saved;
        result
    }

    fn compile_expression_inner(&mut self, expression: &Expression) -> CompileResult<()> {
        match expression {
            Expression::Identifier { name, .. } => {
                let binding = self
                    .symbol_table
                    .resolve(name)
                    .ok_or_else(|| self.unresolved_reference(name))?;
                self.load_symbol(&binding)?;
            }
            Expression::Integer { value, .. } => self.emit_constant(Value::Int(*value))?,
            Expression::Float { value, .. } => self.emit_constant(Value::Float(*value))?,
            Expression::Char { value, .. } => self.emit_constant(Value::Char(*value))?,
            Expression::String { value, .. } => self.emit_constant(Value::string(value.as_str()))?,
            Expression::Boolean { value, .. } => {
                self.emit(if *value { OpCode::OpTrue } else { OpCode::OpFalse }, &[])?;
            }
            Expression::Undefined { .. } => {
                self.emit(OpCode::OpUndefined, &[])?;
            }
            Expression::Array { elements, .. } => {
                for element in elements {
                    self.compile_expression(element)?;
                }
                self.emit(OpCode::OpArray, &[elements.len()])?;
            }
            Expression::Map { pairs, .. } => {
                for (key, value) in pairs {
                    self.emit_constant(Value::string(key.as_str()))?;
                    self.compile_expression(value)?;
                }
                self.emit(OpCode::OpMap, &[pairs.len() * 2])?;
            }
            Expression::Function {
                parameters,
                variadic,
                body,
                ..
            } => self.compile_function_literal(parameters, *variadic, body)?,
            Expression::Prefix {
                operator, right, ..
            } => {
                self.compile_expression(right)?;
                match operator {
                    TokenType::Minus => {
                        self.emit(OpCode::OpMinus, &[])?;
                    }
                    TokenType::Bang => {
                        self.emit(OpCode::OpBang, &[])?;
                    }
                    TokenType::Caret => {
                        self.emit(OpCode::OpComplement, &[])?;
                    }
                    TokenType::Plus => {}
                    other => {
                        return Err(self.error(format!("invalid prefix operator '{}'", other)));
                    }
                }
            }
            Expression::Infix {
                left,
                operator,
                right,
                ..
            } => self.compile_infix(left, *operator, right)?,
            Expression::Conditional {
                condition,
                consequence,
                alternative,
                ..
            } => {
                self.compile_expression(condition)?;
                let jump_falsy = self.emit(OpCode::OpJumpFalsy, &[PENDING_JUMP])?;
                self.compile_expression(consequence)?;
                let jump_end = self.emit(OpCode::OpJump, &[PENDING_JUMP])?;
                let else_start = self.current_instructions_len();
                self.change_operand(jump_falsy, else_start)?;
                self.compile_expression(alternative)?;
                let end = self.current_instructions_len();
                self.change_operand(jump_end, end)?;
            }
            Expression::Call {
                function,
                arguments,
                spread,
                ..
            } => {
                if arguments.len() > u8::MAX as usize {
                    return Err(self.error(format!(
                        "too many arguments: max {}, got {}",
                        u8::MAX,
                        arguments.len()
                    )));
                }
                self.compile_expression(function)?;
                for argument in arguments {
                    self.compile_expression(argument)?;
                }
                self.emit(OpCode::OpCall, &[arguments.len(), usize::from(*spread)])?;
            }
            Expression::Index { left, index, .. } => {
                self.compile_expression(left)?;
                self.compile_expression(index)?;
                self.emit(OpCode::OpIndex, &[])?;
            }
            Expression::Slice {
                left, low, high, ..
            } => {
                self.compile_expression(left)?;
                match low {
                    Some(low) => self.compile_expression(low)?,
                    None => {
                        self.emit(OpCode::OpUndefined, &[])?;
                    }
                }
                match high {
                    Some(high) => self.compile_expression(high)?,
                    None => {
                        self.emit(OpCode::OpUndefined, &[])?;
                    }
                }
                self.emit(OpCode::OpSliceIndex, &[])?;
            }
            Expression::Selector { left, member, .. } => {
                self.compile_expression(left)?;
                self.emit_constant(Value::string(member.as_str()))?;
                self.emit(OpCode::OpIndex, &[])?;
            }
            Expression::Import { name, .. } => self.compile_import(name)?,
            Expression::Error { value, .. } => {
                self.compile_expression(value)?;
                self.emit(OpCode::OpError, &[])?;
            }
        }
        Ok(())
    }

    fn compile_infix(
        &mut self,
        left: &Expression,
        operator: TokenType,
        right: &Expression,
    ) -> CompileResult<()> {
        if matches!(operator, TokenType::And | TokenType::Or) {
            self.compile_expression(left)?;
            let op = if operator == TokenType::And {
                OpCode::OpAndJump
            } else {
                OpCode::OpOrJump
            };
            let jump = self.emit(op, &[PENDING_JUMP])?;
            self.compile_expression(right)?;
            let end = self.current_instructions_len();
            self.change_operand(jump, end)?;
            return Ok(());
        }

        self.compile_expression(left)?;
        self.compile_expression(right)?;
        match operator {
            TokenType::Eq => {
                self.emit(OpCode::OpEqual, &[])?;
            }
            TokenType::NotEq => {
                self.emit(OpCode::OpNotEqual, &[])?;
            }
            other => {
                let op = BinaryOperator::from_token(other)
                    .ok_or_else(|| self.error(format!("invalid binary operator '{}'", other)))?;
                self.emit(OpCode::OpBinaryOp, &[op as usize])?;
            }
        }
        Ok(())
    }

    fn compile_function_literal(
        &mut self,
        parameters: &[String],
        variadic: bool,
        body: &Block,
    ) -> CompileResult<()> {
        self.enter_scope();
        let result = self.compile_function_body(parameters, body);
        let (instructions, source_map, table) = self.leave_scope();
        result?;

        for free in &table.free_symbols {
            match free.symbol_scope {
                SymbolScope::Local => {
                    // A function literal capturing its own not-yet-stored
                    // name: give the slot a cell first so the later store
                    // writes through it.
                    if self.symbol_table.mark_assigned(&free.name) == Some(false) {
                        self.emit(OpCode::OpUndefined, &[])?;
                        self.emit(OpCode::OpDefineLocal, &[free.index])?;
                    }
                    self.emit(OpCode::OpGetLocalPtr, &[free.index])?;
                }
                SymbolScope::Free => {
                    self.emit(OpCode::OpGetFreePtr, &[free.index])?;
                }
                SymbolScope::Global | SymbolScope::Builtin => {
                    return Err(self.error(format!("cannot capture '{}'", free.name)));
                }
            }
        }

        let function = CompiledFunction {
            instructions,
            num_locals: table.max_symbols(),
            num_parameters: parameters.len(),
            variadic,
            file: self.file.clone(),
            source_map,
        };
        let index = self.add_constant(Value::Function(Arc::new(function)));
        self.emit(OpCode::OpClosure, &[index, table.free_symbols.len()])?;
        Ok(())
    }

    fn compile_function_body(&mut self, parameters: &[String], body: &Block) -> CompileResult<()> {
        for parameter in parameters {
            self.symbol_table.define_parameter(parameter);
        }
        self.compile_block(body)?;
        // Always terminate the body: a jump past a trailing `return` still
        // needs somewhere to land.
        self.emit(OpCode::OpReturn, &[])?;
        Ok(())
    }
}
