use crate::{
    bytecode::{
        binding::Binding,
        compilation_scope::{CompilationScope, EmittedInstruction},
        op_code::{Instructions, OpCode, try_make},
        symbol_scope::SymbolScope,
        symbol_table::SymbolTable,
    },
    runtime::value::Value,
    syntax::position::Position,
};

use super::{CompileResult, Compiler};

impl Compiler {
    pub(super) fn emit(&mut self, op_code: OpCode, operands: &[usize]) -> CompileResult<usize> {
        let instruction =
            try_make(op_code, operands).map_err(|overflow| self.operand_overflow(overflow))?;
        let pos = self.add_instruction(&instruction);
        self.set_last_instruction(op_code, pos);
        Ok(pos)
    }

    fn add_instruction(&mut self, instruction: &[u8]) -> usize {
        let position = self.position;
        let scope = self.current_scope_mut();
        let pos = scope.instructions.len();
        scope.instructions.extend_from_slice(instruction);
        if scope.source_map.last().map(|(_, p)| *p) != Some(position) {
            scope.source_map.push((pos, position));
        }
        pos
    }

    fn set_last_instruction(&mut self, op_code: OpCode, pos: usize) {
        let scope = self.current_scope_mut();
        scope.previous_instruction = scope.last_instruction.clone();
        scope.last_instruction = EmittedInstruction {
            opcode: Some(op_code),
            position: pos,
        };
    }

    pub(super) fn current_instructions_len(&self) -> usize {
        self.current_scope().instructions.len()
    }

    /// Rewrites the single operand of a previously emitted jump.
    pub(super) fn change_operand(&mut self, op_pos: usize, operand: usize) -> CompileResult<()> {
        let Ok(op) = OpCode::try_from(self.current_scope().instructions[op_pos]) else {
            return Ok(());
        };
        let new_instruction =
            try_make(op, &[operand]).map_err(|overflow| self.operand_overflow(overflow))?;
        let instructions = &mut self.current_scope_mut().instructions;
        instructions[op_pos..op_pos + new_instruction.len()].copy_from_slice(&new_instruction);
        Ok(())
    }

    pub(super) fn add_constant(&mut self, value: Value) -> usize {
        self.constants.push(value);
        self.constants.len() - 1
    }

    pub(super) fn emit_constant(&mut self, value: Value) -> CompileResult<()> {
        let index = self.add_constant(value);
        self.emit(OpCode::OpConstant, &[index])?;
        Ok(())
    }

    pub(super) fn load_symbol(&mut self, binding: &Binding) -> CompileResult<()> {
        match binding.symbol_scope {
            SymbolScope::Global => {
                self.emit(OpCode::OpGetGlobal, &[binding.index])?;
            }
            SymbolScope::Local => {
                self.emit(OpCode::OpGetLocal, &[binding.index])?;
            }
            SymbolScope::Builtin => {
                self.emit(OpCode::OpGetBuiltin, &[binding.index])?;
            }
            SymbolScope::Free => {
                self.emit(OpCode::OpGetFree, &[binding.index])?;
            }
        }
        Ok(())
    }

    /// Stores the value on top of the stack into `binding`. A definition of a
    /// local that nothing has captured yet gets a fresh slot; any other store
    /// writes through an existing capture cell.
    pub(super) fn store_symbol(&mut self, binding: &Binding, define: bool) -> CompileResult<()> {
        match binding.symbol_scope {
            SymbolScope::Global => {
                self.emit(OpCode::OpSetGlobal, &[binding.index])?;
            }
            SymbolScope::Local => {
                let was_assigned = self.symbol_table.mark_assigned(&binding.name).unwrap_or(true);
                if define && !was_assigned {
                    self.emit(OpCode::OpDefineLocal, &[binding.index])?;
                } else {
                    self.emit(OpCode::OpSetLocal, &[binding.index])?;
                }
            }
            SymbolScope::Free => {
                self.emit(OpCode::OpSetFree, &[binding.index])?;
            }
            SymbolScope::Builtin => {
                return Err(self.error(format!("cannot assign to builtin '{}'", binding.name)));
            }
        }
        Ok(())
    }

    pub(super) fn current_scope(&self) -> &CompilationScope {
        &self.scopes[self.scope_index]
    }

    pub(super) fn current_scope_mut(&mut self) -> &mut CompilationScope {
        &mut self.scopes[self.scope_index]
    }

    /// Opens a function body: new instruction buffer, new local index space.
    pub(super) fn enter_scope(&mut self) {
        self.scopes.push(CompilationScope::new());
        self.scope_index += 1;
        let outer = std::mem::take(&mut self.symbol_table);
        self.symbol_table = SymbolTable::new_enclosed(outer);
    }

    /// Closes a function body and returns its instructions, source map and
    /// symbol table. The enclosing table becomes current again.
    pub(super) fn leave_scope(&mut self) -> (Instructions, Vec<(usize, Position)>, SymbolTable) {
        let scope = self.scopes.pop().unwrap_or_default();
        self.scope_index = self.scope_index.saturating_sub(1);
        let mut table = std::mem::take(&mut self.symbol_table);
        if let Some(outer) = table.outer.take() {
            self.symbol_table = *outer;
        }
        (scope.instructions, scope.source_map, table)
    }

    pub(super) fn enter_block(&mut self) {
        let outer = std::mem::take(&mut self.symbol_table);
        self.symbol_table = SymbolTable::new_block(outer);
    }

    pub(super) fn leave_block(&mut self) {
        if let Some(outer) = self.symbol_table.outer.take() {
            self.symbol_table = *outer;
        }
    }
}
