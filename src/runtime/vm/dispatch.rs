use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    bytecode::op_code::{OpCode, read_u8, read_u16},
    runtime::{
        builtins::BUILTINS,
        closure::Closure,
        error::RuntimeError,
        iterator::ValueIterator,
        operator::BinaryOperator,
        value::{Upvalue, Value},
    },
};

use super::{Flow, VM, index_ops};

impl VM<'_> {
    pub(super) fn dispatch_instruction(
        &mut self,
        instructions: &[u8],
        ip: usize,
        op: OpCode,
    ) -> Result<Flow, RuntimeError> {
        match op {
            OpCode::OpConstant => {
                let index = read_u16(instructions, ip + 1) as usize;
                let value = self.constant(index)?;
                self.push(value)?;
                Ok(Flow::Next(3))
            }
            OpCode::OpPop => {
                self.pop()?;
                Ok(Flow::Next(1))
            }
            OpCode::OpTrue => {
                self.push(Value::Bool(true))?;
                Ok(Flow::Next(1))
            }
            OpCode::OpFalse => {
                self.push(Value::Bool(false))?;
                Ok(Flow::Next(1))
            }
            OpCode::OpUndefined => {
                self.push(Value::Undefined)?;
                Ok(Flow::Next(1))
            }
            OpCode::OpBinaryOp => {
                let byte = read_u8(instructions, ip + 1);
                let operator = BinaryOperator::from_u8(byte)
                    .ok_or_else(|| RuntimeError::custom(format!("unknown operator {}", byte)))?;
                let right = self.pop()?;
                let left = self.pop()?;
                let result = self.execute_binary_operation(operator, &left, &right)?;
                self.alloc()?;
                self.push(result)?;
                Ok(Flow::Next(2))
            }
            OpCode::OpEqual | OpCode::OpNotEqual => {
                let right = self.pop()?;
                let left = self.pop()?;
                let equal = left.equals(&right);
                self.push(Value::Bool(if op == OpCode::OpEqual { equal } else { !equal }))?;
                Ok(Flow::Next(1))
            }
            OpCode::OpMinus => {
                let operand = self.pop()?;
                let result = self.execute_minus(&operand)?;
                self.alloc()?;
                self.push(result)?;
                Ok(Flow::Next(1))
            }
            OpCode::OpBang => {
                let operand = self.pop()?;
                self.push(Value::Bool(operand.is_falsy()))?;
                Ok(Flow::Next(1))
            }
            OpCode::OpComplement => {
                let operand = self.pop()?;
                let result = self.execute_complement(&operand)?;
                self.alloc()?;
                self.push(result)?;
                Ok(Flow::Next(1))
            }
            OpCode::OpJump => {
                self.current_frame_mut().ip = read_u16(instructions, ip + 1) as usize;
                Ok(Flow::Jump)
            }
            OpCode::OpJumpFalsy => {
                let condition = self.pop()?;
                if condition.is_falsy() {
                    self.current_frame_mut().ip = read_u16(instructions, ip + 1) as usize;
                    return Ok(Flow::Jump);
                }
                Ok(Flow::Next(3))
            }
            OpCode::OpAndJump | OpCode::OpOrJump => {
                // Keep the deciding operand as the result; otherwise drop it
                // and evaluate the right-hand side.
                let falsy = self.peek()?.is_falsy();
                if falsy == (op == OpCode::OpAndJump) {
                    self.current_frame_mut().ip = read_u16(instructions, ip + 1) as usize;
                    return Ok(Flow::Jump);
                }
                self.pop()?;
                Ok(Flow::Next(3))
            }
            OpCode::OpGetGlobal => {
                let index = read_u16(instructions, ip + 1) as usize;
                let value = self
                    .globals
                    .get(index)
                    .ok_or_else(|| global_out_of_range(index))?
                    .clone()
                    .unwrap_or_default();
                self.push(value)?;
                Ok(Flow::Next(3))
            }
            OpCode::OpSetGlobal => {
                let index = read_u16(instructions, ip + 1) as usize;
                let value = self.pop()?;
                let slot = self
                    .globals
                    .get_mut(index)
                    .ok_or_else(|| global_out_of_range(index))?;
                *slot = Some(value);
                Ok(Flow::Next(3))
            }
            OpCode::OpGetLocal => {
                let slot = self.local_slot(read_u8(instructions, ip + 1))?;
                let value = match &self.stack[slot] {
                    Value::Captured(cell) => cell.lock().clone(),
                    other => other.clone(),
                };
                self.push(value)?;
                Ok(Flow::Next(2))
            }
            OpCode::OpSetLocal => {
                let slot = self.local_slot(read_u8(instructions, ip + 1))?;
                let value = self.pop()?;
                match &self.stack[slot] {
                    Value::Captured(cell) => *cell.lock() = value,
                    _ => self.stack[slot] = value,
                }
                Ok(Flow::Next(2))
            }
            OpCode::OpDefineLocal => {
                let slot = self.local_slot(read_u8(instructions, ip + 1))?;
                let value = self.pop()?;
                self.stack[slot] = value;
                Ok(Flow::Next(2))
            }
            OpCode::OpGetFree => {
                let cell = self.free_cell(read_u8(instructions, ip + 1))?;
                let value = cell.lock().clone();
                self.push(value)?;
                Ok(Flow::Next(2))
            }
            OpCode::OpSetFree => {
                let cell = self.free_cell(read_u8(instructions, ip + 1))?;
                let value = self.pop()?;
                *cell.lock() = value;
                Ok(Flow::Next(2))
            }
            OpCode::OpGetLocalPtr => {
                let slot = self.local_slot(read_u8(instructions, ip + 1))?;
                let cell = match &self.stack[slot] {
                    Value::Captured(cell) => cell.clone(),
                    other => {
                        let cell: Upvalue = Arc::new(Mutex::new(other.clone()));
                        self.stack[slot] = Value::Captured(cell.clone());
                        cell
                    }
                };
                self.push(Value::Captured(cell))?;
                Ok(Flow::Next(2))
            }
            OpCode::OpGetFreePtr => {
                let cell = self.free_cell(read_u8(instructions, ip + 1))?;
                self.push(Value::Captured(cell))?;
                Ok(Flow::Next(2))
            }
            OpCode::OpGetBuiltin => {
                let index = read_u8(instructions, ip + 1) as usize;
                let builtin = BUILTINS
                    .get(index)
                    .ok_or_else(|| RuntimeError::custom(format!("unknown builtin {}", index)))?;
                self.push(Value::Builtin(builtin.clone()))?;
                Ok(Flow::Next(2))
            }
            OpCode::OpClosure => {
                let index = read_u16(instructions, ip + 1) as usize;
                let num_free = read_u8(instructions, ip + 3) as usize;
                let Value::Function(function) = self.constant(index)? else {
                    return Err(RuntimeError::custom(format!("constant {} is not a function", index)));
                };
                let free = self
                    .take_top(num_free)?
                    .into_iter()
                    .map(|value| match value {
                        Value::Captured(cell) => cell,
                        other => Arc::new(Mutex::new(other)),
                    })
                    .collect();
                self.alloc()?;
                self.push(Value::Closure(Arc::new(Closure::new(function, free))))?;
                Ok(Flow::Next(4))
            }
            OpCode::OpArray => {
                let count = read_u16(instructions, ip + 1) as usize;
                let elements = self.take_top(count)?;
                self.alloc()?;
                self.push(Value::array(elements))?;
                Ok(Flow::Next(3))
            }
            OpCode::OpMap => {
                let count = read_u16(instructions, ip + 1) as usize;
                let items = self.take_top(count)?;
                let mut map = std::collections::BTreeMap::new();
                let mut items = items.into_iter();
                while let (Some(key), Some(value)) = (items.next(), items.next()) {
                    let Value::String(key) = key else {
                        return Err(RuntimeError::InvalidIndexType(key.type_name().to_string()));
                    };
                    map.insert(key.to_string(), value);
                }
                self.alloc()?;
                self.push(Value::map(map))?;
                Ok(Flow::Next(3))
            }
            OpCode::OpIndex => {
                let index = self.pop()?;
                let left = self.pop()?;
                let value = index_ops::index_get(&left, &index)?;
                self.push(value)?;
                Ok(Flow::Next(1))
            }
            OpCode::OpSliceIndex => {
                let high = self.pop()?;
                let low = self.pop()?;
                let left = self.pop()?;
                let value = index_ops::slice(&left, &low, &high)?;
                self.alloc()?;
                self.push(value)?;
                Ok(Flow::Next(1))
            }
            OpCode::OpSetIndex => {
                let value = self.pop()?;
                let key = self.pop()?;
                let container = self.pop()?;
                index_ops::index_set(&container, &key, value)?;
                Ok(Flow::Next(1))
            }
            OpCode::OpError => {
                let payload = self.pop()?;
                self.alloc()?;
                self.push(Value::error(payload))?;
                Ok(Flow::Next(1))
            }
            OpCode::OpCall => {
                let num_args = read_u8(instructions, ip + 1) as usize;
                let spread = read_u8(instructions, ip + 2) != 0;
                self.execute_call(num_args, spread)
            }
            OpCode::OpReturnValue => {
                let value = self.pop()?;
                self.return_from_frame(value)
            }
            OpCode::OpReturn => self.return_from_frame(Value::Undefined),
            OpCode::OpIteratorInit => {
                let iterable = self.pop()?;
                let iterator = ValueIterator::new(&iterable)
                    .ok_or_else(|| RuntimeError::NotIterable(iterable.type_name().to_string()))?;
                self.alloc()?;
                self.push(Value::Iterator(Arc::new(Mutex::new(iterator))))?;
                Ok(Flow::Next(1))
            }
            OpCode::OpIteratorNext | OpCode::OpIteratorKey | OpCode::OpIteratorValue => {
                let Value::Iterator(iterator) = self.pop()? else {
                    return Err(RuntimeError::custom("iterator expected"));
                };
                let mut iterator = iterator.lock();
                let result = match op {
                    OpCode::OpIteratorNext => Value::Bool(iterator.next()),
                    OpCode::OpIteratorKey => iterator.key(),
                    _ => iterator.value(),
                };
                drop(iterator);
                self.push(result)?;
                Ok(Flow::Next(1))
            }
            OpCode::OpSuspend => Ok(Flow::Halt),
        }
    }

    fn local_slot(&self, index: u8) -> Result<usize, RuntimeError> {
        let slot = self.current_frame().base_pointer + index as usize;
        if slot >= self.stack.len() {
            return Err(RuntimeError::StackOverflow);
        }
        Ok(slot)
    }

    fn free_cell(&self, index: u8) -> Result<Upvalue, RuntimeError> {
        self.current_frame()
            .closure
            .free
            .get(index as usize)
            .cloned()
            .ok_or_else(|| RuntimeError::custom(format!("free variable {} out of range", index)))
    }
}

#[cold]
#[inline(never)]
fn global_out_of_range(index: usize) -> RuntimeError {
    RuntimeError::custom(format!("global index out of range: {}", index))
}
