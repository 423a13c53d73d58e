use std::{collections::HashMap, sync::Arc};

use crate::{
    bytecode::op_code::{OpCode, instruction_width, make, read_u16},
    runtime::{compiled_function::CompiledFunction, value::Value},
};

/// Output of a compilation: the entry function plus the constant pool its
/// instructions index into.
#[derive(Debug, Clone)]
pub struct Bytecode {
    pub main_function: CompiledFunction,
    pub constants: Vec<Value>,
}

impl Bytecode {
    /// Collapses repeated scalar constants (ints, floats, strings, chars,
    /// bools) into one slot each and rewrites every `OpConstant` and
    /// `OpClosure` operand to match. Must run before any closure is created
    /// from the pool, since closures keep their function by reference.
    pub fn remove_duplicates(&mut self) {
        let mut deduped: Vec<Value> = Vec::with_capacity(self.constants.len());
        let mut index_map: Vec<usize> = Vec::with_capacity(self.constants.len());
        let mut ints: HashMap<i64, usize> = HashMap::new();
        let mut floats: HashMap<u64, usize> = HashMap::new();
        let mut strings: HashMap<Arc<str>, usize> = HashMap::new();
        let mut chars: HashMap<char, usize> = HashMap::new();
        let mut bools: HashMap<bool, usize> = HashMap::new();

        for value in self.constants.drain(..) {
            let slot = match &value {
                Value::Int(v) => ints.get(v).copied(),
                Value::Float(v) => floats.get(&v.to_bits()).copied(),
                Value::String(v) => strings.get(v).copied(),
                Value::Char(v) => chars.get(v).copied(),
                Value::Bool(v) => bools.get(v).copied(),
                _ => None,
            };
            let slot = match slot {
                Some(slot) => slot,
                None => {
                    let slot = deduped.len();
                    match &value {
                        Value::Int(v) => {
                            ints.insert(*v, slot);
                        }
                        Value::Float(v) => {
                            floats.insert(v.to_bits(), slot);
                        }
                        Value::String(v) => {
                            strings.insert(v.clone(), slot);
                        }
                        Value::Char(v) => {
                            chars.insert(*v, slot);
                        }
                        Value::Bool(v) => {
                            bools.insert(*v, slot);
                        }
                        _ => {}
                    }
                    deduped.push(value);
                    slot
                }
            };
            index_map.push(slot);
        }

        remap_constants(&mut self.main_function.instructions, &index_map);
        for value in deduped.iter_mut() {
            if let Value::Function(function) = value {
                remap_constants(&mut Arc::make_mut(function).instructions, &index_map);
            }
        }
        self.constants = deduped;
    }
}

fn remap_constants(instructions: &mut [u8], index_map: &[usize]) {
    let mut ip = 0;
    while ip < instructions.len() {
        let Ok(op) = OpCode::try_from(instructions[ip]) else {
            break;
        };
        if matches!(op, OpCode::OpConstant | OpCode::OpClosure) {
            let old = read_u16(instructions, ip + 1) as usize;
            if let Some(&new) = index_map.get(old) {
                let encoded = make(OpCode::OpConstant, &[new]);
                instructions[ip + 1..ip + 3].copy_from_slice(&encoded[1..]);
            }
        }
        ip += instruction_width(op);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_duplicates_rewrites_operands() {
        let mut instructions = make(OpCode::OpConstant, &[0]);
        instructions.extend(make(OpCode::OpConstant, &[1]));
        instructions.extend(make(OpCode::OpConstant, &[2]));
        let mut bytecode = Bytecode {
            main_function: CompiledFunction::new(instructions, 0, 0),
            constants: vec![Value::Int(7), Value::string("x"), Value::Int(7)],
        };

        bytecode.remove_duplicates();

        assert_eq!(bytecode.constants.len(), 2);
        assert_eq!(read_u16(&bytecode.main_function.instructions, 7), 0);
        assert_eq!(read_u16(&bytecode.main_function.instructions, 4), 1);
    }

    #[test]
    fn nested_functions_are_remapped() {
        let inner = CompiledFunction::new(make(OpCode::OpConstant, &[2]), 0, 0);
        let mut bytecode = Bytecode {
            main_function: CompiledFunction::new(make(OpCode::OpClosure, &[1, 0]), 0, 0),
            constants: vec![
                Value::string("s"),
                Value::Function(Arc::new(inner)),
                Value::string("s"),
            ],
        };

        bytecode.remove_duplicates();

        assert_eq!(read_u16(&bytecode.main_function.instructions, 1), 1);
        let Value::Function(inner) = &bytecode.constants[1] else {
            panic!("expected function constant");
        };
        assert_eq!(read_u16(&inner.instructions, 1), 0);
    }
}
