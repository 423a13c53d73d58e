use std::sync::Arc;

use crate::{bytecode::op_code::Instructions, syntax::position::Position};

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFunction {
    pub instructions: Instructions,
    pub num_locals: usize,
    pub num_parameters: usize,
    pub variadic: bool,
    pub file: Arc<str>,
    /// `(offset, position)` pairs in ascending offset order.
    pub source_map: Vec<(usize, Position)>,
}

impl CompiledFunction {
    pub fn new(instructions: Instructions, num_locals: usize, num_parameters: usize) -> Self {
        Self {
            instructions,
            num_locals,
            num_parameters,
            variadic: false,
            file: Arc::from(""),
            source_map: Vec::new(),
        }
    }

    /// Source position of the instruction covering `ip`.
    pub fn position_at(&self, ip: usize) -> Option<Position> {
        let idx = self.source_map.partition_point(|(offset, _)| *offset <= ip);
        if idx == 0 {
            return None;
        }
        Some(self.source_map[idx - 1].1)
    }
}
