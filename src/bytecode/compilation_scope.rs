use crate::{
    bytecode::op_code::{Instructions, OpCode},
    syntax::position::Position,
};

/// Opcode and offset of an instruction already written to the scope.
#[derive(Debug, Clone, Default)]
pub struct EmittedInstruction {
    pub opcode: Option<OpCode>,
    pub position: usize,
}

/// Jump sites waiting for the end of the enclosing loop.
#[derive(Debug, Clone, Default)]
pub struct LoopScope {
    pub breaks: Vec<usize>,
    pub continues: Vec<usize>,
}

/// Instruction buffer for the function body currently being compiled.
#[derive(Debug, Clone, Default)]
pub struct CompilationScope {
    pub instructions: Instructions,
    pub last_instruction: EmittedInstruction,
    pub previous_instruction: EmittedInstruction,
    pub source_map: Vec<(usize, Position)>,
    pub loops: Vec<LoopScope>,
}

impl CompilationScope {
    pub fn new() -> Self {
        Self::default()
    }
}
