use thiserror::Error;

use crate::{
    bytecode::op_code::{OpCode, OperandOverflow},
    syntax::{error::SyntaxError, position::Position},
};

use super::Compiler;

/// Semantic error found while compiling a parsed program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Compile Error: {message}\n\tat {file}:{position}")]
pub struct CompileError {
    pub message: String,
    pub file: String,
    pub position: Position,
}

impl Compiler {
    /// Error located at the node currently being compiled.
    pub(super) fn error(&self, message: impl Into<String>) -> CompileError {
        CompileError {
            message: message.into(),
            file: self.file.to_string(),
            position: self.position,
        }
    }

    pub(super) fn unresolved_reference(&self, name: &str) -> CompileError {
        self.error(format!("unresolved reference '{}'", name))
    }

    pub(super) fn redeclared(&self, name: &str) -> CompileError {
        self.error(format!("'{}' redeclared in this block", name))
    }

    /// An instruction operand past its encoding limit: too many constants,
    /// locals, captures or elements, or a function body too long to jump
    /// across.
    pub(super) fn operand_overflow(&self, overflow: OperandOverflow) -> CompileError {
        let what = match (overflow.op, overflow.slot) {
            (OpCode::OpConstant, _) | (OpCode::OpClosure, 0) => "constants",
            (OpCode::OpClosure, _)
            | (OpCode::OpGetFree | OpCode::OpSetFree | OpCode::OpGetFreePtr, _) => {
                "captured variables"
            }
            (
                OpCode::OpGetLocal
                | OpCode::OpSetLocal
                | OpCode::OpDefineLocal
                | OpCode::OpGetLocalPtr,
                _,
            ) => "local variables",
            (OpCode::OpGetGlobal | OpCode::OpSetGlobal, _) => "global variables",
            (OpCode::OpArray | OpCode::OpMap, _) => "elements in a literal",
            (OpCode::OpCall, _) => "arguments",
            (OpCode::OpJump | OpCode::OpJumpFalsy | OpCode::OpAndJump | OpCode::OpOrJump, _) => {
                "instructions in one function"
            }
            _ => "operands",
        };
        self.error(format!(
            "too many {}: {} exceeds the limit of {}",
            what, overflow.operand, overflow.max
        ))
    }

    /// Parse failures inside an imported module surface as a compile error
    /// at the module's own location.
    pub(super) fn module_syntax_error(&self, module: &str, err: &SyntaxError) -> CompileError {
        match err.first() {
            Some(first) => CompileError {
                message: format!("module '{}': {}", module, first.message),
                file: err.file.clone(),
                position: first.position,
            },
            None => self.error(format!("module '{}': syntax error", module)),
        }
    }
}
