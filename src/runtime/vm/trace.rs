use crate::{
    bytecode::op_code::{OpCode, read_operands},
    runtime::error::{ExecutionError, RuntimeError},
};

use super::VM;

impl VM<'_> {
    /// Attaches the source location of every active frame, innermost first.
    /// Caller frames have already advanced past their call instruction, so
    /// they are looked up one byte back.
    pub(super) fn locate(&self, error: RuntimeError) -> ExecutionError {
        let innermost = self.frames.len().saturating_sub(1);
        let trace = self
            .frames
            .iter()
            .enumerate()
            .rev()
            .filter_map(|(i, frame)| {
                let ip = if i == innermost {
                    frame.ip
                } else {
                    frame.ip.saturating_sub(1)
                };
                let function = &frame.closure.function;
                function
                    .position_at(ip)
                    .map(|position| format!("{}:{}", function.file, position))
            })
            .collect();
        ExecutionError { error, trace }
    }

    pub(super) fn trace_instruction(&self, instructions: &[u8], ip: usize, op: OpCode) {
        let Some(sink) = &self.trace else {
            return;
        };
        let operands: String = read_operands(instructions, op, ip)
            .iter()
            .map(|o| format!(" {}", o))
            .collect();
        sink.write_line(format_args!("IP={:04} {}{}", ip, op, operands));
    }
}
