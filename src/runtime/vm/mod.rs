use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::{
    bytecode::{constant_pool::ConstantPool, op_code::OpCode},
    runtime::{
        closure::Closure,
        compiled_function::CompiledFunction,
        error::{ExecutionError, RuntimeError},
        frame::Frame,
        value::Value,
    },
    trace::TraceSink,
};

mod binary_ops;
mod dispatch;
mod function_call;
mod index_ops;
mod trace;

pub use index_ops::{index_get, index_set, slice};

#[cfg(test)]
mod binary_ops_test;
#[cfg(test)]
mod dispatch_test;
#[cfg(test)]
mod function_call_test;
#[cfg(test)]
mod test_support;
#[cfg(test)]
mod trace_test;

pub const STACK_SIZE: usize = 2048;
pub const GLOBALS_SIZE: usize = 1024;
pub const MAX_FRAMES: usize = 1024;

/// Cooperative stop signal checked before every instruction. Clones share
/// the flag, so another thread can stop a running VM.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle(Arc<AtomicBool>);

impl AbortHandle {
    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Remaining allocations for one run; `None` when unlimited.
#[derive(Debug, Clone, Copy)]
struct AllocBudget {
    remaining: Option<u64>,
}

impl AllocBudget {
    fn new(max_allocs: i64) -> Self {
        Self {
            remaining: u64::try_from(max_allocs).ok(),
        }
    }

    fn consume(&mut self) -> Result<(), RuntimeError> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return Err(RuntimeError::AllocLimitExceeded);
            }
            *remaining -= 1;
        }
        Ok(())
    }
}

/// What the run loop does after an instruction.
enum Flow {
    /// Advance the current frame by this many bytes.
    Next(usize),
    /// The instruction already positioned the frames.
    Jump,
    /// Stop the run successfully.
    Halt,
}

/// Stack machine executing one entry function against a constant pool and a
/// globals array. A VM is built per run; globals outlive it.
pub struct VM<'a> {
    constants: &'a ConstantPool,
    globals: &'a mut [Option<Value>],
    stack: Vec<Value>,
    sp: usize,
    frames: Vec<Frame>,
    allocs: AllocBudget,
    abort: AbortHandle,
    trace: Option<TraceSink>,
}

impl<'a> VM<'a> {
    /// `max_allocs < 0` means unlimited.
    pub fn new(
        entry: Arc<CompiledFunction>,
        constants: &'a ConstantPool,
        globals: &'a mut [Option<Value>],
        max_allocs: i64,
    ) -> Self {
        let main_closure = Arc::new(Closure::new(entry, Vec::new()));
        let num_locals = main_closure.function.num_locals;
        let mut frames = Vec::with_capacity(16);
        frames.push(Frame::new(main_closure, 0));

        Self {
            constants,
            globals,
            stack: vec![Value::Undefined; STACK_SIZE],
            sp: num_locals.min(STACK_SIZE),
            frames,
            allocs: AllocBudget::new(max_allocs),
            abort: AbortHandle::default(),
            trace: None,
        }
    }

    pub fn set_trace(&mut self, trace: Option<TraceSink>) {
        self.trace = trace;
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    pub fn run(&mut self) -> Result<(), ExecutionError> {
        match self.run_inner() {
            Ok(()) => Ok(()),
            Err(error) => Err(self.locate(error)),
        }
    }

    fn run_inner(&mut self) -> Result<(), RuntimeError> {
        let mut closure = self.current_frame().closure.clone();

        loop {
            if self.abort.is_aborted() {
                return Err(RuntimeError::Aborted);
            }

            let ip = self.current_frame().ip;
            let instructions: &[u8] = &closure.function.instructions;
            let Some(&byte) = instructions.get(ip) else {
                return Ok(());
            };
            let op = OpCode::try_from(byte)
                .map_err(|byte| RuntimeError::custom(format!("unknown opcode {}", byte)))?;
            if self.trace.is_some() {
                self.trace_instruction(instructions, ip, op);
            }

            let depth = self.frames.len();
            match self.dispatch_instruction(instructions, ip, op)? {
                Flow::Next(width) => self.current_frame_mut().ip += width,
                Flow::Jump => {}
                Flow::Halt => return Ok(()),
            }

            if self.frames.len() != depth {
                closure = self.current_frame().closure.clone();
            }
        }
    }

    pub(super) fn current_frame(&self) -> &Frame {
        &self.frames[self.frames.len() - 1]
    }

    pub(super) fn current_frame_mut(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    pub(super) fn push(&mut self, value: Value) -> Result<(), RuntimeError> {
        if self.sp >= STACK_SIZE {
            return Err(RuntimeError::StackOverflow);
        }
        self.stack[self.sp] = value;
        self.sp += 1;
        Ok(())
    }

    /// Slots at or above `sp` are always `Undefined`, so popped values are
    /// moved out rather than cloned.
    pub(super) fn pop(&mut self) -> Result<Value, RuntimeError> {
        if self.sp == 0 {
            return Err(stack_underflow());
        }
        self.sp -= 1;
        Ok(std::mem::take(&mut self.stack[self.sp]))
    }

    pub(super) fn peek(&self) -> Result<&Value, RuntimeError> {
        match self.sp {
            0 => Err(stack_underflow()),
            sp => Ok(&self.stack[sp - 1]),
        }
    }

    /// Removes the top `count` values, bottom first.
    pub(super) fn take_top(&mut self, count: usize) -> Result<Vec<Value>, RuntimeError> {
        let start = self.sp.checked_sub(count).ok_or_else(stack_underflow)?;
        let values = self.stack[start..self.sp]
            .iter_mut()
            .map(std::mem::take)
            .collect();
        self.sp = start;
        Ok(values)
    }

    /// Lowers the stack pointer, clearing every released slot.
    pub(super) fn reset_sp(&mut self, new_sp: usize) {
        for slot in &mut self.stack[new_sp..self.sp] {
            *slot = Value::Undefined;
        }
        self.sp = new_sp;
    }

    pub(super) fn constant(&self, index: usize) -> Result<Value, RuntimeError> {
        self.constants
            .get(index)
            .cloned()
            .ok_or_else(|| RuntimeError::custom(format!("constant index out of range: {}", index)))
    }

    pub(super) fn alloc(&mut self) -> Result<(), RuntimeError> {
        self.allocs.consume()
    }
}

#[cold]
#[inline(never)]
fn stack_underflow() -> RuntimeError {
    RuntimeError::custom("stack underflow")
}
