use std::sync::Arc;

use tracing::trace;

use crate::runtime::{closure::Closure, error::RuntimeError, frame::Frame, value::Value};

use super::{Flow, MAX_FRAMES, STACK_SIZE, VM};

impl VM<'_> {
    /// Calls the value sitting below `num_args` arguments. With `spread`,
    /// the last argument is an array whose elements become the trailing
    /// arguments.
    pub(super) fn execute_call(&mut self, num_args: usize, spread: bool) -> Result<Flow, RuntimeError> {
        let mut num_args = num_args;
        if spread {
            let last = self.pop()?;
            let Value::Array(items) = last else {
                return Err(RuntimeError::custom(format!(
                    "cannot spread {}: array expected",
                    last.type_name()
                )));
            };
            let items = items.read_recursive().clone();
            num_args = num_args - 1 + items.len();
            for item in items {
                self.push(item)?;
            }
        }

        let callee_slot = self
            .sp
            .checked_sub(num_args + 1)
            .ok_or_else(|| RuntimeError::custom("stack underflow"))?;
        let callee = self.stack[callee_slot].clone();
        match callee {
            Value::Closure(closure) => self.call_closure(closure, num_args),
            Value::Function(function) => {
                self.call_closure(Arc::new(Closure::new(function, Vec::new())), num_args)
            }
            callee if callee.is_callable() => {
                trace!(callee = callee.type_name(), num_args, "native call");
                let args = self.take_top(num_args)?;
                let result = callee.call(&args)?;
                self.reset_sp(callee_slot);
                self.alloc()?;
                self.push(result)?;
                Ok(Flow::Next(3))
            }
            other => Err(RuntimeError::NotCallable(other.type_name().to_string())),
        }
    }

    fn call_closure(&mut self, closure: Arc<Closure>, num_args: usize) -> Result<Flow, RuntimeError> {
        let function = closure.function.clone();
        let mut num_args = num_args;

        if function.variadic {
            let required = function.num_parameters.saturating_sub(1);
            if num_args < required {
                return Err(RuntimeError::WrongNumArguments {
                    want: format!(">={}", required),
                    got: num_args,
                });
            }
            let rest = self.take_top(num_args - required)?;
            self.alloc()?;
            self.push(Value::array(rest))?;
            num_args = function.num_parameters;
        } else if num_args != function.num_parameters {
            return Err(RuntimeError::WrongNumArguments {
                want: format!("={}", function.num_parameters),
                got: num_args,
            });
        }

        if self.frames.len() >= MAX_FRAMES {
            return Err(RuntimeError::StackOverflow);
        }
        let base_pointer = self.sp - num_args;
        let new_sp = base_pointer + function.num_locals;
        if new_sp >= STACK_SIZE {
            return Err(RuntimeError::StackOverflow);
        }

        self.current_frame_mut().ip += 3;
        self.frames.push(Frame::new(closure, base_pointer));
        self.sp = new_sp;
        Ok(Flow::Jump)
    }

    /// Pops the current frame and leaves `value` where the callee was.
    pub(super) fn return_from_frame(&mut self, value: Value) -> Result<Flow, RuntimeError> {
        if self.frames.len() == 1 {
            self.push(value)?;
            return Ok(Flow::Halt);
        }
        let Some(frame) = self.frames.pop() else {
            return Ok(Flow::Halt);
        };
        self.reset_sp(frame.base_pointer.saturating_sub(1));
        self.push(value)?;
        Ok(Flow::Jump)
    }
}
