use std::{collections::HashMap, fmt, sync::Arc};

use parking_lot::RwLock;
use tracing::trace;

use crate::{
    bytecode::{
        constant_pool::ConstantPool,
        op_code::{Instructions, OpCode, make, try_make},
    },
    context::{Context, run_vm},
    error::Error,
    runtime::{
        compiled_function::CompiledFunction,
        marshal::HostValue,
        value::{CopyState, Value},
        vm::VM,
    },
    script::RESERVED_VAR,
    trace::TraceSink,
    variable::Variable,
};

/// Largest argument count a host call can pass (one `OpCall` operand byte).
pub const MAX_CALL_ARGS: usize = u8::MAX as usize;

struct Program {
    globals: Vec<Option<Value>>,
    constants: ConstantPool,
    entry: Arc<CompiledFunction>,
}

/// A bootstrapped script: its globals and the code that produced them.
///
/// Every method takes one lock. Reads share it; [`set`](Compiled::set) and
/// calls hold it exclusively for their whole run, so a host function invoked
/// by a script must not call back into the same `Compiled` synchronously.
/// Use a [`Callback`](crate::Callback) to call back later instead.
pub struct Compiled {
    program: RwLock<Program>,
    indexes: Arc<HashMap<String, usize>>,
    out_idx: usize,
    max_allocs: i64,
    trace: Option<TraceSink>,
}

impl Compiled {
    pub(crate) fn new(
        globals: Vec<Option<Value>>,
        indexes: Arc<HashMap<String, usize>>,
        constants: ConstantPool,
        entry: Arc<CompiledFunction>,
        out_idx: usize,
        max_allocs: i64,
        trace: Option<TraceSink>,
    ) -> Self {
        Self {
            program: RwLock::new(Program {
                globals,
                constants,
                entry,
            }),
            indexes,
            out_idx,
            max_allocs,
            trace,
        }
    }

    /// Calls a callable value with host arguments and returns its result.
    pub fn call(&self, callable: &Value, args: &[HostValue]) -> Result<HostValue, Error> {
        let mut program = self.program.write();
        self.call_locked(&mut program, None, callable.clone(), args)
    }

    pub fn call_with_context(
        &self,
        ctx: &Context,
        callable: &Value,
        args: &[HostValue],
    ) -> Result<HostValue, Error> {
        let mut program = self.program.write();
        self.call_locked(&mut program, Some(ctx), callable.clone(), args)
    }

    /// Calls the global named `name`.
    pub fn call_by_name(&self, name: &str, args: &[HostValue]) -> Result<HostValue, Error> {
        self.call_by_name_inner(None, name, args)
    }

    pub fn call_by_name_with_context(
        &self,
        ctx: &Context,
        name: &str,
        args: &[HostValue],
    ) -> Result<HostValue, Error> {
        self.call_by_name_inner(Some(ctx), name, args)
    }

    fn call_by_name_inner(
        &self,
        ctx: Option<&Context>,
        name: &str,
        args: &[HostValue],
    ) -> Result<HostValue, Error> {
        let mut program = self.program.write();
        let index = *self
            .indexes
            .get(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;
        let callable = program.globals[index].clone().ok_or(Error::NilCallable)?;
        self.call_locked(&mut program, ctx, callable, args)
    }

    /// Appends the callable and arguments as temporary constants, runs
    /// `callable(args...)` into the output global and rolls the constants
    /// back, whatever the outcome.
    fn call_locked(
        &self,
        program: &mut Program,
        ctx: Option<&Context>,
        callable: Value,
        args: &[HostValue],
    ) -> Result<HostValue, Error> {
        if !callable.is_callable() {
            return Err(Error::NotCallable(callable.type_name().to_string()));
        }
        if args.len() > MAX_CALL_ARGS {
            return Err(Error::TooManyArguments {
                max: MAX_CALL_ARGS,
                got: args.len(),
            });
        }
        let args = args
            .iter()
            .cloned()
            .map(Value::from_host)
            .collect::<Result<Vec<_>, _>>()?;
        trace!(
            callable = callable.type_name(),
            num_args = args.len(),
            "host call"
        );

        let Program {
            globals,
            constants,
            entry,
        } = program;
        let mut txn = constants.begin();

        let mut instructions = load_constant(txn.push(callable))?;
        let num_args = args.len();
        for arg in args {
            instructions.extend(load_constant(txn.push(arg))?);
        }
        instructions.extend(make(OpCode::OpCall, &[num_args, 0]));
        instructions.extend(make(OpCode::OpSetGlobal, &[self.out_idx]));
        instructions.extend(make(OpCode::OpSuspend, &[]));
        *entry = Arc::new(CompiledFunction::new(instructions, 0, 0));

        let mut vm = VM::new(entry.clone(), txn.pool(), globals, self.max_allocs);
        vm.set_trace(self.trace.clone());
        let result = run_vm(&mut vm, ctx);
        drop(vm);
        drop(txn);
        result?;

        let out = globals[self.out_idx].replace(Value::Undefined);
        Ok(out.map(|value| value.to_host()).unwrap_or_default())
    }

    /// Copy of the named global; `undefined` when unset or unknown.
    pub fn get(&self, name: &str) -> Variable {
        let program = self.program.read();
        let value = self
            .indexes
            .get(name)
            .and_then(|&index| program.globals[index].as_ref())
            .map(Value::copy)
            .unwrap_or_default();
        Variable::from_value(name, value)
    }

    /// Every global, including the reserved output slot, in name order.
    pub fn get_all(&self) -> Vec<Variable> {
        let program = self.program.read();
        let mut names: Vec<(&String, &usize)> = self.indexes.iter().collect();
        names.sort_unstable();
        names
            .into_iter()
            .map(|(name, &index)| {
                let value = program.globals[index]
                    .as_ref()
                    .map(Value::copy)
                    .unwrap_or_default();
                Variable::from_value(name.as_str(), value)
            })
            .collect()
    }

    /// Replaces the value of a global defined during compilation.
    pub fn set(&self, name: &str, value: impl Into<HostValue>) -> Result<(), Error> {
        if name == RESERVED_VAR {
            return Err(Error::ReservedName(name.to_string()));
        }
        let index = *self
            .indexes
            .get(name)
            .ok_or_else(|| Error::NotDefined(name.to_string()))?;
        let value = Value::from_host(value.into())?;
        self.program.write().globals[index] = Some(value);
        Ok(())
    }

    /// True when the global exists and holds something other than
    /// `undefined`.
    pub fn is_defined(&self, name: &str) -> bool {
        let Some(&index) = self.indexes.get(name) else {
            return false;
        };
        matches!(&self.program.read().globals[index], Some(value) if !value.is_undefined())
    }

    /// Current size of the constant pool.
    pub fn constant_count(&self) -> usize {
        self.program.read().constants.len()
    }

    pub fn global_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.indexes.keys().cloned().collect();
        names.sort_unstable();
        names
    }
}

/// `OpConstant` for a temporary constant; a program whose pool is already
/// near the operand limit has no room for call arguments.
fn load_constant(index: usize) -> Result<Instructions, Error> {
    try_make(OpCode::OpConstant, &[index]).map_err(|overflow| Error::LimitExceeded {
        what: "constants",
        max: overflow.max + 1,
        got: index + 1,
    })
}

/// Independent copy sharing only immutable code. Globals and constants are
/// deep-copied in one pass, so closures keep sharing captured variables
/// with each other but never with the original.
impl Clone for Compiled {
    fn clone(&self) -> Self {
        let program = self.program.read();
        let mut state = CopyState::default();
        Self {
            program: RwLock::new(Program {
                globals: program
                    .globals
                    .iter()
                    .map(|slot| slot.as_ref().map(|value| value.copy_with(&mut state)))
                    .collect(),
                constants: program.constants.copy_with(&mut state),
                entry: program.entry.clone(),
            }),
            indexes: self.indexes.clone(),
            out_idx: self.out_idx,
            max_allocs: self.max_allocs,
            trace: self.trace.clone(),
        }
    }
}

impl fmt::Debug for Compiled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compiled")
            .field("globals", &self.indexes.len())
            .field("out_idx", &self.out_idx)
            .field("max_allocs", &self.max_allocs)
            .finish_non_exhaustive()
    }
}
