use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    compiled::Compiled, context::Context, error::Error, runtime::marshal::HostValue,
    runtime::value::Value,
};

/// A script callable captured by a host function, to be invoked later.
///
/// Host functions run while their program is locked, so they cannot call
/// back into it directly. They capture the callable instead; once the
/// callback is bound to the program with [`set`](Callback::set), the host
/// can call it at any time.
#[derive(Debug)]
pub struct Callback {
    callable: Value,
    args: Vec<HostValue>,
    compiled: Mutex<Option<Arc<Compiled>>>,
}

impl Callback {
    /// `args` are passed ahead of the arguments of every call.
    pub fn new(callable: Value, args: Vec<HostValue>) -> Self {
        Self {
            callable,
            args,
            compiled: Mutex::new(None),
        }
    }

    /// Binds the callback to a program, replacing any earlier binding.
    pub fn set(&self, compiled: &Arc<Compiled>) -> &Self {
        *self.compiled.lock() = Some(compiled.clone());
        self
    }

    pub fn args(&self) -> &[HostValue] {
        &self.args
    }

    pub fn call(&self, args: &[HostValue]) -> Result<HostValue, Error> {
        let compiled = self.bound()?;
        compiled.call(&self.callable, &self.full_args(args))
    }

    pub fn call_with_context(&self, ctx: &Context, args: &[HostValue]) -> Result<HostValue, Error> {
        let compiled = self.bound()?;
        compiled.call_with_context(ctx, &self.callable, &self.full_args(args))
    }

    fn bound(&self) -> Result<Arc<Compiled>, Error> {
        self.compiled.lock().clone().ok_or(Error::NotBound)
    }

    fn full_args(&self, args: &[HostValue]) -> Vec<HostValue> {
        self.args.iter().chain(args).cloned().collect()
    }
}
