use std::{fmt, sync::Arc};

use crate::runtime::{error::RuntimeError, value::Value};

pub type BuiltinFn = fn(&[Value]) -> Result<Value, RuntimeError>;

pub type HostFn = dyn Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync;

/// A function from the fixed builtin table.
#[derive(Clone)]
pub struct BuiltinFunction {
    pub name: &'static str,
    pub func: BuiltinFn,
}

impl fmt::Debug for BuiltinFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BuiltinFunction({})", self.name)
    }
}

impl PartialEq for BuiltinFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// A native function supplied by the host, such as a module attribute or a
/// script variable holding a Rust closure.
#[derive(Clone)]
pub struct HostFunction {
    pub name: Arc<str>,
    pub func: Arc<HostFn>,
}

impl HostFunction {
    pub fn new<F>(name: impl Into<Arc<str>>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }
}

impl fmt::Debug for HostFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostFunction({})", self.name)
    }
}

impl PartialEq for HostFunction {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}
