use crate::runtime::{error::RuntimeError, value::Value};

use super::helpers::check_arity;

fn check(args: &[Value], predicate: fn(&Value) -> bool) -> Result<Value, RuntimeError> {
    check_arity(args, 1)?;
    Ok(Value::Bool(predicate(&args[0])))
}

pub(super) fn builtin_is_int(args: &[Value]) -> Result<Value, RuntimeError> {
    check(args, |v| matches!(v, Value::Int(_)))
}

pub(super) fn builtin_is_float(args: &[Value]) -> Result<Value, RuntimeError> {
    check(args, |v| matches!(v, Value::Float(_)))
}

pub(super) fn builtin_is_string(args: &[Value]) -> Result<Value, RuntimeError> {
    check(args, |v| matches!(v, Value::String(_)))
}

pub(super) fn builtin_is_bool(args: &[Value]) -> Result<Value, RuntimeError> {
    check(args, |v| matches!(v, Value::Bool(_)))
}

pub(super) fn builtin_is_char(args: &[Value]) -> Result<Value, RuntimeError> {
    check(args, |v| matches!(v, Value::Char(_)))
}

pub(super) fn builtin_is_bytes(args: &[Value]) -> Result<Value, RuntimeError> {
    check(args, |v| matches!(v, Value::Bytes(_)))
}

pub(super) fn builtin_is_array(args: &[Value]) -> Result<Value, RuntimeError> {
    check(args, |v| matches!(v, Value::Array(_)))
}

pub(super) fn builtin_is_map(args: &[Value]) -> Result<Value, RuntimeError> {
    check(args, |v| matches!(v, Value::Map(_)))
}

pub(super) fn builtin_is_error(args: &[Value]) -> Result<Value, RuntimeError> {
    check(args, |v| matches!(v, Value::Error(_)))
}

pub(super) fn builtin_is_undefined(args: &[Value]) -> Result<Value, RuntimeError> {
    check(args, Value::is_undefined)
}

/// True for script functions only; builtins and host functions are callable
/// but not functions.
pub(super) fn builtin_is_function(args: &[Value]) -> Result<Value, RuntimeError> {
    check(args, |v| matches!(v, Value::Function(_) | Value::Closure(_)))
}

pub(super) fn builtin_is_callable(args: &[Value]) -> Result<Value, RuntimeError> {
    check(args, Value::is_callable)
}
