use crate::runtime::{error::RuntimeError, value::Value};

pub(crate) fn check_arity(args: &[Value], expected: usize) -> Result<(), RuntimeError> {
    if args.len() != expected {
        return Err(RuntimeError::WrongNumArguments {
            want: format!("={}", expected),
            got: args.len(),
        });
    }
    Ok(())
}

pub(crate) fn check_arity_range(
    args: &[Value],
    min: usize,
    max: usize,
) -> Result<(), RuntimeError> {
    if args.len() < min || args.len() > max {
        return Err(RuntimeError::WrongNumArguments {
            want: format!("={}..{}", min, max),
            got: args.len(),
        });
    }
    Ok(())
}

pub(crate) fn check_min_arity(args: &[Value], min: usize) -> Result<(), RuntimeError> {
    if args.len() < min {
        return Err(RuntimeError::WrongNumArguments {
            want: format!(">={}", min),
            got: args.len(),
        });
    }
    Ok(())
}

/// Argument names in type errors are positional: `first`, `second`, ...
pub(crate) fn ordinal(index: usize) -> String {
    const NAMES: [&str; 5] = ["first", "second", "third", "fourth", "fifth"];
    NAMES
        .get(index)
        .map(|name| name.to_string())
        .unwrap_or_else(|| format!("#{}", index + 1))
}

pub(crate) fn type_error(index: usize, expected: &str, found: &Value) -> RuntimeError {
    RuntimeError::InvalidArgumentType {
        name: ordinal(index),
        expected: expected.to_string(),
        found: found.type_name().to_string(),
    }
}

pub(crate) fn arg_int(args: &[Value], index: usize) -> Result<i64, RuntimeError> {
    match &args[index] {
        Value::Int(v) => Ok(*v),
        other => Err(type_error(index, "int", other)),
    }
}

pub(crate) fn arg_string(args: &[Value], index: usize) -> Result<&str, RuntimeError> {
    match &args[index] {
        Value::String(s) => Ok(s),
        other => Err(type_error(index, "string", other)),
    }
}

/// Fallback returned by a conversion builtin that cannot convert its first
/// argument: the optional second argument, else `undefined`.
pub(crate) fn conversion_default(args: &[Value]) -> Value {
    args.get(1).cloned().unwrap_or_default()
}
