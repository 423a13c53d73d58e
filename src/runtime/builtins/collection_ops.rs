use crate::runtime::{error::RuntimeError, value::Value};

use super::helpers::{arg_int, arg_string, check_arity, check_arity_range, check_min_arity, type_error};

/// Element count: chars for strings, bytes for byte strings.
pub(super) fn builtin_len(args: &[Value]) -> Result<Value, RuntimeError> {
    check_arity(args, 1)?;
    let len = match &args[0] {
        Value::Array(items) => items.read_recursive().len(),
        Value::Map(map) => map.read_recursive().len(),
        Value::String(s) => s.chars().count(),
        Value::Bytes(b) => b.len(),
        other => return Err(type_error(0, "array/string/bytes/map", other)),
    };
    Ok(Value::Int(len as i64))
}

pub(super) fn builtin_copy(args: &[Value]) -> Result<Value, RuntimeError> {
    check_arity(args, 1)?;
    Ok(args[0].copy())
}

/// Returns a new array; the original is left untouched.
pub(super) fn builtin_append(args: &[Value]) -> Result<Value, RuntimeError> {
    check_min_arity(args, 2)?;
    match &args[0] {
        Value::Array(items) => {
            let mut appended = items.read_recursive().clone();
            appended.extend(args[1..].iter().cloned());
            Ok(Value::array(appended))
        }
        other => Err(type_error(0, "array", other)),
    }
}

/// Removes a key from a map in place.
pub(super) fn builtin_delete(args: &[Value]) -> Result<Value, RuntimeError> {
    check_arity(args, 2)?;
    let key = arg_string(args, 1)?;
    match &args[0] {
        Value::Map(map) => {
            map.write().remove(key);
            Ok(Value::Undefined)
        }
        other => Err(type_error(0, "map", other)),
    }
}

/// `range(start, stop[, step])`. Counts down when `start > stop`; the step
/// is always a positive magnitude.
pub(super) fn builtin_range(args: &[Value]) -> Result<Value, RuntimeError> {
    check_arity_range(args, 2, 3)?;
    let start = arg_int(args, 0)?;
    let stop = arg_int(args, 1)?;
    let step = if args.len() == 3 { arg_int(args, 2)? } else { 1 };
    if step <= 0 {
        return Err(RuntimeError::custom("range step must be greater than 0"));
    }

    let mut items = Vec::new();
    let mut current = start;
    if start <= stop {
        while current < stop {
            items.push(Value::Int(current));
            current = match current.checked_add(step) {
                Some(next) => next,
                None => break,
            };
        }
    } else {
        while current > stop {
            items.push(Value::Int(current));
            current = match current.checked_sub(step) {
                Some(next) => next,
                None => break,
            };
        }
    }
    Ok(Value::array(items))
}
