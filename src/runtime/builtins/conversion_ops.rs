use crate::runtime::{error::RuntimeError, value::Value};

use super::helpers::{check_arity, check_arity_range, conversion_default};

pub(super) fn builtin_type_name(args: &[Value]) -> Result<Value, RuntimeError> {
    check_arity(args, 1)?;
    Ok(Value::string(args[0].type_name()))
}

pub(super) fn builtin_string(args: &[Value]) -> Result<Value, RuntimeError> {
    check_arity_range(args, 1, 2)?;
    match &args[0] {
        Value::String(_) => Ok(args[0].clone()),
        Value::Undefined => Ok(conversion_default(args)),
        other => Ok(Value::string(other.to_text())),
    }
}

pub(super) fn builtin_int(args: &[Value]) -> Result<Value, RuntimeError> {
    check_arity_range(args, 1, 2)?;
    let converted = match &args[0] {
        Value::Int(v) => Some(*v),
        Value::Float(v) if v.is_finite() => Some(*v as i64),
        Value::Char(c) => Some(*c as i64),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    Ok(converted.map(Value::Int).unwrap_or_else(|| conversion_default(args)))
}

pub(super) fn builtin_float(args: &[Value]) -> Result<Value, RuntimeError> {
    check_arity_range(args, 1, 2)?;
    let converted = match &args[0] {
        Value::Float(v) => Some(*v),
        Value::Int(v) => Some(*v as f64),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(converted.map(Value::Float).unwrap_or_else(|| conversion_default(args)))
}

pub(super) fn builtin_bool(args: &[Value]) -> Result<Value, RuntimeError> {
    check_arity(args, 1)?;
    Ok(Value::Bool(!args[0].is_falsy()))
}

pub(super) fn builtin_char(args: &[Value]) -> Result<Value, RuntimeError> {
    check_arity_range(args, 1, 2)?;
    let converted = match &args[0] {
        Value::Char(c) => Some(*c),
        Value::Int(v) => u32::try_from(*v).ok().and_then(char::from_u32),
        Value::String(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(c),
                _ => None,
            }
        }
        _ => None,
    };
    Ok(converted.map(Value::Char).unwrap_or_else(|| conversion_default(args)))
}

/// `bytes(n)` allocates `n` zero bytes; strings convert to their UTF-8
/// encoding.
pub(super) fn builtin_bytes(args: &[Value]) -> Result<Value, RuntimeError> {
    check_arity_range(args, 1, 2)?;
    match &args[0] {
        Value::Bytes(_) => Ok(args[0].clone()),
        Value::String(s) => Ok(Value::bytes(s.as_bytes())),
        Value::Int(n) => match usize::try_from(*n) {
            Ok(n) => Ok(Value::bytes(vec![0u8; n])),
            Err(_) => Ok(conversion_default(args)),
        },
        _ => Ok(conversion_default(args)),
    }
}
