use std::collections::BTreeMap;

use crate::runtime::{
    builtins::helpers::{arg_int, arg_string, check_arity, check_arity_range, type_error},
    error::RuntimeError,
    value::Value,
};

pub(super) fn module() -> BTreeMap<String, Value> {
    let functions: [(&str, fn(&[Value]) -> Result<Value, RuntimeError>); 11] = [
        ("contains", contains),
        ("has_prefix", has_prefix),
        ("has_suffix", has_suffix),
        ("to_lower", to_lower),
        ("to_upper", to_upper),
        ("title", title),
        ("trim_space", trim_space),
        ("split", split),
        ("join", join),
        ("repeat", repeat),
        ("replace", replace),
    ];
    functions
        .into_iter()
        .map(|(name, func)| (name.to_string(), Value::host_fn(name, func)))
        .collect()
}

fn two_strings<'a>(args: &'a [Value]) -> Result<(&'a str, &'a str), RuntimeError> {
    check_arity(args, 2)?;
    Ok((arg_string(args, 0)?, arg_string(args, 1)?))
}

fn contains(args: &[Value]) -> Result<Value, RuntimeError> {
    let (s, sub) = two_strings(args)?;
    Ok(Value::Bool(s.contains(sub)))
}

fn has_prefix(args: &[Value]) -> Result<Value, RuntimeError> {
    let (s, prefix) = two_strings(args)?;
    Ok(Value::Bool(s.starts_with(prefix)))
}

fn has_suffix(args: &[Value]) -> Result<Value, RuntimeError> {
    let (s, suffix) = two_strings(args)?;
    Ok(Value::Bool(s.ends_with(suffix)))
}

fn to_lower(args: &[Value]) -> Result<Value, RuntimeError> {
    check_arity(args, 1)?;
    Ok(Value::string(arg_string(args, 0)?.to_lowercase()))
}

fn to_upper(args: &[Value]) -> Result<Value, RuntimeError> {
    check_arity(args, 1)?;
    Ok(Value::string(arg_string(args, 0)?.to_uppercase()))
}

/// Upper-cases the first letter of every whitespace-separated word.
fn title(args: &[Value]) -> Result<Value, RuntimeError> {
    check_arity(args, 1)?;
    let mut out = String::new();
    let mut at_word_start = true;
    for c in arg_string(args, 0)?.chars() {
        if at_word_start && !c.is_whitespace() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = c.is_whitespace();
    }
    Ok(Value::string(out))
}

fn trim_space(args: &[Value]) -> Result<Value, RuntimeError> {
    check_arity(args, 1)?;
    Ok(Value::string(arg_string(args, 0)?.trim()))
}

fn split(args: &[Value]) -> Result<Value, RuntimeError> {
    let (s, sep) = two_strings(args)?;
    let parts: Vec<Value> = if sep.is_empty() {
        s.chars().map(|c| Value::string(c.to_string())).collect()
    } else {
        s.split(sep).map(Value::string).collect()
    };
    Ok(Value::array(parts))
}

fn join(args: &[Value]) -> Result<Value, RuntimeError> {
    check_arity(args, 2)?;
    let sep = arg_string(args, 1)?;
    let Value::Array(items) = &args[0] else {
        return Err(type_error(0, "array", &args[0]));
    };
    let parts = items
        .read_recursive()
        .iter()
        .map(|item| match item {
            Value::String(s) => Ok(s.to_string()),
            other => Err(type_error(0, "array of strings", other)),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::string(parts.join(sep)))
}

fn repeat(args: &[Value]) -> Result<Value, RuntimeError> {
    check_arity(args, 2)?;
    let s = arg_string(args, 0)?;
    let count = usize::try_from(arg_int(args, 1)?)
        .map_err(|_| RuntimeError::custom("negative repeat count"))?;
    Ok(Value::string(s.repeat(count)))
}

/// `replace(s, old, new[, n])`; a negative or missing `n` replaces every
/// occurrence.
fn replace(args: &[Value]) -> Result<Value, RuntimeError> {
    check_arity_range(args, 3, 4)?;
    let s = arg_string(args, 0)?;
    let old = arg_string(args, 1)?;
    let new = arg_string(args, 2)?;
    let limit = if args.len() == 4 { arg_int(args, 3)? } else { -1 };
    let replaced = match usize::try_from(limit) {
        Ok(n) => s.replacen(old, new, n),
        Err(_) => s.replace(old, new),
    };
    Ok(Value::string(replaced))
}
