use std::collections::BTreeMap;

use crate::runtime::{
    builtins::helpers::{check_arity, check_min_arity, type_error},
    error::RuntimeError,
    operator::BinaryOperator,
    value::Value,
};

pub(super) fn module() -> BTreeMap<String, Value> {
    let mut attributes = BTreeMap::new();
    let mut add = |name: &str, value: Value| {
        attributes.insert(name.to_string(), value);
    };
    add("pi", Value::Float(std::f64::consts::PI));
    add("e", Value::Float(std::f64::consts::E));
    add("abs", Value::host_fn("abs", abs));
    add("ceil", Value::host_fn("ceil", |args: &[Value]| unary(args, f64::ceil)));
    add("floor", Value::host_fn("floor", |args: &[Value]| unary(args, f64::floor)));
    add("round", Value::host_fn("round", |args: &[Value]| unary(args, f64::round)));
    add("sqrt", Value::host_fn("sqrt", |args: &[Value]| unary(args, f64::sqrt)));
    add("pow", Value::host_fn("pow", pow));
    add("min", Value::host_fn("min", |args: &[Value]| extreme(args, BinaryOperator::Less)));
    add("max", Value::host_fn("max", |args: &[Value]| extreme(args, BinaryOperator::Greater)));
    attributes
}

fn number(args: &[Value], index: usize) -> Result<f64, RuntimeError> {
    match &args[index] {
        Value::Int(v) => Ok(*v as f64),
        Value::Float(v) => Ok(*v),
        other => Err(type_error(index, "int/float", other)),
    }
}

fn abs(args: &[Value]) -> Result<Value, RuntimeError> {
    check_arity(args, 1)?;
    match &args[0] {
        Value::Int(v) => Ok(Value::Int(v.wrapping_abs())),
        Value::Float(v) => Ok(Value::Float(v.abs())),
        other => Err(type_error(0, "int/float", other)),
    }
}

fn unary(args: &[Value], f: fn(f64) -> f64) -> Result<Value, RuntimeError> {
    check_arity(args, 1)?;
    Ok(Value::Float(f(number(args, 0)?)))
}

fn pow(args: &[Value]) -> Result<Value, RuntimeError> {
    check_arity(args, 2)?;
    Ok(Value::Float(number(args, 0)?.powf(number(args, 1)?)))
}

/// Smallest (`Less`) or largest (`Greater`) argument, returned unconverted.
fn extreme(args: &[Value], keep_if: BinaryOperator) -> Result<Value, RuntimeError> {
    check_min_arity(args, 1)?;
    let mut best = 0;
    for i in 0..args.len() {
        number(args, i)?;
        if args[i].binary_op(keep_if, &args[best])?.is_falsy() {
            continue;
        }
        best = i;
    }
    Ok(args[best].clone())
}
