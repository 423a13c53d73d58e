//! Lenient extraction of Rust values from script values. Each helper returns
//! `None` when the value has no sensible conversion instead of failing.
use std::collections::BTreeMap;

use crate::runtime::value::Value;

pub fn to_int64(value: &Value) -> Option<i64> {
    match value {
        Value::Int(v) => Some(*v),
        Value::Float(v) if v.is_finite() => Some(*v as i64),
        Value::Char(c) => Some(*c as i64),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::String(s) => s.trim().parse().ok(),
        Value::Captured(cell) => to_int64(&cell.lock()),
        _ => None,
    }
}

/// Like [`to_int64`], but also `None` when the result does not fit an `i32`.
pub fn to_int(value: &Value) -> Option<i32> {
    to_int64(value).and_then(|v| i32::try_from(v).ok())
}

pub fn to_float64(value: &Value) -> Option<f64> {
    match value {
        Value::Float(v) => Some(*v),
        Value::Int(v) => Some(*v as f64),
        Value::String(s) => s.trim().parse().ok(),
        Value::Captured(cell) => to_float64(&cell.lock()),
        _ => None,
    }
}

/// Truthiness; every value converts.
pub fn to_bool(value: &Value) -> Option<bool> {
    Some(!value.is_falsy())
}

pub fn to_char(value: &Value) -> Option<char> {
    match value {
        Value::Char(c) => Some(*c),
        Value::Int(v) => u32::try_from(*v).ok().and_then(char::from_u32),
        Value::Captured(cell) => to_char(&cell.lock()),
        _ => None,
    }
}

/// Unquoted text form. `undefined` has none.
pub fn to_string(value: &Value) -> Option<String> {
    match value {
        Value::Undefined => None,
        other => Some(other.to_text()),
    }
}

pub fn to_byte_vec(value: &Value) -> Option<Vec<u8>> {
    match value {
        Value::Bytes(b) => Some(b.to_vec()),
        Value::String(s) => Some(s.as_bytes().to_vec()),
        Value::Captured(cell) => to_byte_vec(&cell.lock()),
        _ => None,
    }
}

/// Snapshot of an array's elements. Elements are shared, not copied.
pub fn to_array(value: &Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items.read_recursive().clone()),
        Value::Captured(cell) => to_array(&cell.lock()),
        _ => None,
    }
}

pub fn to_map(value: &Value) -> Option<BTreeMap<String, Value>> {
    match value {
        Value::Map(map) => Some(map.read_recursive().clone()),
        Value::Captured(cell) => to_map(&cell.lock()),
        _ => None,
    }
}
