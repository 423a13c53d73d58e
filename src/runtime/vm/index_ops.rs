use crate::runtime::{error::RuntimeError, value::Value};

/// `left[index]` and `left.member`.
///
/// Arrays, strings and bytes take an int index and fail out of bounds; maps
/// take a string key and yield `undefined` when it is missing. Indexing
/// `undefined` yields `undefined`, and an error value exposes its payload as
/// `.value`.
pub fn index_get(left: &Value, index: &Value) -> Result<Value, RuntimeError> {
    match left {
        Value::Array(items) => {
            let i = int_index(index)?;
            items
                .read_recursive()
                .get(i)
                .cloned()
                .ok_or(RuntimeError::IndexOutOfBounds)
        }
        Value::Map(map) => {
            let key = string_key(index)?;
            Ok(map.read_recursive().get(key).cloned().unwrap_or_default())
        }
        Value::String(s) => {
            let i = int_index(index)?;
            s.chars()
                .nth(i)
                .map(Value::Char)
                .ok_or(RuntimeError::IndexOutOfBounds)
        }
        Value::Bytes(bytes) => {
            let i = int_index(index)?;
            bytes
                .get(i)
                .map(|b| Value::Int(*b as i64))
                .ok_or(RuntimeError::IndexOutOfBounds)
        }
        Value::Error(payload) => match index {
            Value::String(key) if key.as_ref() == "value" => Ok((**payload).clone()),
            other => Err(RuntimeError::InvalidIndexType(other.type_name().to_string())),
        },
        Value::Undefined => Ok(Value::Undefined),
        other => Err(RuntimeError::NotIndexable(other.type_name().to_string())),
    }
}

/// `container[key] = value`, mutating the shared container in place.
pub fn index_set(container: &Value, key: &Value, value: Value) -> Result<(), RuntimeError> {
    match container {
        Value::Array(items) => {
            let i = int_index(key)?;
            let mut items = items.write();
            let slot = items.get_mut(i).ok_or(RuntimeError::IndexOutOfBounds)?;
            *slot = value;
            Ok(())
        }
        Value::Map(map) => {
            let key = string_key(key)?;
            map.write().insert(key.to_string(), value);
            Ok(())
        }
        other => Err(RuntimeError::NotIndexAssignable(other.type_name().to_string())),
    }
}

/// `left[low:high]` with either bound optional (`undefined`).
pub fn slice(left: &Value, low: &Value, high: &Value) -> Result<Value, RuntimeError> {
    match left {
        Value::Array(items) => {
            let items = items.read_recursive();
            let (low, high) = bounds(low, high, items.len())?;
            Ok(Value::array(items[low..high].to_vec()))
        }
        Value::String(s) => {
            let chars: Vec<char> = s.chars().collect();
            let (low, high) = bounds(low, high, chars.len())?;
            Ok(Value::string(chars[low..high].iter().collect::<String>()))
        }
        Value::Bytes(bytes) => {
            let (low, high) = bounds(low, high, bytes.len())?;
            Ok(Value::bytes(&bytes[low..high]))
        }
        other => Err(RuntimeError::NotIndexable(other.type_name().to_string())),
    }
}

fn int_index(index: &Value) -> Result<usize, RuntimeError> {
    match index {
        Value::Int(i) => usize::try_from(*i).map_err(|_| RuntimeError::IndexOutOfBounds),
        other => Err(RuntimeError::InvalidIndexType(other.type_name().to_string())),
    }
}

fn string_key(index: &Value) -> Result<&str, RuntimeError> {
    match index {
        Value::String(key) => Ok(key.as_ref()),
        other => Err(RuntimeError::InvalidIndexType(other.type_name().to_string())),
    }
}

fn bounds(low: &Value, high: &Value, len: usize) -> Result<(usize, usize), RuntimeError> {
    let low = match low {
        Value::Undefined => 0,
        other => int_index(other)?,
    };
    let high = match high {
        Value::Undefined => len,
        other => int_index(other)?,
    };
    if low > high || high > len {
        return Err(RuntimeError::IndexOutOfBounds);
    }
    Ok((low, high))
}
