//! Conversion between host-side data and script values.
use std::collections::{BTreeMap, HashMap};

use crate::{error::Error, runtime::value::Value};

pub mod convert;
mod serde_bridge;


/// Host-side view of a script value.
///
/// Plain data converts structurally in both directions. Values that only
/// exist inside the runtime (functions, host objects, errors) travel as
/// [`HostValue::Script`] and pass through untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum HostValue {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    String(String),
    Bytes(Vec<u8>),
    Array(Vec<HostValue>),
    Map(BTreeMap<String, HostValue>),
    Script(Value),
}

impl HostValue {
    pub fn is_nil(&self) -> bool {
        matches!(self, HostValue::Nil)
    }
}

impl Value {
    /// Converts host data into a script value. Containers are converted
    /// recursively into fresh arrays and maps.
    pub fn from_host(value: HostValue) -> Result<Value, Error> {
        Ok(match value {
            HostValue::Nil => Value::Undefined,
            HostValue::Bool(v) => Value::Bool(v),
            HostValue::Int(v) => Value::Int(v),
            HostValue::Float(v) => Value::Float(v),
            HostValue::Char(v) => Value::Char(v),
            HostValue::String(v) => Value::string(v),
            HostValue::Bytes(v) => Value::bytes(v),
            HostValue::Array(items) => Value::array(
                items
                    .into_iter()
                    .map(Value::from_host)
                    .collect::<Result<_, _>>()?,
            ),
            HostValue::Map(entries) => Value::map(
                entries
                    .into_iter()
                    .map(|(k, v)| Value::from_host(v).map(|v| (k, v)))
                    .collect::<Result<_, _>>()?,
            ),
            HostValue::Script(value) => match value {
                Value::Iterator(_) | Value::Captured(_) => {
                    return Err(Error::UnsupportedType(value.type_name().to_string()));
                }
                other => other,
            },
        })
    }

    /// Converts a script value into host data. `undefined` becomes
    /// [`HostValue::Nil`].
    pub fn to_host(&self) -> HostValue {
        match self {
            Value::Undefined => HostValue::Nil,
            Value::Int(v) => HostValue::Int(*v),
            Value::Float(v) => HostValue::Float(*v),
            Value::Bool(v) => HostValue::Bool(*v),
            Value::Char(v) => HostValue::Char(*v),
            Value::String(s) => HostValue::String(s.to_string()),
            Value::Bytes(b) => HostValue::Bytes(b.to_vec()),
            Value::Array(items) => {
                HostValue::Array(items.read_recursive().iter().map(Value::to_host).collect())
            }
            Value::Map(map) => HostValue::Map(
                map.read_recursive()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_host()))
                    .collect(),
            ),
            Value::Captured(cell) => cell.lock().to_host(),
            other => HostValue::Script(other.clone()),
        }
    }
}

impl From<bool> for HostValue {
    fn from(v: bool) -> Self {
        HostValue::Bool(v)
    }
}

impl From<i32> for HostValue {
    fn from(v: i32) -> Self {
        HostValue::Int(v.into())
    }
}

impl From<i64> for HostValue {
    fn from(v: i64) -> Self {
        HostValue::Int(v)
    }
}

impl From<u32> for HostValue {
    fn from(v: u32) -> Self {
        HostValue::Int(v.into())
    }
}

impl From<f32> for HostValue {
    fn from(v: f32) -> Self {
        HostValue::Float(v.into())
    }
}

impl From<f64> for HostValue {
    fn from(v: f64) -> Self {
        HostValue::Float(v)
    }
}

impl From<char> for HostValue {
    fn from(v: char) -> Self {
        HostValue::Char(v)
    }
}

impl From<&str> for HostValue {
    fn from(v: &str) -> Self {
        HostValue::String(v.to_string())
    }
}

impl From<String> for HostValue {
    fn from(v: String) -> Self {
        HostValue::String(v)
    }
}

/// Byte vectors become script `bytes`, not arrays.
impl From<Vec<u8>> for HostValue {
    fn from(v: Vec<u8>) -> Self {
        HostValue::Bytes(v)
    }
}

impl From<Vec<HostValue>> for HostValue {
    fn from(v: Vec<HostValue>) -> Self {
        HostValue::Array(v)
    }
}

impl From<BTreeMap<String, HostValue>> for HostValue {
    fn from(v: BTreeMap<String, HostValue>) -> Self {
        HostValue::Map(v)
    }
}

impl From<HashMap<String, HostValue>> for HostValue {
    fn from(v: HashMap<String, HostValue>) -> Self {
        HostValue::Map(v.into_iter().collect())
    }
}

impl<T: Into<HostValue>> From<Option<T>> for HostValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(HostValue::Nil, Into::into)
    }
}

impl From<Value> for HostValue {
    fn from(v: Value) -> Self {
        v.to_host()
    }
}
