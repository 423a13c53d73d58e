use std::collections::BTreeMap;

use crate::{
    error::Error,
    runtime::{
        marshal::{HostValue, convert},
        value::Value,
    },
};

/// A named value passed into a script or read back out of a compiled
/// program. A variable read from a program is a copy and does not follow
/// later changes to the global.
#[derive(Debug, Clone)]
pub struct Variable {
    name: String,
    value: Value,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: impl Into<HostValue>) -> Result<Self, Error> {
        Ok(Self {
            name: name.into(),
            value: Value::from_host(value.into())?,
        })
    }

    pub(crate) fn from_value(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Host form of the value.
    pub fn value(&self) -> HostValue {
        self.value.to_host()
    }

    /// The script value itself.
    pub fn object(&self) -> &Value {
        &self.value
    }

    pub fn value_type(&self) -> &str {
        self.value.type_name()
    }

    pub fn is_undefined(&self) -> bool {
        self.value.is_undefined()
    }

    /// `0` when the value has no integer form.
    pub fn int(&self) -> i32 {
        convert::to_int(&self.value).unwrap_or(0)
    }

    pub fn int64(&self) -> i64 {
        convert::to_int64(&self.value).unwrap_or(0)
    }

    pub fn float(&self) -> f64 {
        convert::to_float64(&self.value).unwrap_or(0.0)
    }

    pub fn char(&self) -> char {
        convert::to_char(&self.value).unwrap_or('\0')
    }

    pub fn bool(&self) -> bool {
        convert::to_bool(&self.value).unwrap_or(false)
    }

    /// Empty when the value has no text form.
    pub fn string(&self) -> String {
        convert::to_string(&self.value).unwrap_or_default()
    }

    pub fn bytes(&self) -> Vec<u8> {
        convert::to_byte_vec(&self.value).unwrap_or_default()
    }

    pub fn array(&self) -> Vec<HostValue> {
        convert::to_array(&self.value)
            .map(|items| items.iter().map(Value::to_host).collect())
            .unwrap_or_default()
    }

    pub fn map(&self) -> BTreeMap<String, HostValue> {
        convert::to_map(&self.value)
            .map(|entries| {
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_host()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The payload of an error value.
    pub fn error(&self) -> Option<HostValue> {
        match &self.value {
            Value::Error(payload) => Some(payload.to_host()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_convert_leniently() {
        let v = Variable::new("n", "42").unwrap();
        assert_eq!(v.name(), "n");
        assert_eq!(v.value_type(), "string");
        assert_eq!(v.int(), 42);
        assert_eq!(v.string(), "42");
        assert!(v.array().is_empty());
    }

    #[test]
    fn error_exposes_payload() {
        let v = Variable::from_value("e", Value::error(Value::string("bad")));
        assert_eq!(v.error(), Some(HostValue::from("bad")));
        assert!(!v.bool());
    }
}
