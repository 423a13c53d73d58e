use std::{collections::BTreeMap, fmt};

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, MapAccess, SeqAccess, Visitor},
    ser::{self, SerializeMap, SerializeSeq},
};

use crate::{error::Error, runtime::value::Value};

use super::HostValue;

impl Serialize for HostValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            HostValue::Nil => serializer.serialize_unit(),
            HostValue::Bool(v) => serializer.serialize_bool(*v),
            HostValue::Int(v) => serializer.serialize_i64(*v),
            HostValue::Float(v) => serializer.serialize_f64(*v),
            HostValue::Char(v) => serializer.serialize_char(*v),
            HostValue::String(v) => serializer.serialize_str(v),
            HostValue::Bytes(v) => serializer.serialize_bytes(v),
            HostValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            HostValue::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            HostValue::Script(value) => Err(ser::Error::custom(format!(
                "unsupported type: {}",
                value.type_name()
            ))),
        }
    }
}

struct HostValueVisitor;

impl<'de> Visitor<'de> for HostValueVisitor {
    type Value = HostValue;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a plain data value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<HostValue, E> {
        Ok(HostValue::Nil)
    }

    fn visit_none<E: de::Error>(self) -> Result<HostValue, E> {
        Ok(HostValue::Nil)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<HostValue, D::Error>
    where
        D: Deserializer<'de>,
    {
        HostValue::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<HostValue, E> {
        Ok(HostValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<HostValue, E> {
        Ok(HostValue::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<HostValue, E> {
        i64::try_from(v)
            .map(HostValue::Int)
            .map_err(|_| E::custom(format!("integer {} out of range", v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<HostValue, E> {
        Ok(HostValue::Float(v))
    }

    fn visit_char<E: de::Error>(self, v: char) -> Result<HostValue, E> {
        Ok(HostValue::Char(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<HostValue, E> {
        Ok(HostValue::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<HostValue, E> {
        Ok(HostValue::String(v))
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<HostValue, E> {
        Ok(HostValue::Bytes(v.to_vec()))
    }

    fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> Result<HostValue, E> {
        Ok(HostValue::Bytes(v))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<HostValue, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(HostValue::Array(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<HostValue, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = BTreeMap::new();
        while let Some((key, value)) = map.next_entry::<String, HostValue>()? {
            entries.insert(key, value);
        }
        Ok(HostValue::Map(entries))
    }
}

impl<'de> Deserialize<'de> for HostValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(HostValueVisitor)
    }
}

impl HostValue {
    /// Converts any serializable host value, going through `serde_json`.
    /// Unsigned integers above `i64::MAX` are rejected.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<HostValue, Error> {
        let json = serde_json::to_value(value)
            .map_err(|err| Error::UnsupportedType(err.to_string()))?;
        from_json(json)
    }
}

fn from_json(json: serde_json::Value) -> Result<HostValue, Error> {
    Ok(match json {
        serde_json::Value::Null => HostValue::Nil,
        serde_json::Value::Bool(v) => HostValue::Bool(v),
        serde_json::Value::Number(n) => {
            if let Some(v) = n.as_i64() {
                HostValue::Int(v)
            } else if n.is_u64() {
                return Err(Error::UnsupportedType(format!("integer {} out of range", n)));
            } else {
                HostValue::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => HostValue::String(s),
        serde_json::Value::Array(items) => HostValue::Array(
            items
                .into_iter()
                .map(from_json)
                .collect::<Result<_, _>>()?,
        ),
        serde_json::Value::Object(entries) => HostValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| from_json(v).map(|v| (k, v)))
                .collect::<Result<_, _>>()?,
        ),
    })
}

impl Value {
    /// Renders plain data as JSON. Error values become `{"error": payload}`;
    /// functions and host objects are rejected. Non-finite floats become
    /// `null`.
    pub fn to_json(&self) -> Result<serde_json::Value, Error> {
        Ok(match self {
            Value::Undefined => serde_json::Value::Null,
            Value::Int(v) => serde_json::Value::from(*v),
            Value::Float(v) => serde_json::Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Bool(v) => serde_json::Value::Bool(*v),
            Value::Char(c) => serde_json::Value::String(c.to_string()),
            Value::String(s) => serde_json::Value::String(s.to_string()),
            Value::Bytes(b) => serde_json::Value::from(b.to_vec()),
            Value::Array(items) => serde_json::Value::Array(
                items
                    .read_recursive()
                    .iter()
                    .map(Value::to_json)
                    .collect::<Result<_, _>>()?,
            ),
            Value::Map(map) => serde_json::Value::Object(
                map.read_recursive()
                    .iter()
                    .map(|(k, v)| v.to_json().map(|v| (k.clone(), v)))
                    .collect::<Result<_, _>>()?,
            ),
            Value::Error(payload) => serde_json::json!({ "error": payload.to_json()? }),
            Value::Captured(cell) => cell.lock().to_json()?,
            other => return Err(Error::UnsupportedType(other.type_name().to_string())),
        })
    }
}
