use crate::runtime::value::Value;

/// Snapshot iterator backing `for k, v in x`. Entries are collected when the
/// loop starts, so mutating the container inside the loop body does not
/// affect the iteration.
#[derive(Debug)]
pub struct ValueIterator {
    entries: Vec<(Value, Value)>,
    current: Option<usize>,
}

impl ValueIterator {
    pub fn new(iterable: &Value) -> Option<Self> {
        let entries: Vec<(Value, Value)> = match iterable {
            Value::Array(items) => items
                .read_recursive()
                .iter()
                .enumerate()
                .map(|(i, v)| (Value::Int(i as i64), v.clone()))
                .collect(),
            Value::Map(map) => map
                .read_recursive()
                .iter()
                .map(|(k, v)| (Value::string(k.as_str()), v.clone()))
                .collect(),
            Value::String(s) => s
                .chars()
                .enumerate()
                .map(|(i, c)| (Value::Int(i as i64), Value::Char(c)))
                .collect(),
            Value::Bytes(bytes) => bytes
                .iter()
                .enumerate()
                .map(|(i, b)| (Value::Int(i as i64), Value::Int(*b as i64)))
                .collect(),
            _ => return None,
        };
        Some(Self {
            entries,
            current: None,
        })
    }

    /// Advances to the next entry; false once exhausted.
    pub fn next(&mut self) -> bool {
        let next = self.current.map_or(0, |i| i + 1);
        self.current = Some(next.min(self.entries.len()));
        next < self.entries.len()
    }

    pub fn key(&self) -> Value {
        self.entry().map(|(k, _)| k.clone()).unwrap_or(Value::Undefined)
    }

    pub fn value(&self) -> Value {
        self.entry().map(|(_, v)| v.clone()).unwrap_or(Value::Undefined)
    }

    fn entry(&self) -> Option<&(Value, Value)> {
        self.current.and_then(|i| self.entries.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_array_entries_in_order() {
        let array = Value::array(vec![Value::Int(10), Value::Int(20)]);
        let mut it = ValueIterator::new(&array).unwrap();

        assert!(it.next());
        assert_eq!(it.key(), Value::Int(0));
        assert_eq!(it.value(), Value::Int(10));
        assert!(it.next());
        assert_eq!(it.value(), Value::Int(20));
        assert!(!it.next());
        assert!(!it.next());
    }

    #[test]
    fn non_iterables_are_rejected() {
        assert!(ValueIterator::new(&Value::Int(3)).is_none());
    }
}
