use std::collections::BTreeMap;

use crate::runtime::{error::RuntimeError, value::Value};

use super::collection_ops::{builtin_append, builtin_copy, builtin_delete, builtin_len, builtin_range};

fn ints(items: &[i64]) -> Value {
    Value::array(items.iter().map(|n| Value::Int(*n)).collect())
}

#[test]
fn len_counts_chars_bytes_and_entries() {
    assert_eq!(builtin_len(&[Value::string("héllo")]), Ok(Value::Int(5)));
    assert_eq!(builtin_len(&[Value::bytes(vec![1u8, 2])]), Ok(Value::Int(2)));
    assert_eq!(builtin_len(&[ints(&[1, 2, 3])]), Ok(Value::Int(3)));
    assert!(matches!(
        builtin_len(&[Value::Int(1)]),
        Err(RuntimeError::InvalidArgumentType { .. })
    ));
}

#[test]
fn copy_detaches_containers() {
    let original = ints(&[1]);
    let copied = builtin_copy(&[original.clone()]).unwrap();
    if let Value::Array(items) = &copied {
        items.write().push(Value::Int(2));
    }
    assert_eq!(original, ints(&[1]));
    assert_eq!(copied, ints(&[1, 2]));
}

#[test]
fn append_returns_a_new_array() {
    let original = ints(&[1]);
    let appended = builtin_append(&[original.clone(), Value::Int(2), Value::Int(3)]).unwrap();
    assert_eq!(appended, ints(&[1, 2, 3]));
    assert_eq!(original, ints(&[1]));
    assert!(builtin_append(&[Value::Int(1), Value::Int(2)]).is_err());
}

#[test]
fn delete_mutates_the_map() {
    let mut entries = BTreeMap::new();
    entries.insert("a".to_string(), Value::Int(1));
    entries.insert("b".to_string(), Value::Int(2));
    let map = Value::map(entries);
    builtin_delete(&[map.clone(), Value::string("a")]).unwrap();
    assert_eq!(builtin_len(&[map]), Ok(Value::Int(1)));
}

#[test]
fn range_counts_up_and_down() {
    assert_eq!(
        builtin_range(&[Value::Int(0), Value::Int(5), Value::Int(2)]),
        Ok(ints(&[0, 2, 4]))
    );
    assert_eq!(
        builtin_range(&[Value::Int(3), Value::Int(0)]),
        Ok(ints(&[3, 2, 1]))
    );
    assert_eq!(builtin_range(&[Value::Int(1), Value::Int(1)]), Ok(ints(&[])));
    assert!(builtin_range(&[Value::Int(0), Value::Int(3), Value::Int(0)]).is_err());
}
