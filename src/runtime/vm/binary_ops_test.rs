use crate::runtime::{error::RuntimeError, object::Object, operator::BinaryOperator, value::Value};

use super::test_support::{run_err, run_ok, run_with};

#[derive(Debug)]
struct Meters(i64);

impl Object for Meters {
    fn type_name(&self) -> &str {
        "meters"
    }

    fn binary_op(&self, op: BinaryOperator, rhs: &Value) -> Result<Value, RuntimeError> {
        match (op, rhs) {
            (BinaryOperator::Add, Value::Int(n)) => Ok(Value::object(Meters(self.0 + n))),
            (BinaryOperator::Greater, Value::Int(n)) => Ok(Value::Bool(self.0 > *n)),
            (BinaryOperator::Less, Value::Int(n)) => Ok(Value::Bool(self.0 < *n)),
            _ => Err(RuntimeError::InvalidOperator),
        }
    }
}

fn meters(value: &Value) -> Option<i64> {
    value.downcast_ref::<Meters>().map(|m| m.0)
}

#[test]
fn host_object_handles_its_own_operators() {
    let out = run_with("out = m + 2", &[("m", Value::object(Meters(5)))], -1).unwrap();
    assert_eq!(meters(&out), Some(7));
}

#[test]
fn reflected_operator_is_tried_on_host_right_operand() {
    let m = Value::object(Meters(5));
    let out = run_with("out = 2 + m", &[("m", m.clone())], -1).unwrap();
    assert_eq!(meters(&out), Some(7));

    // 3 < m becomes m > 3
    let out = run_with("out = 3 < m", &[("m", m)], -1).unwrap();
    assert_eq!(out, Value::Bool(true));
}

#[test]
fn non_commutative_operators_are_not_reflected() {
    let err = run_with("out = 2 - m", &[("m", Value::object(Meters(5)))], -1).unwrap_err();
    assert!(err.to_string().contains("invalid operation: int - meters"));
}

#[test]
fn unary_operators() {
    assert_eq!(run_ok("out = -(3)"), Value::Int(-3));
    assert_eq!(run_ok("out = ^0"), Value::Int(-1));
    assert_eq!(run_ok("out = -1.5"), Value::Float(-1.5));
    assert!(run_err(r#"out = -"x""#).contains("invalid operation: -string"));
}

#[test]
fn comparisons_across_numeric_kinds() {
    assert_eq!(run_ok("out = 1 < 1.5"), Value::Bool(true));
    assert_eq!(run_ok(r#"out = "abc" < "abd""#), Value::Bool(true));
    assert_eq!(run_ok("out = 'b' >= 'a'"), Value::Bool(true));
}
