use crate::runtime::{error::RuntimeError, operator::BinaryOperator, value::Value};

use super::VM;

impl VM<'_> {
    /// Applies `left op right`, naming both operand types when neither
    /// side supports the pairing.
    pub(super) fn execute_binary_operation(
        &self,
        op: BinaryOperator,
        left: &Value,
        right: &Value,
    ) -> Result<Value, RuntimeError> {
        match left.binary_op(op, right) {
            Err(RuntimeError::InvalidOperator) => Err(invalid_operation(op, left, right)),
            other => other,
        }
    }

    pub(super) fn execute_minus(&self, operand: &Value) -> Result<Value, RuntimeError> {
        match operand {
            Value::Int(v) => Ok(Value::Int(v.wrapping_neg())),
            Value::Float(v) => Ok(Value::Float(-v)),
            other => Err(invalid_unary("-", other)),
        }
    }

    pub(super) fn execute_complement(&self, operand: &Value) -> Result<Value, RuntimeError> {
        match operand {
            Value::Int(v) => Ok(Value::Int(!v)),
            other => Err(invalid_unary("^", other)),
        }
    }
}

#[cold]
#[inline(never)]
fn invalid_operation(op: BinaryOperator, left: &Value, right: &Value) -> RuntimeError {
    RuntimeError::InvalidOperation {
        lhs: left.type_name().to_string(),
        op: op.symbol().to_string(),
        rhs: right.type_name().to_string(),
    }
}

#[cold]
#[inline(never)]
fn invalid_unary(op: &str, operand: &Value) -> RuntimeError {
    RuntimeError::InvalidUnaryOperation {
        op: op.to_string(),
        operand: operand.type_name().to_string(),
    }
}
