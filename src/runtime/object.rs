use std::{any::Any, fmt, sync::Arc};

use crate::runtime::{error::RuntimeError, operator::BinaryOperator, value::Value};

/// Upcast helper so host objects can be downcast back to their concrete type.
/// Implemented for every `'static` type.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Host-defined value kinds.
///
/// Every capability has a default that reports it as unsupported, so an
/// implementation only overrides what its type actually does. Objects are
/// shared behind an `Arc` and may be used from several threads, so any
/// interior state needs its own synchronization.
///
/// ```
/// use std::sync::Arc;
/// use rill::{BinaryOperator, Object, RuntimeError, Value};
///
/// #[derive(Debug)]
/// struct Meters(i64);
///
/// impl Object for Meters {
///     fn type_name(&self) -> &str {
///         "meters"
///     }
///
///     fn binary_op(&self, op: BinaryOperator, rhs: &Value) -> Result<Value, RuntimeError> {
///         match (op, rhs) {
///             (BinaryOperator::Add, Value::Int(n)) => Ok(Value::object(Meters(self.0 + n))),
///             _ => Err(RuntimeError::InvalidOperator),
///         }
///     }
/// }
///
/// let sum = Value::object(Meters(2))
///     .binary_op(BinaryOperator::Add, &Value::Int(3))
///     .unwrap();
/// assert_eq!(sum.downcast_ref::<Meters>().map(|m| m.0), Some(5));
/// ```
pub trait Object: AsAny + fmt::Debug + Send + Sync {
    /// Stable label reported by `type_name()` in scripts.
    fn type_name(&self) -> &str;

    fn display(&self) -> String {
        format!("<{}>", self.type_name())
    }

    /// Applies `self op rhs`. Return [`RuntimeError::InvalidOperator`] for
    /// unsupported pairings; [`Value::binary_op`] then tries the reflected
    /// operator on a host-object right operand before failing.
    fn binary_op(&self, op: BinaryOperator, rhs: &Value) -> Result<Value, RuntimeError> {
        let _ = (op, rhs);
        Err(RuntimeError::InvalidOperator)
    }

    fn is_falsy(&self) -> bool {
        false
    }

    /// Value equality against any other value. Identity is checked before
    /// this is called.
    fn equals(&self, other: &Value) -> bool {
        let _ = other;
        false
    }

    /// An independent copy for `copy()` and program cloning. `None` means the
    /// object is immutable and can be shared as is.
    fn copy(&self) -> Option<Arc<dyn Object>> {
        None
    }

    fn is_callable(&self) -> bool {
        false
    }

    fn call(&self, args: &[Value]) -> Result<Value, RuntimeError> {
        let _ = args;
        Err(RuntimeError::NotCallable(self.type_name().to_string()))
    }
}

impl dyn Object {
    pub fn downcast_ref<T: Object + 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}
