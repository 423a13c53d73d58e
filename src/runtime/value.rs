use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    sync::Arc,
};

use parking_lot::{Mutex, RwLock};

use crate::runtime::{
    builtin_function::{BuiltinFunction, HostFunction},
    closure::Closure,
    compiled_function::CompiledFunction,
    error::RuntimeError,
    iterator::ValueIterator,
    object::Object,
    operator::BinaryOperator,
};

/// Shared cell holding a captured local. Created the first time a closure
/// captures a stack slot and shared by every closure that captures it.
pub type Upvalue = Arc<Mutex<Value>>;

/// Runtime value used by the VM stack, globals, constants and closures.
///
/// ## Sharing model
///
/// Scalars are stored inline. Strings and bytes are immutable and shared
/// through `Arc`. Arrays and maps are mutable in place (`a[0] = 1`) and are
/// shared behind `Arc<RwLock<..>>`, so aliasing inside a script behaves like
/// reference semantics. `copy()` produces an independent deep copy.
///
/// Values are `Send + Sync`: a compiled program may run on one thread while
/// another thread clones it or reads its globals.
#[derive(Debug, Clone)]
pub enum Value {
    /// Absence of value.
    Undefined,
    /// 64-bit signed integer. Arithmetic wraps.
    Int(i64),
    /// 64-bit floating point number.
    Float(f64),
    Bool(bool),
    /// Unicode scalar value.
    Char(char),
    /// Immutable UTF-8 string.
    String(Arc<str>),
    /// Immutable byte string.
    Bytes(Arc<[u8]>),
    Array(Arc<RwLock<Vec<Value>>>),
    /// String-keyed map. Keys iterate in sorted order.
    Map(Arc<RwLock<BTreeMap<String, Value>>>),
    /// Error value wrapping a payload; always falsy.
    Error(Arc<Value>),
    /// Function literal as stored in the constant pool.
    Function(Arc<CompiledFunction>),
    /// Function literal instantiated with its captured cells.
    Closure(Arc<Closure>),
    Builtin(BuiltinFunction),
    Host(HostFunction),
    /// Host-defined value kind.
    Object(Arc<dyn Object>),
    /// Loop iterator. Never escapes a `for-in` statement.
    Iterator(Arc<Mutex<ValueIterator>>),
    /// Stack slot that has been captured by a closure. Never visible to
    /// scripts or hosts: reads go through the cell.
    Captured(Upvalue),
}

impl Value {
    pub fn string(s: impl Into<Arc<str>>) -> Value {
        Value::String(s.into())
    }

    pub fn bytes(bytes: impl Into<Arc<[u8]>>) -> Value {
        Value::Bytes(bytes.into())
    }

    pub fn array(items: Vec<Value>) -> Value {
        Value::Array(Arc::new(RwLock::new(items)))
    }

    pub fn map(entries: BTreeMap<String, Value>) -> Value {
        Value::Map(Arc::new(RwLock::new(entries)))
    }

    pub fn error(payload: Value) -> Value {
        Value::Error(Arc::new(payload))
    }

    pub fn object<T: Object + 'static>(object: T) -> Value {
        Value::Object(Arc::new(object))
    }

    /// Wraps a Rust closure as a callable script value.
    pub fn host_fn<F>(name: &str, func: F) -> Value
    where
        F: Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync + 'static,
    {
        Value::Host(HostFunction::new(name, func))
    }

    /// Returns the type name used in diagnostics and by `type_name()`.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Undefined => "undefined",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Error(_) => "error",
            Value::Function(_) | Value::Closure(_) => "compiled-function",
            Value::Builtin(_) => "builtin-function",
            Value::Host(_) => "user-function",
            Value::Object(obj) => obj.type_name(),
            Value::Iterator(_) => "iterator",
            Value::Captured(_) => "captured",
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_falsy(&self) -> bool {
        match self {
            Value::Undefined | Value::Error(_) => true,
            Value::Int(v) => *v == 0,
            Value::Float(v) => v.is_nan(),
            Value::Bool(v) => !v,
            Value::Char(c) => *c == '\0',
            Value::String(s) => s.is_empty(),
            Value::Bytes(b) => b.is_empty(),
            Value::Array(items) => items.read_recursive().is_empty(),
            Value::Map(map) => map.read_recursive().is_empty(),
            Value::Object(obj) => obj.is_falsy(),
            Value::Captured(cell) => cell.lock().is_falsy(),
            Value::Function(_)
            | Value::Closure(_)
            | Value::Builtin(_)
            | Value::Host(_)
            | Value::Iterator(_) => false,
        }
    }

    pub fn is_callable(&self) -> bool {
        match self {
            Value::Function(_) | Value::Closure(_) | Value::Builtin(_) | Value::Host(_) => true,
            Value::Object(obj) => obj.is_callable(),
            _ => false,
        }
    }

    /// Script-level equality (`==`). Values of different kinds are never
    /// equal, except that host objects decide for themselves.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                if Arc::ptr_eq(a, b) {
                    return true;
                }
                let (a, b) = (a.read_recursive(), b.read_recursive());
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.equals(y))
            }
            (Value::Map(a), Value::Map(b)) => {
                if Arc::ptr_eq(a, b) {
                    return true;
                }
                let (a, b) = (a.read_recursive(), b.read_recursive());
                a.len() == b.len()
                    && a
                        .iter()
                        .all(|(k, v)| b.get(k).is_some_and(|other| v.equals(other)))
            }
            (Value::Error(a), Value::Error(b)) => a.equals(b),
            (Value::Function(a), Value::Function(b)) => Arc::ptr_eq(a, b),
            (Value::Closure(a), Value::Closure(b)) => Arc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            (Value::Host(a), Value::Host(b)) => a == b,
            (Value::Object(a), _) => {
                if let Value::Object(b) = other
                    && Arc::ptr_eq(a, b)
                {
                    return true;
                }
                a.equals(other)
            }
            (_, Value::Object(b)) => b.equals(self),
            (Value::Captured(cell), _) => cell.lock().equals(other),
            (_, Value::Captured(cell)) => self.equals(&cell.lock()),
            _ => false,
        }
    }

    /// Deep copy. Containers are copied recursively; host objects copy
    /// themselves or are shared when they report no copy. Closures get fresh
    /// capture cells.
    pub fn copy(&self) -> Value {
        self.copy_with(&mut CopyState::default())
    }

    /// Deep copy that records every capture cell it copies in `state`, so
    /// closures sharing a cell before the copy share its copy afterwards.
    pub fn copy_with(&self, state: &mut CopyState) -> Value {
        match self {
            Value::Array(items) => {
                let items = items.read_recursive().clone();
                Value::array(items.iter().map(|v| v.copy_with(state)).collect())
            }
            Value::Map(map) => {
                let map = map.read_recursive().clone();
                Value::map(
                    map.into_iter()
                        .map(|(k, v)| (k, v.copy_with(state)))
                        .collect(),
                )
            }
            Value::Error(payload) => Value::error(payload.copy_with(state)),
            Value::Object(obj) => obj.copy().map(Value::Object).unwrap_or_else(|| self.clone()),
            Value::Closure(closure) => Value::Closure(state.copy_closure(closure)),
            Value::Captured(cell) => {
                let inner = cell.lock().clone();
                inner.copy_with(state)
            }
            other => other.clone(),
        }
    }

    /// Applies `self op rhs`. When the left operand rejects the pairing and
    /// `rhs` is a host object, the object gets the reflected operator with
    /// the operands swapped. Returns [`RuntimeError::InvalidOperator`] when
    /// neither side supports the pairing.
    pub fn binary_op(&self, op: BinaryOperator, rhs: &Value) -> Result<Value, RuntimeError> {
        match self.binary_op_left(op, rhs) {
            Err(RuntimeError::InvalidOperator) => match (rhs, op.reflected()) {
                (Value::Object(object), Some(reflected)) => object.binary_op(reflected, self),
                _ => Err(RuntimeError::InvalidOperator),
            },
            other => other,
        }
    }

    fn binary_op_left(&self, op: BinaryOperator, rhs: &Value) -> Result<Value, RuntimeError> {
        match (self, rhs) {
            (Value::Int(a), Value::Int(b)) => int_op(*a, op, *b),
            (Value::Int(a), Value::Float(b)) => float_op(*a as f64, op, *b),
            (Value::Int(a), Value::Char(b)) => match op {
                BinaryOperator::Add => char_from(a.wrapping_add(*b as i64)),
                BinaryOperator::Sub => char_from(a.wrapping_sub(*b as i64)),
                _ => compare(op, a, &(*b as i64)),
            },
            (Value::Float(a), Value::Float(b)) => float_op(*a, op, *b),
            (Value::Float(a), Value::Int(b)) => float_op(*a, op, *b as f64),
            (Value::Char(a), Value::Char(b)) => match op {
                BinaryOperator::Add => char_from(*a as i64 + *b as i64),
                BinaryOperator::Sub => char_from(*a as i64 - *b as i64),
                _ => compare(op, a, b),
            },
            (Value::Char(a), Value::Int(b)) => match op {
                BinaryOperator::Add => char_from((*a as i64).wrapping_add(*b)),
                BinaryOperator::Sub => char_from((*a as i64).wrapping_sub(*b)),
                _ => compare(op, &(*a as i64), b),
            },
            (Value::String(a), Value::String(b)) => match op {
                BinaryOperator::Add => Ok(Value::string(format!("{}{}", a, b))),
                _ => compare(op, a, b),
            },
            (Value::String(a), other) if op == BinaryOperator::Add => {
                Ok(Value::string(format!("{}{}", a, other.to_text())))
            }
            (Value::Array(a), Value::Array(b)) if op == BinaryOperator::Add => {
                let mut items = a.read_recursive().clone();
                items.extend(b.read_recursive().iter().cloned());
                Ok(Value::array(items))
            }
            (Value::Bytes(a), Value::Bytes(b)) if op == BinaryOperator::Add => {
                Ok(Value::bytes([a.as_ref(), b.as_ref()].concat()))
            }
            (Value::Object(obj), _) => obj.binary_op(op, rhs),
            (Value::Captured(cell), _) => cell.lock().binary_op(op, rhs),
            _ => Err(RuntimeError::InvalidOperator),
        }
    }

    /// Invokes a native callable: builtins, host functions and callable host
    /// objects. Compiled functions need a VM and are invoked through
    /// [`Compiled::call`](crate::Compiled::call).
    pub fn call(&self, args: &[Value]) -> Result<Value, RuntimeError> {
        match self {
            Value::Builtin(builtin) => (builtin.func)(args),
            Value::Host(host) => (host.func)(args),
            Value::Object(obj) if obj.is_callable() => obj.call(args),
            Value::Function(_) | Value::Closure(_) => Err(RuntimeError::custom(
                "compiled functions must be called through a compiled program",
            )),
            other => Err(RuntimeError::NotCallable(other.type_name().to_string())),
        }
    }

    /// Downcasts a host object value.
    pub fn downcast_ref<T: Object + 'static>(&self) -> Option<&T> {
        match self {
            Value::Object(obj) => obj.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Unquoted text form: strings and chars render raw, everything else
    /// uses `Display`.
    pub fn to_text(&self) -> String {
        match self {
            Value::String(s) => s.to_string(),
            Value::Char(c) => c.to_string(),
            Value::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
            Value::Captured(cell) => cell.lock().to_text(),
            other => other.to_string(),
        }
    }
}

/// Copies made so far during one deep copy, keyed by the address of the
/// original. A cell is registered before its contents are copied, so a
/// closure that captures itself terminates.
#[derive(Default)]
pub struct CopyState {
    cells: HashMap<*const Mutex<Value>, Upvalue>,
    closures: HashMap<*const Closure, Arc<Closure>>,
}

impl CopyState {
    fn copy_closure(&mut self, closure: &Arc<Closure>) -> Arc<Closure> {
        if let Some(copied) = self.closures.get(&Arc::as_ptr(closure)) {
            return copied.clone();
        }
        let free = closure.free.iter().map(|cell| self.copy_cell(cell)).collect();
        let copied = Arc::new(Closure::new(closure.function.clone(), free));
        self.closures.insert(Arc::as_ptr(closure), copied.clone());
        copied
    }

    fn copy_cell(&mut self, cell: &Upvalue) -> Upvalue {
        if let Some(copied) = self.cells.get(&Arc::as_ptr(cell)) {
            return copied.clone();
        }
        let copied: Upvalue = Arc::new(Mutex::new(Value::Undefined));
        self.cells.insert(Arc::as_ptr(cell), copied.clone());
        let inner = cell.lock().clone();
        *copied.lock() = inner.copy_with(self);
        copied
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Undefined
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "<undefined>"),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Char(c) => write!(f, "{}", c),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Bytes(b) => write!(f, "{}", String::from_utf8_lossy(b)),
            Value::Array(items) => {
                let items = items.read_recursive();
                let rendered: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", rendered.join(", "))
            }
            Value::Map(map) => {
                let map = map.read_recursive();
                let rendered: Vec<String> = map.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                write!(f, "{{{}}}", rendered.join(", "))
            }
            Value::Error(payload) => write!(f, "error: {}", payload),
            Value::Function(_) | Value::Closure(_) => write!(f, "<compiled-function>"),
            Value::Builtin(b) => write!(f, "<builtin-function:{}>", b.name),
            Value::Host(h) => write!(f, "<user-function:{}>", h.name),
            Value::Object(obj) => write!(f, "{}", obj.display()),
            Value::Iterator(_) => write!(f, "<iterator>"),
            Value::Captured(cell) => write!(f, "{}", cell.lock()),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::string(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::string(v)
    }
}

fn int_op(a: i64, op: BinaryOperator, b: i64) -> Result<Value, RuntimeError> {
    let result = match op {
        BinaryOperator::Add => a.wrapping_add(b),
        BinaryOperator::Sub => a.wrapping_sub(b),
        BinaryOperator::Mul => a.wrapping_mul(b),
        BinaryOperator::Quo => {
            if b == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            a.wrapping_div(b)
        }
        BinaryOperator::Rem => {
            if b == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            a.wrapping_rem(b)
        }
        BinaryOperator::And => a & b,
        BinaryOperator::Or => a | b,
        BinaryOperator::Xor => a ^ b,
        BinaryOperator::AndNot => a & !b,
        BinaryOperator::Shl => {
            let shift = shift_count(b)?;
            if shift >= 64 { 0 } else { a << shift }
        }
        BinaryOperator::Shr => {
            let shift = shift_count(b)?;
            a >> shift.min(63)
        }
        _ => return compare(op, &a, &b),
    };
    Ok(Value::Int(result))
}

fn shift_count(b: i64) -> Result<u32, RuntimeError> {
    if b < 0 {
        return Err(RuntimeError::custom("negative shift count"));
    }
    Ok(b.min(64) as u32)
}

fn float_op(a: f64, op: BinaryOperator, b: f64) -> Result<Value, RuntimeError> {
    let result = match op {
        BinaryOperator::Add => a + b,
        BinaryOperator::Sub => a - b,
        BinaryOperator::Mul => a * b,
        BinaryOperator::Quo => a / b,
        _ => return compare(op, &a, &b),
    };
    Ok(Value::Float(result))
}

fn compare<T: PartialOrd + ?Sized>(op: BinaryOperator, a: &T, b: &T) -> Result<Value, RuntimeError> {
    let result = match op {
        BinaryOperator::Less => a < b,
        BinaryOperator::LessEq => a <= b,
        BinaryOperator::Greater => a > b,
        BinaryOperator::GreaterEq => a >= b,
        _ => return Err(RuntimeError::InvalidOperator),
    };
    Ok(Value::Bool(result))
}

fn char_from(code: i64) -> Result<Value, RuntimeError> {
    u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .map(Value::Char)
        .ok_or_else(|| RuntimeError::custom(format!("invalid char code: {}", code)))
}
