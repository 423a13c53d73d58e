use thiserror::Error;

/// Errors raised while operating on values: by operators, builtins, host
/// functions, host objects and the VM itself.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// The operand pairing is not supported by this operator implementation.
    /// The VM reports it as [`RuntimeError::InvalidOperation`].
    #[error("invalid operator")]
    InvalidOperator,
    #[error("invalid operation: {lhs} {op} {rhs}")]
    InvalidOperation {
        lhs: String,
        op: String,
        rhs: String,
    },
    #[error("invalid operation: {op}{operand}")]
    InvalidUnaryOperation { op: String, operand: String },
    #[error("not callable: {0}")]
    NotCallable(String),
    /// `want` carries its comparator: `=2`, `=1..3` or `>=2`.
    #[error("wrong number of arguments: want{want}, got={got}")]
    WrongNumArguments { want: String, got: usize },
    #[error("invalid type for argument '{name}': expected {expected}, found {found}")]
    InvalidArgumentType {
        name: String,
        expected: String,
        found: String,
    },
    #[error("index out of bounds")]
    IndexOutOfBounds,
    #[error("invalid index type: {0}")]
    InvalidIndexType(String),
    #[error("not indexable: {0}")]
    NotIndexable(String),
    #[error("not index-assignable: {0}")]
    NotIndexAssignable(String),
    #[error("not iterable: {0}")]
    NotIterable(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("allocation limit exceeded")]
    AllocLimitExceeded,
    #[error("stack overflow")]
    StackOverflow,
    #[error("execution aborted")]
    Aborted,
    #[error("{0}")]
    Custom(String),
}

impl RuntimeError {
    pub fn custom(message: impl Into<String>) -> Self {
        RuntimeError::Custom(message.into())
    }
}

/// A [`RuntimeError`] together with the script locations that were active
/// when it was raised, innermost first.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Runtime Error: {error}{}", render_trace(.trace))]
pub struct ExecutionError {
    pub error: RuntimeError,
    pub trace: Vec<String>,
}

impl ExecutionError {
    pub fn new(error: RuntimeError) -> Self {
        Self {
            error,
            trace: Vec::new(),
        }
    }
}

impl From<RuntimeError> for ExecutionError {
    fn from(error: RuntimeError) -> Self {
        ExecutionError::new(error)
    }
}

fn render_trace(trace: &[String]) -> String {
    trace.iter().map(|loc| format!("\n\tat {}", loc)).collect()
}
