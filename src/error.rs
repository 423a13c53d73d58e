use thiserror::Error;

use crate::{
    bytecode::compiler::CompileError, context::ContextError, runtime::error::ExecutionError,
    syntax::error::SyntaxError,
};

/// Errors returned by the host-facing API.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Runtime(#[from] ExecutionError),
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error("not callable: {0}")]
    NotCallable(String),
    #[error("callable is undefined")]
    NilCallable,
    #[error("'{0}' not found")]
    NotFound(String),
    #[error("'{0}' is not defined")]
    NotDefined(String),
    #[error("unsupported type: {0}")]
    UnsupportedType(String),
    #[error("'{0}' is a reserved name")]
    ReservedName(String),
    #[error("callback is not bound to a compiled program")]
    NotBound,
    #[error("too many arguments: max={max}, got={got}")]
    TooManyArguments { max: usize, got: usize },
    #[error("too many {what}: max={max}, got={got}")]
    LimitExceeded {
        what: &'static str,
        max: usize,
        got: usize,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True when the run was stopped by its context rather than failing.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Error::Context(_))
    }
}
