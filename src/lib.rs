//! Embeddable scripting runtime.
//!
//! A [`Script`] is compiled and run once to populate its globals. The
//! resulting [`Compiled`] program can then be read, updated and called into
//! from any number of host threads.
//!
//! ```
//! use rill::{HostValue, Script};
//!
//! let script = Script::new("double := func(x) { return x * 2 }");
//! let compiled = script.compile_run().unwrap();
//! let result = compiled.call_by_name("double", &[HostValue::from(21)]).unwrap();
//! assert_eq!(result, HostValue::Int(42));
//! ```
pub mod bytecode;
pub mod callback;
pub mod compiled;
pub mod context;
pub mod error;
pub mod modules;
pub mod runtime;
pub mod script;
pub mod stdlib;
pub mod syntax;
pub mod trace;
pub mod variable;

pub use callback::Callback;
pub use compiled::Compiled;
pub use context::{CancelHandle, Context, ContextError};
pub use error::Error;
pub use modules::{Module, ModuleMap, ModuleResolver};
pub use runtime::{
    error::{ExecutionError, RuntimeError},
    marshal::HostValue,
    object::Object,
    operator::BinaryOperator,
    value::Value,
};
pub use script::Script;
pub use trace::TraceSink;
