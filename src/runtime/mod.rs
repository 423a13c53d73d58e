//! Values and the machinery that executes compiled programs.
//!
//! # Sharing
//! Every value is `Send + Sync`. Arrays, maps and captured-variable cells
//! are shared behind `Arc` with `parking_lot` locks, so a compiled program
//! can be read from one thread while another calls into it. Scripts cannot
//! build reference cycles through closures (a closure never captures
//! itself, only the cell of the variable it is assigned to), but a script
//! can still store a container inside itself; such values leak.
pub mod builtin_function;
pub mod builtins;
pub mod closure;
pub mod compiled_function;
pub mod error;
pub mod frame;
pub mod iterator;
pub mod marshal;
pub mod object;
pub mod operator;
pub mod value;
pub mod vm;
