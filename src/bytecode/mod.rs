pub mod binding;
#[allow(clippy::module_inception)]
pub mod bytecode;
pub mod compilation_scope;
pub mod compiler;
pub mod constant_pool;
pub mod op_code;
pub mod symbol_scope;
pub mod symbol_table;
