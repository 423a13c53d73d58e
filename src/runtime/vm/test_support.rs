use std::sync::Arc;

use crate::{
    bytecode::{compiler::Compiler, constant_pool::ConstantPool},
    runtime::{error::ExecutionError, value::Value},
    syntax::parser::Parser,
};

use super::{GLOBALS_SIZE, VM};

/// Compiles and runs `source` with the given globals predefined, returning
/// the final value of the global `out`.
pub(super) fn run_with(
    source: &str,
    vars: &[(&str, Value)],
    max_allocs: i64,
) -> Result<Value, ExecutionError> {
    let program = Parser::parse_source(source, "test").unwrap_or_else(|e| panic!("{}", e));
    let mut table = Compiler::root_symbol_table();
    let mut globals = vec![None; GLOBALS_SIZE];
    for (name, value) in vars {
        let binding = table.define(name);
        globals[binding.index] = Some(value.clone());
    }
    let out = table.define("out");

    let mut compiler = Compiler::new_with_state("test", table);
    compiler.compile(&program).unwrap_or_else(|e| panic!("{}", e));
    let (mut bytecode, _) = compiler.finish();
    bytecode.remove_duplicates();
    let constants = ConstantPool::new(bytecode.constants);

    let mut vm = VM::new(
        Arc::new(bytecode.main_function),
        &constants,
        &mut globals,
        max_allocs,
    );
    let result = vm.run();
    drop(vm);
    result?;
    Ok(globals[out.index].clone().unwrap_or_default())
}

pub(super) fn run(source: &str) -> Result<Value, ExecutionError> {
    run_with(source, &[], -1)
}

pub(super) fn run_ok(source: &str) -> Value {
    run(source).unwrap_or_else(|e| panic!("{}", e))
}

pub(super) fn run_err(source: &str) -> String {
    match run(source) {
        Ok(value) => panic!("expected runtime error, got {}", value),
        Err(err) => err.to_string(),
    }
}
