use std::{collections::HashMap, path::PathBuf, sync::Arc};

use tracing::debug;

use crate::{
    bytecode::{
        bytecode::Bytecode,
        compilation_scope::CompilationScope,
        op_code::{OpCode, disassemble},
        symbol_table::SymbolTable,
    },
    modules::ModuleResolver,
    runtime::{builtins::BUILTINS, compiled_function::CompiledFunction, value::Value},
    syntax::{position::Position, program::Program},
    trace::TraceSink,
};

mod builder;
mod errors;
mod expression;
mod import;
mod statement;

pub use errors::CompileError;

pub(super) type CompileResult<T> = Result<T, CompileError>;

/// File extension appended to file imports that have none.
pub const SOURCE_FILE_EXT: &str = "rill";

pub struct Compiler {
    constants: Vec<Value>,
    pub symbol_table: SymbolTable,
    pub(super) scopes: Vec<CompilationScope>,
    pub(super) scope_index: usize,
    pub(super) file: Arc<str>,
    /// Position of the node being compiled; recorded for every emitted
    /// instruction.
    pub(super) position: Position,
    pub(super) modules: Option<Arc<dyn ModuleResolver>>,
    pub(super) import_dir: Option<PathBuf>,
    /// Compiled source modules by name, as constant indexes.
    pub(super) module_cache: HashMap<String, usize>,
    /// Modules currently being compiled, outermost first.
    pub(super) import_stack: Vec<String>,
    /// Scope index of the module body being compiled, if any.
    pub(super) module_scope: Option<usize>,
    trace: Option<TraceSink>,
}


impl Compiler {
    pub fn new(file: &str) -> Self {
        Self::new_with_state(file, Self::root_symbol_table())
    }

    /// Starts from a prepared global table, e.g. one with host variables
    /// already defined.
    pub fn new_with_state(file: &str, symbol_table: SymbolTable) -> Self {
        Self {
            constants: Vec::new(),
            symbol_table,
            scopes: vec![CompilationScope::new()],
            scope_index: 0,
            file: Arc::from(file),
            position: Position::default(),
            modules: None,
            import_dir: None,
            module_cache: HashMap::new(),
            import_stack: Vec::new(),
            module_scope: None,
            trace: None,
        }
    }

    /// A global table with every builtin function defined.
    pub fn root_symbol_table() -> SymbolTable {
        let mut symbol_table = SymbolTable::new();
        for (index, builtin) in BUILTINS.iter().enumerate() {
            symbol_table.define_builtin(index, builtin.name);
        }
        symbol_table
    }

    pub fn with_modules(mut self, modules: Option<Arc<dyn ModuleResolver>>) -> Self {
        self.modules = modules;
        self
    }

    /// Enables `import("path")` of source files relative to `dir`.
    pub fn with_import_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.import_dir = dir;
        self
    }

    pub fn with_trace(mut self, trace: Option<TraceSink>) -> Self {
        self.trace = trace;
        self
    }

    pub fn compile(&mut self, program: &Program) -> CompileResult<()> {
        for statement in &program.statements {
            self.compile_statement(statement)?;
        }
        self.emit(OpCode::OpSuspend, &[])?;

        debug!(
            file = %self.file,
            constants = self.constants.len(),
            globals = self.symbol_table.max_symbols(),
            "compiled program"
        );
        if let Some(trace) = &self.trace {
            trace.write_line(format_args!("Compiler Output:"));
            for line in disassemble(&self.current_scope().instructions).lines() {
                trace.write_line(format_args!("{}", line));
            }
        }
        Ok(())
    }

    /// Consumes the compiler, returning the bytecode and the global symbol
    /// table.
    pub fn finish(mut self) -> (Bytecode, SymbolTable) {
        let scope = self.scopes.swap_remove(0);
        let mut main_function = CompiledFunction::new(scope.instructions, 0, 0);
        main_function.file = self.file.clone();
        main_function.source_map = scope.source_map;
        let bytecode = Bytecode {
            main_function,
            constants: self.constants,
        };
        (bytecode, self.symbol_table)
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new("(main)")
    }
}
