use std::{
    collections::{BTreeMap, HashMap},
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};

use tracing::debug;

use crate::{
    bytecode::{compiler::Compiler, constant_pool::ConstantPool, symbol_table::SymbolTable},
    compiled::Compiled,
    context::{Context, run_vm},
    error::Error,
    modules::ModuleResolver,
    runtime::{
        marshal::HostValue,
        value::Value,
        vm::{GLOBALS_SIZE, VM},
    },
    syntax::parser::Parser,
    trace::TraceSink,
    variable::Variable,
};

/// Global reserved for the results of host calls into a compiled program.
pub const RESERVED_VAR: &str = "$out";

/// File name used for the main source in diagnostics.
pub const MAIN_FILE: &str = "(main)";

/// Source text plus everything needed to compile and bootstrap it.
///
/// ```
/// use rill::Script;
///
/// let mut script = Script::new("total := a + b");
/// script.add("a", 2).unwrap();
/// script.add("b", 3).unwrap();
/// let compiled = script.compile_run().unwrap();
/// assert_eq!(compiled.get("total").int(), 5);
/// ```
pub struct Script {
    source: String,
    variables: BTreeMap<String, Variable>,
    modules: Option<Arc<dyn ModuleResolver>>,
    import_dir: Option<PathBuf>,
    max_allocs: i64,
    trace: Option<TraceSink>,
}

impl Script {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            variables: BTreeMap::new(),
            modules: None,
            import_dir: None,
            max_allocs: -1,
            trace: None,
        }
    }

    /// Adds a global visible to the script, replacing any pending value of
    /// the same name.
    pub fn add(&mut self, name: &str, value: impl Into<HostValue>) -> Result<(), Error> {
        if name == RESERVED_VAR {
            return Err(Error::ReservedName(name.to_string()));
        }
        let variable = Variable::new(name, value)?;
        self.variables.insert(name.to_string(), variable);
        Ok(())
    }

    /// Returns false when no variable of that name was added.
    pub fn remove(&mut self, name: &str) -> bool {
        if name == RESERVED_VAR {
            return false;
        }
        self.variables.remove(name).is_some()
    }

    pub fn set_imports(&mut self, resolver: impl ModuleResolver + 'static) -> &mut Self {
        self.modules = Some(Arc::new(resolver));
        self
    }

    /// Without a resolver only file imports can succeed.
    pub fn clear_imports(&mut self) -> &mut Self {
        self.modules = None;
        self
    }

    /// Root directory for file imports. Stored as an absolute path.
    pub fn set_import_dir(&mut self, dir: impl AsRef<Path>) -> Result<(), Error> {
        self.import_dir = Some(std::path::absolute(dir)?);
        Ok(())
    }

    /// Maximum number of allocations per run; negative means unlimited.
    pub fn set_max_allocs(&mut self, max_allocs: i64) -> &mut Self {
        self.max_allocs = max_allocs;
        self
    }

    /// Sends the compiled disassembly and an instruction trace of every run
    /// to `writer`.
    pub fn set_trace(&mut self, writer: impl Write + Send + 'static) -> &mut Self {
        self.trace = Some(TraceSink::new(writer));
        self
    }

    /// Compiles the source and runs it once to populate its globals.
    pub fn compile_run(&self) -> Result<Compiled, Error> {
        self.compile(None)
    }

    pub fn compile_run_with_context(&self, ctx: &Context) -> Result<Compiled, Error> {
        self.compile(Some(ctx))
    }

    fn compile(&self, ctx: Option<&Context>) -> Result<Compiled, Error> {
        let (mut symbol_table, mut globals) = self.prep_compile()?;

        let program = Parser::parse_source(&self.source, MAIN_FILE)?;

        let out = symbol_table.define(RESERVED_VAR);
        globals[out.index] = Some(Value::Undefined);

        let import_dir = self
            .import_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        let mut compiler = Compiler::new_with_state(MAIN_FILE, symbol_table)
            .with_modules(self.modules.clone())
            .with_import_dir(Some(import_dir))
            .with_trace(self.trace.clone());
        compiler.compile(&program)?;
        let (mut bytecode, symbol_table) = compiler.finish();
        if symbol_table.max_symbols() > GLOBALS_SIZE {
            return Err(too_many_globals(symbol_table.max_symbols()));
        }

        globals.truncate(symbol_table.max_symbols() + 1);
        let indexes: HashMap<String, usize> =
            symbol_table.global_definitions().into_iter().collect();

        bytecode.remove_duplicates();
        let constants = ConstantPool::new(bytecode.constants);
        let entry = Arc::new(bytecode.main_function);

        debug!(
            globals = globals.len(),
            constants = constants.len(),
            "bootstrapping script"
        );
        let mut vm = VM::new(entry.clone(), &constants, &mut globals, self.max_allocs);
        vm.set_trace(self.trace.clone());
        run_vm(&mut vm, ctx)?;
        drop(vm);

        Ok(Compiled::new(
            globals,
            Arc::new(indexes),
            constants,
            entry,
            out.index,
            self.max_allocs,
            self.trace.clone(),
        ))
    }

    /// Defines every host variable, in name order, as a global. One slot
    /// stays free for the output variable.
    fn prep_compile(&self) -> Result<(SymbolTable, Vec<Option<Value>>), Error> {
        if self.variables.len() >= GLOBALS_SIZE {
            return Err(too_many_globals(self.variables.len() + 1));
        }
        let mut symbol_table = Compiler::root_symbol_table();
        let mut globals = vec![None; GLOBALS_SIZE];

        for (index, (name, variable)) in self.variables.iter().enumerate() {
            let binding = symbol_table.define(name);
            assert_eq!(
                binding.index, index,
                "wrong symbol index for global '{}'",
                name
            );
            globals[binding.index] = Some(variable.object().copy());
        }
        Ok((symbol_table, globals))
    }
}

fn too_many_globals(got: usize) -> Error {
    Error::LimitExceeded {
        what: "global variables",
        max: GLOBALS_SIZE,
        got,
    }
}
