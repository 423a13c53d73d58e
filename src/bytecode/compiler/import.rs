use std::{path::Path, sync::Arc};

use tracing::debug;

use crate::{
    bytecode::{
        compilation_scope::CompilationScope, op_code::OpCode, symbol_table::SymbolTable,
    },
    modules::Module,
    runtime::{compiled_function::CompiledFunction, value::Value},
    syntax::{parser::Parser, position::Position},
};

use super::{CompileResult, Compiler, SOURCE_FILE_EXT};

impl Compiler {
    /// `import("name")`: builtin modules become a map constant; source
    /// modules compile to a function that is called in place and evaluates
    /// to whatever the module exports.
    pub(super) fn compile_import(&mut self, name: &str) -> CompileResult<()> {
        if let Some(&index) = self.module_cache.get(name) {
            self.emit_module_call(index)?;
            return Ok(());
        }

        let module = self.modules.as_ref().and_then(|modules| modules.resolve(name));
        match module {
            Some(Module::Builtin(attributes)) => {
                let map = attributes
                    .iter()
                    .map(|(key, value)| (key.clone(), value.copy()))
                    .collect();
                self.emit_constant(Value::map(map))?;
                Ok(())
            }
            Some(Module::Source(source)) => {
                let index = self.compile_module(name, name, &source, None)?;
                self.module_cache.insert(name.to_string(), index);
                self.emit_module_call(index)?;
                Ok(())
            }
            None => self.compile_file_import(name),
        }
    }

    fn compile_file_import(&mut self, name: &str) -> CompileResult<()> {
        let Some(dir) = self.import_dir.clone() else {
            return Err(self.error(format!("module '{}' not found", name)));
        };

        let mut path = dir.join(name);
        if path.extension().is_none() {
            path.set_extension(SOURCE_FILE_EXT);
        }
        let read_error = |err: std::io::Error| {
            self.error(format!("module file read error: {}: {}", path.display(), err))
        };
        let path = std::fs::canonicalize(&path).map_err(read_error)?;
        let key = path.to_string_lossy().into_owned();
        if let Some(&index) = self.module_cache.get(&key) {
            self.emit_module_call(index)?;
            return Ok(());
        }

        let source = std::fs::read_to_string(&path).map_err(read_error)?;
        let module_dir = path.parent().map(Path::to_path_buf);
        let index = self.compile_module(&key, &key, &source, module_dir)?;
        self.module_cache.insert(key, index);
        self.emit_module_call(index)?;
        Ok(())
    }

    fn emit_module_call(&mut self, index: usize) -> CompileResult<()> {
        self.emit(OpCode::OpConstant, &[index])?;
        self.emit(OpCode::OpCall, &[0, 0])?;
        Ok(())
    }

    /// Compiles a module body into a function constant. Module top-level
    /// names are locals of that function; nothing from the importing file is
    /// visible inside it.
    fn compile_module(
        &mut self,
        key: &str,
        file: &str,
        source: &str,
        module_dir: Option<std::path::PathBuf>,
    ) -> CompileResult<usize> {
        if self.import_stack.iter().any(|entry| entry == key) {
            let mut chain = self.import_stack.clone();
            chain.push(key.to_string());
            return Err(self.error(format!("cyclic module import: {}", chain.join(" -> "))));
        }

        let program = Parser::parse_source(source, file)
            .map_err(|err| self.module_syntax_error(key, &err))?;
        debug!(module = key, "compiling module");

        let saved_table = std::mem::replace(
            &mut self.symbol_table,
            SymbolTable::new_enclosed(Self::root_symbol_table()),
        );
        let saved_file = std::mem::replace(&mut self.file, Arc::from(file));
        let saved_position = std::mem::replace(&mut self.position, Position::default());
        let saved_module_scope = self.module_scope;
        let saved_dir = match module_dir {
            Some(dir) if self.import_dir.is_some() => self.import_dir.replace(dir),
            _ => self.import_dir.clone(),
        };

        self.import_stack.push(key.to_string());
        self.scopes.push(CompilationScope::new());
        self.scope_index += 1;
        self.module_scope = Some(self.scope_index);

        let mut result = Ok(());
        for statement in &program.statements {
            result = self.compile_statement(statement);
            if result.is_err() {
                break;
            }
        }
        if result.is_ok() {
            result = self.emit(OpCode::OpReturn, &[]).map(|_| ());
        }

        let scope = self.scopes.pop().unwrap_or_default();
        self.scope_index -= 1;
        self.import_stack.pop();
        let module_table = std::mem::replace(&mut self.symbol_table, saved_table);
        let module_file = std::mem::replace(&mut self.file, saved_file);
        self.position = saved_position;
        self.module_scope = saved_module_scope;
        self.import_dir = saved_dir;
        result?;

        let function = CompiledFunction {
            instructions: scope.instructions,
            num_locals: module_table.max_symbols(),
            num_parameters: 0,
            variadic: false,
            file: module_file,
            source_map: scope.source_map,
        };
        Ok(self.add_constant(Value::Function(Arc::new(function))))
    }
}
