use std::collections::HashMap;

use crate::bytecode::{binding::Binding, symbol_scope::SymbolScope};

/// Lexical scope chain used by the compiler.
///
/// A function table starts a new index space for locals. A block table
/// (`if`, `for`, bare `{}`) shares the index space of its enclosing function
/// and hands its slots back when it closes, so sibling blocks reuse them.
/// Blocks at the top level define globals, which are never reused.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    pub outer: Option<Box<SymbolTable>>,
    store: HashMap<String, Binding>,
    block: bool,
    num_definitions: usize,
    max_definitions: usize,
    pub free_symbols: Vec<Binding>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_enclosed(outer: SymbolTable) -> Self {
        Self {
            outer: Some(Box::new(outer)),
            ..Self::default()
        }
    }

    pub fn new_block(outer: SymbolTable) -> Self {
        Self {
            outer: Some(Box::new(outer)),
            block: true,
            ..Self::default()
        }
    }

    pub fn is_block(&self) -> bool {
        self.block
    }

    pub fn define(&mut self, name: &str) -> Binding {
        let index = self.next_index();
        let scope = if self.is_global_level() {
            SymbolScope::Global
        } else {
            SymbolScope::Local
        };

        if scope == SymbolScope::Global && self.block {
            self.count_root_definition();
        } else {
            self.num_definitions += 1;
        }

        let binding = Binding::new(name, scope, index);
        self.store.insert(name.to_string(), binding.clone());
        self.update_max_definitions(index + 1);
        binding
    }

    /// Defines a function parameter; parameters start out assigned.
    pub fn define_parameter(&mut self, name: &str) -> Binding {
        let mut binding = self.define(name);
        binding.mark_assigned();
        self.store.insert(name.to_string(), binding.clone());
        binding
    }

    pub fn define_builtin(&mut self, index: usize, name: &str) -> Binding {
        let binding = Binding::new(name, SymbolScope::Builtin, index);
        self.store.insert(name.to_string(), binding.clone());
        binding
    }

    /// True when `name` is already a variable of this exact block.
    /// Builtins and captured names may be shadowed.
    pub fn exists_in_current_scope(&self, name: &str) -> bool {
        self.store.get(name).is_some_and(|binding| {
            matches!(binding.symbol_scope, SymbolScope::Global | SymbolScope::Local)
        })
    }

    pub fn resolve(&mut self, name: &str) -> Option<Binding> {
        self.resolve_inner(name, false)
    }

    fn resolve_inner(&mut self, name: &str, recur: bool) -> Option<Binding> {
        if let Some(binding) = self.store.get(name)
            && (binding.symbol_scope != SymbolScope::Local || binding.is_assigned || recur)
        {
            return Some(binding.clone());
        }

        let outer = self.outer.as_mut()?;
        let binding = outer.resolve_inner(name, true)?;

        match binding.symbol_scope {
            SymbolScope::Local | SymbolScope::Free if !self.block => Some(self.define_free(binding)),
            _ => Some(binding),
        }
    }

    /// Marks the nearest local named `name` in the current function as
    /// assigned. Returns whether it already was, or `None` when no such
    /// local is visible without crossing a function boundary.
    pub fn mark_assigned(&mut self, name: &str) -> Option<bool> {
        if let Some(binding) = self.store.get_mut(name)
            && binding.symbol_scope == SymbolScope::Local
        {
            let was_assigned = binding.is_assigned;
            binding.mark_assigned();
            return Some(was_assigned);
        }
        if self.block {
            return self.outer.as_mut()?.mark_assigned(name);
        }
        None
    }

    /// Number of slots needed: locals for a function table, globals for the
    /// root table.
    pub fn max_symbols(&self) -> usize {
        self.max_definitions
    }

    /// Names of the globals defined directly in this table.
    pub fn names(&self) -> Vec<String> {
        self.store
            .values()
            .filter(|b| b.symbol_scope == SymbolScope::Global)
            .map(|b| b.name.clone())
            .collect()
    }

    /// Global bindings of this table as `(name, index)` pairs.
    pub fn global_definitions(&self) -> Vec<(String, usize)> {
        self.store
            .values()
            .filter(|b| b.symbol_scope == SymbolScope::Global)
            .map(|b| (b.name.clone(), b.index))
            .collect()
    }

    pub fn define_free(&mut self, original: Binding) -> Binding {
        self.free_symbols.push(original.clone());
        let mut binding = Binding::new(
            &original.name,
            SymbolScope::Free,
            self.free_symbols.len() - 1,
        );
        binding.mark_assigned();
        self.store.insert(binding.name.clone(), binding.clone());
        binding
    }

    fn next_index(&self) -> usize {
        match (&self.outer, self.block) {
            (Some(outer), true) => outer.next_index() + self.num_definitions,
            _ => self.num_definitions,
        }
    }

    fn is_global_level(&self) -> bool {
        match (&self.outer, self.block) {
            (Some(outer), true) => outer.is_global_level(),
            (outer, _) => outer.is_none(),
        }
    }

    fn count_root_definition(&mut self) {
        match self.outer.as_mut() {
            Some(outer) => outer.count_root_definition(),
            None => self.num_definitions += 1,
        }
    }

    fn update_max_definitions(&mut self, count: usize) {
        if count > self.max_definitions {
            self.max_definitions = count;
        }
        if self.block
            && let Some(outer) = self.outer.as_mut()
        {
            outer.update_max_definitions(count);
        }
    }
}
