//! Named modules that scripts load with `import("name")`.
use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use crate::runtime::value::Value;

/// A module a resolver can hand to the compiler.
#[derive(Debug, Clone)]
pub enum Module {
    /// Script source, compiled once per compilation that imports it.
    Source(Arc<str>),
    /// Attributes exposed to scripts as an immutable-by-copy map.
    Builtin(Arc<BTreeMap<String, Value>>),
}

/// Looks modules up by import name. Names it does not know fall through to
/// file imports when those are enabled.
pub trait ModuleResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Option<Module>;
}

/// In-memory module registry.
#[derive(Debug, Clone, Default)]
pub struct ModuleMap {
    modules: HashMap<String, Module>,
}

impl ModuleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, module: Module) {
        self.modules.insert(name.into(), module);
    }

    pub fn add_source_module(&mut self, name: impl Into<String>, source: impl Into<Arc<str>>) {
        self.add(name, Module::Source(source.into()));
    }

    pub fn add_builtin_module(&mut self, name: impl Into<String>, attributes: BTreeMap<String, Value>) {
        self.add(name, Module::Builtin(Arc::new(attributes)));
    }

    pub fn remove(&mut self, name: &str) -> Option<Module> {
        self.modules.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Module> {
        self.modules.get(name)
    }

    /// Adds every module of `other`, replacing same-named entries.
    pub fn merge(&mut self, other: &ModuleMap) {
        for (name, module) in &other.modules {
            self.modules.insert(name.clone(), module.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.modules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl ModuleResolver for ModuleMap {
    fn resolve(&self, name: &str) -> Option<Module> {
        self.get(name).cloned()
    }
}
