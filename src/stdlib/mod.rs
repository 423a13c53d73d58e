//! Modules bundled with the runtime. Nothing is importable until the host
//! registers it, usually with [`module_map`].
use crate::modules::ModuleMap;

mod math;
mod text;

const FUNCTOOLS: &str = include_str!("functools.rill");
const OPERATOR: &str = include_str!("operator.rill");

const MODULE_NAMES: &[&str] = &["functools", "math", "operator", "text"];

pub fn all_module_names() -> Vec<&'static str> {
    MODULE_NAMES.to_vec()
}

/// Module map holding the named bundled modules. Unknown names are skipped.
pub fn module_map(names: &[&str]) -> ModuleMap {
    let mut modules = ModuleMap::new();
    for name in names {
        match *name {
            "math" => modules.add_builtin_module("math", math::module()),
            "text" => modules.add_builtin_module("text", text::module()),
            "functools" => modules.add_source_module("functools", FUNCTOOLS),
            "operator" => modules.add_source_module("operator", OPERATOR),
            other => tracing::debug!(module = other, "unknown stdlib module"),
        }
    }
    modules
}
