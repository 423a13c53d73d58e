use crate::bytecode::symbol_scope::SymbolScope;

#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: String,
    pub symbol_scope: SymbolScope,
    pub index: usize,
    /// Set once a local has been stored to. A closure capturing an
    /// unassigned local (a recursive function literal) needs the slot
    /// initialized first.
    pub is_assigned: bool,
}

impl Binding {
    pub fn new(name: &str, symbol_scope: SymbolScope, index: usize) -> Self {
        Self {
            name: name.to_string(),
            symbol_scope,
            index,
            is_assigned: false,
        }
    }

    pub fn mark_assigned(&mut self) {
        self.is_assigned = true;
    }
}
