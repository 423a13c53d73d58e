use std::sync::Arc;

use crate::runtime::value::{CopyState, Value};

/// Constants of a compiled program.
///
/// Host calls
/// need a few extra slots for their callable and arguments; those live in a
/// scratch area that a [`PoolTransaction`] truncates again when dropped, so
/// repeated calls never grow the pool.
#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    base: Arc<[Value]>,
    scratch: Vec<Value>,
}

impl ConstantPool {
    pub fn new(constants: Vec<Value>) -> Self {
        Self {
            base: constants.into(),
            scratch: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.base.len() + self.scratch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        match index.checked_sub(self.base.len()) {
            None => self.base.get(index),
            Some(offset) => self.scratch.get(offset),
        }
    }

    pub fn base(&self) -> &[Value] {
        &self.base
    }

    /// Deep copy of the base constants, for an independent program clone.
    /// Builtin module maps are the only mutable constants.
    pub fn copy_with(&self, state: &mut CopyState) -> Self {
        Self {
            base: self.base.iter().map(|v| v.copy_with(state)).collect(),
            scratch: Vec::new(),
        }
    }

    /// Starts a scoped set of temporary constants.
    pub fn begin(&mut self) -> PoolTransaction<'_> {
        let mark = self.scratch.len();
        PoolTransaction { pool: self, mark }
    }
}

/// Temporary constants appended for one host call. Dropping the transaction
/// removes them and releases what they referenced.
pub struct PoolTransaction<'a> {
    pool: &'a mut ConstantPool,
    mark: usize,
}

impl PoolTransaction<'_> {
    /// Appends a constant and returns its index.
    pub fn push(&mut self, value: Value) -> usize {
        self.pool.scratch.push(value);
        self.pool.len() - 1
    }

    pub fn pool(&self) -> &ConstantPool {
        self.pool
    }
}

impl Drop for PoolTransaction<'_> {
    fn drop(&mut self) {
        self.pool.scratch.truncate(self.mark);
    }
}
