use std::sync::Arc;

use crate::runtime::{compiled_function::CompiledFunction, value::Upvalue};

/// A compiled function plus the cells it captured. Cells are shared with the
/// frame that created them, so writes from either side are visible to both.
#[derive(Debug)]
pub struct Closure {
    pub function: Arc<CompiledFunction>,
    pub free: Vec<Upvalue>,
}

impl Closure {
    pub fn new(function: Arc<CompiledFunction>, free: Vec<Upvalue>) -> Self {
        Self { function, free }
    }
}
