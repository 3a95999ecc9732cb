//! Lexical variable scopes for expression inference.
//!
//! One frame per function or lambda body. Lookups walk from the innermost
//! frame outward; popping a frame discards everything bound in it.

use crate::types::ValueType;
use pure_common::Name;
use rustc_hash::FxHashMap;

#[derive(Clone, Debug, Default)]
pub struct VariableScope {
    frames: Vec<FxHashMap<Name, ValueType>>,
}

impl VariableScope {
    pub fn new() -> Self {
        Self {
            frames: vec![FxHashMap::default()],
        }
    }

    pub fn push_frame(&mut self) {
        self.frames.push(FxHashMap::default());
    }

    pub fn pop_frame(&mut self) {
        // The root frame stays.
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Bind `name` in the innermost frame, shadowing outer bindings. Rebinding
    /// in the same frame replaces the previous type.
    pub fn bind(&mut self, name: Name, value_type: ValueType) {
        if self.frames.is_empty() {
            self.frames.push(FxHashMap::default());
        }
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name, value_type);
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&ValueType> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Run `f` inside a fresh frame.
    pub fn with_frame<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.push_frame();
        let result = f(self);
        self.pop_frame();
        result
    }
}

#[cfg(test)]
#[path = "../tests/scope_tests.rs"]
mod tests;
