//! Binding scope
//!
//! Maps names to either an immediate value (`x = expr`) or a delayed
//! expression re-evaluated on every read (`x := expr`). Insertion order is
//! kept so listings are stable.

use indexmap::IndexMap;

use crate::ast::Expr;
use crate::value::Value;

/// A single binding
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    /// Value computed at assignment time
    Value(Value),
    /// Expression evaluated at each read
    Delayed(Expr),
}

/// Name to binding environment
#[derive(Debug, Clone, Default)]
pub struct Scope {
    bindings: IndexMap<String, Binding>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    /// Immediate value of a binding; delayed bindings are not evaluated here.
    pub fn value(&self, name: &str) -> Option<&Value> {
        match self.bindings.get(name) {
            Some(Binding::Value(v)) => Some(v),
            _ => None,
        }
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), Binding::Value(value));
    }

    pub fn set_delayed(&mut self, name: impl Into<String>, expr: Expr) {
        self.bindings.insert(name.into(), Binding::Delayed(expr));
    }

    /// Remove a binding, returning whether one existed.
    pub fn clear(&mut self, name: &str) -> bool {
        self.bindings.shift_remove(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }
}
