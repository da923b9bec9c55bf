//! Simctl DSL
//!
//! The embedded expression language used for run configuration and for the
//! interactive evaluate loop. Sources are parsed into an immutable [`Expr`]
//! tree and evaluated against a mutable [`Scope`] through a [`Context`].

pub mod ast;
pub mod builtins;
pub mod error;
pub mod eval;
pub mod parser;
pub mod scope;
pub mod value;

use std::path::Path;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use error::{EvalError, ParseError};
pub use eval::{Context, DEFAULT_MAX_DEPTH};
pub use scope::{Binding, Scope};
pub use value::Value;

/// Parser and evaluator front end.
///
/// Holds evaluation limits; parsing itself is stateless.
#[derive(Debug, Clone)]
pub struct Engine {
    max_depth: usize,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration source from disk.
    pub fn parse_source(&self, path: &Path) -> Result<Expr, ParseError> {
        parser::parse_file(path)
    }

    /// Parse a single command or inline source.
    pub fn parse_text(&self, text: &str) -> Result<Expr, ParseError> {
        parser::parse(text)
    }

    /// Evaluate a tree against the context's scope.
    pub fn evaluate(&self, expr: &Expr, ctx: &mut dyn Context) -> Result<Value, EvalError> {
        eval::evaluate_with_limit(expr, ctx, self.max_depth)
    }
}
