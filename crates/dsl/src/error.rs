//! Parse and evaluation errors

use std::path::PathBuf;

use simctl_foundation::Signal;
use thiserror::Error;

use crate::builtins::Arity;

/// Failure to turn source text into an expression tree
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("cannot read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}", .diagnostics.join("\n"))]
    Syntax { diagnostics: Vec<String> },
}

/// Failure while evaluating an expression tree.
///
/// Every variant maps to the [`Signal`] it escalates as; see [`EvalError::signal`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("{function} called with {found} argument(s); expected {expected}, as in {signature}")]
    Arity {
        function: String,
        signature: &'static str,
        expected: Arity,
        found: usize,
    },

    #[error("{context}: expected {expected}, found {found}")]
    Type {
        context: String,
        expected: &'static str,
        found: String,
    },

    #[error("{function}: result is not a finite number")]
    Domain { function: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("symbol '{0}' is protected")]
    Protected(String),

    #[error("recursion depth {0} exceeded")]
    RecursionLimit(usize),

    #[error("{signal} raised{}", with_reason(.reason))]
    Raised {
        signal: Signal,
        reason: Option<String>,
    },
}

fn with_reason(reason: &Option<String>) -> String {
    match reason {
        Some(reason) => format!(": {}", reason),
        None => String::new(),
    }
}

impl EvalError {
    /// Severity this error escalates as.
    pub fn signal(&self) -> Signal {
        match self {
            EvalError::Raised { signal, .. } => *signal,
            _ => Signal::Abort,
        }
    }

    /// Whether the error was raised explicitly by `Abort[]` or `Exit[]`.
    pub fn is_raised(&self) -> bool {
        matches!(self, EvalError::Raised { .. })
    }

    pub(crate) fn type_mismatch(
        context: impl Into<String>,
        expected: &'static str,
        found: &crate::value::Value,
    ) -> Self {
        EvalError::Type {
            context: context.into(),
            expected,
            found: found.type_name().to_string(),
        }
    }
}
