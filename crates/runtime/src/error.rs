//! Runtime errors

use simctl_dsl::EvalError;
use thiserror::Error;

/// Simulation state rejected its configuration tree
#[derive(Debug, Error)]
pub enum InitError {
    #[error("configuration evaluation failed: {0}")]
    Evaluation(#[from] EvalError),

    #[error("Iterations must be a non-negative integer, found {found}")]
    InvalidIterations { found: String },
}
