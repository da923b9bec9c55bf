//! Simulation state
//!
//! Owns the binding scope and the iteration counter for one run. The run's
//! parameters live in the scope under reserved names:
//!
//! - `Iterations`: total iteration count, read once by [`Simulation::initialize`]
//!   (defaults to 1 when unbound)
//! - `Continue`: optional predicate checked before each iteration
//! - `Iteration`: current 1-based index, written by [`Simulation::advance`]

use simctl_dsl::{Context, Engine, EvalError, Expr, Scope, Value};
use simctl_foundation::Signal;
use tracing::{debug, trace, warn};

use crate::error::InitError;
use crate::sink::SharedSink;

pub const ITERATIONS: &str = "Iterations";
pub const CONTINUE: &str = "Continue";
pub const ITERATION: &str = "Iteration";

/// Mutable state of a single run
#[derive(Default)]
pub struct Simulation {
    scope: Scope,
    engine: Engine,
    iteration: u64,
    iterations: u64,
    sink: Option<SharedSink>,
    capture: bool,
    output: Vec<String>,
}

impl Simulation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_engine(engine: Engine) -> Self {
        Self {
            engine,
            ..Self::default()
        }
    }

    /// Attach the sink messages are reported to. The simulation shares it
    /// with the controller and never closes it.
    pub fn bind_sink(&mut self, sink: SharedSink) {
        self.sink = Some(sink);
    }

    /// Evaluate a configuration tree into the scope and read the iteration count.
    pub fn initialize(&mut self, tree: &Expr) -> Result<(), InitError> {
        self.iteration = 0;
        self.iterations = 0;
        self.scope.set(ITERATION, Value::Number(0.0));

        let engine = self.engine.clone();
        engine.evaluate(tree, self)?;

        self.iterations = if self.scope.contains(ITERATIONS) {
            let value = engine.evaluate(&Expr::symbol(ITERATIONS), self)?;
            value.as_count().ok_or_else(|| InitError::InvalidIterations {
                found: value.to_string(),
            })?
        } else {
            1
        };

        debug!(
            iterations = self.iterations,
            bindings = ?self.scope.names().collect::<Vec<_>>(),
            "simulation initialized"
        );
        Ok(())
    }

    /// Move to the next iteration.
    ///
    /// Returns `Ok(false)` once every iteration has run, or when `Continue`
    /// is bound and does not evaluate to `True`. The predicate sees the index
    /// of the iteration that just finished. A signal raised by the predicate
    /// is returned to the caller after being reported.
    pub fn advance(&mut self) -> Result<bool, Signal> {
        if self.iteration >= self.iterations {
            return Ok(false);
        }

        if self.scope.contains(CONTINUE) {
            match self.evaluate(&Expr::symbol(CONTINUE)) {
                Ok(Value::Bool(true)) => {}
                Ok(value) => {
                    debug!(iteration = self.iteration, %value, "continuation predicate ended the run");
                    return Ok(false);
                }
                Err(signal) => {
                    warn!(iteration = self.iteration, %signal, "continuation predicate raised");
                    return Err(signal);
                }
            }
        }

        self.iteration += 1;
        self.scope
            .set(ITERATION, Value::Number(self.iteration as f64));
        trace!(iteration = self.iteration, "advanced");
        Ok(true)
    }

    pub fn current_iteration(&self) -> u64 {
        self.iteration
    }

    pub fn iteration_count(&self) -> u64 {
        self.iterations
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn scope_mut(&mut self) -> &mut Scope {
        &mut self.scope
    }

    /// Evaluate against the scope, translating failures into a [`Signal`].
    ///
    /// Errors are reported to the sink where they are detected. An explicit
    /// `Abort[]`/`Exit[]` is reported only when it carries a reason.
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value, Signal> {
        let engine = self.engine.clone();
        match engine.evaluate(expr, self) {
            Ok(value) => Ok(value),
            Err(err) => {
                let signal = err.signal();
                debug!(error = %err, %signal, "evaluation failed");
                match &err {
                    EvalError::Raised {
                        reason: Some(reason),
                        ..
                    } => self.message_with(reason, signal),
                    EvalError::Raised { reason: None, .. } => {}
                    other => self.message_with(&other.to_string(), signal),
                }
                Err(signal)
            }
        }
    }

    /// Evaluate a named binding, or `None` when it is unbound.
    pub fn evaluate_binding(&mut self, name: &str) -> Result<Option<Value>, Signal> {
        if !self.scope.contains(name) {
            return Ok(None);
        }
        self.evaluate(&Expr::symbol(name)).map(Some)
    }

    pub fn message(&self, text: &str) {
        match &self.sink {
            Some(sink) => sink.borrow_mut().message(text),
            None => debug!(text, "message without sink"),
        }
    }

    pub fn message_with(&self, text: &str, signal: Signal) {
        match &self.sink {
            Some(sink) => sink.borrow_mut().message_with(text, signal),
            None => debug!(text, %signal, "message without sink"),
        }
    }

    /// Keep `Print` output for the caller instead of sending it to the sink.
    pub fn set_capture_output(&mut self, capture: bool) {
        self.capture = capture;
    }

    /// Drain captured `Print` lines.
    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }
}

impl Context for Simulation {
    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn scope_mut(&mut self) -> &mut Scope {
        &mut self.scope
    }

    fn print(&mut self, text: &str) {
        if self.capture {
            self.output.push(text.to_string());
        } else {
            self.message(text);
        }
    }
}
