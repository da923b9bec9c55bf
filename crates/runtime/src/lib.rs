//! Simctl Runtime
//!
//! Drives kernels through iterations and evaluates interactive commands.
//! The [`Controller`] owns one [`Simulation`] and one [`MessageSink`] handle
//! per run, and turns raised [`Signal`]s into continue/skip/stop decisions.

pub mod controller;
pub mod error;
pub mod input;
pub mod kernel;
pub mod simulation;
pub mod sink;

pub use controller::Controller;
pub use error::InitError;
pub use kernel::{Kernel, KernelFactory, ScriptKernel};
pub use simctl_foundation::{Phase, Signal};
pub use simulation::Simulation;
pub use sink::{LogSink, MemorySink, MessageSink, SharedSink, SinkConfig};
