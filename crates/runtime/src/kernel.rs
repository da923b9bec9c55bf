//! Kernels
//!
//! A kernel is the unit of computation run once per iteration. The
//! controller builds a fresh instance from a [`KernelFactory`] for every
//! iteration and drives it through [`Phase::ALL`] in order, stopping at the
//! first raised [`Signal`].

use simctl_foundation::{Phase, Signal};
use tracing::trace;

use crate::simulation::Simulation;

/// Builds one kernel instance per iteration
pub type KernelFactory = Box<dyn Fn() -> Box<dyn Kernel>>;

/// Three-phase computation over a [`Simulation`]
pub trait Kernel {
    fn initialize(&mut self, _sim: &mut Simulation) -> Result<(), Signal> {
        Ok(())
    }

    fn execute(&mut self, sim: &mut Simulation) -> Result<(), Signal>;

    fn finalize(&mut self, _sim: &mut Simulation) -> Result<(), Signal> {
        Ok(())
    }

    /// Dispatch a single phase.
    fn run_phase(&mut self, phase: Phase, sim: &mut Simulation) -> Result<(), Signal> {
        trace!(%phase, iteration = sim.current_iteration(), "kernel phase");
        match phase {
            Phase::Initialize => self.initialize(sim),
            Phase::Execute => self.execute(sim),
            Phase::Finalize => self.finalize(sim),
        }
    }
}

/// Factory for any default-constructible kernel.
pub fn factory<K: Kernel + Default + 'static>() -> KernelFactory {
    Box::new(|| Box::new(K::default()) as Box<dyn Kernel>)
}

/// Kernel driven by the configuration itself.
///
/// Each phase evaluates the scope binding of the same name (`Initialize`,
/// `Execute`, `Finalize`); an unbound phase does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScriptKernel;

impl ScriptKernel {
    fn run_binding(phase: Phase, sim: &mut Simulation) -> Result<(), Signal> {
        sim.evaluate_binding(phase.name()).map(|_| ())
    }
}

impl Kernel for ScriptKernel {
    fn initialize(&mut self, sim: &mut Simulation) -> Result<(), Signal> {
        Self::run_binding(Phase::Initialize, sim)
    }

    fn execute(&mut self, sim: &mut Simulation) -> Result<(), Signal> {
        Self::run_binding(Phase::Execute, sim)
    }

    fn finalize(&mut self, sim: &mut Simulation) -> Result<(), Signal> {
        Self::run_binding(Phase::Finalize, sim)
    }
}
