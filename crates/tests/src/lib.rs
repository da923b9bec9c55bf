//! Integration test harness for simctl.
//!
//! Runs the controller end to end: configuration source on disk → parse →
//! simulation state → kernels → sink. Kernels are scripted so tests can
//! raise a signal at any iteration and phase, and record every phase call.

use std::cell::RefCell;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use simctl_foundation::{Phase, Signal};
use simctl_runtime::{Controller, Kernel, KernelFactory, MemorySink, Simulation, SinkConfig};
use tempfile::{NamedTempFile, TempDir};

/// Phase calls shared by every kernel one harness builds
#[derive(Debug, Default)]
pub struct KernelLog {
    pub built: usize,
    pub calls: Vec<(u64, Phase)>,
}

impl KernelLog {
    /// Iterations that ran at least one phase, in order.
    pub fn iterations(&self) -> Vec<u64> {
        let mut seen: Vec<u64> = self.calls.iter().map(|(i, _)| *i).collect();
        seen.dedup();
        seen
    }

    pub fn ran(&self, iteration: u64, phase: Phase) -> bool {
        self.calls.contains(&(iteration, phase))
    }
}

struct Scripted {
    raises: Rc<Vec<(u64, Phase, Signal)>>,
    log: Rc<RefCell<KernelLog>>,
}

impl Scripted {
    fn step(&mut self, phase: Phase, sim: &mut Simulation) -> Result<(), Signal> {
        let iteration = sim.current_iteration();
        self.log.borrow_mut().calls.push((iteration, phase));
        match self
            .raises
            .iter()
            .find(|(at, p, _)| *at == iteration && *p == phase)
        {
            Some((_, _, signal)) => Err(*signal),
            None => Ok(()),
        }
    }
}

impl Kernel for Scripted {
    fn initialize(&mut self, sim: &mut Simulation) -> Result<(), Signal> {
        self.step(Phase::Initialize, sim)
    }

    fn execute(&mut self, sim: &mut Simulation) -> Result<(), Signal> {
        self.step(Phase::Execute, sim)
    }

    fn finalize(&mut self, sim: &mut Simulation) -> Result<(), Signal> {
        self.step(Phase::Finalize, sim)
    }
}

/// Test harness for running simulations from expression-language source.
pub struct TestHarness {
    config: Option<NamedTempFile>,
    raises: Vec<(u64, Phase, Signal)>,
    scripted: bool,
    sink: Rc<RefCell<MemorySink>>,
    log: Rc<RefCell<KernelLog>>,
}

impl TestHarness {
    /// Harness whose configuration source holds `source`.
    ///
    /// # Panics
    ///
    /// Panics if the temporary configuration file cannot be written.
    pub fn from_source(source: &str) -> Self {
        let mut file = NamedTempFile::new().expect("create config file");
        file.write_all(source.as_bytes())
            .expect("write config file");
        Self {
            config: Some(file),
            ..Self::without_config()
        }
    }

    /// Harness that runs without any configuration source.
    pub fn without_config() -> Self {
        Self {
            config: None,
            raises: Vec::new(),
            scripted: true,
            sink: MemorySink::new().shared(),
            log: Rc::new(RefCell::new(KernelLog::default())),
        }
    }

    /// Raise `signal` from `phase` of `iteration`.
    pub fn raise_at(mut self, iteration: u64, phase: Phase, signal: Signal) -> Self {
        self.raises.push((iteration, phase, signal));
        self
    }

    /// Use the configuration-driven kernel instead of the scripted one.
    pub fn with_script_kernel(mut self) -> Self {
        self.scripted = false;
        self
    }

    /// Use a sink whose initialization fails.
    pub fn with_failing_sink(mut self) -> Self {
        self.sink = MemorySink::failing().shared();
        self
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config.as_ref().map(NamedTempFile::path)
    }

    fn controller(&self) -> Controller {
        let controller = Controller::new(self.sink.clone(), SinkConfig::default());
        if !self.scripted {
            return controller;
        }

        let raises = Rc::new(self.raises.clone());
        let log = self.log.clone();
        let kernels: KernelFactory = Box::new(move || {
            log.borrow_mut().built += 1;
            Box::new(Scripted {
                raises: raises.clone(),
                log: log.clone(),
            }) as Box<dyn Kernel>
        });
        controller.with_kernels(kernels)
    }

    /// Batch run over the configuration source.
    pub fn run(&self) -> Signal {
        self.controller().simulate(self.config_path())
    }

    /// Batch run over an arbitrary path.
    pub fn run_path(&self, path: &Path) -> Signal {
        self.controller().simulate(Some(path))
    }

    /// Interactive session over `input`, returning the signal and stdout text.
    pub fn online(&self, input: &str) -> (Signal, String) {
        let mut output = Vec::new();
        let signal = self
            .controller()
            .simulate_online(input.as_bytes(), &mut output);
        (signal, String::from_utf8_lossy(&output).into_owned())
    }

    pub fn sink(&self) -> std::cell::Ref<'_, MemorySink> {
        self.sink.borrow()
    }

    pub fn kernels(&self) -> std::cell::Ref<'_, KernelLog> {
        self.log.borrow()
    }

    /// Sink messages, in order.
    pub fn messages(&self) -> Vec<String> {
        self.sink().texts().into_iter().map(str::to_string).collect()
    }

    /// Iteration progress lines only.
    pub fn progress(&self) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|m| m.contains("iteration") || m.contains("aborted"))
            .collect()
    }
}

/// Scratch directory with a path inside it that does not exist.
pub fn missing_path() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("missing.sim");
    (dir, path)
}
