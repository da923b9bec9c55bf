//! Run controller
//!
//! Drives a [`Simulation`] either through a batch of iterations sourced from
//! a configuration file, or through an interactive evaluate loop. Kernels
//! and evaluation report failures as a raised [`Signal`]:
//!
//! - `Abort` ends the current unit (iteration or command) and the run goes on
//! - `Exit`, or any other raised signal in batch mode, ends the run
//!
//! The sink is closed before either entry point returns.

use std::io::{self, BufRead, Write};
use std::path::Path;

use simctl_dsl::{Engine, Expr};
use simctl_foundation::{Phase, Signal};
use tracing::{debug, error, info, instrument, warn};

use crate::input::Tokens;
use crate::kernel::{factory, KernelFactory, ScriptKernel};
use crate::simulation::Simulation;
use crate::sink::{SharedSink, SinkConfig};

/// Token that ends the interactive loop, along with `q`
const QUIT: &str = "Quit[]";

fn is_quit(token: &str) -> bool {
    token == QUIT || token == "q"
}

/// Owns the state of one run at a time
pub struct Controller {
    sink: SharedSink,
    sink_config: SinkConfig,
    engine: Engine,
    kernels: KernelFactory,
    sim: Simulation,
}

impl Controller {
    /// Controller running [`ScriptKernel`] with the default engine.
    pub fn new(sink: SharedSink, sink_config: SinkConfig) -> Self {
        Self {
            sink,
            sink_config,
            engine: Engine::new(),
            kernels: factory::<ScriptKernel>(),
            sim: Simulation::new(),
        }
    }

    pub fn with_kernels(mut self, kernels: KernelFactory) -> Self {
        self.kernels = kernels;
        self
    }

    /// State of the last (or current) run.
    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// Batch mode: run every iteration the configuration asks for.
    #[instrument(skip(self))]
    pub fn simulate(&mut self, config: Option<&Path>) -> Signal {
        if let Err(signal) = self.start() {
            return signal;
        }

        let Some(path) = config else {
            error!("no configuration source given");
            self.report_with("No input file specified!", Signal::Exit);
            self.finish();
            return Signal::Exit;
        };

        let tree = match self.engine.parse_source(path) {
            Ok(tree) => tree,
            Err(e) => return self.abort_startup(e.to_string()),
        };
        if let Err(e) = self.sim.initialize(&tree) {
            return self.abort_startup(e.to_string());
        }

        let total = self.sim.iteration_count();
        self.sink.borrow_mut().set_iteration_count(total);
        info!(iterations = total, config = %path.display(), "starting simulation");

        let mut outcome = Signal::Success;
        loop {
            match self.sim.advance() {
                Ok(true) => {}
                Ok(false) => break,
                Err(Signal::Abort) => {
                    warn!(
                        iteration = self.sim.current_iteration(),
                        "continuation predicate aborted, ending run"
                    );
                    self.report_with("Simulation run aborted due to error!", Signal::Abort);
                    outcome = Signal::Abort;
                    break;
                }
                Err(signal) => return self.terminate(signal),
            }

            let i = self.sim.current_iteration();
            self.report(&format!("Starting Simulation iteration: {i}/{total}"));

            match self.run_iteration() {
                Ok(()) => self.report(&format!("Simulation iteration: {i}/{total} done!")),
                Err(Signal::Abort) => {
                    warn!(iteration = i, "iteration aborted");
                    self.report_with("Simulation run aborted due to error!", Signal::Abort);
                    outcome = Signal::Abort;
                }
                Err(signal) => return self.terminate(signal),
            }
        }

        self.report("Simulation done!");
        self.sink.borrow_mut().error_summary();
        self.report("Bye!");
        self.finish();
        info!(%outcome, "simulation finished");
        outcome
    }

    /// Interactive mode: evaluate whitespace-delimited commands from `input`.
    ///
    /// Returns `Success` once the loop ends normally, even after evaluation
    /// errors. An I/O failure on either stream ends the session with `Exit`.
    #[instrument(skip_all)]
    pub fn simulate_online<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Signal {
        if let Err(signal) = self.start() {
            return signal;
        }
        if let Err(e) = self.sim.initialize(&Expr::Compound(Vec::new())) {
            return self.abort_startup(e.to_string());
        }
        self.sim.set_capture_output(true);

        let session = self.evaluate_loop(Tokens::new(input), &mut output);
        self.sim.set_capture_output(false);

        match session {
            Ok(()) => {
                self.report("Bye!");
                self.finish();
                Signal::Success
            }
            Err(e) => {
                error!(error = %e, "interactive session I/O failed");
                self.report_with(&format!("Session I/O failed: {e}"), Signal::Exit);
                self.finish();
                Signal::Exit
            }
        }
    }

    fn evaluate_loop<R: BufRead, W: Write>(
        &mut self,
        mut tokens: Tokens<R>,
        output: &mut W,
    ) -> io::Result<()> {
        let mut index: u64 = 1;
        let mut quit_pending = false;

        loop {
            write!(output, "In[{index}]:")?;
            output.flush()?;

            let token = if quit_pending {
                Some(QUIT.to_string())
            } else {
                tokens.next_token()?
            };
            let Some(token) = token else {
                debug!("end of input");
                break;
            };
            if is_quit(&token) {
                break;
            }
            debug!(index, %token, "command");

            match self.engine.parse_text(&token) {
                Ok(tree) => {
                    write!(output, "Out[{index}]:")?;
                    let result = self.sim.evaluate(&tree.into_print_first());

                    let printed = self.sim.take_output();
                    if printed.is_empty() {
                        writeln!(output)?;
                    }
                    for line in printed {
                        writeln!(output, "{line}")?;
                    }

                    match result {
                        Ok(value) => writeln!(output, "Result[{index}]:{value}")?,
                        Err(signal @ (Signal::Abort | Signal::Exit)) => {
                            warn!(index, %signal, "command raised, ending session");
                            self.report_with("evaluation error!", signal);
                            quit_pending = true;
                        }
                        Err(signal) => debug!(index, %signal, "command raised"),
                    }
                }
                Err(e) => {
                    self.report_with(&format!("Cannot parse command: {token}"), Signal::Abort);
                    self.report(&e.to_string());
                }
            }

            index += 1;
        }

        Ok(())
    }

    /// Initialize the sink and bind it to a fresh simulation.
    fn start(&mut self) -> Result<(), Signal> {
        let init = self.sink.borrow_mut().init(&self.sink_config);
        if let Err(e) = init {
            error!(error = %e, "message sink initialization failed");
            self.finish();
            return Err(Signal::Exit);
        }

        self.sim = Simulation::with_engine(self.engine.clone());
        self.sim.bind_sink(self.sink.clone());
        Ok(())
    }

    /// Fresh kernel, all phases in order, first raised signal wins.
    fn run_iteration(&mut self) -> Result<(), Signal> {
        let mut kernel = (self.kernels)();
        for phase in Phase::ALL {
            kernel.run_phase(phase, &mut self.sim)?;
        }
        Ok(())
    }

    /// Fatal path of a running batch: report, summarize, close, return `Exit`.
    fn terminate(&mut self, signal: Signal) -> Signal {
        let iteration = self.sim.current_iteration();
        if signal.is_fatal() {
            error!(iteration, %signal, "fatal signal, terminating run");
        } else {
            error!(iteration, %signal, "unexpected signal, terminating run");
        }
        self.report_with("Simulation aborted due to fatal error!", Signal::Exit);
        self.sink.borrow_mut().summary();
        self.finish();
        Signal::Exit
    }

    fn abort_startup(&mut self, reason: String) -> Signal {
        error!(%reason, "simulation initialization failed");
        self.report(&reason);
        self.report_with("Simulation initialization failed!", Signal::Exit);
        self.finish();
        Signal::Exit
    }

    fn report(&self, text: &str) {
        self.sink.borrow_mut().message(text);
    }

    fn report_with(&self, text: &str, signal: Signal) {
        self.sink.borrow_mut().message_with(text, signal);
    }

    fn finish(&mut self) {
        self.sink.borrow_mut().close();
    }
}
