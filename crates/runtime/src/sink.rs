//! Message sinks
//!
//! A sink receives every status line the controller, simulation state and
//! kernels produce, optionally tagged with a [`Signal`] severity. The
//! controller initializes it at the start of a run and closes it before
//! returning, on every path.
//!
//! The sink is shared between the controller and the [`Simulation`] it
//! drives, so it is handed around as a [`SharedSink`]. All access happens on
//! one thread; each call borrows it only for its own duration.
//!
//! [`Simulation`]: crate::Simulation

use std::cell::RefCell;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::rc::Rc;

use simctl_foundation::Signal;
use tracing::{debug, error, info, trace, warn};

/// Shared, single-threaded handle to a sink
pub type SharedSink = Rc<RefCell<dyn MessageSink>>;

/// Sink settings applied by [`MessageSink::init`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    /// Emit messages through `tracing`
    pub echo: bool,
    /// Prepended to every line
    pub prefix: String,
    /// Append every line to this file (truncated on init)
    pub log_file: Option<PathBuf>,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            echo: true,
            prefix: "Sim: ".to_string(),
            log_file: None,
        }
    }
}

/// Receiver for run status messages
pub trait MessageSink {
    /// Prepare the sink for a run. Failure is fatal to the run.
    fn init(&mut self, config: &SinkConfig) -> io::Result<()>;

    /// Record a message with an optional severity tag.
    fn log(&mut self, text: &str, severity: Option<Signal>);

    fn message(&mut self, text: &str) {
        self.log(text, None);
    }

    fn message_with(&mut self, text: &str, severity: Signal) {
        self.log(text, Some(severity));
    }

    /// Total iterations of the run, for progress reporting.
    fn set_iteration_count(&mut self, count: u64);

    /// Report totals for every severity.
    fn summary(&mut self);

    /// Report error totals only.
    fn error_summary(&mut self);

    /// Flush and release resources. Calling it twice is harmless.
    fn close(&mut self);
}

/// Per-severity message totals
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeverityCounts {
    pub messages: usize,
    pub aborts: usize,
    pub exits: usize,
}

impl SeverityCounts {
    fn record(&mut self, severity: Option<Signal>) {
        self.messages += 1;
        match severity {
            Some(Signal::Abort) => self.aborts += 1,
            Some(Signal::Exit) => self.exits += 1,
            _ => {}
        }
    }

    pub fn errors(&self) -> usize {
        self.aborts + self.exits
    }
}

fn tag(severity: Option<Signal>) -> &'static str {
    match severity {
        Some(Signal::Abort) => "[Abort] ",
        Some(Signal::Exit) => "[Exit] ",
        _ => "",
    }
}

/// Sink that logs through `tracing` and optionally into a file
#[derive(Debug, Default)]
pub struct LogSink {
    config: SinkConfig,
    file: Option<BufWriter<File>>,
    iterations: u64,
    counts: SeverityCounts,
    open: bool,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counts(&self) -> SeverityCounts {
        self.counts
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    fn emit(&mut self, line: &str, severity: Option<Signal>) {
        if self.config.echo {
            match severity {
                Some(Signal::Exit) => error!("{}{}", self.config.prefix, line),
                Some(Signal::Abort) => warn!("{}{}", self.config.prefix, line),
                _ => info!("{}{}", self.config.prefix, line),
            }
        }

        if let Some(file) = self.file.as_mut() {
            let written = writeln!(file, "{}{}{}", self.config.prefix, tag(severity), line);
            if let Err(e) = written {
                warn!(error = %e, "log file write failed, disabling log file");
                self.file = None;
            }
        }
    }
}

impl MessageSink for LogSink {
    fn init(&mut self, config: &SinkConfig) -> io::Result<()> {
        self.close();
        self.config = config.clone();
        self.counts = SeverityCounts::default();
        self.iterations = 0;
        self.file = match &config.log_file {
            Some(path) => {
                debug!(path = %path.display(), "opening log file");
                Some(BufWriter::new(File::create(path)?))
            }
            None => None,
        };
        self.open = true;
        Ok(())
    }

    fn log(&mut self, text: &str, severity: Option<Signal>) {
        self.counts.record(severity);
        for line in text.trim_end().lines() {
            self.emit(line, severity);
        }
    }

    fn set_iteration_count(&mut self, count: u64) {
        debug!(count, "iteration count");
        self.iterations = count;
    }

    fn summary(&mut self) {
        let line = format!(
            "{} messages, {} aborted, {} fatal ({} iterations planned)",
            self.counts.messages, self.counts.aborts, self.counts.exits, self.iterations
        );
        self.emit(&line, None);
    }

    fn error_summary(&mut self) {
        let line = if self.counts.errors() == 0 {
            "no errors".to_string()
        } else {
            format!(
                "{} errors ({} aborted, {} fatal)",
                self.counts.errors(),
                self.counts.aborts,
                self.counts.exits
            )
        };
        let severity = (self.counts.errors() > 0).then_some(Signal::Abort);
        self.emit(&line, severity);
    }

    fn close(&mut self) {
        if let Some(mut file) = self.file.take() {
            if let Err(e) = file.flush() {
                warn!(error = %e, "log file flush failed");
            }
        }
        if self.open {
            trace!("sink closed");
        }
        self.open = false;
    }
}

impl Drop for LogSink {
    fn drop(&mut self) {
        self.close();
    }
}

/// A recorded message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub text: String,
    pub severity: Option<Signal>,
}

/// Sink that keeps every message in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    config: Option<SinkConfig>,
    records: Vec<Record>,
    iteration_count: Option<u64>,
    summaries: usize,
    error_summaries: usize,
    closes: usize,
    fail_init: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose `init` always fails.
    pub fn failing() -> Self {
        Self {
            fail_init: true,
            ..Self::default()
        }
    }

    /// Wrap into a typed shared handle; clone it into a [`SharedSink`] to hand out.
    pub fn shared(self) -> Rc<RefCell<MemorySink>> {
        Rc::new(RefCell::new(self))
    }

    pub fn config(&self) -> Option<&SinkConfig> {
        self.config.as_ref()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn texts(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.text.as_str()).collect()
    }

    /// Number of messages with exactly this text.
    pub fn count(&self, text: &str) -> usize {
        self.records.iter().filter(|r| r.text == text).count()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.count(text) > 0
    }

    pub fn iteration_count(&self) -> Option<u64> {
        self.iteration_count
    }

    pub fn summaries(&self) -> usize {
        self.summaries
    }

    pub fn error_summaries(&self) -> usize {
        self.error_summaries
    }

    pub fn close_count(&self) -> usize {
        self.closes
    }

    pub fn is_closed(&self) -> bool {
        self.closes > 0
    }
}

impl MessageSink for MemorySink {
    fn init(&mut self, config: &SinkConfig) -> io::Result<()> {
        if self.fail_init {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "sink refused to initialize",
            ));
        }
        self.config = Some(config.clone());
        Ok(())
    }

    fn log(&mut self, text: &str, severity: Option<Signal>) {
        trace!(text, ?severity, "message");
        self.records.push(Record {
            text: text.to_string(),
            severity,
        });
    }

    fn set_iteration_count(&mut self, count: u64) {
        self.iteration_count = Some(count);
    }

    fn summary(&mut self) {
        self.summaries += 1;
    }

    fn error_summary(&mut self) {
        self.error_summaries += 1;
    }

    fn close(&mut self) {
        self.closes += 1;
    }
}
