//! Simctl Tools
//!
//! Shared setup for the `simulate` and `simulate-online` binaries.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use clap::Args;
use simctl_runtime::{Controller, LogSink, SharedSink, SinkConfig};
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize logging with a default filter.
///
/// Use `RUST_LOG` environment variable to override the default filter.
/// Output goes to stderr so stdout stays free for the interactive protocol.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,simctl_runtime=info,simctl_dsl=info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Message sink flags shared by both binaries
#[derive(Args, Debug, Clone)]
pub struct SinkArgs {
    /// File every sink message is written to
    #[arg(long, default_value = "sim.log", conflicts_with = "no_log_file")]
    pub log_file: PathBuf,

    /// Do not write a log file
    #[arg(long)]
    pub no_log_file: bool,

    /// Prefix for every sink line
    #[arg(long, default_value = "Sim: ")]
    pub prefix: String,

    /// Keep sink messages out of the terminal log
    #[arg(long)]
    pub quiet: bool,
}

impl SinkArgs {
    pub fn sink_config(&self) -> SinkConfig {
        SinkConfig {
            echo: !self.quiet,
            prefix: self.prefix.clone(),
            log_file: (!self.no_log_file).then(|| self.log_file.clone()),
        }
    }

    /// Controller writing to a fresh [`LogSink`] configured from these flags.
    pub fn controller(&self) -> Controller {
        let sink: SharedSink = Rc::new(RefCell::new(LogSink::new()));
        Controller::new(sink, self.sink_config())
    }
}
