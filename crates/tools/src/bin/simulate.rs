//! Batch simulation runner
//!
//! Runs every iteration the configuration source asks for.
//!
//! Usage: `simulate [CONFIG] [--log-file PATH | --no-log-file] [--prefix TEXT] [--quiet]`

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

use simctl_tools::SinkArgs;

#[derive(Parser, Debug)]
#[command(name = "simulate")]
#[command(about = "Run a simulation from a configuration source")]
struct Args {
    /// Configuration source (expression language)
    config: Option<PathBuf>,

    #[command(flatten)]
    sink: SinkArgs,
}

fn main() -> ExitCode {
    simctl_tools::init_logging();

    let args = Args::parse();
    debug!(?args, "arguments");

    let signal = args.sink.controller().simulate(args.config.as_deref());
    debug!(%signal, code = signal.code(), "exiting");
    signal.into()
}
