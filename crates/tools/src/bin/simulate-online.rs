//! Interactive simulation shell
//!
//! Reads whitespace-delimited commands from stdin and evaluates each one
//! against the live simulation scope. `q` or `Quit[]` ends the session.

use std::io;
use std::process::ExitCode;

use clap::Parser;

use simctl_tools::SinkArgs;

#[derive(Parser, Debug)]
#[command(name = "simulate-online")]
#[command(about = "Evaluate commands against a live simulation")]
struct Args {
    #[command(flatten)]
    sink: SinkArgs,
}

fn main() -> ExitCode {
    simctl_tools::init_logging();

    let args = Args::parse();
    let stdin = io::stdin();
    let stdout = io::stdout();

    args.sink
        .controller()
        .simulate_online(stdin.lock(), stdout.lock())
        .into()
}
