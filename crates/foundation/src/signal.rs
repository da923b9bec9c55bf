//! Severity signals.
//!
//! A [`Signal`] is the only channel through which kernel phases and
//! expression evaluation report failure to the controller. Fallible
//! computational code returns `Result<T, Signal>`; the controller inspects the
//! tag and decides whether to continue, skip the current unit, or stop.
//!
//! # Examples
//!
//! ```
//! # use simctl_foundation::Signal;
//! assert!(Signal::Success < Signal::Abort);
//! assert!(Signal::Abort < Signal::Exit);
//! assert_eq!(Signal::Abort.code(), 1);
//! assert_eq!(Signal::Success.max(Signal::Abort), Signal::Abort);
//! ```

use std::fmt;
use std::process::ExitCode;

/// Severity of a raised signal, ordered by increasing fatality.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Signal {
    /// Normal completion
    #[default]
    Success = 0,
    /// Recoverable failure scoped to the current unit of work
    Abort = 1,
    /// Unrecoverable failure, terminates the run
    Exit = 2,
}

impl Signal {
    /// All signals in order of increasing fatality
    pub const ALL: [Signal; 3] = [Signal::Success, Signal::Abort, Signal::Exit];

    /// Process exit status for this severity (its ordinal).
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Get the signal name as a static string.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Abort => "Abort",
            Self::Exit => "Exit",
        }
    }

    /// Check if this signal ends the whole run.
    pub const fn is_fatal(self) -> bool {
        matches!(self, Self::Exit)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Signal> for ExitCode {
    fn from(signal: Signal) -> Self {
        ExitCode::from(signal.code())
    }
}
