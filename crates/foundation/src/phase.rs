//! Kernel phases.
//!
//! Every iteration constructs one kernel and drives it through the three
//! phases below, strictly in order. A phase that raises a [`Signal`]
//! ends the sequence; later phases of that iteration never run.
//!
//! [`Signal`]: crate::Signal
//!
//! # Examples
//!
//! ```
//! # use simctl_foundation::Phase;
//! assert!(Phase::Initialize < Phase::Execute);
//! assert_eq!(Phase::ALL.last(), Some(&Phase::Finalize));
//! ```

use std::fmt;

/// Phase of a single kernel iteration.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Phase {
    /// Prepare per-iteration state
    Initialize = 0,
    /// Run the computation
    Execute = 1,
    /// Publish results, release iteration resources
    Finalize = 2,
}

impl Phase {
    /// All phases in execution order
    pub const ALL: [Phase; 3] = [Phase::Initialize, Phase::Execute, Phase::Finalize];

    /// Get the phase name as a static string.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Initialize => "Initialize",
            Self::Execute => "Execute",
            Self::Finalize => "Finalize",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
