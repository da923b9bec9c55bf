//! Simctl Foundation
//!
//! Core vocabulary shared by every simctl crate: the [`Signal`] severity used
//! to escalate faults out of computational code, and the [`Phase`] sequence a
//! kernel is driven through on each iteration.

pub mod phase;
pub mod signal;

pub use phase::Phase;
pub use signal::Signal;
