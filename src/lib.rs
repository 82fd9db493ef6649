//! Timebox - focus cycle tracker
//!
//! Timebox tracks timed work cycles: starting one, finishing it when its
//! duration elapses, or interrupting it early. State survives restarts, and
//! a running countdown picks up where it left off.

// Allow multiple crate versions from dependencies (can't easily control)
#![allow(clippy::multiple_crate_versions)]

pub mod cli;
pub mod clock;
pub mod config;
pub mod cycle;
pub mod logging;
pub mod store;
pub mod ticker;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::TimeboxConfig;
pub use cycle::{
    cycles_reducer, Cycle, CycleAction, CycleError, CycleId, CycleStatus, CyclesState,
};
pub use store::{CyclesController, FileStore, KeyValueStore, MemoryStore};
pub use ticker::{tick, Countdown, TickOutcome};
