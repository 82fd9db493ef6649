//! Cycle management
//!
//! This module holds the cycle data model, its errors, and the reducer that
//! drives every state transition.

pub mod error;
pub mod model;
pub mod reducer;

pub use error::{CycleError, CycleResult, IllegalTransition};
pub use model::{Cycle, CycleId, CycleStatus, CyclesState};
pub use reducer::{cycles_reducer, reduce, CycleAction};
