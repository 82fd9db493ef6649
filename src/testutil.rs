//! Shared test utilities
//!
//! Common helpers used across test modules. Only compiled in test builds.

use chrono::{DateTime, TimeZone, Utc};

use crate::cycle::model::{Cycle, CycleId};

/// Fixed reference instant used as "T0" across tests.
#[must_use]
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
}

/// Create a running `Cycle` with a chosen id, started at [`t0`].
#[must_use]
pub fn make_test_cycle(id: &str, task: &str, minutes_amount: u32) -> Cycle {
    Cycle {
        id: CycleId::from(id),
        task: task.to_string(),
        minutes_amount,
        start_time: t0(),
        interrupted_at: None,
        finished_at: None,
    }
}
