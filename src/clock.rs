//! Wall-clock sources
//!
//! The controller reads time only through [`Clock`], so tests and simulations
//! can pin or advance "now".

use std::cell::Cell;

use chrono::{DateTime, Duration, Utc};

/// Source of the current instant
pub trait Clock {
    /// The current instant in UTC
    fn now(&self) -> DateTime<Utc>;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// The real system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a clock frozen at `now`
    #[must_use]
    pub const fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    /// Jump to `now`
    pub fn set(&self, now: DateTime<Utc>) {
        self.now.set(now);
    }

    /// Move forward by `by`
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}
