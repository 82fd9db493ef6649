//! Countdown ticking
//!
//! The controller never polls the clock on its own. A timer source calls
//! [`tick`] once per period; each call derives the elapsed seconds of the
//! active cycle, pushes them into the controller and finishes the cycle once
//! its target is reached. [`watch`] is that timer source on a tokio interval.

use std::fmt;
use std::time::Duration;

use crate::clock::Clock;
use crate::cycle::model::CycleId;
use crate::store::controller::CyclesController;
use crate::store::KeyValueStore;

/// Countdown view of a running cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    /// Target duration in seconds
    pub total_seconds: u64,
    /// Seconds elapsed so far
    pub seconds_passed: u64,
}

impl Countdown {
    /// Build a countdown from a target and the elapsed seconds
    #[must_use]
    pub const fn new(total_seconds: u64, seconds_passed: u64) -> Self {
        Self {
            total_seconds,
            seconds_passed,
        }
    }

    /// Seconds left, never below zero
    #[must_use]
    pub const fn remaining_seconds(&self) -> u64 {
        self.total_seconds.saturating_sub(self.seconds_passed)
    }

    /// Whole minutes left
    #[must_use]
    pub const fn minutes(&self) -> u64 {
        self.remaining_seconds() / 60
    }

    /// Seconds left within the current minute
    #[must_use]
    pub const fn seconds(&self) -> u64 {
        self.remaining_seconds() % 60
    }

    /// Whether the target has been reached
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.seconds_passed >= self.total_seconds
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes(), self.seconds())
    }
}

/// What a single tick did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// No cycle is running
    Idle,
    /// The active cycle is still counting down
    Running(Countdown),
    /// The active cycle reached its target on this tick and was finished
    Finished(CycleId),
}

/// Advance the countdown of the active cycle by reading the controller's clock.
pub fn tick<S: KeyValueStore, C: Clock>(controller: &mut CyclesController<S, C>) -> TickOutcome {
    let Some(cycle) = controller.active_cycle() else {
        return TickOutcome::Idle;
    };

    let id = cycle.id.clone();
    let total = cycle.total_seconds();
    let elapsed = cycle.seconds_since_start(controller.clock().now());

    if elapsed >= total {
        controller.mark_active_cycle_as_finished();
        controller.update_seconds_passed_amount(total);
        TickOutcome::Finished(id)
    } else {
        controller.update_seconds_passed_amount(elapsed);
        TickOutcome::Running(Countdown::new(total, elapsed))
    }
}

/// Tick every `period` until the active cycle ends.
///
/// `on_tick` sees every outcome, including the last one. Returns `Idle` when
/// nothing is running or the cycle was closed elsewhere, `Finished` when the
/// target was reached.
pub async fn watch<S, C, F>(
    controller: &mut CyclesController<S, C>,
    period: Duration,
    mut on_tick: F,
) -> TickOutcome
where
    S: KeyValueStore,
    C: Clock,
    F: FnMut(&TickOutcome),
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        interval.tick().await;
        let outcome = tick(controller);
        on_tick(&outcome);
        if !matches!(outcome, TickOutcome::Running(_)) {
            return outcome;
        }
    }
}
