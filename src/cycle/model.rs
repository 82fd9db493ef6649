//! Cycle data model
//!
//! A `Cycle` is one timed work interval. `CyclesState` is the aggregate that
//! holds the full history plus the id of the cycle currently running.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque, stable identifier of a cycle
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CycleId(String);

impl CycleId {
    /// Generate a fresh random identifier
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow the identifier as text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CycleId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CycleId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a cycle is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStatus {
    /// Neither finished nor interrupted
    InProgress,
    /// Reached its target duration
    Finished,
    /// Stopped before reaching its target duration
    Interrupted,
}

/// One timed work interval
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    /// Identifier assigned at creation
    pub id: CycleId,
    /// What the cycle is spent on
    pub task: String,
    /// Target duration in minutes
    pub minutes_amount: u32,
    /// When the cycle was started
    pub start_time: DateTime<Utc>,
    /// When the cycle was interrupted, if it was
    pub interrupted_at: Option<DateTime<Utc>>,
    /// When the cycle reached its target, if it did
    pub finished_at: Option<DateTime<Utc>>,
}

impl Cycle {
    /// Create a new, non-terminal cycle with a generated id
    #[must_use]
    pub fn new(task: &str, minutes_amount: u32, start_time: DateTime<Utc>) -> Self {
        Self {
            id: CycleId::generate(),
            task: task.to_string(),
            minutes_amount,
            start_time,
            interrupted_at: None,
            finished_at: None,
        }
    }

    /// A cycle is terminal once it has been finished or interrupted
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.interrupted_at.is_some() || self.finished_at.is_some()
    }

    /// Derive the lifecycle status from the terminal timestamps
    #[must_use]
    pub const fn status(&self) -> CycleStatus {
        if self.finished_at.is_some() {
            CycleStatus::Finished
        } else if self.interrupted_at.is_some() {
            CycleStatus::Interrupted
        } else {
            CycleStatus::InProgress
        }
    }

    /// Target duration in seconds
    #[must_use]
    pub fn total_seconds(&self) -> u64 {
        u64::from(self.minutes_amount) * 60
    }

    /// Whole seconds elapsed between `start_time` and `now`, never negative
    #[must_use]
    pub fn seconds_since_start(&self, now: DateTime<Utc>) -> u64 {
        let millis = (now - self.start_time).num_milliseconds();
        u64::try_from(millis / 1000).unwrap_or(0)
    }
}

/// The aggregate root: every cycle ever started plus the running one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CyclesState {
    /// All cycles in creation order
    pub cycles: Vec<Cycle>,
    /// The cycle currently running, if any
    pub active_cycle_id: Option<CycleId>,
}

impl CyclesState {
    /// Find a cycle by id
    #[must_use]
    pub fn find(&self, id: &CycleId) -> Option<&Cycle> {
        self.cycles.iter().find(|c| &c.id == id)
    }

    /// The cycle referenced by `active_cycle_id`
    #[must_use]
    pub fn active_cycle(&self) -> Option<&Cycle> {
        self.active_cycle_id.as_ref().and_then(|id| self.find(id))
    }

    /// Check the aggregate invariants, returning a description of the first violation.
    pub fn check_invariants(&self) -> Result<(), String> {
        for (i, cycle) in self.cycles.iter().enumerate() {
            if cycle.task.trim().is_empty() {
                return Err(format!("cycle '{}' has an empty task", cycle.id));
            }
            if cycle.minutes_amount == 0 {
                return Err(format!("cycle '{}' has a zero duration", cycle.id));
            }
            if cycle.interrupted_at.is_some() && cycle.finished_at.is_some() {
                return Err(format!(
                    "cycle '{}' is both interrupted and finished",
                    cycle.id
                ));
            }
            if self.cycles[..i].iter().any(|c| c.id == cycle.id) {
                return Err(format!("duplicate cycle id '{}'", cycle.id));
            }
        }

        if let Some(id) = &self.active_cycle_id {
            match self.find(id) {
                None => return Err(format!("active cycle '{id}' does not exist")),
                Some(c) if c.is_terminal() => {
                    return Err(format!("active cycle '{id}' is already terminal"));
                }
                Some(_) => {}
            }
        }

        Ok(())
    }
}
