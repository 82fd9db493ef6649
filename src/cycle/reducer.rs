//! Cycle reducer
//!
//! Pure state transitions over `CyclesState`. The reducer never reads the
//! clock: instants used for terminal timestamps travel inside the action, so
//! replaying the same actions always yields the same state.

use chrono::{DateTime, Utc};

use crate::cycle::error::IllegalTransition;
use crate::cycle::model::{Cycle, CycleId, CyclesState};

/// The three transitions a `CyclesState` accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleAction {
    /// Append a cycle and make it the active one
    AddNewCycle(Cycle),
    /// Stamp `finished_at` on a running cycle
    MarkCycleAsFinished {
        /// Target cycle
        cycle_id: CycleId,
        /// When it finished
        at: DateTime<Utc>,
    },
    /// Stamp `interrupted_at` on a running cycle and release the active slot
    InterruptCurrentCycle {
        /// Target cycle
        cycle_id: CycleId,
        /// When it was interrupted
        at: DateTime<Utc>,
    },
}

impl CycleAction {
    /// Short name used in logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AddNewCycle(_) => "add_new_cycle",
            Self::MarkCycleAsFinished { .. } => "mark_cycle_as_finished",
            Self::InterruptCurrentCycle { .. } => "interrupt_current_cycle",
        }
    }
}

/// Apply `action` to `state`, rejecting transitions that would break an invariant.
///
/// Terminal cycles are never touched. Finishing or interrupting the active
/// cycle releases `active_cycle_id`.
pub fn reduce(state: &CyclesState, action: &CycleAction) -> Result<CyclesState, IllegalTransition> {
    match action {
        CycleAction::AddNewCycle(cycle) => {
            if state.find(&cycle.id).is_some() {
                return Err(IllegalTransition::DuplicateCycle(cycle.id.clone()));
            }
            if cycle.is_terminal() {
                return Err(IllegalTransition::TerminalOnArrival(cycle.id.clone()));
            }

            let mut next = state.clone();
            next.cycles.push(cycle.clone());
            next.active_cycle_id = Some(cycle.id.clone());
            Ok(next)
        }
        CycleAction::MarkCycleAsFinished { cycle_id, at } => {
            close_cycle(state, cycle_id, |cycle| cycle.finished_at = Some(*at))
        }
        CycleAction::InterruptCurrentCycle { cycle_id, at } => {
            close_cycle(state, cycle_id, |cycle| cycle.interrupted_at = Some(*at))
        }
    }
}

/// Infallible form of [`reduce`]: an illegal transition leaves the state unchanged.
#[must_use]
pub fn cycles_reducer(state: &CyclesState, action: &CycleAction) -> CyclesState {
    reduce(state, action).unwrap_or_else(|_| state.clone())
}

fn close_cycle(
    state: &CyclesState,
    cycle_id: &CycleId,
    stamp: impl FnOnce(&mut Cycle),
) -> Result<CyclesState, IllegalTransition> {
    let mut next = state.clone();
    let cycle = next
        .cycles
        .iter_mut()
        .find(|c| &c.id == cycle_id)
        .ok_or_else(|| IllegalTransition::UnknownCycle(cycle_id.clone()))?;

    if cycle.is_terminal() {
        return Err(IllegalTransition::AlreadyTerminal(cycle_id.clone()));
    }

    stamp(cycle);

    if next.active_cycle_id.as_ref() == Some(cycle_id) {
        next.active_cycle_id = None;
    }

    Ok(next)
}
