//! Cycle store controller
//!
//! Owns the authoritative `CyclesState`, feeds every change through the
//! reducer, persists the result and exposes the derived read views
//! (`active_cycle`, `seconds_passed_amount`, `countdown`).

use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::cycle::error::{CycleError, CycleResult};
use crate::cycle::model::{Cycle, CycleId, CyclesState};
use crate::cycle::reducer::{reduce, CycleAction};
use crate::store::persist::{revive_state, serialize_state, storage_key};
use crate::store::KeyValueStore;
use crate::ticker::Countdown;

/// The single owner of cycle state for a process
///
/// Construct one with [`CyclesController::load`] and hand it to whoever needs
/// it by reference.
pub struct CyclesController<S, C = SystemClock> {
    store: S,
    clock: C,
    key: String,
    state: CyclesState,
    seconds_passed_amount: u64,
}

impl<S: KeyValueStore> CyclesController<S> {
    /// Load state for `namespace` from `store` using the system clock
    pub fn open(store: S, namespace: &str) -> Self {
        Self::load(store, SystemClock, namespace)
    }
}

impl<S: KeyValueStore, C: Clock> CyclesController<S, C> {
    /// Rehydrate state from `store`, falling back to an empty history.
    ///
    /// Missing, unparsable or inconsistent payloads all yield an empty state;
    /// the problem is logged, never returned. With an active cycle the elapsed
    /// seconds are derived from its start time so a restart keeps progress.
    pub fn load(store: S, clock: C, namespace: &str) -> Self {
        let key = storage_key(namespace);
        let state = load_state(&store, &key);

        let seconds_passed_amount = state
            .active_cycle()
            .map_or(0, |cycle| cycle.seconds_since_start(clock.now()));

        debug!(
            key = %key,
            cycles = state.cycles.len(),
            active = state.active_cycle_id.is_some(),
            seconds_passed_amount,
            "Cycle state loaded"
        );

        Self {
            store,
            clock,
            key,
            state,
            seconds_passed_amount,
        }
    }

    /// Start a new cycle and make it the active one.
    ///
    /// The elapsed-seconds view resets to 0. Input is checked before anything
    /// changes, so a rejected call leaves state and storage untouched.
    pub fn create_new_cycle(&mut self, task: &str, minutes_amount: u32) -> CycleResult<CycleId> {
        let task = task.trim();
        if task.is_empty() {
            return Err(CycleError::validation("task", "must not be empty"));
        }
        if minutes_amount == 0 {
            return Err(CycleError::validation(
                "minutes_amount",
                "must be a positive number of minutes",
            ));
        }

        let cycle = Cycle::new(task, minutes_amount, self.clock.now());
        let id = cycle.id.clone();
        info!(cycle_id = %id, task, minutes_amount, "Starting cycle");

        self.dispatch(&CycleAction::AddNewCycle(cycle));
        self.seconds_passed_amount = 0;

        Ok(id)
    }

    /// Mark the active cycle as finished. No-op without an active cycle.
    pub fn mark_active_cycle_as_finished(&mut self) {
        let Some(cycle_id) = self.state.active_cycle_id.clone() else {
            debug!("No active cycle to finish");
            return;
        };
        info!(cycle_id = %cycle_id, "Cycle finished");
        let at = self.clock.now();
        self.dispatch(&CycleAction::MarkCycleAsFinished { cycle_id, at });
    }

    /// Interrupt the active cycle. No-op without an active cycle.
    pub fn interrupt_current_cycle(&mut self) {
        let Some(cycle_id) = self.state.active_cycle_id.clone() else {
            debug!("No active cycle to interrupt");
            return;
        };
        info!(cycle_id = %cycle_id, "Cycle interrupted");
        let at = self.clock.now();
        self.dispatch(&CycleAction::InterruptCurrentCycle { cycle_id, at });
    }

    /// Record how many seconds of the active cycle have elapsed
    pub fn update_seconds_passed_amount(&mut self, amount: u64) {
        self.seconds_passed_amount = amount;
    }

    /// Every cycle in creation order
    #[must_use]
    pub fn cycles(&self) -> &[Cycle] {
        &self.state.cycles
    }

    /// The running cycle, if any
    #[must_use]
    pub fn active_cycle(&self) -> Option<&Cycle> {
        self.state.active_cycle()
    }

    /// Id of the running cycle, if any
    #[must_use]
    pub const fn active_cycle_id(&self) -> Option<&CycleId> {
        self.state.active_cycle_id.as_ref()
    }

    /// Elapsed seconds of the running cycle as last recorded
    #[must_use]
    pub const fn seconds_passed_amount(&self) -> u64 {
        self.seconds_passed_amount
    }

    /// Countdown view of the running cycle
    #[must_use]
    pub fn countdown(&self) -> Option<Countdown> {
        self.active_cycle()
            .map(|cycle| Countdown::new(cycle.total_seconds(), self.seconds_passed_amount))
    }

    /// The full canonical state
    #[must_use]
    pub const fn state(&self) -> &CyclesState {
        &self.state
    }

    /// Key the state is persisted under
    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.key
    }

    /// The clock this controller reads
    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    fn dispatch(&mut self, action: &CycleAction) {
        match reduce(&self.state, action) {
            Ok(next) => {
                debug!(action = action.name(), "Applied cycle action");
                self.state = next;
                self.persist();
            }
            Err(e) => {
                warn!(action = action.name(), error = %e, "Ignoring illegal cycle transition");
            }
        }
    }

    fn persist(&self) {
        // Keep the previous payload rather than overwrite it with nothing.
        let json = match serialize_state(&self.state) {
            Ok(json) => json,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to serialize cycle state");
                return;
            }
        };
        match self.store.set(&self.key, &json) {
            Ok(()) => debug!(key = %self.key, bytes = json.len(), "Cycle state persisted"),
            Err(e) => warn!(key = %self.key, error = %e, "Failed to persist cycle state"),
        }
    }
}

fn load_state<S: KeyValueStore>(store: &S, key: &str) -> CyclesState {
    let payload = match store.get(key) {
        Ok(Some(payload)) => payload,
        Ok(None) => return CyclesState::default(),
        Err(e) => {
            warn!(key, error = %e, "Failed to read stored cycle state, starting empty");
            return CyclesState::default();
        }
    };

    revive_state(&payload).unwrap_or_else(|e| {
        warn!(key, error = %e, "Discarding corrupted cycle state, starting empty");
        CyclesState::default()
    })
}
