//! Single owner of the session state.
//!
//! All writers go through [`ProgressionStore::dispatch`], which runs the
//! reducer under the watch channel's write lock. Read-modify-write races
//! between independent callers (a goal edit and a quest completion, say)
//! cannot lose updates.

use tokio::sync::watch;

use super::state::{reduce, SessionState, StoreEvent};

/// Owned, observable session state.
pub struct ProgressionStore {
    tx: watch::Sender<SessionState>,
}

impl Default for ProgressionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressionStore {
    /// Create a store holding an empty session.
    pub fn new() -> Self {
        Self::with_state(SessionState::default())
    }

    /// Create a store seeded with `state`.
    pub fn with_state(state: SessionState) -> Self {
        let (tx, _rx) = watch::channel(state);
        Self { tx }
    }

    /// Apply an event and return the resulting state.
    pub fn dispatch(&self, event: StoreEvent) -> SessionState {
        let mut result = SessionState::default();
        self.tx.send_modify(|state| {
            *state = reduce(state, event);
            result = state.clone();
        });
        result
    }

    /// Apply an event only while `generation` is still current.
    ///
    /// Returns `None` (and changes nothing) for stale work.
    pub fn dispatch_if_current(&self, generation: u64, event: StoreEvent) -> Option<SessionState> {
        let mut result = None;
        self.tx.send_if_modified(|state| {
            if state.generation != generation {
                return false;
            }
            *state = reduce(state, event);
            result = Some(state.clone());
            true
        });
        result
    }

    /// Apply an event and return the states before and after, atomically.
    pub fn dispatch_with_snapshot(&self, event: StoreEvent) -> (SessionState, SessionState) {
        let mut before = SessionState::default();
        let mut after = SessionState::default();
        self.tx.send_modify(|state| {
            before = state.clone();
            *state = reduce(state, event);
            after = state.clone();
        });
        (before, after)
    }

    /// Current state.
    pub fn snapshot(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    /// Current session generation.
    pub fn generation(&self) -> u64 {
        self.tx.borrow().generation
    }

    /// Observe every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    /// Start a new generation, invalidating in-flight work.
    pub fn reset(&self) -> u64 {
        self.dispatch(StoreEvent::Reset).generation
    }
}
