//! Optimistic transactions.
//!
//! Apply a mutation locally right away, then keep it or revert it depending
//! on the remote outcome. The snapshot is taken under the same lock as the
//! mutation, so the revert is exact. A transaction dropped without being
//! settled reverts itself.

use std::future::Future;

use super::progression_store::ProgressionStore;
use super::state::{SessionState, StoreEvent};

/// An applied but not yet settled optimistic mutation.
pub struct Transaction<'a> {
    store: &'a ProgressionStore,
    snapshot: SessionState,
    applied: SessionState,
    settled: bool,
}

impl<'a> Transaction<'a> {
    /// Snapshot the state and apply `mutation` atomically.
    pub fn begin(store: &'a ProgressionStore, mutation: StoreEvent) -> Self {
        let (snapshot, applied) = store.dispatch_with_snapshot(mutation);
        Self {
            store,
            snapshot,
            applied,
            settled: false,
        }
    }

    /// State as it was before the mutation.
    pub fn snapshot(&self) -> &SessionState {
        &self.snapshot
    }

    /// State right after the mutation.
    pub fn applied(&self) -> &SessionState {
        &self.applied
    }

    /// Session generation the transaction belongs to.
    pub fn generation(&self) -> u64 {
        self.snapshot.generation
    }

    /// Whether the session that started this transaction is still live.
    pub fn is_current(&self) -> bool {
        self.store.generation() == self.generation()
    }

    /// Keep the optimistic state. Returns `false` if the session moved on.
    pub fn commit(mut self) -> bool {
        self.settled = true;
        self.is_current()
    }

    /// Restore the snapshot. Returns `false` (and does nothing) if stale.
    pub fn revert(mut self) -> bool {
        self.settled = true;
        self.restore()
    }

    fn restore(&mut self) -> bool {
        let generation = self.generation();
        let snapshot = std::mem::take(&mut self.snapshot);
        self.store
            .dispatch_if_current(generation, StoreEvent::Restore(Box::new(snapshot)))
            .is_some()
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::debug!("Unsettled optimistic transaction dropped, reverting");
            self.restore();
        }
    }
}

/// Run `remote` around an optimistic `mutation`: commit on `Ok`, revert on `Err`.
pub async fn optimistic<T, E, F, Fut>(
    store: &ProgressionStore,
    mutation: StoreEvent,
    remote: F,
) -> Result<T, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let transaction = Transaction::begin(store, mutation);
    match remote().await {
        Ok(value) => {
            transaction.commit();
            Ok(value)
        }
        Err(err) => {
            transaction.revert();
            Err(err)
        }
    }
}
