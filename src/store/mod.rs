//! Session state store.
//!
//! One owned, observable copy of the client-side mirror:
//! - `dispatch(event) -> new state` through a pure reducer
//! - Optimistic transactions with exact revert
//! - Generation counter for discarding late responses

pub mod progression_store;
pub mod state;
pub mod transaction;

// Re-exports for convenience
pub use progression_store::ProgressionStore;
pub use state::{reduce, SessionState, StoreEvent};
pub use transaction::{optimistic, Transaction};
