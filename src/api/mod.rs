//! Backend API module.
//!
//! The remote LifeQuest REST API is the source of truth. This module holds
//! the trait the core depends on, the HTTP implementation and the wire types.

pub mod backend;
pub mod client;
pub mod types;

// Re-exports for convenience
pub use backend::LifeQuestApi;
pub use client::ApiClient;
pub use types::{ApiError, CompleteQuestResponse, PrimaryGoalResponse};
