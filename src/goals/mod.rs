//! Reward goals module.
//!
//! Manages user-defined rewards tied to a target level:
//! - Goal validation and CRUD against the backend
//! - Percent / remaining XP / ETA metrics on the cumulative XP axis
//! - Achievement detection, surfaced once per session

pub mod manager;
pub mod tracker;
pub mod types;

// Re-exports for convenience
pub use manager::{GoalError, GoalManager};
pub use tracker::{achievable_goals, goal_metrics, AchievementWatch};
pub use types::{Goal, GoalDraft, GoalMetrics, GoalPatch, GoalValidationError};
