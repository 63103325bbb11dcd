//! User session module.

pub mod lifecycle;
pub mod types;

// Re-exports for convenience
pub use lifecycle::{GoalOverview, Session, SessionError};
pub use types::{DailyXpStat, OnboardingData, User, UserRegistration};
