//! LifeQuest - Hero Progression Core
//!
//! Client-side progression for the LifeQuest self-development app. Tracks
//! XP and levels on a geometric curve, completes daily quests optimistically
//! against the backend with exact rollback, and watches user-defined reward
//! goals tied to target levels.

pub mod api;
pub mod config;
pub mod goals;
pub mod notify;
pub mod progression;
pub mod quests;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use api::{ApiClient, ApiError, LifeQuestApi};
pub use config::AppConfig;
pub use goals::{Goal, GoalManager, GoalMetrics};
pub use notify::{EventBus, ProgressionEvent};
pub use progression::ProgressRecord;
pub use quests::{Quest, QuestCompletionOrchestrator};
pub use session::{Session, User};
pub use store::ProgressionStore;
