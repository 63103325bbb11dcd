//! Quests module.
//!
//! Daily quests per development branch and their completion flow.

pub mod orchestrator;
pub mod types;

// Re-exports for convenience
pub use orchestrator::{CompletionError, CompletionReport, QuestCompletionOrchestrator};
pub use types::{BonusReward, Branch, CompletionOutcome, CompletionState, Quest};
