//! Progression module.
//!
//! XP accrual and leveling:
//! - Level curve (XP needed per level, cumulative XP axis)
//! - Progress records mirrored from the backend
//! - Pure XP application with multi-level rollover

pub mod curve;
pub mod engine;
pub mod types;

// Re-exports for convenience
pub use curve::{next_level_xp, total_xp_to_reach_level, BASE_LEVEL_XP, LEVEL_GROWTH};
pub use engine::{apply_xp_gain, normalize, xp_ratio};
pub use types::ProgressRecord;
