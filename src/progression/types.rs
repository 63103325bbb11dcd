//! Progress record type definitions.

use serde::{Deserialize, Serialize};

use super::curve::{next_level_xp, total_xp_to_reach_level};

/// A user's level/XP state as mirrored from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    /// Current level (1-based)
    #[serde(default = "default_level")]
    pub current_level: u32,
    /// XP accumulated inside the current level
    #[serde(default)]
    pub current_xp: u64,
    /// XP required to leave the current level
    #[serde(default = "default_next_level_xp")]
    pub next_level_xp: u64,
    /// Lifetime XP, never decreases
    #[serde(default)]
    pub total_xp: u64,
    /// Headline reward goal text
    #[serde(default)]
    pub goal_text: Option<String>,
    /// Level the headline goal unlocks at
    #[serde(default)]
    pub goal_level: Option<u32>,
    /// Percent towards the headline goal as reported by the server
    #[serde(default)]
    pub goal_progress: Option<u32>,
}

fn default_level() -> u32 {
    1
}

fn default_next_level_xp() -> u64 {
    next_level_xp(1)
}

impl Default for ProgressRecord {
    fn default() -> Self {
        Self {
            current_level: 1,
            current_xp: 0,
            next_level_xp: next_level_xp(1),
            total_xp: 0,
            goal_text: None,
            goal_level: None,
            goal_progress: None,
        }
    }
}

impl ProgressRecord {
    /// Create a record at the given level with XP inside that level.
    pub fn at_level(level: u32, current_xp: u64) -> Self {
        let level = level.max(1);
        Self {
            current_level: level,
            current_xp,
            next_level_xp: next_level_xp(level),
            total_xp: total_xp_to_reach_level(level).saturating_add(current_xp),
            ..Default::default()
        }
    }

    /// Position on the cumulative XP axis (level base + in-level XP).
    pub fn cumulative_xp(&self) -> u64 {
        total_xp_to_reach_level(self.current_level).saturating_add(self.current_xp)
    }

    /// XP still needed to reach the next level.
    pub fn xp_to_next_level(&self) -> u64 {
        self.next_level_xp.saturating_sub(self.current_xp)
    }

    /// Whether `current_xp < next_level_xp` holds.
    pub fn is_normalized(&self) -> bool {
        self.current_level >= 1 && self.next_level_xp > 0 && self.current_xp < self.next_level_xp
    }

    /// Copy the XP/level fields from `other`, keeping this record's goal fields.
    pub fn restore_progression(&mut self, other: &ProgressRecord) {
        self.current_level = other.current_level;
        self.current_xp = other.current_xp;
        self.next_level_xp = other.next_level_xp;
        self.total_xp = other.total_xp;
    }

    /// Server-style coarse goal percentage: `floor(level / goal_level * 100)`.
    pub fn legacy_goal_progress(current_level: u32, goal_level: u32) -> u32 {
        if goal_level == 0 {
            return 100;
        }
        ((current_level as u64 * 100) / goal_level as u64).min(u32::MAX as u64) as u32
    }
}
