//! Quest type definitions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::goals::types::Goal;

/// A completable task granting a fixed XP reward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    /// Unique identifier
    pub id: Uuid,
    /// Display title
    pub title: String,
    /// Optional detailed description
    #[serde(default)]
    pub description: Option<String>,
    /// XP granted on completion
    #[serde(default = "default_xp_reward")]
    pub xp_reward: u32,
    /// Whether the quest resets daily
    #[serde(default = "default_true")]
    pub is_daily: bool,
    /// Whether the quest is completed for the current period
    #[serde(default)]
    pub is_completed: bool,
    /// Development branch the quest belongs to
    pub branch: Branch,
    /// Free-form category label
    #[serde(default)]
    pub category: Option<String>,
}

fn default_xp_reward() -> u32 {
    20
}

fn default_true() -> bool {
    true
}

impl Quest {
    /// Create an open daily quest.
    pub fn new(title: impl Into<String>, branch: Branch, xp_reward: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: None,
            xp_reward,
            is_daily: true,
            is_completed: false,
            branch,
            category: None,
        }
    }
}

/// Thematic development branch chosen at onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Branch {
    /// Strength and energy
    Power,
    /// Calm and resilience
    Stability,
    /// Health and longevity
    Longevity,
    /// Quests shared by every branch
    Global,
}

impl Branch {
    /// Wire name of the branch.
    pub fn as_str(&self) -> &'static str {
        match self {
            Branch::Power => "power",
            Branch::Stability => "stability",
            Branch::Longevity => "longevity",
            Branch::Global => "global",
        }
    }

    /// Get display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Branch::Power => "Power",
            Branch::Stability => "Stability",
            Branch::Longevity => "Longevity",
            Branch::Global => "Global",
        }
    }
}

impl std::fmt::Display for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.display_name())
    }
}

impl std::str::FromStr for Branch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "power" => Ok(Branch::Power),
            "stability" => Ok(Branch::Stability),
            "longevity" => Ok(Branch::Longevity),
            "global" => Ok(Branch::Global),
            other => Err(format!("unknown branch: {}", other)),
        }
    }
}

/// Extra reward granted once every daily quest is done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BonusReward {
    /// Bonus XP granted
    pub xp: u64,
    /// New level if the bonus itself caused a level-up
    pub level_up: Option<u32>,
}

/// Server-confirmed result of a quest completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOutcome {
    /// Base XP credited for the quest
    pub xp_gained: u64,
    /// New level if the base reward caused a level-up
    pub level_up: Option<u32>,
    /// Daily bonus, if it was awarded by this completion
    pub bonus: Option<BonusReward>,
    /// Goals whose level threshold is now met
    pub achieved_goals: Vec<Goal>,
}

impl CompletionOutcome {
    /// Highest level reported by either the base reward or the bonus.
    pub fn effective_level(&self) -> Option<u32> {
        let bonus_level = self.bonus.as_ref().and_then(|b| b.level_up);
        match (self.level_up, bonus_level) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        }
    }

    /// Total XP credited including the bonus.
    pub fn total_xp(&self) -> u64 {
        self.xp_gained
            .saturating_add(self.bonus.as_ref().map(|b| b.xp).unwrap_or(0))
    }
}

/// Lifecycle of a single completion attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionState {
    /// No completion in flight
    Idle,
    /// Optimistic state applied, awaiting the server
    Pending(Uuid),
    /// Server confirmed the completion
    Committed(Uuid),
    /// Server call failed and local state was restored
    RolledBack(Uuid),
}

impl CompletionState {
    /// Whether a completion is currently in flight.
    pub fn is_pending(&self) -> bool {
        matches!(self, CompletionState::Pending(_))
    }
}
