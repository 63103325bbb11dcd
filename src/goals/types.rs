//! Reward goal type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Minimum goal text length after trimming.
pub const MIN_GOAL_TEXT_LEN: usize = 3;

/// Lowest level a goal may target.
pub const MIN_GOAL_LEVEL: u32 = 1;

/// Highest level a goal may target.
pub const MAX_GOAL_LEVEL: u32 = 50;

/// A user-defined reward unlocked at a target level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    /// Unique identifier
    pub id: Uuid,
    /// Reward description
    #[serde(default)]
    pub goal_text: Option<String>,
    /// Level at which the goal is achieved
    #[serde(default = "default_goal_level")]
    pub goal_level: u32,
    /// Whether the goal has been completed
    #[serde(default)]
    pub is_completed: bool,
    /// When the goal was completed
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// When the user was told the goal was reached
    #[serde(default)]
    pub notified_at: Option<DateTime<Utc>>,
    /// Free-form notes
    #[serde(default)]
    pub notes: Option<String>,
    /// Picture of the reward
    #[serde(default)]
    pub image_url: Option<String>,
    /// When the goal was created
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_goal_level() -> u32 {
    10
}

impl Goal {
    /// Create an open goal. Mostly useful for tests and local previews.
    pub fn new(goal_text: impl Into<String>, goal_level: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            goal_text: Some(goal_text.into()),
            goal_level,
            is_completed: false,
            completed_at: None,
            notified_at: None,
            notes: None,
            image_url: None,
            created_at: Some(Utc::now()),
        }
    }

    /// Display text, falling back to a placeholder.
    pub fn display_text(&self) -> &str {
        self.goal_text.as_deref().unwrap_or("Goal")
    }

    /// Whether the goal's level threshold is met at `level`.
    pub fn is_reached_at(&self, level: u32) -> bool {
        level >= self.goal_level
    }
}

/// Payload for creating a goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalDraft {
    /// Reward description
    pub goal_text: String,
    /// Target level
    pub goal_level: u32,
    /// Free-form notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Picture of the reward
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl GoalDraft {
    /// Create a draft with text and level only.
    pub fn new(goal_text: impl Into<String>, goal_level: u32) -> Self {
        Self {
            goal_text: goal_text.into(),
            goal_level,
            notes: None,
            image_url: None,
        }
    }

    /// Check text and level bounds.
    pub fn validate(&self) -> Result<(), GoalValidationError> {
        validate_goal_text(&self.goal_text)?;
        validate_goal_level(self.goal_level)
    }

    /// Copy of the draft with the text trimmed.
    pub fn normalized(&self) -> Self {
        Self {
            goal_text: self.goal_text.trim().to_string(),
            ..self.clone()
        }
    }
}

/// Partial update of a goal. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal_level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notified_at: Option<DateTime<Utc>>,
}

impl GoalPatch {
    /// Check the bounds of whichever fields are present.
    pub fn validate(&self) -> Result<(), GoalValidationError> {
        if let Some(text) = &self.goal_text {
            validate_goal_text(text)?;
        }
        if let Some(level) = self.goal_level {
            validate_goal_level(level)?;
        }
        Ok(())
    }

    /// Copy of the patch with the text trimmed.
    pub fn normalized(&self) -> Self {
        Self {
            goal_text: self.goal_text.as_ref().map(|t| t.trim().to_string()),
            ..self.clone()
        }
    }

    /// Apply the present fields to a local goal.
    pub fn apply_to(&self, goal: &mut Goal) {
        if let Some(text) = &self.goal_text {
            goal.goal_text = Some(text.clone());
        }
        if let Some(level) = self.goal_level {
            goal.goal_level = level;
        }
        if let Some(done) = self.is_completed {
            goal.is_completed = done;
        }
        if let Some(notes) = &self.notes {
            goal.notes = Some(notes.clone());
        }
        if let Some(url) = &self.image_url {
            goal.image_url = Some(url.clone());
        }
        if self.completed_at.is_some() {
            goal.completed_at = self.completed_at;
        }
        if self.notified_at.is_some() {
            goal.notified_at = self.notified_at;
        }
    }
}

/// Progress metrics towards a target level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalMetrics {
    /// Percent of the cumulative XP covered (0-100)
    pub percent: f64,
    /// XP still missing
    pub remaining: u64,
    /// Days at the observed daily rate; `None` without rate data
    pub eta_days: Option<u64>,
}

impl GoalMetrics {
    /// Whether the target is already reached.
    pub fn is_reached(&self) -> bool {
        self.remaining == 0
    }

    /// Percent rounded down for display.
    pub fn whole_percent(&self) -> u32 {
        self.percent.floor() as u32
    }
}

/// Goal validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GoalValidationError {
    #[error("Goal text must be at least {min} characters (got {actual})")]
    TextTooShort { min: usize, actual: usize },

    #[error("Goal level must be between {min} and {max} (got {level})")]
    LevelOutOfRange { level: u32, min: u32, max: u32 },
}

/// Validate goal text length after trimming.
pub fn validate_goal_text(text: &str) -> Result<(), GoalValidationError> {
    let actual = text.trim().chars().count();
    if actual < MIN_GOAL_TEXT_LEN {
        return Err(GoalValidationError::TextTooShort {
            min: MIN_GOAL_TEXT_LEN,
            actual,
        });
    }
    Ok(())
}

/// Validate the target level range.
pub fn validate_goal_level(level: u32) -> Result<(), GoalValidationError> {
    if !(MIN_GOAL_LEVEL..=MAX_GOAL_LEVEL).contains(&level) {
        return Err(GoalValidationError::LevelOutOfRange {
            level,
            min: MIN_GOAL_LEVEL,
            max: MAX_GOAL_LEVEL,
        });
    }
    Ok(())
}
