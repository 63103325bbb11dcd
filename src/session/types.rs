//! User and session-level type definitions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::goals::types::{validate_goal_level, validate_goal_text, GoalValidationError};
use crate::quests::types::Branch;

/// A registered LifeQuest user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Backend identifier
    pub id: Uuid,
    /// Telegram user id, used to address the API
    pub tg_id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default = "default_language")]
    pub language_code: String,
    /// Whether the PRO tier is active
    #[serde(default)]
    pub is_pro: bool,
    /// Branches whose quests the user receives
    #[serde(default)]
    pub active_branches: Vec<Branch>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
}

fn default_language() -> String {
    "en".to_string()
}

impl User {
    /// Onboarding is finished once age and gender are known.
    pub fn is_onboarded(&self) -> bool {
        self.age.is_some() && self.gender.is_some()
    }

    /// Name shown in greetings.
    pub fn display_name(&self) -> &str {
        self.first_name
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or("Hero")
    }
}

/// Registration payload for `POST /users/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRegistration {
    pub tg_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub language_code: String,
}

impl UserRegistration {
    /// Registration with only the Telegram id.
    pub fn new(tg_id: i64) -> Self {
        Self {
            tg_id,
            username: None,
            first_name: None,
            last_name: None,
            language_code: default_language(),
        }
    }
}

/// Target level of the first goal when onboarding names none.
pub const DEFAULT_ONBOARDING_GOAL_LEVEL: u32 = 10;

/// Answers collected by onboarding, sent to `POST /users/{tg_id}/onboarding`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingData {
    pub age: u32,
    pub gender: String,
    /// First development branch
    pub branch: Branch,
    /// First reward goal, seeded when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal_text: Option<String>,
    #[serde(default = "default_goal_level")]
    pub goal_level: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selfie_url: Option<String>,
}

fn default_goal_level() -> u32 {
    DEFAULT_ONBOARDING_GOAL_LEVEL
}

impl OnboardingData {
    pub fn new(age: u32, gender: impl Into<String>, branch: Branch) -> Self {
        Self {
            age,
            gender: gender.into(),
            branch,
            goal_text: None,
            goal_level: DEFAULT_ONBOARDING_GOAL_LEVEL,
            selfie_url: None,
        }
    }

    /// Seed a first goal.
    pub fn with_goal(mut self, goal_text: impl Into<String>, goal_level: u32) -> Self {
        self.goal_text = Some(goal_text.into().trim().to_string());
        self.goal_level = goal_level;
        self
    }

    /// Check the goal part with the same rules as a goal draft.
    pub fn validate(&self) -> Result<(), GoalValidationError> {
        if let Some(text) = &self.goal_text {
            validate_goal_text(text)?;
        }
        validate_goal_level(self.goal_level)
    }
}

/// Observed daily XP rate for the user's branches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyXpStat {
    /// XP available per day including the bonus
    #[serde(default)]
    pub daily_xp: u64,
    /// Number of regular daily quests
    #[serde(default)]
    pub daily_quest_count: u32,
    /// XP of the all-dailies bonus
    #[serde(default)]
    pub bonus_xp: u64,
}
