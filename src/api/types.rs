//! Wire types and error definitions for the backend API.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::goals::types::Goal;
use crate::progression::ProgressRecord;
use crate::quests::types::{BonusReward, Branch, CompletionOutcome};

/// Error types for backend API calls.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Connection could not be established or was dropped
    #[error("Network unavailable: {0}")]
    Network(String),

    /// Request did not complete in time
    #[error("Request timed out")]
    Timeout,

    /// Backend returned 5xx
    #[error("Server error ({status}): {detail}")]
    Server { status: u16, detail: String },

    /// Backend returned 404
    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend refused the request (400/403/409/422)
    #[error("Request rejected ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    /// Any other unexpected status
    #[error("Unexpected status {0}")]
    Status(u16),

    /// Body could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ApiError {
    /// Whether the failure is a transport problem rather than a server answer.
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Timeout)
    }

    /// Classify a non-success HTTP status with the body's detail message.
    pub fn from_status(status: u16, detail: Option<String>) -> Self {
        let detail = detail.unwrap_or_default();
        match status {
            404 => ApiError::NotFound(detail),
            400 | 403 | 409 | 422 => ApiError::Rejected { status, detail },
            500..=599 => ApiError::Server { status, detail },
            _ => ApiError::Status(status),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::Serialization(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::from_status(status.as_u16(), None)
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// FastAPI error body.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorDetail {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorDetail {
    /// Human-readable detail; FastAPI sends strings or validation arrays.
    pub fn message(&self) -> Option<String> {
        match &self.detail {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
            None => None,
        }
    }
}

/// Body of `POST /quests/complete`.
#[derive(Debug, Clone, Serialize)]
pub struct CompleteQuestRequest {
    pub quest_id: Uuid,
}

/// Raw response of `POST /quests/complete`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompleteQuestResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub xp_gained: Option<u64>,
    #[serde(default)]
    pub leveled_up: bool,
    #[serde(default)]
    pub new_level: Option<u32>,
    #[serde(default)]
    pub bonus_awarded: bool,
    #[serde(default)]
    pub bonus_xp: Option<u64>,
    #[serde(default)]
    pub bonus_leveled_up: bool,
    #[serde(default)]
    pub bonus_new_level: Option<u32>,
    #[serde(default)]
    pub achieved_goals: Vec<Goal>,
}

impl CompleteQuestResponse {
    /// Convert the flag soup into an explicit outcome.
    ///
    /// `fallback_xp` is used when the server omits `xp_gained`;
    /// `fallback_level` when it reports a level-up without the new level.
    pub fn into_outcome(self, fallback_xp: u64, fallback_level: u32) -> CompletionOutcome {
        let level_up = if self.leveled_up {
            Some(self.new_level.unwrap_or(fallback_level))
        } else {
            None
        };

        let bonus = if self.bonus_awarded {
            Some(BonusReward {
                xp: self.bonus_xp.unwrap_or(0),
                level_up: if self.bonus_leveled_up {
                    Some(
                        self.bonus_new_level
                            .or(self.new_level)
                            .unwrap_or(fallback_level),
                    )
                } else {
                    None
                },
            })
        } else {
            None
        };

        CompletionOutcome {
            xp_gained: self.xp_gained.unwrap_or(fallback_xp),
            level_up,
            bonus,
            achieved_goals: self.achieved_goals,
        }
    }
}

/// Response of `POST /users/{tg_id}/goal`.
#[derive(Debug, Clone, Deserialize)]
pub struct PrimaryGoalResponse {
    #[serde(default)]
    pub success: bool,
    pub progress: ProgressRecord,
}

/// Response of `POST /pro/activate` and `POST /onboarding`.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl ActionResponse {
    /// Turn a `success: false` answer into a rejection.
    pub fn into_result(self, refused: &str) -> Result<(), ApiError> {
        if self.success {
            Ok(())
        } else {
            Err(ApiError::Rejected {
                status: 200,
                detail: self.message.unwrap_or_else(|| refused.to_string()),
            })
        }
    }
}

/// Response of `POST /branches/add`.
#[derive(Debug, Clone, Deserialize)]
pub struct AddBranchResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub active_branches: Vec<Branch>,
}
