//! Backend API surface consumed by the progression core.

use async_trait::async_trait;
use uuid::Uuid;

use super::types::{ApiError, CompleteQuestResponse, PrimaryGoalResponse};
use crate::goals::types::{Goal, GoalDraft, GoalPatch};
use crate::progression::ProgressRecord;
use crate::quests::types::{Branch, Quest};
use crate::session::types::{DailyXpStat, OnboardingData, User, UserRegistration};

/// The remote LifeQuest API. The server is authoritative for all of it.
///
/// Users are addressed by their Telegram id.
#[async_trait]
pub trait LifeQuestApi: Send + Sync {
    /// Register a user, or return the existing record.
    async fn register_user(&self, registration: &UserRegistration) -> Result<User, ApiError>;

    async fn get_user(&self, tg_id: i64) -> Result<User, ApiError>;

    async fn get_progress(&self, tg_id: i64) -> Result<ProgressRecord, ApiError>;

    /// Store profile answers, pick the first branch and seed the first goal.
    async fn complete_onboarding(
        &self,
        tg_id: i64,
        data: &OnboardingData,
    ) -> Result<(), ApiError>;

    /// Add a branch to the active set. PRO only; others get a 403.
    ///
    /// Returns the active branches after the change.
    async fn add_branch(&self, tg_id: i64, branch: Branch) -> Result<Vec<Branch>, ApiError>;

    /// Today's quests for the user's active branches.
    async fn get_quests(&self, tg_id: i64) -> Result<Vec<Quest>, ApiError>;

    async fn complete_quest(
        &self,
        tg_id: i64,
        quest_id: Uuid,
    ) -> Result<CompleteQuestResponse, ApiError>;

    async fn get_goals(&self, tg_id: i64) -> Result<Vec<Goal>, ApiError>;

    async fn create_goal(&self, tg_id: i64, draft: &GoalDraft) -> Result<Goal, ApiError>;

    async fn update_goal(
        &self,
        tg_id: i64,
        goal_id: Uuid,
        patch: &GoalPatch,
    ) -> Result<Goal, ApiError>;

    async fn complete_goal(&self, tg_id: i64, goal_id: Uuid) -> Result<Goal, ApiError>;

    /// Mark a goal's achievement as delivered to the user.
    async fn notify_goal(&self, tg_id: i64, goal_id: Uuid) -> Result<(), ApiError>;

    /// Replace the headline goal stored on the progress record.
    async fn update_primary_goal(
        &self,
        tg_id: i64,
        draft: &GoalDraft,
    ) -> Result<PrimaryGoalResponse, ApiError>;

    async fn get_daily_xp(&self, tg_id: i64) -> Result<DailyXpStat, ApiError>;

    async fn activate_pro(&self, tg_id: i64) -> Result<(), ApiError>;
}
