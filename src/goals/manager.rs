//! Reward goal management.
//!
//! Create, edit and complete goals against the backend, mirroring each
//! confirmed result into the progression store. Validation runs before any
//! network call and before any local mutation.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::types::{Goal, GoalDraft, GoalPatch, GoalValidationError};
use crate::api::{ApiError, LifeQuestApi};
use crate::progression::ProgressRecord;
use crate::store::{ProgressionStore, StoreEvent};

/// Manager for a user's reward goals.
pub struct GoalManager {
    api: Arc<dyn LifeQuestApi>,
    store: Arc<ProgressionStore>,
    tg_id: i64,
}

impl GoalManager {
    /// Create a goal manager for one user.
    pub fn new(api: Arc<dyn LifeQuestApi>, store: Arc<ProgressionStore>, tg_id: i64) -> Self {
        Self { api, store, tg_id }
    }

    /// Create a new goal.
    pub async fn create(&self, draft: &GoalDraft) -> Result<Goal, GoalError> {
        draft.validate()?;
        let draft = draft.normalized();
        let generation = self.store.generation();

        let goal = self.api.create_goal(self.tg_id, &draft).await?;
        tracing::info!("Created goal '{}' at level {}", goal.display_text(), goal.goal_level);

        self.mirror(generation, StoreEvent::GoalUpserted(goal.clone()))?;
        Ok(goal)
    }

    /// Update the present fields of a goal.
    pub async fn update(&self, goal_id: Uuid, patch: &GoalPatch) -> Result<Goal, GoalError> {
        patch.validate()?;
        self.require_local(goal_id)?;
        let patch = patch.normalized();
        let generation = self.store.generation();

        let goal = self.api.update_goal(self.tg_id, goal_id, &patch).await?;
        tracing::debug!("Updated goal {}", goal_id);

        self.mirror(generation, StoreEvent::GoalUpserted(goal.clone()))?;
        Ok(goal)
    }

    /// Mark a goal as completed.
    pub async fn complete(&self, goal_id: Uuid) -> Result<Goal, GoalError> {
        self.require_local(goal_id)?;
        let generation = self.store.generation();

        let goal = self.api.complete_goal(self.tg_id, goal_id).await?;
        tracing::info!("Completed goal '{}'", goal.display_text());

        self.mirror(generation, StoreEvent::GoalUpserted(goal.clone()))?;
        Ok(goal)
    }

    /// Record on the server that the user was told about a reached goal.
    pub async fn notify(&self, goal_id: Uuid) -> Result<(), GoalError> {
        let mut goal = self.require_local(goal_id)?;
        let generation = self.store.generation();

        self.api.notify_goal(self.tg_id, goal_id).await?;

        GoalPatch {
            notified_at: Some(Utc::now()),
            ..Default::default()
        }
        .apply_to(&mut goal);
        self.mirror(generation, StoreEvent::GoalUpserted(goal))
    }

    /// Reload all goals from the server.
    pub async fn refresh(&self) -> Result<Vec<Goal>, GoalError> {
        let generation = self.store.generation();
        let goals = self.api.get_goals(self.tg_id).await?;
        tracing::debug!("Loaded {} goals", goals.len());

        self.mirror(generation, StoreEvent::GoalsLoaded(goals.clone()))?;
        Ok(goals)
    }

    /// Replace the headline goal stored on the progress record.
    ///
    /// Only the goal fields of the server's answer are applied; XP fields
    /// stay under the control of quest completion.
    pub async fn set_primary(&self, draft: &GoalDraft) -> Result<ProgressRecord, GoalError> {
        draft.validate()?;
        let draft = draft.normalized();
        let generation = self.store.generation();

        let response = self.api.update_primary_goal(self.tg_id, &draft).await?;
        if !response.success {
            tracing::warn!("Server did not confirm headline goal update");
        }
        let server = response.progress;

        let state = self
            .store
            .dispatch_if_current(
                generation,
                StoreEvent::GoalDefinitionChanged {
                    goal_text: server.goal_text.or(Some(draft.goal_text)),
                    goal_level: server.goal_level.or(Some(draft.goal_level)),
                },
            )
            .ok_or(GoalError::Stale)?;
        Ok(state.progress)
    }

    fn require_local(&self, goal_id: Uuid) -> Result<Goal, GoalError> {
        self.store
            .snapshot()
            .goal(&goal_id)
            .cloned()
            .ok_or(GoalError::NotFound(goal_id))
    }

    fn mirror(&self, generation: u64, event: StoreEvent) -> Result<(), GoalError> {
        self.store
            .dispatch_if_current(generation, event)
            .map(|_| ())
            .ok_or(GoalError::Stale)
    }
}

/// Goal management errors.
#[derive(Debug, thiserror::Error)]
pub enum GoalError {
    #[error("Validation error: {0}")]
    Validation(#[from] GoalValidationError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Goal not found: {0}")]
    NotFound(Uuid),

    #[error("Session ended before the server answered")]
    Stale,
}
