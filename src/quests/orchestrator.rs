//! Quest completion orchestration.
//!
//! One attempt runs `Idle -> Pending -> {Committed, RolledBack}`:
//! 1. Guard: at most one completion in flight across the session
//! 2. Optimistic: quest marked done and XP applied before any I/O
//! 3. Remote call to the backend
//! 4. Reconcile with the server (commit, refresh) or roll back to the snapshot
//! 5. Notify level-ups, daily bonus and achieved goals

use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

use super::types::{CompletionOutcome, CompletionState};
use crate::api::{ApiError, LifeQuestApi};
use crate::goals::tracker::AchievementWatch;
use crate::goals::types::Goal;
use crate::notify::{EventBus, LevelUpSource, ProgressionEvent};
use crate::progression::ProgressRecord;
use crate::store::{ProgressionStore, StoreEvent, Transaction};

/// Result of a committed completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionReport {
    pub quest_id: Uuid,
    /// What the server confirmed
    pub outcome: CompletionOutcome,
    /// Progress after reconciliation
    pub progress: ProgressRecord,
    /// Goals surfaced to the user by this completion
    pub newly_achieved: Vec<Goal>,
}

/// Quest completion errors.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("Another quest completion is in progress: {0}")]
    Busy(Uuid),

    #[error("Quest not found: {0}")]
    UnknownQuest(Uuid),

    #[error("Quest already completed: {0}")]
    AlreadyCompleted(Uuid),

    #[error("Quest completion failed: {0}")]
    Api(#[from] ApiError),

    #[error("Session ended before the server answered")]
    Stale,
}

/// Coordinates optimistic quest completion against the backend.
pub struct QuestCompletionOrchestrator {
    api: Arc<dyn LifeQuestApi>,
    store: Arc<ProgressionStore>,
    events: Arc<EventBus>,
    watch: Arc<Mutex<AchievementWatch>>,
    tg_id: i64,
    refresh_after_completion: bool,
    state: Mutex<CompletionState>,
}

impl QuestCompletionOrchestrator {
    /// Create an orchestrator for one user.
    pub fn new(
        api: Arc<dyn LifeQuestApi>,
        store: Arc<ProgressionStore>,
        events: Arc<EventBus>,
        watch: Arc<Mutex<AchievementWatch>>,
        tg_id: i64,
    ) -> Self {
        Self {
            api,
            store,
            events,
            watch,
            tg_id,
            refresh_after_completion: true,
            state: Mutex::new(CompletionState::Idle),
        }
    }

    /// Whether to re-fetch progress after a committed completion.
    pub fn with_refresh_after_completion(mut self, refresh: bool) -> Self {
        self.refresh_after_completion = refresh;
        self
    }

    /// Current attempt state.
    pub fn state(&self) -> CompletionState {
        *self.lock_state()
    }

    /// Quest currently in flight, if any.
    pub fn processing_quest(&self) -> Option<Uuid> {
        match self.state() {
            CompletionState::Pending(id) => Some(id),
            _ => None,
        }
    }

    /// Complete a quest optimistically and reconcile with the server.
    pub async fn complete_quest(&self, quest_id: Uuid) -> Result<CompletionReport, CompletionError> {
        let mut guard = self.try_begin(quest_id)?;

        let current = self.store.snapshot();
        let quest = current
            .quest(&quest_id)
            .ok_or(CompletionError::UnknownQuest(quest_id))?;
        if quest.is_completed {
            return Err(CompletionError::AlreadyCompleted(quest_id));
        }
        let xp_reward = quest.xp_reward as u64;

        tracing::info!("Completing quest '{}' (+{} XP)", quest.title, xp_reward);
        let transaction = Transaction::begin(
            &self.store,
            StoreEvent::Batch(vec![
                StoreEvent::QuestCompleted(quest_id),
                StoreEvent::XpGained(xp_reward),
            ]),
        );

        let response = self.api.complete_quest(self.tg_id, quest_id).await;

        if !transaction.is_current() {
            tracing::debug!("Discarding late completion response for {}", quest_id);
            return Err(CompletionError::Stale);
        }

        let response = match response {
            Ok(response) => response,
            Err(err) => {
                transaction.revert();
                guard.settle(CompletionState::RolledBack(quest_id));
                tracing::warn!("Quest {} completion failed, rolled back: {}", quest_id, err);
                return Err(CompletionError::Api(err));
            }
        };

        let generation = transaction.generation();
        let optimistic_level = transaction.applied().progress.current_level;
        if !transaction.commit() {
            tracing::debug!("Session closed before {} committed", quest_id);
            return Err(CompletionError::Stale);
        }

        let outcome = response.into_outcome(xp_reward, optimistic_level);
        if !self.reconcile(generation, &outcome).await {
            tracing::debug!("Session closed while reconciling {}, dropping events", quest_id);
            return Err(CompletionError::Stale);
        }
        let newly_achieved = self.notify(&outcome);

        guard.settle(CompletionState::Committed(quest_id));
        tracing::debug!("Quest {} committed", quest_id);

        Ok(CompletionReport {
            quest_id,
            outcome,
            progress: self.store.snapshot().progress,
            newly_achieved,
        })
    }

    /// Fold server truth into the store.
    ///
    /// Returns false once the session generation has moved on.
    async fn reconcile(&self, generation: u64, outcome: &CompletionOutcome) -> bool {
        let mut events = Vec::new();
        if let Some(bonus) = &outcome.bonus {
            events.push(StoreEvent::XpGained(bonus.xp));
        }
        events.extend(
            outcome
                .achieved_goals
                .iter()
                .cloned()
                .map(StoreEvent::GoalUpserted),
        );
        if !events.is_empty()
            && self
                .store
                .dispatch_if_current(generation, StoreEvent::Batch(events))
                .is_none()
        {
            return false;
        }

        if !self.refresh_after_completion {
            return true;
        }
        match self.api.get_progress(self.tg_id).await {
            Ok(progress) => {
                if self
                    .store
                    .dispatch_if_current(generation, StoreEvent::ProgressReplaced(progress))
                    .is_none()
                {
                    tracing::debug!("Discarding late progress refresh");
                }
            }
            Err(err) => {
                tracing::warn!("Progress refresh after completion failed, keeping local state: {}", err);
            }
        }
        self.store.generation() == generation
    }

    /// Publish one event per level-up, bonus and newly achieved goal.
    fn notify(&self, outcome: &CompletionOutcome) -> Vec<Goal> {
        if let Some(level) = outcome.level_up {
            self.events.publish(ProgressionEvent::LevelUp {
                level,
                source: LevelUpSource::Quest,
            });
        }
        if let Some(bonus) = &outcome.bonus {
            self.events
                .publish(ProgressionEvent::BonusAwarded { xp: bonus.xp });
            if let Some(level) = bonus.level_up {
                self.events.publish(ProgressionEvent::LevelUp {
                    level,
                    source: LevelUpSource::DailyBonus,
                });
            }
        }

        let state = self.store.snapshot();
        let newly_achieved = {
            let mut watch = lock(&self.watch);
            let mut found = watch.observe(outcome.achieved_goals.iter());
            found.extend(watch.evaluate(&state.progress, &state.goals));
            found
        };
        for goal in &newly_achieved {
            self.events
                .publish(ProgressionEvent::GoalAchieved { goal: goal.clone() });
        }
        newly_achieved
    }

    fn try_begin(&self, quest_id: Uuid) -> Result<InFlight<'_>, CompletionError> {
        let mut state = self.lock_state();
        if let CompletionState::Pending(in_flight) = *state {
            tracing::debug!("Rejecting completion of {}: {} in flight", quest_id, in_flight);
            return Err(CompletionError::Busy(in_flight));
        }
        *state = CompletionState::Pending(quest_id);
        Ok(InFlight {
            state: &self.state,
            settled: false,
        })
    }

    fn lock_state(&self) -> MutexGuard<'_, CompletionState> {
        lock(&self.state)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Clears the in-flight guard on every exit path.
struct InFlight<'a> {
    state: &'a Mutex<CompletionState>,
    settled: bool,
}

impl InFlight<'_> {
    fn settle(&mut self, terminal: CompletionState) {
        *lock(self.state) = terminal;
        self.settled = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            *lock(self.state) = CompletionState::Idle;
        }
    }
}
