//! User session lifecycle.
//!
//! Wires the store, notification bus, quest orchestrator and goal manager
//! together for one user, and keeps the mirror in sync with the backend.

use std::sync::{Arc, Mutex, MutexGuard};

use crossbeam::channel::Receiver;
use uuid::Uuid;

use super::types::{OnboardingData, User, UserRegistration};
use crate::api::{ApiError, LifeQuestApi};
use crate::config::SessionSettings;
use crate::goals::tracker::{goal_metrics, AchievementWatch};
use crate::goals::types::{Goal, GoalMetrics, GoalValidationError};
use crate::goals::GoalManager;
use crate::notify::{EventBus, ProgressionEvent};
use crate::quests::{Branch, CompletionError, CompletionReport, QuestCompletionOrchestrator};
use crate::store::{ProgressionStore, SessionState, StoreEvent};

/// Metrics for one open goal.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalOverview {
    pub goal: Goal,
    pub metrics: GoalMetrics,
}

/// Session errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Onboarding must be completed first")]
    OnboardingRequired,

    #[error("Invalid onboarding goal: {0}")]
    InvalidGoal(#[from] GoalValidationError),

    #[error("Session ended before the server answered")]
    Stale,
}

/// One user's live session.
pub struct Session {
    api: Arc<dyn LifeQuestApi>,
    store: Arc<ProgressionStore>,
    events: Arc<EventBus>,
    watch: Arc<Mutex<AchievementWatch>>,
    orchestrator: QuestCompletionOrchestrator,
    goals: GoalManager,
    tg_id: i64,
}

impl Session {
    /// Build an empty session for a user without touching the network.
    pub fn new(api: Arc<dyn LifeQuestApi>, tg_id: i64, settings: &SessionSettings) -> Self {
        let store = Arc::new(ProgressionStore::new());
        let events = Arc::new(EventBus::new());
        let watch = Arc::new(Mutex::new(AchievementWatch::new()));

        let orchestrator = QuestCompletionOrchestrator::new(
            api.clone(),
            store.clone(),
            events.clone(),
            watch.clone(),
            tg_id,
        )
        .with_refresh_after_completion(settings.refresh_after_completion);
        let goals = GoalManager::new(api.clone(), store.clone(), tg_id);

        Self {
            api,
            store,
            events,
            watch,
            orchestrator,
            goals,
            tg_id,
        }
    }

    /// Register (or look up) the user and load the session.
    ///
    /// Users who have not finished onboarding get a session holding only
    /// their user record; see [`Session::needs_onboarding`].
    pub async fn start(
        api: Arc<dyn LifeQuestApi>,
        registration: &UserRegistration,
        settings: &SessionSettings,
    ) -> Result<Self, SessionError> {
        let session = Self::new(api, registration.tg_id, settings);

        let user = session.api.register_user(registration).await?;
        tracing::info!("Session started for {} (tg {})", user.display_name(), user.tg_id);
        let onboarded = user.is_onboarded();
        session.store.dispatch(StoreEvent::UserLoaded(user));

        if onboarded {
            session.refresh().await?;
        } else {
            tracing::info!("User {} has not completed onboarding", session.tg_id);
        }
        Ok(session)
    }

    /// Telegram id of the session's user.
    pub fn tg_id(&self) -> i64 {
        self.tg_id
    }

    /// Current mirrored state.
    pub fn state(&self) -> SessionState {
        self.store.snapshot()
    }

    /// The underlying store, for UIs that want to observe state changes.
    pub fn store(&self) -> &Arc<ProgressionStore> {
        &self.store
    }

    /// Goal operations for this user.
    pub fn goals(&self) -> &GoalManager {
        &self.goals
    }

    /// Quest completion for this user.
    pub fn orchestrator(&self) -> &QuestCompletionOrchestrator {
        &self.orchestrator
    }

    /// Subscribe to level-up, bonus and goal notifications.
    pub fn subscribe(&self) -> Receiver<ProgressionEvent> {
        self.events.subscribe()
    }

    /// Whether the user record lacks onboarding data.
    pub fn needs_onboarding(&self) -> bool {
        self.store
            .snapshot()
            .user
            .map(|u| !u.is_onboarded())
            .unwrap_or(true)
    }

    /// Reload user, progress, quests, goals and daily rate from the server.
    pub async fn refresh(&self) -> Result<SessionState, SessionError> {
        let generation = self.store.generation();

        let user = self.api.get_user(self.tg_id).await?;
        if !user.is_onboarded() {
            self.apply(generation, StoreEvent::UserLoaded(user))?;
            return Err(SessionError::OnboardingRequired);
        }
        let progress = self.api.get_progress(self.tg_id).await?;
        let quests = self.api.get_quests(self.tg_id).await?;
        let goals = self.api.get_goals(self.tg_id).await?;

        let mut events = vec![
            StoreEvent::UserLoaded(user),
            StoreEvent::ProgressReplaced(progress),
            StoreEvent::QuestsLoaded(quests),
            StoreEvent::GoalsLoaded(goals),
        ];
        match self.api.get_daily_xp(self.tg_id).await {
            Ok(stat) => events.push(StoreEvent::DailyXpLoaded(stat)),
            Err(err) => tracing::warn!("Daily XP unavailable, ETAs disabled: {}", err),
        }

        let state = self.apply(generation, StoreEvent::Batch(events))?;
        tracing::debug!(
            "Refreshed: level {} ({} / {} XP), {} quests, {} goals",
            state.progress.current_level,
            state.progress.current_xp,
            state.progress.next_level_xp,
            state.quests.len(),
            state.goals.len()
        );

        self.check_goals();
        Ok(state)
    }

    /// Complete a quest; see [`QuestCompletionOrchestrator::complete_quest`].
    pub async fn complete_quest(&self, quest_id: Uuid) -> Result<CompletionReport, CompletionError> {
        self.orchestrator.complete_quest(quest_id).await
    }

    /// Surface goals newly reached at the current level, once each.
    pub fn check_goals(&self) -> Vec<Goal> {
        let state = self.store.snapshot();
        let found = lock(&self.watch).evaluate(&state.progress, &state.goals);
        for goal in &found {
            self.events
                .publish(ProgressionEvent::GoalAchieved { goal: goal.clone() });
        }
        found
    }

    /// Metrics for every open goal at the observed daily rate.
    pub fn goal_overview(&self) -> Vec<GoalOverview> {
        let state = self.store.snapshot();
        let rate = state.daily_rate();
        let mut overview: Vec<_> = state
            .open_goals()
            .map(|goal| GoalOverview {
                goal: goal.clone(),
                metrics: goal_metrics(&state.progress, goal.goal_level, rate),
            })
            .collect();
        overview.sort_by_key(|o| o.goal.goal_level);
        overview
    }

    /// Metrics for the headline goal on the progress record.
    pub fn headline_metrics(&self) -> Option<GoalMetrics> {
        let state = self.store.snapshot();
        state
            .progress
            .goal_level
            .map(|level| goal_metrics(&state.progress, level, state.daily_rate()))
    }

    /// Finish onboarding and load the session data it unlocks.
    ///
    /// The goal part is validated before any network call.
    pub async fn complete_onboarding(&self, data: &OnboardingData) -> Result<User, SessionError> {
        data.validate()?;
        let generation = self.store.generation();
        self.api.complete_onboarding(self.tg_id, data).await?;
        let user = self.api.get_user(self.tg_id).await?;
        tracing::info!(
            "Onboarding completed for {} on branch {}",
            user.display_name(),
            data.branch
        );

        self.apply(generation, StoreEvent::UserLoaded(user.clone()))?;
        self.refresh().await?;
        Ok(user)
    }

    /// Add a development branch and reload the user and today's quests.
    pub async fn add_branch(&self, branch: Branch) -> Result<Vec<Branch>, SessionError> {
        let generation = self.store.generation();
        let branches = self.api.add_branch(self.tg_id, branch).await?;
        let user = self.api.get_user(self.tg_id).await?;
        let quests = self.api.get_quests(self.tg_id).await?;
        tracing::info!("Branch {} added, {} quests today", branch, quests.len());

        self.apply(
            generation,
            StoreEvent::Batch(vec![
                StoreEvent::UserLoaded(user),
                StoreEvent::QuestsLoaded(quests),
            ]),
        )?;
        Ok(branches)
    }

    /// Activate the PRO tier and reload the user record.
    ///
    /// PRO grants features server-side; it does not change XP rewards.
    pub async fn activate_pro(&self) -> Result<User, SessionError> {
        let generation = self.store.generation();
        self.api.activate_pro(self.tg_id).await?;
        let user = self.api.get_user(self.tg_id).await?;
        tracing::info!("PRO activated for {}", user.display_name());

        self.apply(generation, StoreEvent::UserLoaded(user.clone()))?;
        Ok(user)
    }

    /// End the session. Responses still in flight are discarded.
    pub fn close(&self) {
        let generation = self.store.reset();
        lock(&self.watch).clear();
        tracing::info!("Session closed (generation {})", generation);
    }

    fn apply(&self, generation: u64, event: StoreEvent) -> Result<SessionState, SessionError> {
        self.store
            .dispatch_if_current(generation, event)
            .ok_or(SessionError::Stale)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
