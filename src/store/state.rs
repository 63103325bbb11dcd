//! Session state and its reducer.

use uuid::Uuid;

use crate::goals::types::Goal;
use crate::progression::{apply_xp_gain, normalize, ProgressRecord};
use crate::quests::types::Quest;
use crate::session::types::{DailyXpStat, User};

/// Everything the client mirrors for one user session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// Bumped on reset; work started under an older generation is stale
    pub generation: u64,
    pub user: Option<User>,
    pub progress: ProgressRecord,
    pub quests: Vec<Quest>,
    pub goals: Vec<Goal>,
    pub daily_xp: Option<DailyXpStat>,
}

impl SessionState {
    /// Look up a quest by id.
    pub fn quest(&self, quest_id: &Uuid) -> Option<&Quest> {
        self.quests.iter().find(|q| q.id == *quest_id)
    }

    /// Look up a goal by id.
    pub fn goal(&self, goal_id: &Uuid) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id == *goal_id)
    }

    /// Goals that are still open.
    pub fn open_goals(&self) -> impl Iterator<Item = &Goal> {
        self.goals.iter().filter(|g| !g.is_completed)
    }

    /// Observed daily XP rate, zero when unknown.
    pub fn daily_rate(&self) -> u64 {
        self.daily_xp.map(|d| d.daily_xp).unwrap_or(0)
    }
}

/// A state transition. Applied through [`reduce`] only.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    UserLoaded(User),
    /// Server truth replaces the local progress record
    ProgressReplaced(ProgressRecord),
    /// Local (optimistic) XP gain
    XpGained(u64),
    /// Headline goal fields on the progress record changed
    GoalDefinitionChanged {
        goal_text: Option<String>,
        goal_level: Option<u32>,
    },
    QuestsLoaded(Vec<Quest>),
    QuestCompleted(Uuid),
    GoalsLoaded(Vec<Goal>),
    GoalUpserted(Goal),
    DailyXpLoaded(DailyXpStat),
    /// Undo an optimistic step: XP fields and quest flags from the snapshot
    Restore(Box<SessionState>),
    /// Several events applied as one atomic step
    Batch(Vec<StoreEvent>),
    /// Drop everything and start a new generation
    Reset,
}

/// Pure reducer: `state` is left untouched.
pub fn reduce(state: &SessionState, event: StoreEvent) -> SessionState {
    let mut next = state.clone();
    apply(&mut next, event);
    next
}

fn apply(state: &mut SessionState, event: StoreEvent) {
    match event {
        StoreEvent::UserLoaded(user) => state.user = Some(user),
        StoreEvent::ProgressReplaced(progress) => {
            let mut progress = normalize(&progress);
            fill_goal_progress(&mut progress);
            state.progress = progress;
        }
        StoreEvent::XpGained(xp) => {
            let mut progress = apply_xp_gain(&state.progress, xp);
            fill_goal_progress(&mut progress);
            state.progress = progress;
        }
        StoreEvent::GoalDefinitionChanged {
            goal_text,
            goal_level,
        } => {
            state.progress.goal_text = goal_text;
            state.progress.goal_level = goal_level;
            state.progress.goal_progress = None;
            fill_goal_progress(&mut state.progress);
        }
        StoreEvent::QuestsLoaded(quests) => state.quests = quests,
        StoreEvent::QuestCompleted(quest_id) => {
            if let Some(quest) = state.quests.iter_mut().find(|q| q.id == quest_id) {
                quest.is_completed = true;
            }
        }
        StoreEvent::GoalsLoaded(goals) => state.goals = goals,
        StoreEvent::GoalUpserted(goal) => {
            match state.goals.iter_mut().find(|g| g.id == goal.id) {
                Some(existing) => *existing = goal,
                None => state.goals.insert(0, goal),
            }
        }
        StoreEvent::DailyXpLoaded(stat) => state.daily_xp = Some(stat),
        StoreEvent::Restore(snapshot) => {
            state.progress.restore_progression(&snapshot.progress);
            fill_goal_progress(&mut state.progress);
            for quest in state.quests.iter_mut() {
                if let Some(before) = snapshot.quest(&quest.id) {
                    quest.is_completed = before.is_completed;
                }
            }
        }
        StoreEvent::Batch(events) => {
            for event in events {
                apply(state, event);
            }
        }
        StoreEvent::Reset => {
            *state = SessionState {
                generation: state.generation.wrapping_add(1),
                ..Default::default()
            };
        }
    }
}

/// Recompute the coarse headline-goal percentage the server would report.
fn fill_goal_progress(progress: &mut ProgressRecord) {
    if let Some(goal_level) = progress.goal_level {
        progress.goal_progress = Some(ProgressRecord::legacy_goal_progress(
            progress.current_level,
            goal_level,
        ));
    }
}
