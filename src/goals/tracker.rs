//! Goal progress metrics and achievement detection.
//!
//! Metrics are computed on the cumulative XP axis, so a level plus the XP
//! inside that level can be compared against any target level.

use std::collections::HashSet;

use uuid::Uuid;

use super::types::{Goal, GoalMetrics};
use crate::progression::{total_xp_to_reach_level, ProgressRecord};

/// Percent, remaining XP and ETA towards `goal_level`.
///
/// `eta_days` is `None` when `daily_xp` is zero: there is no rate to project
/// from, which is different from "zero days left".
pub fn goal_metrics(progress: &ProgressRecord, goal_level: u32, daily_xp: u64) -> GoalMetrics {
    let target_total = total_xp_to_reach_level(goal_level);
    let current_total = progress.cumulative_xp();
    let remaining = target_total.saturating_sub(current_total);

    let percent = if target_total > 0 {
        (current_total as f64 / target_total as f64 * 100.0).clamp(0.0, 100.0)
    } else {
        100.0
    };

    let eta_days = if daily_xp > 0 {
        Some(remaining.div_ceil(daily_xp))
    } else {
        None
    };

    GoalMetrics {
        percent,
        remaining,
        eta_days,
    }
}

/// Open goals whose level threshold is met by the current level.
///
/// Stateless; returns the same goals every time it is asked. `notified_at`
/// is not consulted, so announcements are deduplicated per session only.
pub fn achievable_goals<'a>(progress: &ProgressRecord, goals: &'a [Goal]) -> Vec<&'a Goal> {
    goals
        .iter()
        .filter(|goal| !goal.is_completed && goal.is_reached_at(progress.current_level))
        .collect()
}

/// Session-scoped record of which goals were already surfaced.
#[derive(Debug, Default, Clone)]
pub struct AchievementWatch {
    seen: HashSet<Uuid>,
}

impl AchievementWatch {
    /// Create an empty watch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the goals from `candidates` not surfaced before, marking them seen.
    ///
    /// Duplicates inside `candidates` are reported once.
    pub fn observe<'a, I>(&mut self, candidates: I) -> Vec<Goal>
    where
        I: IntoIterator<Item = &'a Goal>,
    {
        candidates
            .into_iter()
            .filter(|goal| self.seen.insert(goal.id))
            .cloned()
            .collect()
    }

    /// Evaluate `goals` against `progress` and return newly eligible ones.
    pub fn evaluate(&mut self, progress: &ProgressRecord, goals: &[Goal]) -> Vec<Goal> {
        self.observe(achievable_goals(progress, goals))
    }

    /// Whether a goal was already surfaced.
    pub fn has_seen(&self, goal_id: &Uuid) -> bool {
        self.seen.contains(goal_id)
    }

    /// Mark a goal as surfaced without reporting it.
    pub fn mark_seen(&mut self, goal_id: Uuid) {
        self.seen.insert(goal_id);
    }

    /// Number of goals surfaced so far.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether nothing has been surfaced yet.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Forget everything (new session).
    pub fn clear(&mut self) {
        self.seen.clear();
    }
}
