//! Progression notifications.
//!
//! The core never renders anything; it publishes [`ProgressionEvent`]s and
//! the presentation layer decides how to show them.

use std::sync::Mutex;

use crossbeam::channel::{unbounded, Receiver, Sender};

use crate::goals::types::Goal;

/// Where a level-up came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelUpSource {
    /// The quest's own XP reward
    Quest,
    /// The all-dailies bonus granted with it
    DailyBonus,
}

/// A user-visible progression event.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressionEvent {
    /// A new level was reached
    LevelUp { level: u32, source: LevelUpSource },
    /// The all-dailies bonus was granted
    BonusAwarded { xp: u64 },
    /// A goal's target level was reached
    GoalAchieved { goal: Goal },
}

impl ProgressionEvent {
    /// Short text suitable for a toast or log line.
    pub fn summary(&self) -> String {
        match self {
            ProgressionEvent::LevelUp { level, source } => match source {
                LevelUpSource::Quest => format!("Level up! You reached level {}", level),
                LevelUpSource::DailyBonus => {
                    format!("Daily bonus level up! You reached level {}", level)
                }
            },
            ProgressionEvent::BonusAwarded { xp } => {
                format!("All daily quests done: +{} bonus XP", xp)
            }
            ProgressionEvent::GoalAchieved { goal } => format!(
                "Goal reached at level {}: {}",
                goal.goal_level,
                goal.display_text()
            ),
        }
    }
}

/// Fan-out of progression events to any number of subscribers.
///
/// Each subscriber gets its own channel and sees every event in publish
/// order. Dropped receivers are pruned on the next publish.
#[derive(Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<Sender<ProgressionEvent>>>,
}

impl EventBus {
    /// Create a bus with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber.
    pub fn subscribe(&self) -> Receiver<ProgressionEvent> {
        let (tx, rx) = unbounded();
        match self.subscribers.lock() {
            Ok(mut subscribers) => subscribers.push(tx),
            Err(poisoned) => poisoned.into_inner().push(tx),
        }
        rx
    }

    /// Publish an event to every live subscriber.
    pub fn publish(&self, event: ProgressionEvent) {
        tracing::info!("{}", event.summary());
        let mut subscribers = match self.subscribers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Number of live subscribers as of the last publish.
    pub fn subscriber_count(&self) -> usize {
        match self.subscribers.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}
