//! Integration tests for reward goal management.

use std::sync::Arc;

use lifequest::config::SessionSettings;
use lifequest::goals::{Goal, GoalDraft, GoalError, GoalPatch, GoalValidationError};
use lifequest::progression::ProgressRecord;
use lifequest::session::{Session, UserRegistration};
use lifequest::store::StoreEvent;

use crate::mock_api::{MockApi, TG_ID};

async fn start(api: &Arc<MockApi>) -> Session {
    Session::start(
        api.clone(),
        &UserRegistration::new(TG_ID),
        &SessionSettings::default(),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_invalid_draft_makes_no_call_and_no_change() {
    let api = Arc::new(MockApi::new());
    let session = start(&api).await;
    let before = session.state();

    let short = session.goals().create(&GoalDraft::new(" ok ", 10)).await;
    assert!(matches!(
        short,
        Err(GoalError::Validation(GoalValidationError::TextTooShort { .. }))
    ));

    let too_high = session.goals().create(&GoalDraft::new("Vacation", 51)).await;
    assert!(matches!(
        too_high,
        Err(GoalError::Validation(GoalValidationError::LevelOutOfRange { .. }))
    ));

    assert_eq!(api.call_count("create_goal"), 0);
    assert_eq!(session.state(), before);
}

#[tokio::test]
async fn test_create_mirrors_trimmed_goal() {
    let api = Arc::new(MockApi::new());
    let session = start(&api).await;
    let existing = session.goals().create(&GoalDraft::new("Old goal", 4)).await.unwrap();

    let goal = session
        .goals()
        .create(&GoalDraft::new("  New headphones  ", 5))
        .await
        .unwrap();

    assert_eq!(goal.goal_text.as_deref(), Some("New headphones"));
    let state = session.state();
    assert_eq!(state.goals.len(), 2);
    assert_eq!(state.goals[0].id, goal.id);
    assert_eq!(state.goals[1].id, existing.id);
}

#[tokio::test]
async fn test_update_applies_only_present_fields() {
    let api = Arc::new(MockApi::new());
    let session = start(&api).await;
    let goal = session.goals().create(&GoalDraft::new("Concert", 7)).await.unwrap();

    let patch = GoalPatch {
        goal_level: Some(9),
        notes: Some("Front row".to_string()),
        ..Default::default()
    };
    let updated = session.goals().update(goal.id, &patch).await.unwrap();

    assert_eq!(updated.goal_level, 9);
    assert_eq!(updated.goal_text.as_deref(), Some("Concert"));
    assert_eq!(session.state().goal(&goal.id), Some(&updated));
}

#[tokio::test]
async fn test_invalid_patch_rejected_before_network() {
    let api = Arc::new(MockApi::new());
    let session = start(&api).await;
    let goal = session.goals().create(&GoalDraft::new("Bike", 7)).await.unwrap();

    let patch = GoalPatch {
        goal_level: Some(0),
        ..Default::default()
    };
    let result = session.goals().update(goal.id, &patch).await;

    assert!(matches!(result, Err(GoalError::Validation(_))));
    assert_eq!(api.call_count("update_goal"), 0);
    assert_eq!(session.state().goal(&goal.id).unwrap().goal_level, 7);
}

#[tokio::test]
async fn test_unknown_goal_is_not_found_locally() {
    let api = Arc::new(MockApi::new());
    let session = start(&api).await;

    let result = session.goals().complete(uuid::Uuid::new_v4()).await;

    assert!(matches!(result, Err(GoalError::NotFound(_))));
    assert_eq!(api.call_count("complete_goal"), 0);
}

#[tokio::test]
async fn test_completed_goal_leaves_overview() {
    let api = Arc::new(MockApi::new());
    let session = start(&api).await;
    let goal = session.goals().create(&GoalDraft::new("Camera", 3)).await.unwrap();
    assert_eq!(session.goal_overview().len(), 1);

    let done = session.goals().complete(goal.id).await.unwrap();

    assert!(done.is_completed);
    assert!(done.completed_at.is_some());
    assert!(session.goal_overview().is_empty());
}

#[tokio::test]
async fn test_notify_marks_goal_delivered() {
    let api = Arc::new(MockApi::new());
    let goal = Goal::new("Spa day", 1);
    api.edit(|s| s.goals = vec![goal.clone()]);
    let session = start(&api).await;

    session.goals().notify(goal.id).await.unwrap();

    assert_eq!(api.call_count("notify_goal"), 1);
    assert!(session.state().goal(&goal.id).unwrap().notified_at.is_some());
}

#[tokio::test]
async fn test_refresh_replaces_goal_list() {
    let api = Arc::new(MockApi::new());
    let session = start(&api).await;
    api.edit(|s| s.goals = vec![Goal::new("A", 2), Goal::new("B", 3)]);

    let goals = session.goals().refresh().await.unwrap();

    assert_eq!(goals.len(), 2);
    assert_eq!(session.state().goals, goals);
}

#[tokio::test]
async fn test_primary_goal_does_not_touch_xp() {
    let api = Arc::new(MockApi::new());
    let session = start(&api).await;

    // Local XP the server has not confirmed yet
    session.store().dispatch(StoreEvent::XpGained(150));
    let local = session.state().progress;

    let progress = session
        .goals()
        .set_primary(&GoalDraft::new("Marathon", 10))
        .await
        .unwrap();

    assert_eq!(progress.goal_text.as_deref(), Some("Marathon"));
    assert_eq!(progress.goal_level, Some(10));
    assert_eq!(progress.goal_progress, Some(20));
    assert_eq!(progress.current_level, local.current_level);
    assert_eq!(progress.current_xp, local.current_xp);
    assert_ne!(progress.current_xp, ProgressRecord::default().current_xp);
}
