//! Unit tests for goal metrics, validation and achievement detection.

use lifequest::goals::types::MAX_GOAL_LEVEL;
use lifequest::goals::{goal_metrics, AchievementWatch, Goal, GoalDraft, GoalPatch, GoalValidationError};
use lifequest::progression::{total_xp_to_reach_level, ProgressRecord};

#[test]
fn test_metrics_midway_to_goal() {
    let progress = ProgressRecord::at_level(5, 0);
    let metrics = goal_metrics(&progress, 10, 50);

    let target = total_xp_to_reach_level(10);
    let current = total_xp_to_reach_level(5);
    assert_eq!(metrics.remaining, target - current);
    assert!((metrics.percent - current as f64 / target as f64 * 100.0).abs() < 1e-9);
    assert_eq!(metrics.eta_days, Some((target - current).div_ceil(50)));
}

#[test]
fn test_metrics_reached_goal_clamps() {
    let progress = ProgressRecord::at_level(12, 30);
    let metrics = goal_metrics(&progress, 10, 80);

    assert!(metrics.is_reached());
    assert_eq!(metrics.percent, 100.0);
    assert_eq!(metrics.eta_days, Some(0));
}

#[test]
fn test_metrics_without_rate_has_no_eta() {
    let progress = ProgressRecord::at_level(2, 10);
    let metrics = goal_metrics(&progress, 20, 0);
    assert_eq!(metrics.eta_days, None);
    assert!(metrics.remaining > 0);
}

#[test]
fn test_eta_rounds_up() {
    // 100 XP to level 2, 30 XP/day -> 4 days
    let metrics = goal_metrics(&ProgressRecord::default(), 2, 30);
    assert_eq!(metrics.remaining, 100);
    assert_eq!(metrics.eta_days, Some(4));
}

#[test]
fn test_draft_validation_bounds() {
    assert!(GoalDraft::new("Trip", 1).validate().is_ok());
    assert!(GoalDraft::new("Trip", MAX_GOAL_LEVEL).validate().is_ok());

    assert_eq!(
        GoalDraft::new("  ab  ", 10).validate(),
        Err(GoalValidationError::TextTooShort { min: 3, actual: 2 })
    );
    assert!(matches!(
        GoalDraft::new("Trip", 0).validate(),
        Err(GoalValidationError::LevelOutOfRange { level: 0, .. })
    ));
    assert!(matches!(
        GoalDraft::new("Trip", MAX_GOAL_LEVEL + 1).validate(),
        Err(GoalValidationError::LevelOutOfRange { .. })
    ));
}

#[test]
fn test_patch_validates_only_present_fields() {
    assert!(GoalPatch::default().validate().is_ok());

    let patch = GoalPatch {
        notes: Some("x".to_string()),
        ..Default::default()
    };
    assert!(patch.validate().is_ok());

    let patch = GoalPatch {
        goal_level: Some(99),
        ..Default::default()
    };
    assert!(patch.validate().is_err());
}

#[test]
fn test_watch_reports_each_goal_once() {
    let goals = vec![Goal::new("Headphones", 3), Goal::new("Bike", 8)];
    let mut watch = AchievementWatch::new();

    let found = watch.evaluate(&ProgressRecord::at_level(3, 0), &goals);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, goals[0].id);

    // Same level again: nothing new
    assert!(watch.evaluate(&ProgressRecord::at_level(3, 50), &goals).is_empty());

    // Crossing the second threshold reports only the new one
    let found = watch.evaluate(&ProgressRecord::at_level(9, 0), &goals);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, goals[1].id);
    assert_eq!(watch.len(), 2);
}

#[test]
fn test_watch_skips_completed_goals() {
    let mut done = Goal::new("Watch", 2);
    done.is_completed = true;
    let mut watch = AchievementWatch::new();

    assert!(watch.evaluate(&ProgressRecord::at_level(5, 0), &[done]).is_empty());
    assert!(watch.is_empty());
}

#[test]
fn test_watch_clear_starts_new_session() {
    let goals = vec![Goal::new("Concert", 2)];
    let progress = ProgressRecord::at_level(2, 0);
    let mut watch = AchievementWatch::new();

    assert_eq!(watch.evaluate(&progress, &goals).len(), 1);
    watch.clear();
    assert_eq!(watch.evaluate(&progress, &goals).len(), 1);
}

#[test]
fn test_two_satisfied_goals_each_reported_once() {
    let goals = vec![Goal::new("Sneakers", 2), Goal::new("Dinner out", 4)];
    let progress = ProgressRecord::at_level(6, 0);
    let mut watch = AchievementWatch::new();

    let mut reported = Vec::new();
    for _ in 0..5 {
        reported.extend(watch.evaluate(&progress, &goals));
    }

    assert_eq!(reported.len(), 2);
    assert!(reported.iter().any(|g| g.id == goals[0].id));
    assert!(reported.iter().any(|g| g.id == goals[1].id));
}
