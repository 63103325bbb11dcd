//! Unit tests for XP application and level rollover.

use lifequest::progression::{apply_xp_gain, next_level_xp, normalize, xp_ratio, ProgressRecord};

#[test]
fn test_gain_below_threshold_stays_in_level() {
    let progress = ProgressRecord::at_level(1, 40);
    let next = apply_xp_gain(&progress, 30);

    assert_eq!(next.current_level, 1);
    assert_eq!(next.current_xp, 70);
    assert_eq!(next.next_level_xp, 100);
    assert_eq!(next.total_xp, 70);
}

#[test]
fn test_exact_threshold_levels_up_with_zero_remainder() {
    let progress = ProgressRecord::at_level(1, 80);
    let next = apply_xp_gain(&progress, 20);

    assert_eq!(next.current_level, 2);
    assert_eq!(next.current_xp, 0);
    assert_eq!(next.next_level_xp, 105);
}

#[test]
fn test_large_gain_cascades_through_levels() {
    // 90 + 250 = 340 -> L2 (240 left) -> L3 (135 left) -> L4 (25 left)
    let progress = ProgressRecord::at_level(1, 90);
    let next = apply_xp_gain(&progress, 250);

    assert_eq!(next.current_level, 4);
    assert_eq!(next.current_xp, 25);
    assert_eq!(next.next_level_xp, 115);
    assert_eq!(next.total_xp, 340);
}

#[test]
fn test_input_record_is_not_mutated() {
    let progress = ProgressRecord::at_level(3, 10);
    let before = progress.clone();
    let _ = apply_xp_gain(&progress, 1_000);
    assert_eq!(progress, before);
}

#[test]
fn test_gain_keeps_goal_fields() {
    let progress = ProgressRecord {
        goal_text: Some("New bike".to_string()),
        goal_level: Some(10),
        ..ProgressRecord::at_level(2, 0)
    };
    let next = apply_xp_gain(&progress, 500);
    assert_eq!(next.goal_text.as_deref(), Some("New bike"));
    assert_eq!(next.goal_level, Some(10));
}

#[test]
fn test_result_is_always_normalized() {
    let mut progress = ProgressRecord::default();
    for gain in [0, 1, 99, 100, 105, 333, 2_500, 17] {
        progress = apply_xp_gain(&progress, gain);
        assert!(progress.is_normalized(), "{:?}", progress);
        assert_eq!(progress.next_level_xp, next_level_xp(progress.current_level));
    }
}

#[test]
fn test_normalize_repairs_server_payload() {
    let raw = ProgressRecord {
        current_level: 0,
        current_xp: 150,
        next_level_xp: 0,
        total_xp: 150,
        ..Default::default()
    };
    let fixed = normalize(&raw);

    assert_eq!(fixed.current_level, 2);
    assert_eq!(fixed.current_xp, 50);
    assert_eq!(fixed.next_level_xp, 105);
    assert_eq!(fixed.total_xp, 150);
}

#[test]
fn test_xp_ratio() {
    assert_eq!(xp_ratio(&ProgressRecord::at_level(1, 50)), 0.5);
    assert_eq!(xp_ratio(&ProgressRecord::default()), 0.0);
}

#[test]
fn test_total_xp_accumulates_every_gain() {
    let mut progress = ProgressRecord::at_level(7, 33);
    for gain in [0, 5, 140, 1_000, 12] {
        let next = apply_xp_gain(&progress, gain);
        assert_eq!(next.total_xp, progress.total_xp + gain);
        progress = next;
    }
}

#[test]
fn test_zero_gain_is_identity() {
    let progress = ProgressRecord {
        goal_level: Some(15),
        goal_progress: Some(26),
        ..ProgressRecord::at_level(4, 60)
    };
    assert_eq!(apply_xp_gain(&progress, 0), progress);
}
