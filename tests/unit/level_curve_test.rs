//! Unit tests for the level curve.

use lifequest::progression::{next_level_xp, total_xp_to_reach_level};

#[test]
fn test_known_level_costs() {
    // floor(100 * 1.05^(level - 1))
    let expected = [(1, 100), (2, 105), (3, 110), (4, 115), (5, 121), (10, 155)];
    for (level, xp) in expected {
        assert_eq!(next_level_xp(level), xp, "level {}", level);
    }
}

#[test]
fn test_costs_never_decrease() {
    for level in 1..500 {
        assert!(next_level_xp(level + 1) >= next_level_xp(level));
    }
}

#[test]
fn test_cumulative_matches_sum_of_steps() {
    let mut running = 0u64;
    for level in 1..=60 {
        assert_eq!(total_xp_to_reach_level(level), running);
        running += next_level_xp(level);
    }
}

#[test]
fn test_level_ten_threshold() {
    // 100 + 105 + 110 + 115 + 121 + 127 + 134 + 140 + 147
    assert_eq!(total_xp_to_reach_level(10), 1099);
}

#[test]
fn test_extreme_levels_saturate() {
    assert_eq!(next_level_xp(u32::MAX), u64::MAX);
    assert!(total_xp_to_reach_level(5_000) > total_xp_to_reach_level(50));
}
