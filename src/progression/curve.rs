//! Level curve.
//!
//! XP cost of each level grows geometrically by 5% per level, rounded down,
//! starting at 100 XP for the 1 → 2 step.

/// XP required to go from level 1 to level 2.
pub const BASE_LEVEL_XP: u64 = 100;

/// Per-level growth factor of the XP cost.
pub const LEVEL_GROWTH: f64 = 1.05;

/// XP required to advance from `level` to `level + 1`.
///
/// Level 0 is not a valid level; it is priced like level 1.
pub fn next_level_xp(level: u32) -> u64 {
    let exponent = level.saturating_sub(1);
    let cost = BASE_LEVEL_XP as f64 * LEVEL_GROWTH.powi(exponent.min(i32::MAX as u32) as i32);
    // Float to int casts saturate, so very deep levels clamp at u64::MAX
    cost.floor() as u64
}

/// Cumulative XP needed to reach `level` starting from level 1 with 0 XP.
pub fn total_xp_to_reach_level(level: u32) -> u64 {
    (1..level).fold(0u64, |total, l| total.saturating_add(next_level_xp(l)))
}
