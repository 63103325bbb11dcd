//! XP application with level rollover.
//!
//! Every function here is pure: it takes a record by reference and returns a
//! new one, so callers can keep the original as a rollback snapshot.

use super::curve::next_level_xp;
use super::types::ProgressRecord;

/// Apply an XP gain, cascading through as many level-ups as the gain covers.
pub fn apply_xp_gain(progress: &ProgressRecord, xp_gain: u64) -> ProgressRecord {
    let mut next = progress.clone();
    if xp_gain == 0 {
        return next;
    }

    next.current_xp = next.current_xp.saturating_add(xp_gain);
    next.total_xp = next.total_xp.saturating_add(xp_gain);
    roll_over(&mut next);
    next
}

/// Bring a record back to `current_xp < next_level_xp`.
///
/// Server payloads can carry a zero threshold or an overflowing in-level XP;
/// both are repaired against the level curve. Total XP is left untouched.
pub fn normalize(progress: &ProgressRecord) -> ProgressRecord {
    let mut next = progress.clone();
    if next.current_level == 0 {
        next.current_level = 1;
    }
    if next.next_level_xp == 0 {
        next.next_level_xp = next_level_xp(next.current_level);
    }
    roll_over(&mut next);
    next
}

/// Fill ratio of the in-level progress bar (0.0 - 1.0).
pub fn xp_ratio(progress: &ProgressRecord) -> f64 {
    if progress.next_level_xp == 0 {
        return 0.0;
    }
    (progress.current_xp as f64 / progress.next_level_xp as f64).clamp(0.0, 1.0)
}

fn roll_over(record: &mut ProgressRecord) {
    while record.current_xp >= record.next_level_xp {
        record.current_xp -= record.next_level_xp;
        record.current_level = record.current_level.saturating_add(1);
        record.next_level_xp = next_level_xp(record.current_level);
        if record.current_level == u32::MAX {
            // No level above; park the remainder below the threshold
            record.current_xp = record.current_xp.min(record.next_level_xp.saturating_sub(1));
            break;
        }
    }
}
