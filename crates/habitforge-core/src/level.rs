//! Level and XP arithmetic.
//!
//! Levels are grouped in bands of three; every band costs 1.5x the
//! previous one. The functions here are pure -- the profile aggregate
//! owns the state and calls into this module on every XP mutation.

/// XP required to clear a level in the first band (levels 1-3).
pub const BASE_XP: i64 = 360;

/// Per-band requirement multiplier.
pub const GROWTH_FACTOR: f64 = 1.5;

/// Levels per requirement band.
const BAND_WIDTH: u32 = 3;

/// A title tier. Resolution picks the highest tier whose `min_level`
/// the given level reaches.
#[derive(Debug, Clone, Copy)]
pub struct LevelTitle {
    pub min_level: u32,
    pub title: &'static str,
}

/// Ascending title tiers. Tier 1 covers every valid level, so
/// resolution always finds a match.
pub const LEVEL_TITLES: &[LevelTitle] = &[
    LevelTitle { min_level: 1, title: "Novice" },
    LevelTitle { min_level: 5, title: "Apprentice" },
    LevelTitle { min_level: 10, title: "Habit Master" },
    LevelTitle { min_level: 20, title: "Grandmaster" },
    LevelTitle { min_level: 50, title: "Legend" },
];

/// XP required to advance past `level`.
///
/// Constant within each 3-level band, 1.5x per band, floored to an
/// integer. Monotonically non-decreasing in `level`.
pub fn required_xp(level: u32) -> i64 {
    let band = level.saturating_sub(1) / BAND_WIDTH;
    (BASE_XP as f64 * GROWTH_FACTOR.powi(band as i32)).floor() as i64
}

/// Title for `level`, resolved from the highest matching tier.
pub fn title_for_level(level: u32) -> &'static str {
    LEVEL_TITLES
        .iter()
        .rev()
        .find(|tier| level >= tier.min_level)
        .unwrap_or(&LEVEL_TITLES[0])
        .title
}

/// Outcome of applying an XP delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelChange {
    pub level: u32,
    pub xp: i64,
    pub leveled_up: bool,
    pub leveled_down: bool,
}

/// Apply `delta` XP to `(level, current_xp)` and normalize.
///
/// A negative balance walks levels down, refunding the requirement of
/// each newly reached level; level 1 is the floor and XP clamps at 0
/// there. A balance at or above the current requirement walks levels
/// up, possibly several at once. The returned flags are the only
/// signal that a level transition occurred.
pub fn apply_xp_delta(level: u32, current_xp: i64, delta: i64) -> LevelChange {
    let mut level = level.max(1);
    let start_level = level;
    let mut xp = current_xp + delta;

    while xp < 0 {
        if level > 1 {
            level -= 1;
            xp += required_xp(level);
        } else {
            xp = 0;
            break;
        }
    }

    while xp >= required_xp(level) {
        xp -= required_xp(level);
        level += 1;
    }

    LevelChange {
        level,
        xp,
        leveled_up: level > start_level,
        leveled_down: level < start_level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn required_xp_constant_within_band() {
        assert_eq!(required_xp(1), 360);
        assert_eq!(required_xp(2), 360);
        assert_eq!(required_xp(3), 360);
        assert_eq!(required_xp(4), 540);
        assert_eq!(required_xp(6), 540);
        assert_eq!(required_xp(7), 810);
    }

    #[test]
    fn titles_resolve_highest_matching_tier() {
        assert_eq!(title_for_level(1), "Novice");
        assert_eq!(title_for_level(4), "Novice");
        assert_eq!(title_for_level(5), "Apprentice");
        assert_eq!(title_for_level(19), "Habit Master");
        assert_eq!(title_for_level(20), "Grandmaster");
        assert_eq!(title_for_level(75), "Legend");
    }

    #[test]
    fn gaining_past_requirement_levels_up() {
        let change = apply_xp_delta(1, 0, 400);
        assert_eq!(change.level, 2);
        assert_eq!(change.xp, 40);
        assert!(change.leveled_up);
        assert!(!change.leveled_down);
    }

    #[test]
    fn large_gain_levels_up_multiple_times() {
        // 360 + 360 + 360 clears the whole first band.
        let change = apply_xp_delta(1, 0, 1100);
        assert_eq!(change.level, 4);
        assert_eq!(change.xp, 20);
        assert!(change.leveled_up);
    }

    #[test]
    fn deficit_descends_and_clamps_at_level_one() {
        // -500 from (2, 40): deficit 460, refund level 1's 360 -> -100,
        // floor at level 1 clamps to zero.
        let change = apply_xp_delta(2, 40, -500);
        assert_eq!(change.level, 1);
        assert_eq!(change.xp, 0);
        assert!(change.leveled_down);
        assert!(!change.leveled_up);
    }

    #[test]
    fn deficit_without_clamp_descends_exactly() {
        let change = apply_xp_delta(2, 40, -100);
        assert_eq!(change.level, 1);
        assert_eq!(change.xp, 300);
        assert!(change.leveled_down);
    }

    #[test]
    fn zero_delta_is_identity() {
        let change = apply_xp_delta(7, 123, 0);
        assert_eq!(change.level, 7);
        assert_eq!(change.xp, 123);
        assert!(!change.leveled_up);
        assert!(!change.leveled_down);
    }

    proptest! {
        #[test]
        fn required_xp_is_monotone(level in 1u32..200) {
            prop_assert!(required_xp(level + 1) >= required_xp(level));
        }

        #[test]
        fn apply_then_revert_round_trips(
            level in 1u32..60,
            frac in 0i64..360,
            delta in 0i64..20_000,
        ) {
            // Valid resting state: 0 <= xp < required_xp(level).
            let xp = frac.min(required_xp(level) - 1);
            let up = apply_xp_delta(level, xp, delta);
            let down = apply_xp_delta(up.level, up.xp, -delta);
            // Positive deltas never clamp, so the round trip is exact.
            prop_assert_eq!(down.level, level);
            prop_assert_eq!(down.xp, xp);
        }

        #[test]
        fn result_is_always_normalized(
            level in 1u32..60,
            xp in 0i64..10_000,
            delta in -50_000i64..50_000,
        ) {
            let change = apply_xp_delta(level, xp, delta);
            prop_assert!(change.level >= 1);
            prop_assert!(change.xp >= 0);
            prop_assert!(change.xp < required_xp(change.level));
        }
    }
}
