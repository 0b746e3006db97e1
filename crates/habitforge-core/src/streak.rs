//! Streak computation over sparse completion records.
//!
//! A [`CompletionRecord`] stores only the days an entity was actually
//! completed. The current streak is recomputed from scratch on every
//! toggle -- toggling a past date can change the chain length, so
//! incremental maintenance would go stale.
//!
//! The aggregate best streak (overview statistics) is a different
//! measure: the longest run of consecutive days on which *any* tracked
//! entity was completed. It is also distinct from the profile's global
//! check-in streak, which is maintained incrementally.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Upper bound on the backward walk when recomputing a streak.
pub const MAX_LOOKBACK_DAYS: i64 = 365;

/// Sparse per-entity completion history with cached derived values.
///
/// Only `true` entries are stored; an absent date means not completed.
/// `streak` and `last_completed` are caches, refreshed by
/// [`CompletionRecord::recompute`] after every mutation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionRecord {
    #[serde(default)]
    pub completed: BTreeMap<NaiveDate, bool>,
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub last_completed: Option<NaiveDate>,
}

impl CompletionRecord {
    pub fn is_completed(&self, date: NaiveDate) -> bool {
        self.completed.get(&date).copied().unwrap_or(false)
    }

    /// Set completion for a day. Clearing removes the entry so the map
    /// stays sparse.
    pub fn set(&mut self, date: NaiveDate, done: bool) {
        if done {
            self.completed.insert(date, true);
        } else {
            self.completed.remove(&date);
        }
    }

    /// Refresh the cached `streak` and `last_completed`, anchored at
    /// `today`.
    pub fn recompute(&mut self, today: NaiveDate) {
        let snapshot = current_streak(&self.completed, today);
        self.streak = snapshot.streak;
        self.last_completed = snapshot.last_completed;
    }
}

/// Result of a streak walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakSnapshot {
    pub streak: u32,
    /// Most recent completed day in the unbroken chain. `None` when
    /// the walk found nothing, even if older completions exist beyond
    /// the first gap.
    pub last_completed: Option<NaiveDate>,
}

/// Walk backward from `today` counting consecutive completed days.
///
/// The walk starts at `today` itself when it is completed, otherwise
/// at yesterday -- a miss today does not break yesterday's chain until
/// the day is actually over. Bounded at [`MAX_LOOKBACK_DAYS`] offsets.
pub fn current_streak(completed: &BTreeMap<NaiveDate, bool>, today: NaiveDate) -> StreakSnapshot {
    let has_today = completed.get(&today).copied().unwrap_or(false);
    let start_offset = if has_today { 0 } else { 1 };

    let mut streak = 0u32;
    let mut last_completed = None;

    for offset in start_offset..MAX_LOOKBACK_DAYS {
        let date = today - Duration::days(offset);
        if completed.get(&date).copied().unwrap_or(false) {
            if last_completed.is_none() {
                last_completed = Some(date);
            }
            streak += 1;
        } else {
            break;
        }
    }

    StreakSnapshot {
        streak,
        last_completed,
    }
}

/// Longest run of consecutive days, up to `today`, on which at least
/// one of the given records was completed.
pub fn best_streak<'a, I>(records: I, today: NaiveDate) -> u32
where
    I: IntoIterator<Item = &'a CompletionRecord>,
{
    // Union of completed days across all records. BTreeSet keeps the
    // ascending order the run scan needs.
    let mut dates = std::collections::BTreeSet::new();
    for record in records {
        for (date, done) in &record.completed {
            if *done && *date <= today {
                dates.insert(*date);
            }
        }
    }

    let mut best = 0u32;
    let mut run = 0u32;
    let mut prev: Option<NaiveDate> = None;
    for date in dates {
        run = match prev {
            Some(p) if date - p == Duration::days(1) => run + 1,
            _ => 1,
        };
        best = best.max(run);
        prev = Some(date);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn record(days: &[&str]) -> CompletionRecord {
        let mut rec = CompletionRecord::default();
        for d in days {
            rec.set(date(d), true);
        }
        rec
    }

    #[test]
    fn chain_with_gap_stops_at_gap() {
        // Completed today and yesterday, gap two days back, older hit
        // beyond the gap is ignored.
        let rec = record(&["2026-03-10", "2026-03-09", "2026-03-07"]);
        let snap = current_streak(&rec.completed, date("2026-03-10"));
        assert_eq!(snap.streak, 2);
        assert_eq!(snap.last_completed, Some(date("2026-03-10")));
    }

    #[test]
    fn missing_today_anchors_at_yesterday() {
        let rec = record(&["2026-03-09"]);
        let snap = current_streak(&rec.completed, date("2026-03-10"));
        assert_eq!(snap.streak, 1);
        assert_eq!(snap.last_completed, Some(date("2026-03-09")));
    }

    #[test]
    fn gap_at_yesterday_means_no_chain() {
        let rec = record(&["2026-03-08"]);
        let snap = current_streak(&rec.completed, date("2026-03-10"));
        assert_eq!(snap.streak, 0);
        // The walk stopped at the first gap, so the older completion
        // is not reported either.
        assert_eq!(snap.last_completed, None);
    }

    #[test]
    fn empty_record_has_no_streak() {
        let rec = CompletionRecord::default();
        let snap = current_streak(&rec.completed, date("2026-03-10"));
        assert_eq!(snap.streak, 0);
        assert_eq!(snap.last_completed, None);
    }

    #[test]
    fn toggle_off_today_keeps_prior_chain() {
        let mut rec = record(&["2026-03-08", "2026-03-09", "2026-03-10"]);
        rec.set(date("2026-03-10"), false);
        rec.recompute(date("2026-03-10"));
        assert_eq!(rec.streak, 2);
        assert_eq!(rec.last_completed, Some(date("2026-03-09")));
    }

    #[test]
    fn toggling_past_date_heals_a_gap() {
        let mut rec = record(&["2026-03-10", "2026-03-08"]);
        rec.recompute(date("2026-03-10"));
        assert_eq!(rec.streak, 1);

        rec.set(date("2026-03-09"), true);
        rec.recompute(date("2026-03-10"));
        assert_eq!(rec.streak, 3);
    }

    #[test]
    fn best_streak_unions_records() {
        // One habit covers the 9th-10th, another the 7th-8th: the
        // union forms a four-day run.
        let a = record(&["2026-03-09", "2026-03-10"]);
        let b = record(&["2026-03-07", "2026-03-08"]);
        assert_eq!(best_streak([&a, &b], date("2026-03-10")), 4);
    }

    #[test]
    fn best_streak_ignores_future_dates() {
        let a = record(&["2026-03-10", "2026-03-11", "2026-03-12"]);
        assert_eq!(best_streak([&a], date("2026-03-10")), 1);
    }

    #[test]
    fn best_streak_takes_longest_run() {
        let a = record(&[
            "2026-03-01",
            "2026-03-02",
            "2026-03-05",
            "2026-03-06",
            "2026-03-07",
        ]);
        assert_eq!(best_streak([&a], date("2026-03-10")), 3);
    }

    #[test]
    fn best_streak_empty_is_zero() {
        assert_eq!(
            best_streak(std::iter::empty::<&CompletionRecord>(), date("2026-03-10")),
            0
        );
    }
}
