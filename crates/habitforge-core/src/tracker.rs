//! Habit registry and completion tracking.
//!
//! Each tracked habit owns a sparse [`CompletionRecord`]; toggling any
//! day recomputes the cached streak from scratch. The tracker also
//! answers the aggregate questions the gamification rules need: how
//! many habits are "active" for the All-Rounder rule, whether today is
//! fully completed, and the overview best streak.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::streak::{self, CompletionRecord};

/// Habits with a streak this long (and completed today) count as
/// "active" for the All-Rounder rule.
pub const ACTIVE_STREAK_DAYS: u32 = 30;

/// Name fragments that mark a habit as early-morning themed. The
/// config can extend this set.
pub const EARLY_BIRD_KEYWORDS: &[&str] = &[
    "早起",
    "早晨",
    "晨练",
    "早餐",
    "起床",
    "morning",
    "wake up",
    "wake",
    "breakfast",
    "sunrise",
];

/// One tracked habit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitEntry {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub target_days: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub record: CompletionRecord,
}

/// Result of toggling one habit for one day.
#[derive(Debug, Clone)]
pub struct ToggleOutcome {
    pub habit_id: String,
    pub name: String,
    /// New completion state for the toggled day.
    pub completed: bool,
    /// Recomputed streak after the toggle.
    pub streak: u32,
}

/// Registry of tracked habits. Insertion order is preserved for
/// display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HabitTracker {
    habits: Vec<HabitEntry>,
}

impl HabitTracker {
    /// Register a new habit with a fresh id and empty record.
    pub fn add(
        &mut self,
        name: &str,
        icon: &str,
        color: &str,
        target_days: u32,
        now: DateTime<Utc>,
    ) -> HabitEntry {
        let entry = HabitEntry {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            icon: icon.to_string(),
            color: color.to_string(),
            target_days,
            created_at: now,
            record: CompletionRecord::default(),
        };
        self.habits.push(entry.clone());
        entry
    }

    /// Remove habits by id; unknown ids are ignored.
    pub fn remove(&mut self, ids: &[String]) {
        self.habits.retain(|h| !ids.contains(&h.id));
    }

    pub fn get(&self, id: &str) -> Option<&HabitEntry> {
        self.habits.iter().find(|h| h.id == id)
    }

    pub fn habits(&self) -> &[HabitEntry] {
        &self.habits
    }

    pub fn len(&self) -> usize {
        self.habits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.habits.is_empty()
    }

    /// Flip completion of `date` for one habit and recompute its
    /// cached streak anchored at `today`. `None` for unknown ids.
    pub fn toggle(&mut self, id: &str, date: NaiveDate, today: NaiveDate) -> Option<ToggleOutcome> {
        let habit = self.habits.iter_mut().find(|h| h.id == id)?;
        let completed = !habit.record.is_completed(date);
        habit.record.set(date, completed);
        habit.record.recompute(today);
        Some(ToggleOutcome {
            habit_id: habit.id.clone(),
            name: habit.name.clone(),
            completed,
            streak: habit.record.streak,
        })
    }

    // ── Aggregate queries ────────────────────────────────────────────

    /// Habits completed today whose streak has reached
    /// [`ACTIVE_STREAK_DAYS`]; the All-Rounder input.
    pub fn active_count(&self, today: NaiveDate) -> u32 {
        self.habits
            .iter()
            .filter(|h| h.record.is_completed(today) && h.record.streak >= ACTIVE_STREAK_DAYS)
            .count() as u32
    }

    pub fn completed_count_on(&self, date: NaiveDate) -> usize {
        self.habits
            .iter()
            .filter(|h| h.record.is_completed(date))
            .count()
    }

    pub fn all_completed_on(&self, date: NaiveDate) -> bool {
        !self.habits.is_empty() && self.completed_count_on(date) == self.habits.len()
    }

    pub fn completion_rate_on(&self, date: NaiveDate) -> f64 {
        if self.habits.is_empty() {
            return 0.0;
        }
        self.completed_count_on(date) as f64 / self.habits.len() as f64 * 100.0
    }

    /// Longest run of consecutive days on which any habit was
    /// completed (overview statistics).
    pub fn best_streak(&self, today: NaiveDate) -> u32 {
        streak::best_streak(self.habits.iter().map(|h| &h.record), today)
    }
}

/// Whether a habit name matches the early-morning keyword heuristic.
/// Matching is case-insensitive on the name side; `extra` extends the
/// built-in keyword set.
pub fn is_early_bird_name(name: &str, extra: &[String]) -> bool {
    let lower = name.to_lowercase();
    EARLY_BIRD_KEYWORDS
        .iter()
        .map(|k| k.to_string())
        .chain(extra.iter().cloned())
        .any(|keyword| lower.contains(&keyword.to_lowercase()))
}
