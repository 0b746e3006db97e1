//! The gamification profile aggregate.
//!
//! Owns level/XP/streak/achievement state and applies every mutation.
//! Operations take an explicit `now` -- the service layer owns the
//! clock -- and any operation that can unlock achievements returns the
//! unlock events it produced, cascades included.
//!
//! The global `streak` here counts consecutive calendar days with at
//! least one check-in, maintained incrementally. It is a different
//! measure from the per-habit streaks recomputed in [`crate::streak`],
//! and the two can diverge; that split is intentional.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::achievements::{
    self, definition, AchievementId, AchievementMap, AchievementState, RuleUpdate,
};
use crate::level::{self, required_xp, title_for_level};
use crate::notify::UnlockEvent;

/// Persistent gamification state for the single local user.
///
/// At rest `0 <= current_xp < required_xp(level)`; `add_xp` normalizes
/// before returning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub level: u32,
    pub current_xp: i64,
    pub current_title: String,
    /// Consecutive calendar days with at least one check-in.
    pub streak: u32,
    pub last_active_date: Option<NaiveDate>,
    pub xp_today: i64,
    pub last_xp_date: Option<NaiveDate>,
    /// Lifetime count of check-in events.
    pub total_completions: u64,
    pub early_bird_count: u32,
    #[serde(default)]
    pub achievements: AchievementMap,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            level: 1,
            current_xp: 0,
            current_title: title_for_level(1).to_string(),
            streak: 0,
            last_active_date: None,
            xp_today: 0,
            last_xp_date: None,
            total_completions: 0,
            early_bird_count: 0,
            achievements: AchievementMap::new(),
        }
    }
}

/// Result of one `add_xp` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpApplied {
    pub level: u32,
    pub leveled_up: bool,
    pub leveled_down: bool,
}

/// Read-only progress view for one achievement.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AchievementProgress {
    pub progress: u32,
    pub max_progress: u32,
    pub percentage: f64,
    pub unlocked: bool,
}

impl Profile {
    // ── XP and leveling ──────────────────────────────────────────────

    /// Apply an XP delta (habit completion, achievement reward, or a
    /// refund when a completion is toggled back off).
    ///
    /// Tracks the daily XP tally, resetting it when the calendar day
    /// changed since the last grant, then normalizes level/XP through
    /// [`level::apply_xp_delta`].
    pub fn add_xp(&mut self, amount: i64, now: DateTime<Utc>) -> XpApplied {
        let today = now.date_naive();
        let mut xp_today = if self.last_xp_date == Some(today) {
            self.xp_today + amount
        } else {
            amount
        };
        if xp_today < 0 {
            xp_today = 0;
        }
        self.xp_today = xp_today;
        self.last_xp_date = Some(today);

        let change = level::apply_xp_delta(self.level, self.current_xp, amount);
        self.current_xp = change.xp;
        if change.leveled_up || change.leveled_down {
            self.level = change.level;
            self.current_title = title_for_level(change.level).to_string();
        }

        XpApplied {
            level: self.level,
            leveled_up: change.leveled_up,
            leveled_down: change.leveled_down,
        }
    }

    /// Zero the daily XP tally once the calendar day rolls over.
    /// Called at startup and from the periodic tick.
    pub fn check_daily_reset(&mut self, now: DateTime<Utc>) {
        let today = now.date_naive();
        if self.last_xp_date != Some(today) {
            self.xp_today = 0;
            self.last_xp_date = Some(today);
        }
    }

    pub fn next_level_xp(&self) -> i64 {
        required_xp(self.level)
    }

    // ── Check-in ─────────────────────────────────────────────────────

    /// Record a daily check-in. Idempotent per calendar day.
    ///
    /// Consecutive-day check-ins extend the global streak, anything
    /// else resets it to 1. Runs the first-step and streak-tier rules
    /// afterward and returns whatever they unlocked.
    pub fn check_in(&mut self, now: DateTime<Utc>) -> Vec<UnlockEvent> {
        let today = now.date_naive();
        if self.last_active_date == Some(today) {
            return Vec::new();
        }

        let yesterday = today.pred_opt();
        self.streak = if self.last_active_date.is_some() && self.last_active_date == yesterday {
            self.streak + 1
        } else {
            1
        };
        self.last_active_date = Some(today);
        self.total_completions += 1;

        let mut events = self.check_first_step(now);
        events.extend(self.check_streak_achievements(now));
        events
    }

    /// Bump the early-bird tally and re-run its rule.
    pub fn record_early_bird(&mut self, now: DateTime<Utc>) -> Vec<UnlockEvent> {
        self.early_bird_count += 1;
        self.check_early_bird(now)
    }

    // ── Achievement mutations ────────────────────────────────────────

    /// Unlock an achievement, granting its rarity XP and re-running the
    /// completionist rule (every unlock changes its input).
    ///
    /// No-op when the id has no definition or is already unlocked, so
    /// duplicate and cascaded calls are safe.
    pub fn unlock_achievement(&mut self, id: AchievementId, now: DateTime<Utc>) -> Vec<UnlockEvent> {
        if self.is_unlocked(id) {
            return Vec::new();
        }
        let Some(def) = definition(id) else {
            return Vec::new();
        };

        self.achievements.insert(
            id,
            AchievementState {
                id,
                unlocked: true,
                progress: def.max_progress,
                unlocked_at: Some(now),
            },
        );
        tracing::debug!(achievement = %id, "achievement unlocked");

        let mut events = vec![UnlockEvent::from_definition(def, now)];
        self.add_xp(def.rarity.xp_reward(), now);
        events.extend(self.check_completionist(now));
        events
    }

    /// Add to an achievement's progress, unlocking when it reaches the
    /// definition's maximum. No-op for unknown or unlocked ids.
    pub fn update_progress(
        &mut self,
        id: AchievementId,
        delta: i64,
        now: DateTime<Utc>,
    ) -> Vec<UnlockEvent> {
        if self.is_unlocked(id) {
            return Vec::new();
        }
        let Some(def) = definition(id) else {
            return Vec::new();
        };

        let current = self
            .achievements
            .get(&id)
            .map(|a| a.progress)
            .unwrap_or(0);
        let next = (current as i64 + delta).max(0) as u32;
        if next >= def.max_progress {
            self.unlock_achievement(id, now)
        } else {
            self.achievements
                .entry(id)
                .or_insert_with(|| AchievementState::locked(id))
                .progress = next;
            Vec::new()
        }
    }

    // ── Rule-check triggers ──────────────────────────────────────────

    pub fn check_first_step(&mut self, now: DateTime<Utc>) -> Vec<UnlockEvent> {
        match achievements::check_first_step(self.total_completions, &self.achievements) {
            Some(id) => self.unlock_achievement(id, now),
            None => Vec::new(),
        }
    }

    pub fn check_streak_achievements(&mut self, now: DateTime<Utc>) -> Vec<UnlockEvent> {
        let updates = achievements::check_streak_tiers(self.streak, &self.achievements);
        let mut events = Vec::new();
        for update in updates {
            events.extend(self.apply_rule_update(update, now));
        }
        events
    }

    pub fn check_early_bird(&mut self, now: DateTime<Utc>) -> Vec<UnlockEvent> {
        match achievements::check_early_bird(self.early_bird_count, &self.achievements) {
            Some(update) => self.apply_rule_update(update, now),
            None => Vec::new(),
        }
    }

    /// `active_habits` is supplied by the tracker: habits completed
    /// today whose own streak has reached 30 days.
    pub fn check_all_rounder(&mut self, active_habits: u32, now: DateTime<Utc>) -> Vec<UnlockEvent> {
        match achievements::check_all_rounder(active_habits, self.streak, &self.achievements) {
            Some(update) => self.apply_rule_update(update, now),
            None => Vec::new(),
        }
    }

    pub fn check_completionist(&mut self, now: DateTime<Utc>) -> Vec<UnlockEvent> {
        match achievements::check_completionist(&self.achievements) {
            Some(update) => self.apply_rule_update(update, now),
            None => Vec::new(),
        }
    }

    fn apply_rule_update(&mut self, update: RuleUpdate, now: DateTime<Utc>) -> Vec<UnlockEvent> {
        if update.unlocked {
            self.unlock_achievement(update.id, now)
        } else {
            self.achievements
                .entry(update.id)
                .or_insert_with(|| AchievementState::locked(update.id))
                .progress = update.progress;
            Vec::new()
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn is_unlocked(&self, id: AchievementId) -> bool {
        self.achievements
            .get(&id)
            .map(|a| a.unlocked)
            .unwrap_or(false)
    }

    /// Progress view for one achievement; `None` for ids without a
    /// catalog definition.
    pub fn achievement_progress(&self, id: AchievementId) -> Option<AchievementProgress> {
        let def = definition(id)?;
        let state = self.achievements.get(&id);
        let progress = state.map(|a| a.progress).unwrap_or(0);
        let unlocked = state.map(|a| a.unlocked).unwrap_or(false);
        let percentage = if def.max_progress == 0 {
            0.0
        } else {
            (progress as f64 / def.max_progress as f64 * 100.0).min(100.0)
        };
        Some(AchievementProgress {
            progress,
            max_progress: def.max_progress,
            percentage,
            unlocked,
        })
    }

    /// Wipe back to the first-launch defaults.
    pub fn reset(&mut self) {
        *self = Profile::default();
    }
}
