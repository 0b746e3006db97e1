//! Achievement catalog, per-user state, and unlock rules.

mod catalog;
mod rules;

pub use catalog::{definition, AchievementDef, AchievementId, Rarity, CATALOG};
pub use rules::{
    check_all_rounder, check_completionist, check_early_bird, check_first_step,
    check_streak_tiers, RuleUpdate, ALL_ROUNDER_HABITS, ALL_ROUNDER_STREAK, EARLY_BIRD_GOAL,
    STREAK_TIERS,
};

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-user state for one achievement, created lazily on first
/// progress update.
///
/// `unlocked` is monotonic: once set it never reverts, and `progress`
/// stays clamped at the definition's `max_progress`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementState {
    pub id: AchievementId,
    pub unlocked: bool,
    pub progress: u32,
    #[serde(default)]
    pub unlocked_at: Option<DateTime<Utc>>,
}

impl AchievementState {
    pub fn locked(id: AchievementId) -> Self {
        Self {
            id,
            unlocked: false,
            progress: 0,
            unlocked_at: None,
        }
    }
}

/// Map of all lazily created achievement states, keyed by id.
pub type AchievementMap = BTreeMap<AchievementId, AchievementState>;
