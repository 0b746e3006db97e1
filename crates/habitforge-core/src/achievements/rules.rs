//! Unlock rule evaluation.
//!
//! Every rule is a pure function over the current metrics and the
//! achievement-state map, returning either nothing or a progress/unlock
//! instruction for the profile to apply. Rules short-circuit on an
//! already-unlocked target, which is what guarantees the completionist
//! cascade terminates.

use super::catalog::{AchievementId, CATALOG};
use super::AchievementMap;

/// Streak-day thresholds and the achievement each one unlocks.
pub const STREAK_TIERS: [(AchievementId, u32); 4] = [
    (AchievementId::Persistent, 7),
    (AchievementId::HabitBuilder, 21),
    (AchievementId::CenturyClub, 100),
    (AchievementId::Legendary, 365),
];

/// Early-bird completions required to unlock.
pub const EARLY_BIRD_GOAL: u32 = 30;

/// All-Rounder: habits that must be simultaneously active.
pub const ALL_ROUNDER_HABITS: u32 = 5;

/// All-Rounder: global streak days required alongside the habit count.
pub const ALL_ROUNDER_STREAK: u32 = 30;

/// Instruction produced by a rule: either an unlock or a progress
/// value to record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleUpdate {
    pub id: AchievementId,
    pub unlocked: bool,
    pub progress: u32,
}

fn is_unlocked(achievements: &AchievementMap, id: AchievementId) -> bool {
    achievements.get(&id).map(|a| a.unlocked).unwrap_or(false)
}

/// First Step: unlocks on the very first check-in.
pub fn check_first_step(
    total_completions: u64,
    achievements: &AchievementMap,
) -> Option<AchievementId> {
    if is_unlocked(achievements, AchievementId::FirstStep) {
        return None;
    }
    (total_completions >= 1).then_some(AchievementId::FirstStep)
}

/// Streak tiers: each unmet tier tracks the streak as its progress and
/// unlocks when the threshold is reached. Tiers are independent.
pub fn check_streak_tiers(streak: u32, achievements: &AchievementMap) -> Vec<RuleUpdate> {
    STREAK_TIERS
        .iter()
        .filter(|(id, _)| !is_unlocked(achievements, *id))
        .map(|&(id, goal)| RuleUpdate {
            id,
            unlocked: streak >= goal,
            progress: streak,
        })
        .collect()
}

/// Early Bird: unlocks after [`EARLY_BIRD_GOAL`] early-morning
/// completions.
pub fn check_early_bird(early_bird_count: u32, achievements: &AchievementMap) -> Option<RuleUpdate> {
    if is_unlocked(achievements, AchievementId::EarlyBird) {
        return None;
    }
    Some(RuleUpdate {
        id: AchievementId::EarlyBird,
        unlocked: early_bird_count >= EARLY_BIRD_GOAL,
        progress: early_bird_count,
    })
}

/// All-Rounder: needs [`ALL_ROUNDER_HABITS`] simultaneously active
/// habits and a [`ALL_ROUNDER_STREAK`]-day global streak. With only
/// the habit count met, the streak is tracked as progress; with
/// neither, the rule stays silent.
pub fn check_all_rounder(
    active_habits: u32,
    streak: u32,
    achievements: &AchievementMap,
) -> Option<RuleUpdate> {
    if is_unlocked(achievements, AchievementId::AllRounder) {
        return None;
    }
    if active_habits >= ALL_ROUNDER_HABITS && streak >= ALL_ROUNDER_STREAK {
        Some(RuleUpdate {
            id: AchievementId::AllRounder,
            unlocked: true,
            progress: ALL_ROUNDER_STREAK,
        })
    } else if active_habits >= ALL_ROUNDER_HABITS {
        Some(RuleUpdate {
            id: AchievementId::AllRounder,
            unlocked: false,
            progress: streak.min(ALL_ROUNDER_STREAK),
        })
    } else {
        None
    }
}

/// Completionist: unlocks when every other achievement is unlocked.
/// Must be re-evaluated after any other unlock.
pub fn check_completionist(achievements: &AchievementMap) -> Option<RuleUpdate> {
    if is_unlocked(achievements, AchievementId::Completionist) {
        return None;
    }
    let unlocked_others = achievements
        .values()
        .filter(|a| a.unlocked && a.id != AchievementId::Completionist)
        .count();
    let goal = CATALOG.len() - 1;
    Some(RuleUpdate {
        id: AchievementId::Completionist,
        unlocked: unlocked_others >= goal,
        progress: unlocked_others as u32,
    })
}
