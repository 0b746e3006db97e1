//! Static achievement definitions.
//!
//! The catalog is immutable; dynamic per-user state lives in
//! [`super::AchievementState`]. Rarity determines the XP granted when
//! an achievement unlocks.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Achievement rarity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// XP granted when an achievement of this rarity unlocks.
    pub const fn xp_reward(&self) -> i64 {
        match self {
            Rarity::Common => 100,
            Rarity::Rare => 250,
            Rarity::Epic => 500,
            Rarity::Legendary => 1000,
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
        }
    }
}

/// Identifier for each achievement in the catalog.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AchievementId {
    FirstStep,
    Persistent,
    HabitBuilder,
    EarlyBird,
    CenturyClub,
    AllRounder,
    Legendary,
    Completionist,
}

impl AchievementId {
    pub const ALL: [AchievementId; 8] = [
        AchievementId::FirstStep,
        AchievementId::Persistent,
        AchievementId::HabitBuilder,
        AchievementId::EarlyBird,
        AchievementId::CenturyClub,
        AchievementId::AllRounder,
        AchievementId::Legendary,
        AchievementId::Completionist,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            AchievementId::FirstStep => "first_step",
            AchievementId::Persistent => "persistent",
            AchievementId::HabitBuilder => "habit_builder",
            AchievementId::EarlyBird => "early_bird",
            AchievementId::CenturyClub => "century_club",
            AchievementId::AllRounder => "all_rounder",
            AchievementId::Legendary => "legendary",
            AchievementId::Completionist => "completionist",
        }
    }
}

impl fmt::Display for AchievementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AchievementId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AchievementId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| format!("unknown achievement id: {s}"))
    }
}

/// Static definition of one achievement.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AchievementDef {
    pub id: AchievementId,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub rarity: Rarity,
    pub max_progress: u32,
}

/// The full achievement catalog.
pub const CATALOG: &[AchievementDef] = &[
    AchievementDef {
        id: AchievementId::FirstStep,
        name: "First Step",
        description: "Complete your first habit check-in",
        icon: "seedling",
        rarity: Rarity::Common,
        max_progress: 1,
    },
    AchievementDef {
        id: AchievementId::Persistent,
        name: "Persistent",
        description: "7-day streak",
        icon: "fire",
        rarity: Rarity::Common,
        max_progress: 7,
    },
    AchievementDef {
        id: AchievementId::HabitBuilder,
        name: "Habit Builder",
        description: "21-day streak",
        icon: "trophy",
        rarity: Rarity::Rare,
        max_progress: 21,
    },
    AchievementDef {
        id: AchievementId::EarlyBird,
        name: "Early Bird",
        description: "Wake up early for 30 days",
        icon: "sun",
        rarity: Rarity::Rare,
        max_progress: 30,
    },
    AchievementDef {
        id: AchievementId::CenturyClub,
        name: "Century Club",
        description: "100-day streak",
        icon: "medal",
        rarity: Rarity::Epic,
        max_progress: 100,
    },
    AchievementDef {
        id: AchievementId::AllRounder,
        name: "All-Rounder",
        description: "Maintain 5 habits for 30 days",
        icon: "star",
        rarity: Rarity::Epic,
        max_progress: 30,
    },
    AchievementDef {
        id: AchievementId::Legendary,
        name: "Legendary",
        description: "365-day streak",
        icon: "crown",
        rarity: Rarity::Legendary,
        max_progress: 365,
    },
    AchievementDef {
        id: AchievementId::Completionist,
        name: "Completionist",
        description: "Unlock all other achievements",
        icon: "gem",
        rarity: Rarity::Legendary,
        max_progress: (CATALOG_LEN - 1) as u32,
    },
];

const CATALOG_LEN: usize = 8;

/// Look up a definition. Unknown ids yield `None` and callers treat
/// that as a no-op rather than an error.
pub fn definition(id: AchievementId) -> Option<&'static AchievementDef> {
    CATALOG.iter().find(|def| def.id == id)
}
