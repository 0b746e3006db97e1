//! Engine events.
//!
//! Every state change in the engine produces an [`Event`]. The
//! presentation layer polls for them; `CompletionToggled` doubles as
//! the inbound boundary from the habit/task layer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::achievements::AchievementId;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A habit's completion flipped for a given day.
    CompletionToggled {
        habit_id: String,
        name: String,
        completed: bool,
        date: NaiveDate,
        at: DateTime<Utc>,
    },
    /// First qualifying completion of the day was recorded.
    CheckedIn {
        streak: u32,
        total_completions: u64,
        at: DateTime<Utc>,
    },
    /// XP was granted or refunded.
    XpApplied {
        amount: i64,
        xp_today: i64,
        at: DateTime<Utc>,
    },
    /// The level changed as a result of an XP application.
    LevelChanged {
        level: u32,
        title: String,
        leveled_up: bool,
        at: DateTime<Utc>,
    },
    /// An achievement transitioned to unlocked.
    AchievementUnlocked {
        id: AchievementId,
        xp_reward: i64,
        at: DateTime<Utc>,
    },
    /// Every tracked habit was completed today.
    CelebrationTriggered {
        date: NaiveDate,
        at: DateTime<Utc>,
    },
    /// The daily XP tally was reset on day rollover.
    DailyReset {
        date: NaiveDate,
        at: DateTime<Utc>,
    },
}
