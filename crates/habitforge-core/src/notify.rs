//! Unlock notifications and the daily celebration gate.
//!
//! Unlock *events* are decoupled from their display: the queue scans
//! the achievement map after each state change, picks up fresh unlocks
//! exactly once, and exposes at most one "currently displayed" event
//! at a time. The presentation layer renders whatever `current()`
//! returns and calls `dismiss()`.
//!
//! The all-habits-done celebration is gated separately: at most once
//! per calendar day, and never while an unlock is on screen. Both
//! checks run synchronously in the service reducer, so the suppression
//! is an ordering guarantee rather than a timing race.

use std::collections::{HashSet, VecDeque};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::achievements::{definition, AchievementDef, AchievementId, Rarity};
use crate::profile::Profile;

/// How long after unlock a scan still considers the event fresh.
pub const RECENCY_WINDOW_SECS: i64 = 5;

/// How long a displayed unlock stays up before auto-clearing.
pub const DISPLAY_DURATION_SECS: i64 = 5;

/// Transient record of an achievement transitioning to unlocked.
/// Carries a snapshot of the catalog metadata plus the XP the unlock
/// paid out; never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct UnlockEvent {
    pub id: AchievementId,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub rarity: Rarity,
    pub xp_reward: i64,
    pub created_at: DateTime<Utc>,
}

impl UnlockEvent {
    pub fn from_definition(def: &'static AchievementDef, at: DateTime<Utc>) -> Self {
        Self {
            id: def.id,
            name: def.name,
            description: def.description,
            icon: def.icon,
            rarity: def.rarity,
            xp_reward: def.rarity.xp_reward(),
            created_at: at,
        }
    }
}

struct DisplayedUnlock {
    event: UnlockEvent,
    shown_at: DateTime<Utc>,
}

/// FIFO queue of pending unlock events with a single display slot and
/// an id de-duplication set.
pub struct UnlockNotificationQueue {
    pending: VecDeque<UnlockEvent>,
    current: Option<DisplayedUnlock>,
    processed: HashSet<AchievementId>,
    recency_window: Duration,
    display_duration: Duration,
}

impl Default for UnlockNotificationQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl UnlockNotificationQueue {
    pub fn new() -> Self {
        Self::with_durations(
            Duration::seconds(RECENCY_WINDOW_SECS),
            Duration::seconds(DISPLAY_DURATION_SECS),
        )
    }

    pub fn with_durations(recency_window: Duration, display_duration: Duration) -> Self {
        Self {
            pending: VecDeque::new(),
            current: None,
            processed: HashSet::new(),
            recency_window,
            display_duration,
        }
    }

    /// Scan the profile for freshly unlocked achievements and enqueue
    /// each one exactly once, then promote the head if nothing is
    /// displayed.
    ///
    /// Freshness means `unlocked_at` within the recency window; older
    /// unlocks (e.g. rehydrated from disk) are never re-announced.
    pub fn scan(&mut self, profile: &Profile, now: DateTime<Utc>) {
        for (id, state) in &profile.achievements {
            if !state.unlocked || self.processed.contains(id) {
                continue;
            }
            let Some(unlocked_at) = state.unlocked_at else {
                continue;
            };
            if now - unlocked_at > self.recency_window {
                // Stale unlock: mark processed so later scans skip it
                // without announcing.
                self.processed.insert(*id);
                continue;
            }
            if let Some(def) = definition(*id) {
                self.pending
                    .push_back(UnlockEvent::from_definition(def, unlocked_at));
                self.processed.insert(*id);
            }
        }
        self.promote(now);
    }

    fn promote(&mut self, now: DateTime<Utc>) {
        if self.current.is_none() {
            if let Some(event) = self.pending.pop_front() {
                tracing::debug!(achievement = %event.id, "displaying unlock");
                self.current = Some(DisplayedUnlock {
                    event,
                    shown_at: now,
                });
            }
        }
    }

    /// The unlock currently on display, if any.
    pub fn current(&self) -> Option<&UnlockEvent> {
        self.current.as_ref().map(|d| &d.event)
    }

    pub fn is_displaying(&self) -> bool {
        self.current.is_some()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Explicitly clear the display and promote the next pending
    /// unlock.
    pub fn dismiss(&mut self, now: DateTime<Utc>) {
        self.current = None;
        self.promote(now);
    }

    /// Auto-clear the display once it has been up for the full display
    /// duration. Driven by the periodic tick.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if let Some(displayed) = &self.current {
            if now - displayed.shown_at >= self.display_duration {
                self.dismiss(now);
            }
        }
    }
}

/// Once-per-day gate for the "every habit completed" celebration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CelebrationGate {
    pub last_celebrated: Option<NaiveDate>,
}

impl CelebrationGate {
    /// Decide whether the celebration fires, and record the day if it
    /// does.
    ///
    /// Requires at least `min_tracked` habits, all of them completed
    /// today, no unlock currently displayed, and no celebration yet
    /// today.
    pub fn should_fire(
        &mut self,
        tracked: usize,
        completed_today: usize,
        min_tracked: usize,
        unlock_displayed: bool,
        today: NaiveDate,
    ) -> bool {
        if tracked < min_tracked || completed_today != tracked {
            return false;
        }
        if unlock_displayed {
            return false;
        }
        if self.last_celebrated == Some(today) {
            return false;
        }
        self.last_celebrated = Some(today);
        true
    }
}
