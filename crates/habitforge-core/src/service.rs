//! The gamification engine service.
//!
//! One explicit object owns the whole engine -- profile, habit
//! tracker, unlock queue, celebration gate, clock, and store -- and is
//! constructed once at startup and passed by reference to consumers.
//! Nothing here is global state.
//!
//! Handling a completion toggle is a single synchronous reducer step:
//! record mutation, XP, check-in, rule checks, queue scan, celebration
//! gate, persist. Dependent achievement evaluation therefore always
//! observes fully committed XP/streak state, as an ordering guarantee
//! rather than a settle delay.
//!
//! The engine produces [`Event`]s for every state change; the
//! presentation layer polls [`GamificationEngine::drain_events`].

use std::sync::Arc;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::achievements::AchievementId;
use crate::clock::Clock;
use crate::error::Result;
use crate::events::Event;
use crate::notify::{CelebrationGate, UnlockEvent, UnlockNotificationQueue};
use crate::profile::{Profile, XpApplied};
use crate::storage::{Config, StateDb};
use crate::tracker::{is_early_bird_name, HabitEntry, HabitTracker, ToggleOutcome};

/// The aggregate persisted as one JSON blob. Written atomically after
/// every mutation so achievements can never go out of sync with
/// level/XP on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub profile: Profile,
    #[serde(default)]
    pub tracker: HabitTracker,
    #[serde(default)]
    pub celebration: CelebrationGate,
}

/// The gamification engine. Single-writer: exactly one instance owns
/// the persisted profile.
pub struct GamificationEngine {
    profile: Profile,
    tracker: HabitTracker,
    queue: UnlockNotificationQueue,
    celebration: CelebrationGate,
    config: Config,
    clock: Arc<dyn Clock>,
    db: Option<StateDb>,
    events: Vec<Event>,
}

impl GamificationEngine {
    /// In-memory engine with fresh defaults (no persistence).
    pub fn new(config: Config, clock: Arc<dyn Clock>) -> Self {
        let queue = queue_from(&config);
        Self {
            profile: Profile::default(),
            tracker: HabitTracker::default(),
            queue,
            celebration: CelebrationGate::default(),
            config,
            clock,
            db: None,
            events: Vec::new(),
        }
    }

    /// Open against a state store, rehydrating the last persisted
    /// snapshot. A missing or corrupt blob falls back to a fresh
    /// default aggregate.
    pub fn open(db: StateDb, config: Config, clock: Arc<dyn Clock>) -> Result<Self> {
        let snapshot = match db.load()? {
            Some(blob) => match serde_json::from_str::<EngineSnapshot>(&blob) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    tracing::warn!(error = %e, "corrupt state blob, starting fresh");
                    EngineSnapshot::default()
                }
            },
            None => EngineSnapshot::default(),
        };

        let queue = queue_from(&config);
        let mut engine = Self {
            profile: snapshot.profile,
            tracker: snapshot.tracker,
            queue,
            celebration: snapshot.celebration,
            config,
            clock,
            db: Some(db),
            events: Vec::new(),
        };
        // Day may have rolled over since the last run.
        let now = engine.clock.now();
        engine.profile.check_daily_reset(now);
        // Pick up unlocks still inside the recency window; anything
        // older is marked processed without being announced.
        engine.queue.scan(&engine.profile, now);
        Ok(engine)
    }

    fn persist(&self) -> Result<()> {
        if let Some(db) = &self.db {
            let blob = serde_json::to_string(&EngineSnapshot {
                profile: self.profile.clone(),
                tracker: self.tracker.clone(),
                celebration: self.celebration.clone(),
            })?;
            db.save(&blob)?;
        }
        Ok(())
    }

    /// Publish unlock events, refresh the queue, persist. Tail of
    /// every mutating entry point.
    fn commit(&mut self, unlocks: Vec<UnlockEvent>) -> Result<()> {
        let now = self.clock.now();
        for unlock in &unlocks {
            self.events.push(Event::AchievementUnlocked {
                id: unlock.id,
                xp_reward: unlock.xp_reward,
                at: unlock.created_at,
            });
        }
        self.queue.scan(&self.profile, now);
        self.persist()
    }

    // ── Habit management ─────────────────────────────────────────────

    pub fn add_habit(
        &mut self,
        name: &str,
        icon: &str,
        color: &str,
        target_days: u32,
    ) -> Result<HabitEntry> {
        let now = self.clock.now();
        let entry = self.tracker.add(name, icon, color, target_days, now);
        self.persist()?;
        Ok(entry)
    }

    pub fn remove_habits(&mut self, ids: &[String]) -> Result<()> {
        self.tracker.remove(ids);
        self.persist()
    }

    /// Handle a completion toggle for today. The full reducer: record
    /// mutation, XP delta, check-in, early-bird, all-rounder, queue
    /// scan, celebration gate, persist. Unknown ids are a no-op.
    pub fn toggle_habit(&mut self, id: &str) -> Result<Option<ToggleOutcome>> {
        let now = self.clock.now();
        let today = now.date_naive();

        let Some(outcome) = self.tracker.toggle(id, today, today) else {
            return Ok(None);
        };
        self.events.push(Event::CompletionToggled {
            habit_id: outcome.habit_id.clone(),
            name: outcome.name.clone(),
            completed: outcome.completed,
            date: today,
            at: now,
        });

        let amount = if outcome.completed {
            self.config.xp.per_completion
        } else {
            -self.config.xp.per_completion
        };
        let applied = self.profile.add_xp(amount, now);
        self.events.push(Event::XpApplied {
            amount,
            xp_today: self.profile.xp_today,
            at: now,
        });
        if applied.leveled_up || applied.leveled_down {
            self.events.push(Event::LevelChanged {
                level: applied.level,
                title: self.profile.current_title.clone(),
                leveled_up: applied.leveled_up,
                at: now,
            });
        }

        let mut unlocks = Vec::new();
        if outcome.completed {
            let checked_in = self.profile.last_active_date != Some(today);
            unlocks.extend(self.profile.check_in(now));
            if checked_in {
                self.events.push(Event::CheckedIn {
                    streak: self.profile.streak,
                    total_completions: self.profile.total_completions,
                    at: now,
                });
            }
            if is_early_bird_name(&outcome.name, &self.config.early_bird.extra_keywords) {
                unlocks.extend(self.profile.record_early_bird(now));
            }
            let active = self.tracker.active_count(today);
            unlocks.extend(self.profile.check_all_rounder(active, now));
        }

        self.commit(unlocks)?;

        if outcome.completed {
            let fired = self.celebration.should_fire(
                self.tracker.len(),
                self.tracker.completed_count_on(today),
                self.config.celebration.min_tracked,
                self.queue.is_displaying(),
                today,
            );
            if fired {
                self.events.push(Event::CelebrationTriggered {
                    date: today,
                    at: now,
                });
                self.persist()?;
            }
        }

        Ok(Some(outcome))
    }

    /// Toggle a past (or future) date. Record-only: streak caches
    /// recompute, but XP, check-in, and celebration apply exclusively
    /// to today's toggles.
    pub fn toggle_habit_on(
        &mut self,
        id: &str,
        date: chrono::NaiveDate,
    ) -> Result<Option<ToggleOutcome>> {
        let today = self.clock.today();
        if date == today {
            return self.toggle_habit(id);
        }
        let now = self.clock.now();
        let Some(outcome) = self.tracker.toggle(id, date, today) else {
            return Ok(None);
        };
        self.events.push(Event::CompletionToggled {
            habit_id: outcome.habit_id.clone(),
            name: outcome.name.clone(),
            completed: outcome.completed,
            date,
            at: now,
        });
        self.persist()?;
        Ok(Some(outcome))
    }

    // ── Profile entry points ─────────────────────────────────────────

    pub fn add_xp(&mut self, amount: i64) -> Result<XpApplied> {
        let now = self.clock.now();
        let applied = self.profile.add_xp(amount, now);
        self.events.push(Event::XpApplied {
            amount,
            xp_today: self.profile.xp_today,
            at: now,
        });
        if applied.leveled_up || applied.leveled_down {
            self.events.push(Event::LevelChanged {
                level: applied.level,
                title: self.profile.current_title.clone(),
                leveled_up: applied.leveled_up,
                at: now,
            });
        }
        self.commit(Vec::new())?;
        Ok(applied)
    }

    pub fn check_in(&mut self) -> Result<()> {
        let now = self.clock.now();
        let unlocks = self.profile.check_in(now);
        self.commit(unlocks)
    }

    pub fn unlock_achievement(&mut self, id: AchievementId) -> Result<()> {
        let now = self.clock.now();
        let unlocks = self.profile.unlock_achievement(id, now);
        self.commit(unlocks)
    }

    pub fn update_progress(&mut self, id: AchievementId, delta: i64) -> Result<()> {
        let now = self.clock.now();
        let unlocks = self.profile.update_progress(id, delta, now);
        self.commit(unlocks)
    }

    /// Reset the whole aggregate to first-launch defaults.
    pub fn reset(&mut self) -> Result<()> {
        self.profile.reset();
        self.tracker = HabitTracker::default();
        self.celebration = CelebrationGate::default();
        self.persist()
    }

    // ── Periodic tick ────────────────────────────────────────────────

    /// Advance time-driven behavior: auto-clear the displayed unlock
    /// and reset the daily XP tally on day rollover. Cheap enough to
    /// call once a minute.
    pub fn tick(&mut self) -> Result<()> {
        let now = self.clock.now();
        self.queue.tick(now);

        let today = now.date_naive();
        if self.profile.last_xp_date != Some(today) {
            self.profile.check_daily_reset(now);
            self.events.push(Event::DailyReset {
                date: today,
                at: now,
            });
            self.persist()?;
        }
        Ok(())
    }

    // ── Presentation surface ─────────────────────────────────────────

    /// The unlock currently on display, if any.
    pub fn current_unlock(&self) -> Option<&UnlockEvent> {
        self.queue.current()
    }

    /// Dismiss the displayed unlock and promote the next one.
    pub fn dismiss_unlock(&mut self) {
        self.queue.dismiss(self.clock.now());
    }

    /// Drain events accumulated since the last poll.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn tracker(&self) -> &HabitTracker {
        &self.tracker
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Overview statistics for today.
    pub fn overview(&self) -> Overview {
        let today = self.clock.today();
        Overview {
            level: self.profile.level,
            title: self.profile.current_title.clone(),
            xp_today: self.profile.xp_today,
            global_streak: self.profile.streak,
            habits_total: self.tracker.len(),
            completed_today: self.tracker.completed_count_on(today),
            completion_rate: self.tracker.completion_rate_on(today),
            best_streak: self.tracker.best_streak(today),
        }
    }
}

/// Snapshot of today's headline numbers.
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub level: u32,
    pub title: String,
    pub xp_today: i64,
    pub global_streak: u32,
    pub habits_total: usize,
    pub completed_today: usize,
    pub completion_rate: f64,
    pub best_streak: u32,
}

fn queue_from(config: &Config) -> UnlockNotificationQueue {
    UnlockNotificationQueue::with_durations(
        Duration::seconds(config.notifications.recency_window_secs as i64),
        Duration::seconds(config.notifications.display_duration_secs as i64),
    )
}

/// Drive [`GamificationEngine::tick`] from a tokio interval; the
/// once-per-minute day-rollover check for daemon-style callers.
pub async fn run_ticker(engine: Arc<Mutex<GamificationEngine>>, period: std::time::Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        interval.tick().await;
        let mut engine = engine.lock().await;
        if let Err(e) = engine.tick() {
            tracing::warn!(error = %e, "periodic tick failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{DateTime, Utc};

    fn manual(start: &str) -> Arc<ManualClock> {
        Arc::new(ManualClock::new(start.parse::<DateTime<Utc>>().unwrap()))
    }

    fn engine_with(clock: Arc<ManualClock>) -> GamificationEngine {
        GamificationEngine::new(Config::default(), clock)
    }

    #[test]
    fn toggle_runs_the_full_reducer() {
        let clock = manual("2026-03-10T08:00:00Z");
        let mut engine = engine_with(clock);
        let id = engine.add_habit("Read", "book", "#333", 21).unwrap().id;

        engine.toggle_habit(&id).unwrap().unwrap();

        // 120 for the completion plus 100 for the First Step unlock.
        assert_eq!(engine.profile().xp_today, 220);
        assert_eq!(engine.profile().streak, 1);
        assert_eq!(engine.profile().total_completions, 1);
        assert!(engine.profile().is_unlocked(AchievementId::FirstStep));
        assert_eq!(
            engine.current_unlock().unwrap().id,
            AchievementId::FirstStep
        );

        let events = engine.drain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::CompletionToggled { completed: true, .. })));
        assert!(events.iter().any(|e| matches!(e, Event::CheckedIn { .. })));
        assert!(events.iter().any(|e| matches!(
            e,
            Event::AchievementUnlocked {
                id: AchievementId::FirstStep,
                ..
            }
        )));
    }

    #[test]
    fn untoggle_refunds_xp_but_keeps_check_in() {
        let clock = manual("2026-03-10T08:00:00Z");
        let mut engine = engine_with(clock);
        let id = engine.add_habit("Read", "book", "#333", 21).unwrap().id;

        engine.toggle_habit(&id).unwrap();
        let outcome = engine.toggle_habit(&id).unwrap().unwrap();
        assert!(!outcome.completed);
        assert_eq!(outcome.streak, 0);

        // Refund removes the completion XP; the unlock reward and the
        // check-in both stand.
        assert_eq!(engine.profile().xp_today, 100);
        assert_eq!(engine.profile().total_completions, 1);
        assert!(engine.profile().is_unlocked(AchievementId::FirstStep));
    }

    #[test]
    fn unknown_habit_is_a_silent_noop() {
        let clock = manual("2026-03-10T08:00:00Z");
        let mut engine = engine_with(clock);
        assert!(engine.toggle_habit("missing").unwrap().is_none());
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn early_bird_habit_bumps_the_count() {
        let clock = manual("2026-03-10T08:00:00Z");
        let mut engine = engine_with(clock);
        let id = engine
            .add_habit("Morning run", "shoe", "#444", 30)
            .unwrap()
            .id;

        engine.toggle_habit(&id).unwrap();
        assert_eq!(engine.profile().early_bird_count, 1);

        let progress = engine
            .profile()
            .achievement_progress(AchievementId::EarlyBird)
            .unwrap();
        assert_eq!(progress.progress, 1);
    }

    #[test]
    fn celebration_waits_for_the_unlock_display() {
        let clock = manual("2026-03-10T08:00:00Z");
        let mut engine = engine_with(clock.clone());
        let a = engine.add_habit("Read", "book", "#333", 21).unwrap().id;
        let b = engine.add_habit("Stretch", "leaf", "#444", 30).unwrap().id;

        engine.toggle_habit(&a).unwrap();
        // First Step unlock is on display, so completing everything
        // today is not celebrated yet.
        engine.toggle_habit(&b).unwrap();
        let events = engine.drain_events();
        assert!(!events
            .iter()
            .any(|e| matches!(e, Event::CelebrationTriggered { .. })));

        // Display clears; re-toggling keeps today fully completed and
        // the celebration fires -- once.
        clock.advance(chrono::Duration::seconds(6));
        engine.tick().unwrap();
        assert!(engine.current_unlock().is_none());

        engine.toggle_habit(&b).unwrap();
        engine.toggle_habit(&b).unwrap();
        let events = engine.drain_events();
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, Event::CelebrationTriggered { .. }))
                .count(),
            1
        );

        engine.toggle_habit(&b).unwrap();
        engine.toggle_habit(&b).unwrap();
        assert!(!engine
            .drain_events()
            .iter()
            .any(|e| matches!(e, Event::CelebrationTriggered { .. })));
    }

    #[test]
    fn past_date_toggle_is_record_only() {
        let clock = manual("2026-03-10T08:00:00Z");
        let mut engine = engine_with(clock);
        let id = engine.add_habit("Read", "book", "#333", 21).unwrap().id;

        let yesterday = "2026-03-09".parse().unwrap();
        let outcome = engine.toggle_habit_on(&id, yesterday).unwrap().unwrap();
        assert!(outcome.completed);
        assert_eq!(outcome.streak, 1);

        assert_eq!(engine.profile().xp_today, 0);
        assert_eq!(engine.profile().total_completions, 0);
    }

    #[test]
    fn day_rollover_resets_xp_today() {
        let clock = manual("2026-03-10T08:00:00Z");
        let mut engine = engine_with(clock.clone());
        let id = engine.add_habit("Read", "book", "#333", 21).unwrap().id;
        engine.toggle_habit(&id).unwrap();
        assert!(engine.profile().xp_today > 0);

        clock.advance(chrono::Duration::days(1));
        engine.tick().unwrap();
        assert_eq!(engine.profile().xp_today, 0);
        assert!(engine
            .drain_events()
            .iter()
            .any(|e| matches!(e, Event::DailyReset { .. })));
    }

    #[test]
    fn snapshot_round_trips_through_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.db");
        let clock = manual("2026-03-10T08:00:00Z");

        let habit_id = {
            let db = StateDb::open_at(&path).unwrap();
            let mut engine =
                GamificationEngine::open(db, Config::default(), clock.clone()).unwrap();
            let id = engine.add_habit("Read", "book", "#333", 21).unwrap().id;
            engine.toggle_habit(&id).unwrap();
            id
        };

        clock.advance(chrono::Duration::seconds(30));
        let db = StateDb::open_at(&path).unwrap();
        let engine = GamificationEngine::open(db, Config::default(), clock).unwrap();
        assert_eq!(engine.profile().total_completions, 1);
        assert!(engine.profile().is_unlocked(AchievementId::FirstStep));
        assert!(engine.tracker().get(&habit_id).unwrap().record.streak == 1);
        // The unlock left the recency window before the restart, so
        // rehydration does not re-announce it.
        assert!(engine.current_unlock().is_none());
    }

    #[test]
    fn corrupt_blob_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.db");
        {
            let db = StateDb::open_at(&path).unwrap();
            db.save("not json at all").unwrap();
        }
        let db = StateDb::open_at(&path).unwrap();
        let clock = manual("2026-03-10T08:00:00Z");
        let engine = GamificationEngine::open(db, Config::default(), clock).unwrap();
        assert_eq!(engine.profile().level, 1);
        assert!(engine.tracker().is_empty());
    }

    #[test]
    fn overview_reports_todays_numbers() {
        let clock = manual("2026-03-10T08:00:00Z");
        let mut engine = engine_with(clock);
        let a = engine.add_habit("Read", "book", "#333", 21).unwrap().id;
        engine.add_habit("Run", "shoe", "#444", 30).unwrap();
        engine.toggle_habit(&a).unwrap();

        let overview = engine.overview();
        assert_eq!(overview.habits_total, 2);
        assert_eq!(overview.completed_today, 1);
        assert_eq!(overview.completion_rate, 50.0);
        assert_eq!(overview.best_streak, 1);
        assert_eq!(overview.global_streak, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_drives_the_auto_clear() {
        let clock = manual("2026-03-10T08:00:00Z");
        let mut engine = engine_with(clock.clone());
        engine.unlock_achievement(AchievementId::FirstStep).unwrap();
        assert!(engine.current_unlock().is_some());

        // Display duration elapses on the engine's clock; the ticker
        // just has to observe it.
        clock.advance(chrono::Duration::seconds(6));

        let engine = Arc::new(Mutex::new(engine));
        let handle = tokio::spawn(run_ticker(
            engine.clone(),
            std::time::Duration::from_secs(60),
        ));
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        assert!(engine.lock().await.current_unlock().is_none());
        handle.abort();
    }
}
