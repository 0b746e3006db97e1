//! # Habitforge Core Library
//!
//! Core business logic for the Habitforge habit tracker: the
//! gamification engine (levels, XP, streaks, achievement unlocks), the
//! habit completion tracker, and their persistence. It follows a
//! CLI-first philosophy: every operation is available through the
//! standalone CLI binary, and any GUI is a thin layer over this same
//! library.
//!
//! ## Architecture
//!
//! - **Level arithmetic**: pure XP-to-level functions; levels come in
//!   bands of three with a 1.5x cost multiplier per band
//! - **Streak engine**: per-habit streaks recomputed from sparse
//!   completion records on every toggle
//! - **Achievement rules**: pure predicates from accumulated metrics
//!   to unlock/progress decisions
//! - **Engine service**: one explicit object owning profile, tracker,
//!   unlock queue, and celebration gate; every completion toggle runs
//!   a single synchronous reducer step
//! - **Storage**: SQLite-backed single-blob state store plus TOML
//!   configuration
//!
//! ## Key Components
//!
//! - [`GamificationEngine`]: the service object consumers hold
//! - [`Profile`]: the persisted gamification aggregate
//! - [`HabitTracker`]: habit registry and completion records
//! - [`UnlockNotificationQueue`]: serializes unlock events for display

pub mod achievements;
pub mod clock;
pub mod error;
pub mod events;
pub mod level;
pub mod notify;
pub mod profile;
pub mod service;
pub mod storage;
pub mod streak;
pub mod tracker;

pub use achievements::{AchievementDef, AchievementId, AchievementState, Rarity, CATALOG};
pub use clock::{Clock, SystemClock};
pub use error::{ConfigError, CoreError, StoreError};
pub use events::Event;
pub use notify::{CelebrationGate, UnlockEvent, UnlockNotificationQueue};
pub use profile::{AchievementProgress, Profile, XpApplied};
pub use service::{run_ticker, EngineSnapshot, GamificationEngine, Overview};
pub use storage::{Config, StateDb};
pub use streak::{CompletionRecord, StreakSnapshot};
pub use tracker::{HabitEntry, HabitTracker, ToggleOutcome};
