pub mod achievements;
pub mod habit;
pub mod notify;
pub mod profile;
pub mod stats;

use std::sync::Arc;

use habitforge_core::{Config, GamificationEngine, StateDb, SystemClock};

/// Open the engine against the default store and configuration.
pub fn open_engine() -> Result<GamificationEngine, Box<dyn std::error::Error>> {
    let db = StateDb::open()?;
    let config = Config::load()?;
    let engine = GamificationEngine::open(db, config, Arc::new(SystemClock))?;
    Ok(engine)
}
