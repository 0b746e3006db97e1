//! Persistence: TOML configuration and the SQLite-backed state store.

mod config;
mod state_db;

pub use config::{CelebrationConfig, Config, EarlyBirdConfig, NotificationsConfig, XpConfig};
pub use state_db::StateDb;

use std::path::PathBuf;

/// Returns `~/.config/habitforge[-dev]/` based on HABITFORGE_ENV.
///
/// Set HABITFORGE_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if the config directory cannot be created.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("HABITFORGE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("habitforge-dev")
    } else {
        base_dir.join("habitforge")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
