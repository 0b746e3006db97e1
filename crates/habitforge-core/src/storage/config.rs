//! TOML-based engine configuration.
//!
//! Tunables for:
//! - XP per habit completion
//! - Unlock notification display and recency windows
//! - Celebration gating
//! - Extra early-bird keywords
//!
//! Configuration is stored at `~/.config/habitforge/config.toml`.
//! Missing files and missing keys fall back to defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::ConfigError;

/// XP configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XpConfig {
    /// XP granted per habit completion (and refunded on un-toggle).
    #[serde(default = "default_xp_per_completion")]
    pub per_completion: i64,
}

impl Default for XpConfig {
    fn default() -> Self {
        Self {
            per_completion: default_xp_per_completion(),
        }
    }
}

/// Unlock notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Seconds a displayed unlock stays up before auto-clearing.
    #[serde(default = "default_5")]
    pub display_duration_secs: u64,
    /// Seconds after unlock during which a scan still announces it.
    #[serde(default = "default_5")]
    pub recency_window_secs: u64,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            display_duration_secs: default_5(),
            recency_window_secs: default_5(),
        }
    }
}

/// Celebration configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CelebrationConfig {
    /// Minimum tracked habits before the all-done celebration fires.
    #[serde(default = "default_min_tracked")]
    pub min_tracked: usize,
}

impl Default for CelebrationConfig {
    fn default() -> Self {
        Self {
            min_tracked: default_min_tracked(),
        }
    }
}

/// Early-bird keyword configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EarlyBirdConfig {
    /// Keywords added to the built-in early-morning set.
    #[serde(default)]
    pub extra_keywords: Vec<String>,
}

/// Engine configuration.
///
/// Serialized to/from TOML at `~/.config/habitforge/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub xp: XpConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub celebration: CelebrationConfig,
    #[serde(default)]
    pub early_bird: EarlyBirdConfig,
}

fn default_xp_per_completion() -> i64 {
    120
}
fn default_5() -> u64 {
    5
}
fn default_min_tracked() -> usize {
    2
}

impl Config {
    fn default_path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/habitforge"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from the default location, falling back to defaults when
    /// the file does not exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or
    /// parsed.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&raw).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Save to the default location.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::default_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let raw = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, raw).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_engine_constants() {
        let config = Config::default();
        assert_eq!(config.xp.per_completion, 120);
        assert_eq!(config.notifications.display_duration_secs, 5);
        assert_eq!(config.celebration.min_tracked, 2);
        assert!(config.early_bird.extra_keywords.is_empty());
    }

    #[test]
    fn partial_toml_fills_missing_sections() {
        let config: Config = toml::from_str("[xp]\nper_completion = 200\n").unwrap();
        assert_eq!(config.xp.per_completion, 200);
        assert_eq!(config.notifications.recency_window_secs, 5);
    }

    #[test]
    fn round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.xp.per_completion = 150;
        config.early_bird.extra_keywords.push("dawn".to_string());
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.xp.per_completion, 150);
        assert_eq!(loaded.early_bird.extra_keywords, vec!["dawn".to_string()]);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.xp.per_completion, 120);
    }
}
