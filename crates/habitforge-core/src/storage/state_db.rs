//! SQLite-backed durable key-value store for engine state.
//!
//! The engine serializes its whole aggregate (profile + tracker +
//! celebration gate) as a single JSON blob keyed in the `kv` table.
//! One `INSERT OR REPLACE` per save keeps the write atomic: a crash
//! mid-write can never leave achievements inconsistent with level/XP.

use std::path::Path;

use rusqlite::{params, Connection};

use super::data_dir;
use crate::error::StoreError;

/// Key under which the engine aggregate is stored.
pub const STATE_KEY: &str = "gamification_state";

/// SQLite database holding the persisted engine state.
pub struct StateDb {
    conn: Connection,
}

impl StateDb {
    /// Open the database at `~/.config/habitforge/habitforge.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StoreError> {
        let dir = data_dir().map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        Self::open_at(&dir.join("habitforge.db"))
    }

    /// Open the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::OpenFailed {
            path: ":memory:".into(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );",
            )
            .map_err(|e| StoreError::MigrationFailed(e.to_string()))
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Load the persisted aggregate blob, if any.
    pub fn load(&self) -> Result<Option<String>, StoreError> {
        self.kv_get(STATE_KEY)
    }

    /// Persist the aggregate blob atomically.
    pub fn save(&self, blob: &str) -> Result<(), StoreError> {
        self.kv_set(STATE_KEY, blob)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kv_store() {
        let db = StateDb::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
    }

    #[test]
    fn save_replaces_previous_blob() {
        let db = StateDb::open_memory().unwrap();
        assert!(db.load().unwrap().is_none());
        db.save("{\"v\":1}").unwrap();
        db.save("{\"v\":2}").unwrap();
        assert_eq!(db.load().unwrap().unwrap(), "{\"v\":2}");
    }

    #[test]
    fn reopen_preserves_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.db");
        {
            let db = StateDb::open_at(&path).unwrap();
            db.save("persisted").unwrap();
        }
        let db = StateDb::open_at(&path).unwrap();
        assert_eq!(db.load().unwrap().unwrap(), "persisted");
    }
}
