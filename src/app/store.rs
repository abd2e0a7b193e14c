// src/app/store.rs
use std::fs;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;
use tracing::{info, warn};

use crate::app::types::WatchedEntry;

/// Storage slot holding the JSON array of watched entries.
pub const WATCHED_KEY: &str = "watched";

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS kv (
  key   TEXT PRIMARY KEY NOT NULL,
  value TEXT NOT NULL
)
"#;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("storage encode: {0}")]
    Json(#[from] serde_json::Error),
    #[error("storage dir: {0}")]
    Io(#[from] std::io::Error),
}

/// String-keyed slots in a single SQLite table.
pub struct KvStore {
    conn: Connection,
}

impl KvStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let v = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(v)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", [key])?;
        Ok(())
    }
}

/// Loads and saves the watched list under [`WATCHED_KEY`].
pub struct WatchedStore {
    kv: KvStore,
}

impl WatchedStore {
    pub fn new(kv: KvStore) -> Self {
        Self { kv }
    }

    /// Opens the on-disk store, or an in-memory one if that fails so the app
    /// still runs (changes are then lost on exit).
    pub fn open_or_memory(path: &Path) -> Result<Self, StoreError> {
        match KvStore::open(path) {
            Ok(kv) => {
                info!("watched list storage: {}", path.display());
                Ok(Self::new(kv))
            }
            Err(e) => {
                warn!("cannot open {} ({e}); watched list will not persist", path.display());
                KvStore::open_in_memory().map(Self::new)
            }
        }
    }

    /// Missing or unreadable data yields an empty list.
    pub fn load(&self) -> Vec<WatchedEntry> {
        let raw = match self.kv.get(WATCHED_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("reading watched list failed: {e}");
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<WatchedEntry>>(&raw) {
            Ok(list) => list,
            Err(e) => {
                warn!("stored watched list is corrupt ({e}); starting empty");
                Vec::new()
            }
        }
    }

    pub fn save(&self, entries: &[WatchedEntry]) -> Result<(), StoreError> {
        let json = serde_json::to_string(entries)?;
        self.kv.set(WATCHED_KEY, &json)
    }

    #[cfg(test)]
    pub(crate) fn kv(&self) -> &KvStore {
        &self.kv
    }
}
