//! Serialized conversation state keyed by session id.

use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::StoreError;

/// SQLite-backed checkpoint store.
///
/// State is stored as opaque JSON; the dialog layer owns the shape. A save
/// replaces any previous checkpoint for the session, so the store always
/// holds exactly the state as of the last completed turn.
pub struct CheckpointStore {
    conn: Mutex<Connection>,
}

impl CheckpointStore {
    /// Opens (creating directories and the table as needed) a store at `path`.
    pub fn open(path: &str) -> Result<Self, StoreError> {
        if let Some(parent) = Path::new(path).parent() {
            fs::create_dir_all(parent)?;
        }
        let store = Self::init(Connection::open(path)?)?;
        info!("Checkpoint store ready at {}", path);
        Ok(store)
    }

    /// Opens an in-memory store; checkpoints vanish with the process.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS sessions (
                session_id TEXT PRIMARY KEY,
                state_json TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );",
        )?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Saves (or replaces) the checkpoint for a session.
    pub fn save(&self, session_id: &str, state_json: &str) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO sessions (session_id, state_json, updated_at)
             VALUES (?1, ?2, datetime('now'))",
            params![session_id, state_json],
        )?;
        debug!("Checkpointed session {}", session_id);
        Ok(())
    }

    /// Loads the checkpoint for a session, if one exists.
    pub fn load(&self, session_id: &str) -> Result<Option<String>, StoreError> {
        let conn = self.lock()?;
        let state = conn
            .query_row(
                "SELECT state_json FROM sessions WHERE session_id = ?1",
                params![session_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_session_loads_none() {
        let store = CheckpointStore::open_in_memory().unwrap();
        assert!(store.load("nope").unwrap().is_none());
    }

    #[test]
    fn save_replaces_previous_checkpoint() {
        let store = CheckpointStore::open_in_memory().unwrap();
        store.save("s1", "{\"turn\":1}").unwrap();
        store.save("s1", "{\"turn\":2}").unwrap();
        assert_eq!(store.load("s1").unwrap().as_deref(), Some("{\"turn\":2}"));
    }

    #[test]
    fn checkpoints_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.db");
        let path = path.to_str().unwrap();

        {
            let store = CheckpointStore::open(path).unwrap();
            store.save("s1", "{\"messages\":[]}").unwrap();
        }
        let store = CheckpointStore::open(path).unwrap();
        assert_eq!(store.load("s1").unwrap().as_deref(), Some("{\"messages\":[]}"));
    }
}
