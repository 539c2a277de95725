//! SQLite persistence for the courier harness.
//!
//! Two independent stores live here:
//!
//! - [`FixtureStore`] — the synthetic mailbox and calendar the assistant's
//!   tools run against, seeded once at startup with sample data placed
//!   relative to a supplied clock
//! - [`CheckpointStore`] — serialized conversation state keyed by session
//!   id, so an interrupted dialog (including one parked mid-delegation)
//!   resumes where it left off
//!
//! All timestamps are stored as `YYYY-MM-DD HH:MM:SS` text, which makes
//! lexicographic comparison chronological and lets a bare `YYYY-MM-DD`
//! range bound compare correctly against full timestamps.

use thiserror::Error;

mod checkpoint;
mod fixtures;
mod seed;
pub mod time;

pub use checkpoint::CheckpointStore;
pub use fixtures::{EmailFilter, EmailRecord, EventFilter, EventRecord, FixtureStore};
pub use seed::DEFAULT_USER;

/// Errors raised by the fixture and checkpoint stores.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying SQLite operation failed.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Filesystem error while preparing a database path.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A previous holder of the connection lock panicked.
    #[error("store connection lock poisoned")]
    LockPoisoned,

    /// A timestamp argument did not parse.
    #[error("invalid timestamp '{0}': expected YYYY-MM-DD or YYYY-MM-DD HH:MM:SS")]
    InvalidTimestamp(String),
}
