//! The synthetic mailbox and calendar the assistant's tools query.

use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::types::ToSql;
use rusqlite::{params, params_from_iter, Connection};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{time, StoreError};

/// A stored email row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailRecord {
    pub id: i64,
    pub sender: String,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub timestamp: String,
    pub thread_id: i64,
}

/// A stored calendar event, projected without its row id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub title: String,
    pub description: Option<String>,
    pub start_time: String,
    pub end_time: String,
}

/// Structured filters for an email search.
///
/// `queries` holds free-text query strings; everything else narrows the
/// result further. All filters AND together.
#[derive(Debug, Clone, Default)]
pub struct EmailFilter {
    pub queries: Vec<String>,
    pub sender: Option<String>,
    pub recipient: Option<String>,
    /// Inclusive lower bound on `timestamp`.
    pub start_date: Option<String>,
    /// Exclusive upper bound on `timestamp`.
    pub end_date: Option<String>,
    /// Exact thread match. Zero behaves like an absent filter.
    pub thread_id: Option<i64>,
}

/// Structured filters for a calendar search.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub queries: Vec<String>,
    /// Inclusive lower bound on `start_time`.
    pub start_date: Option<String>,
    /// Exclusive upper bound on `end_time`.
    pub end_date: Option<String>,
}

/// SQLite-backed mailbox and calendar fixture.
///
/// The connection sits behind a `Mutex` so the store can be shared across
/// concurrently dispatched tool calls; statements themselves are short and
/// synchronous.
pub struct FixtureStore {
    conn: Mutex<Connection>,
}

impl FixtureStore {
    /// Opens (creating directories and tables as needed) a store at `path`.
    pub fn open(path: &str) -> Result<Self, StoreError> {
        if let Some(parent) = Path::new(path).parent() {
            fs::create_dir_all(parent)?;
        }
        let store = Self::init(Connection::open(path)?)?;
        info!("Fixture store ready at {}", path);
        Ok(store)
    }

    /// Opens an in-memory store. Used by tests and throwaway runs.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS emails (
                id INTEGER PRIMARY KEY,
                sender TEXT NOT NULL,
                recipient TEXT NOT NULL,
                subject TEXT NOT NULL,
                body TEXT NOT NULL,
                timestamp DATE DEFAULT CURRENT_TIMESTAMP,
                thread_id INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS calendar_events (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT,
                start_time TIMESTAMP NOT NULL,
                end_time TIMESTAMP NOT NULL
            );",
        )?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Searches emails with free-text tokens and structured filters.
    ///
    /// Every token from [`query_tokens`] becomes a substring predicate over
    /// subject, body, sender and recipient; token predicates OR together and
    /// AND with the structured filters. Rows come back in insertion order;
    /// there is no ranking.
    pub fn search_emails(&self, filter: &EmailFilter) -> Result<Vec<EmailRecord>, StoreError> {
        let mut sql = String::from(
            "SELECT id, sender, recipient, subject, body, timestamp, thread_id \
             FROM emails WHERE 1=1",
        );
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();

        let tokens = query_tokens(&filter.queries);
        if !tokens.is_empty() {
            let group = tokens
                .iter()
                .map(|_| "(subject LIKE ? OR body LIKE ? OR sender LIKE ? OR recipient LIKE ?)")
                .collect::<Vec<_>>()
                .join(" OR ");
            sql.push_str(&format!(" AND ({group})"));
            for token in &tokens {
                let pattern = format!("%{token}%");
                for _ in 0..4 {
                    params.push(Box::new(pattern.clone()));
                }
            }
        }
        if let Some(sender) = &filter.sender {
            sql.push_str(" AND sender LIKE ?");
            params.push(Box::new(format!("%{sender}%")));
        }
        if let Some(recipient) = &filter.recipient {
            sql.push_str(" AND recipient LIKE ?");
            params.push(Box::new(format!("%{recipient}%")));
        }
        if let Some(start) = &filter.start_date {
            sql.push_str(" AND timestamp >= ?");
            params.push(Box::new(time::normalize_timestamp(start)?));
        }
        if let Some(end) = &filter.end_date {
            sql.push_str(" AND timestamp < ?");
            params.push(Box::new(time::normalize_timestamp(end)?));
        }
        if let Some(thread_id) = filter.thread_id {
            if thread_id != 0 {
                sql.push_str(" AND thread_id = ?");
                params.push(Box::new(thread_id));
            }
        }

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
            Ok(EmailRecord {
                id: row.get(0)?,
                sender: row.get(1)?,
                recipient: row.get(2)?,
                subject: row.get(3)?,
                body: row.get(4)?,
                timestamp: row.get(5)?,
                thread_id: row.get(6)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Searches calendar events with free-text tokens and a date window.
    ///
    /// Tokens match title and description. The start bound is inclusive on
    /// `start_time`; the end bound is exclusive and tests `end_time`.
    pub fn search_events(&self, filter: &EventFilter) -> Result<Vec<EventRecord>, StoreError> {
        let mut sql = String::from(
            "SELECT title, description, start_time, end_time FROM calendar_events WHERE 1=1",
        );
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();

        let tokens = query_tokens(&filter.queries);
        if !tokens.is_empty() {
            let group = tokens
                .iter()
                .map(|_| "(title LIKE ? OR description LIKE ?)")
                .collect::<Vec<_>>()
                .join(" OR ");
            sql.push_str(&format!(" AND ({group})"));
            for token in &tokens {
                let pattern = format!("%{token}%");
                for _ in 0..2 {
                    params.push(Box::new(pattern.clone()));
                }
            }
        }
        if let Some(start) = &filter.start_date {
            sql.push_str(" AND start_time >= ?");
            params.push(Box::new(time::normalize_timestamp(start)?));
        }
        if let Some(end) = &filter.end_date {
            sql.push_str(" AND end_time < ?");
            params.push(Box::new(time::normalize_timestamp(end)?));
        }

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
            Ok(EventRecord {
                title: row.get(0)?,
                description: row.get(1)?,
                start_time: row.get(2)?,
                end_time: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Next thread id by `COALESCE(MAX(thread_id), 0) + 1`, so an empty
    /// store starts at 1.
    ///
    /// Max-plus-one is a separate read and write. Two writers sharing the
    /// database file can observe the same max and assign colliding thread
    /// ids; the harness runs a single process and leaves that race in place.
    pub fn next_thread_id(&self) -> Result<i64, StoreError> {
        let conn = self.lock()?;
        Ok(next_thread_id_locked(&conn)?)
    }

    /// Inserts an outgoing email, assigning the next thread id when none is
    /// given, and returns the thread id used. The timestamp comes from the
    /// schema default.
    pub fn insert_email(
        &self,
        sender: &str,
        recipient: &str,
        subject: &str,
        body: &str,
        thread_id: Option<i64>,
    ) -> Result<i64, StoreError> {
        let conn = self.lock()?;
        let thread_id = match thread_id {
            Some(id) => id,
            None => next_thread_id_locked(&conn)?,
        };
        conn.execute(
            "INSERT INTO emails (sender, recipient, subject, body, thread_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![sender, recipient, subject, body, thread_id],
        )?;
        Ok(thread_id)
    }

    /// Inserts an email with an explicit timestamp. Seed data only.
    pub(crate) fn insert_email_at(
        &self,
        sender: &str,
        recipient: &str,
        subject: &str,
        body: &str,
        timestamp: &str,
        thread_id: i64,
    ) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO emails (sender, recipient, subject, body, timestamp, thread_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![sender, recipient, subject, body, timestamp, thread_id],
        )?;
        Ok(())
    }

    /// Inserts a calendar event. The interval is stored as given; an end
    /// before the start is accepted.
    pub fn insert_event(
        &self,
        title: &str,
        description: Option<&str>,
        start_time: &str,
        end_time: &str,
    ) -> Result<(), StoreError> {
        let start = time::normalize_timestamp(start_time)?;
        let end = time::normalize_timestamp(end_time)?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO calendar_events (title, description, start_time, end_time)
             VALUES (?1, ?2, ?3, ?4)",
            params![title, description, start, end],
        )?;
        Ok(())
    }

    /// Number of stored emails.
    pub fn email_count(&self) -> Result<i64, StoreError> {
        let conn = self.lock()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM emails", [], |r| r.get(0))?)
    }

    /// Number of stored calendar events.
    pub fn event_count(&self) -> Result<i64, StoreError> {
        let conn = self.lock()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM calendar_events", [], |r| r.get(0))?)
    }
}

fn next_thread_id_locked(conn: &Connection) -> Result<i64, rusqlite::Error> {
    conn.query_row("SELECT COALESCE(MAX(thread_id), 0) + 1 FROM emails", [], |r| r.get(0))
}

/// Splits query strings into substring-match tokens.
///
/// Each query is split on `"` and each piece whitespace-tokenized, so
/// quoting changes segmentation but every word still matches on its own.
/// `*` becomes the SQL wildcard `%`.
fn query_tokens(queries: &[String]) -> Vec<String> {
    queries
        .iter()
        .flat_map(|q| q.split('"'))
        .flat_map(str::split_whitespace)
        .map(|token| token.replace('*', "%"))
        .collect()
}
