//! Typed argument structs for each tool.
//!
//! Unknown fields are rejected so a hallucinated parameter surfaces as an
//! invalid-arguments error the model can correct, instead of being silently
//! dropped.

use courier_store::{EmailFilter, EventFilter};
use serde::Deserialize;

/// Free-text queries: the model may send one string or a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Queries {
    One(String),
    Many(Vec<String>),
}

impl Queries {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(q) => vec![q],
            Self::Many(qs) => qs,
        }
    }
}

/// Arguments for `search_emails`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchEmailArgs {
    #[serde(default)]
    pub queries: Option<Queries>,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub recipient: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub thread_id: Option<i64>,
}

impl SearchEmailArgs {
    pub fn into_filter(self) -> EmailFilter {
        EmailFilter {
            queries: self.queries.map(Queries::into_vec).unwrap_or_default(),
            sender: self.sender,
            recipient: self.recipient,
            start_date: self.start_date,
            end_date: self.end_date,
            thread_id: self.thread_id,
        }
    }
}

/// Arguments for `search_calendar_events`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchEventArgs {
    #[serde(default)]
    pub queries: Option<Queries>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

impl SearchEventArgs {
    pub fn into_filter(self) -> EventFilter {
        EventFilter {
            queries: self.queries.map(Queries::into_vec).unwrap_or_default(),
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// Arguments for `create_calendar_event`. The interval is not validated.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateEventArgs {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_time: String,
    pub end_time: String,
}

/// Arguments for `send_email`. The sender is always the session user.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendEmailArgs {
    pub to: String,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub thread_id: Option<i64>,
}

/// Arguments for the `delegate_writer` control tool.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DelegateWriterArgs {
    /// What the writer persona is being asked to do.
    pub request: String,
}

/// Arguments for the `complete_or_escalate` control tool.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompleteOrEscalateArgs {
    /// Whether the writer is abandoning the task rather than finishing it.
    #[serde(default = "default_cancel")]
    pub cancel: bool,
    pub reason: String,
}

fn default_cancel() -> bool {
    true
}
