//! Executes parsed tool calls against the fixture store.

use std::sync::Arc;

use courier_core::{SessionContext, ToolKind};
use courier_store::FixtureStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::args::{CreateEventArgs, SearchEmailArgs, SearchEventArgs, SendEmailArgs};
use crate::ToolError;

/// Search output shape: matching rows plus their count.
#[derive(Debug, Serialize)]
struct SearchResults<T> {
    results: Vec<T>,
    count: usize,
}

fn render<T: Serialize>(results: Vec<T>) -> Result<String, ToolError> {
    let payload = SearchResults { count: results.len(), results };
    serde_json::to_string(&payload).map_err(|e| ToolError::ExecutionFailed(e.to_string()))
}

fn parse_args<T: DeserializeOwned>(arguments: &serde_json::Value) -> Result<T, ToolError> {
    serde_json::from_value(arguments.clone()).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

/// The executable tools, bound to a fixture store.
///
/// Dispatch takes an already-parsed [`ToolKind`]; persona permission checks
/// happen upstream in the router, which owns the persona notion.
pub struct Toolbox {
    store: Arc<FixtureStore>,
}

impl Toolbox {
    pub fn new(store: Arc<FixtureStore>) -> Self {
        Self { store }
    }

    /// Runs one tool call and renders the content for its result message.
    pub async fn dispatch(
        &self,
        kind: ToolKind,
        arguments: &serde_json::Value,
        ctx: &SessionContext,
    ) -> Result<String, ToolError> {
        debug!("TOOLS: executing {}", kind);
        match kind {
            ToolKind::SearchEmails => self.search_emails(arguments),
            ToolKind::SearchCalendarEvents => self.search_events(arguments),
            ToolKind::CreateCalendarEvent => self.create_event(arguments),
            ToolKind::SendEmail => self.send_email(arguments, ctx),
            ToolKind::DelegateWriter | ToolKind::CompleteOrEscalate => {
                Err(ToolError::ExecutionFailed(format!(
                    "'{kind}' is a control tool; invoke it on its own with no other tool calls"
                )))
            }
        }
    }

    fn search_emails(&self, arguments: &serde_json::Value) -> Result<String, ToolError> {
        let args: SearchEmailArgs = parse_args(arguments)?;
        let found = self.store.search_emails(&args.into_filter())?;
        render(found)
    }

    fn search_events(&self, arguments: &serde_json::Value) -> Result<String, ToolError> {
        let args: SearchEventArgs = parse_args(arguments)?;
        let found = self.store.search_events(&args.into_filter())?;
        render(found)
    }

    fn create_event(&self, arguments: &serde_json::Value) -> Result<String, ToolError> {
        let args: CreateEventArgs = parse_args(arguments)?;
        self.store.insert_event(
            &args.title,
            args.description.as_deref(),
            &args.start_time,
            &args.end_time,
        )?;
        Ok(format!(
            "Calendar event created: {} from {} to {}.",
            args.title, args.start_time, args.end_time
        ))
    }

    fn send_email(
        &self,
        arguments: &serde_json::Value,
        ctx: &SessionContext,
    ) -> Result<String, ToolError> {
        let args: SendEmailArgs = parse_args(arguments)?;
        let thread_id = self.store.insert_email(
            &ctx.user_id,
            &args.to,
            &args.subject,
            &args.body,
            args.thread_id,
        )?;
        debug!("TOOLS: email sent on thread {}", thread_id);
        Ok(format!("Email sent to {} with subject '{}'.", args.to, args.subject))
    }
}
