//! Core domain types and error definitions for courier.
//!
//! This crate provides the fundamental types shared across the courier
//! workspace:
//!
//! - [`AgentError`] — Error type for dialog and model operations
//! - [`Message`] and [`MessageRole`] — Conversation message types
//! - [`ToolCall`], [`ToolResult`], [`ToolSchema`] — Tool interaction types
//! - [`ToolKind`] — The closed set of tool identifiers the harness knows
//! - [`SessionContext`] — Per-session user identity and session id
//!
//! # Example
//!
//! ```rust
//! use courier_core::{Message, ToolKind};
//!
//! let msg = Message::user("Did Priya reply about the offsite?");
//! assert!(!msg.has_tool_calls());
//!
//! let kind = ToolKind::parse("search_emails").unwrap();
//! assert!(!kind.is_control());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while driving a dialog turn.
///
/// Tool-level failures never surface here; the router converts them into
/// correlated error messages and feeds them back to the model. These
/// variants are the fatal cases the surrounding harness has to see.
#[derive(Error, Debug)]
pub enum AgentError {
    /// Model API request failed.
    #[error("model request failed: {0}")]
    Model(String),

    /// Model request kept failing after the bounded retry budget.
    #[error("model request failed after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },

    /// A single turn bounced between router states too many times.
    #[error("dialog turn exceeded {0} routing steps")]
    TurnLimit(usize),

    /// Conversation state could not be serialized or deserialized.
    #[error("state serialization failed: {0}")]
    State(String),

    /// Checkpoint store read or write failed.
    #[error("checkpoint store failed: {0}")]
    Checkpoint(String),
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        AgentError::State(err.to_string())
    }
}

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from either assistant persona.
    Assistant,
    /// Tool output (real or synthesized by the router) correlated to a call.
    Tool,
}

/// A single message in a conversation history.
///
/// Assistant messages may carry tool calls; tool messages carry the id of
/// the call they answer. Serialized as-is into the checkpoint store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message sender.
    pub role: MessageRole,
    /// The content of the message.
    pub content: String,
    /// Tool calls requested by an assistant message.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// For tool messages, the id of the call this answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    /// Creates a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Creates a new assistant message without tool calls.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::assistant_with_calls(content, Vec::new())
    }

    /// Creates a new assistant message carrying tool calls.
    pub fn assistant_with_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            tool_calls,
            tool_call_id: None,
        }
    }

    /// Creates a tool-response message correlated to a call id.
    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Tool,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: Some(tool_call_id.into()),
        }
    }

    /// Whether this message requests any tool calls.
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

// ============================================================================
// Tool Types
// ============================================================================

/// A tool call requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Model-generated identifier, used to correlate the result.
    pub id: String,
    /// Name of the tool to execute.
    pub name: String,
    /// Arguments to pass to the tool (JSON object).
    pub arguments: serde_json::Value,
}

impl ToolCall {
    /// The closed tool identifier for this call's name, if the name is known.
    pub fn kind(&self) -> Option<ToolKind> {
        ToolKind::parse(&self.name)
    }
}

/// Result of a tool execution, to be appended as a tool message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// ID from the original tool call request.
    pub tool_call_id: String,
    /// Output content from the tool execution.
    pub content: String,
}

impl ToolResult {
    pub fn new(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self { tool_call_id: tool_call_id.into(), content: content.into() }
    }
}

/// JSON schema describing a tool for model function calling.
///
/// Follows the OpenAI function calling format; the Anthropic client
/// translates it to that API's input_schema shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Unique name of the tool (e.g., "search_emails").
    pub name: String,
    /// Human-readable description of what the tool does.
    pub description: String,
    /// JSON Schema object describing the tool's parameters.
    pub parameters: serde_json::Value,
}

// ============================================================================
// Tool Identifiers
// ============================================================================

/// The closed set of tools the harness understands.
///
/// Tool names coming back from the model are parsed into this enum at the
/// routing boundary; anything that does not parse is answered with a
/// tool-execution error instead of being looked up in a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    /// Substring search over stored emails.
    SearchEmails,
    /// Substring search over stored calendar events.
    SearchCalendarEvents,
    /// Insert a calendar event.
    CreateCalendarEvent,
    /// Insert an email on behalf of the session user.
    SendEmail,
    /// Control tool: hand the dialog to the writer persona.
    DelegateWriter,
    /// Control tool: return the dialog from the writer persona.
    CompleteOrEscalate,
}

impl ToolKind {
    /// Parses a wire-level tool name into a known identifier.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "search_emails" => Some(Self::SearchEmails),
            "search_calendar_events" => Some(Self::SearchCalendarEvents),
            "create_calendar_event" => Some(Self::CreateCalendarEvent),
            "send_email" => Some(Self::SendEmail),
            "delegate_writer" => Some(Self::DelegateWriter),
            "complete_or_escalate" => Some(Self::CompleteOrEscalate),
            _ => None,
        }
    }

    /// The wire-level name presented to the model.
    pub const fn name(self) -> &'static str {
        match self {
            Self::SearchEmails => "search_emails",
            Self::SearchCalendarEvents => "search_calendar_events",
            Self::CreateCalendarEvent => "create_calendar_event",
            Self::SendEmail => "send_email",
            Self::DelegateWriter => "delegate_writer",
            Self::CompleteOrEscalate => "complete_or_escalate",
        }
    }

    /// Control tools drive routing instead of executing against the store.
    pub const fn is_control(self) -> bool {
        matches!(self, Self::DelegateWriter | Self::CompleteOrEscalate)
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Session Context
// ============================================================================

/// Identity and session id a dialog runs under.
///
/// The user id is injected into both persona prompts and is the sender
/// address for outgoing email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionContext {
    /// Email address of the configured user.
    pub user_id: String,
    /// Stable id used to key checkpoints.
    pub session_id: String,
}

impl SessionContext {
    pub fn new(user_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), session_id: session_id.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_kind_round_trips_names() {
        for kind in [
            ToolKind::SearchEmails,
            ToolKind::SearchCalendarEvents,
            ToolKind::CreateCalendarEvent,
            ToolKind::SendEmail,
            ToolKind::DelegateWriter,
            ToolKind::CompleteOrEscalate,
        ] {
            assert_eq!(ToolKind::parse(kind.name()), Some(kind));
        }
        assert_eq!(ToolKind::parse("fetch_url"), None);
    }

    #[test]
    fn control_tools_are_marked() {
        assert!(ToolKind::DelegateWriter.is_control());
        assert!(ToolKind::CompleteOrEscalate.is_control());
        assert!(!ToolKind::SearchEmails.is_control());
        assert!(!ToolKind::SendEmail.is_control());
    }

    #[test]
    fn message_serde_skips_empty_tool_fields() {
        let msg = Message::user("hello");
        let json = serde_json::to_value(&msg).unwrap();
        assert!(json.get("tool_calls").is_none());
        assert!(json.get("tool_call_id").is_none());

        let tool = Message::tool("call_1", "done");
        let json = serde_json::to_value(&tool).unwrap();
        assert_eq!(json["tool_call_id"], "call_1");
    }
}
