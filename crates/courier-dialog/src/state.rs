//! The serializable conversation state a session checkpoints.

use courier_core::{Message, MessageRole, ToolCall};
use serde::{Deserialize, Serialize};

use crate::persona::Persona;

/// Transcript plus the persona stack.
///
/// The stack is part of the state itself, so a checkpoint taken
/// mid-delegation resumes with the writer in control. Empty stack means the
/// main assistant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationState {
    pub messages: Vec<Message>,
    #[serde(default)]
    pub dialog_stack: Vec<Persona>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The persona currently in control.
    pub fn active_persona(&self) -> Persona {
        self.dialog_stack.last().copied().unwrap_or(Persona::Main)
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn push_persona(&mut self, persona: Persona) {
        self.dialog_stack.push(persona);
    }

    pub fn pop_persona(&mut self) -> Option<Persona> {
        self.dialog_stack.pop()
    }

    /// Tool calls on the most recent message that still await responses.
    ///
    /// Empty unless the last message is an assistant message carrying calls;
    /// once the tool results are appended the last message is a tool message
    /// and nothing is pending.
    pub fn pending_calls(&self) -> &[ToolCall] {
        match self.messages.last() {
            Some(m) if m.has_tool_calls() => &m.tool_calls,
            _ => &[],
        }
    }

    /// Content of the most recent assistant message.
    pub fn last_assistant_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::Assistant)
            .map(|m| m.content.as_str())
    }
}
