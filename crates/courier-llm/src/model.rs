//! The model-invocation seam the router depends on.

use async_trait::async_trait;
use courier_core::{AgentError, Message, ToolCall, ToolSchema};

/// Token usage and timing metrics from a model call.
#[derive(Debug, Clone, Default)]
pub struct LlmMetrics {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub elapsed_ms: u64,
}

/// One model response: text, tool calls, or both.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
    pub metrics: LlmMetrics,
}

impl ChatTurn {
    /// A plain text turn. Mostly useful for scripted test models.
    pub fn text(content: impl Into<String>) -> Self {
        Self { content: content.into(), tool_calls: Vec::new(), metrics: LlmMetrics::default() }
    }

    /// A turn carrying tool calls (and possibly preamble text).
    pub fn with_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self { content: content.into(), tool_calls, metrics: LlmMetrics::default() }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// The assistant message this turn appends to the conversation.
    pub fn into_message(self) -> Message {
        Message::assistant_with_calls(self.content, self.tool_calls)
    }
}

/// Anything that can answer a persona's chat request.
///
/// Implementations must tolerate histories that interleave tool calls and
/// correlated tool results; the router guarantees every call in the history
/// already has its result by the time it invokes the model again.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn chat(
        &self,
        system_prompt: &str,
        history: &[Message],
        tools: &[ToolSchema],
    ) -> Result<ChatTurn, AgentError>;
}

/// Converts any error into an AgentError::Model.
pub(crate) fn llm_err(e: impl ToString) -> AgentError {
    AgentError::Model(e.to_string())
}
