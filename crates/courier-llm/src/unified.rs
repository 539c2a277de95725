//! Provider routing by model name.

use async_trait::async_trait;
use courier_core::{AgentError, Message, ToolSchema};

use crate::anthropic::AnthropicClient;
use crate::model::{ChatModel, ChatTurn};
use crate::openai::OpenAiClient;

/// A model client that picks its provider from the model name.
///
/// `claude-*` models go to the Anthropic API; everything else is treated as
/// OpenAI-compatible and honors an optional API base override.
pub enum UnifiedClient {
    OpenAi(OpenAiClient),
    Anthropic(AnthropicClient),
}

impl UnifiedClient {
    pub fn for_model(model: &str, api_base: Option<&str>) -> Self {
        if model.starts_with("claude-") {
            Self::Anthropic(AnthropicClient::new(model))
        } else {
            Self::OpenAi(OpenAiClient::new(model, api_base))
        }
    }

    /// The model this client sends requests for.
    pub fn model(&self) -> &str {
        match self {
            Self::OpenAi(client) => client.model(),
            Self::Anthropic(client) => client.model(),
        }
    }
}

#[async_trait]
impl ChatModel for UnifiedClient {
    async fn chat(
        &self,
        system_prompt: &str,
        history: &[Message],
        tools: &[ToolSchema],
    ) -> Result<ChatTurn, AgentError> {
        match self {
            Self::OpenAi(client) => client.chat(system_prompt, history, tools).await,
            Self::Anthropic(client) => client.chat(system_prompt, history, tools).await,
        }
    }
}
