//! Anthropic messages API client with tool support.

use std::time::Instant;

use async_trait::async_trait;
use courier_core::{AgentError, Message, MessageRole, ToolCall, ToolSchema};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::model::{llm_err, ChatModel, ChatTurn, LlmMetrics};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 8192;

#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<AnthropicTool>,
}

#[derive(Serialize)]
struct AnthropicTool {
    name: String,
    description: String,
    input_schema: serde_json::Value,
}

#[derive(Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: Vec<ContentBlock>,
}

impl AnthropicMessage {
    /// Whether this message only carries tool results and can absorb more.
    fn is_tool_result_carrier(&self) -> bool {
        self.role == "user"
            && self.content.iter().all(|b| matches!(b, ContentBlock::ToolResult { .. }))
    }
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "tool_use")]
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    #[serde(rename = "tool_result")]
    ToolResult { tool_use_id: String, content: String },
}

#[derive(Deserialize)]
struct Usage {
    input_tokens: Option<u32>,
    output_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ResponseBlock>,
    usage: Usage,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ResponseBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "tool_use")]
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    #[serde(other)]
    Other,
}

/// Client for Anthropic's Claude models.
pub struct AnthropicClient {
    client: Client,
    model: String,
    api_key: String,
}

impl AnthropicClient {
    /// Creates a new client; the key comes from `ANTHROPIC_API_KEY`.
    pub fn new(model: &str) -> Self {
        Self {
            client: Client::new(),
            model: model.to_string(),
            api_key: std::env::var("ANTHROPIC_API_KEY").unwrap_or_default(),
        }
    }

    /// The model this client sends requests for.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ChatModel for AnthropicClient {
    async fn chat(
        &self,
        system_prompt: &str,
        history: &[Message],
        tools: &[ToolSchema],
    ) -> Result<ChatTurn, AgentError> {
        let start = Instant::now();

        let request = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            system: system_prompt.to_string(),
            messages: to_anthropic_messages(history),
            tools: tools
                .iter()
                .map(|t| AnthropicTool {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    input_schema: t.parameters.clone(),
                })
                .collect(),
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(llm_err)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Model(format!("Anthropic API error {status}: {body}")));
        }

        let resp: AnthropicResponse = response.json().await.map_err(llm_err)?;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        let metrics = LlmMetrics {
            input_tokens: resp.usage.input_tokens.unwrap_or(0),
            output_tokens: resp.usage.output_tokens.unwrap_or(0),
            elapsed_ms,
        };

        let mut content = String::new();
        let mut tool_calls = Vec::new();
        for block in resp.content {
            match block {
                ResponseBlock::Text { text } => content.push_str(&text),
                ResponseBlock::ToolUse { id, name, input } => {
                    tool_calls.push(ToolCall { id, name, arguments: input });
                }
                ResponseBlock::Other => {}
            }
        }

        info!(
            "Anthropic: {}ms, tokens: {}/{} (in/out), tool_calls: {}",
            elapsed_ms,
            metrics.input_tokens,
            metrics.output_tokens,
            tool_calls.len()
        );

        Ok(ChatTurn { content, tool_calls, metrics })
    }
}

/// Converts domain history to Anthropic messages.
///
/// Assistant tool calls become `tool_use` blocks; tool results ride in a
/// following user message, and consecutive results share one, which is how
/// the API expects a multi-call turn to be answered.
fn to_anthropic_messages(history: &[Message]) -> Vec<AnthropicMessage> {
    let mut messages: Vec<AnthropicMessage> = Vec::new();
    for msg in history {
        match msg.role {
            MessageRole::User => messages.push(AnthropicMessage {
                role: "user",
                content: vec![ContentBlock::Text { text: msg.content.clone() }],
            }),
            MessageRole::Assistant => {
                let mut content = Vec::new();
                if !msg.content.is_empty() {
                    content.push(ContentBlock::Text { text: msg.content.clone() });
                }
                for tc in &msg.tool_calls {
                    content.push(ContentBlock::ToolUse {
                        id: tc.id.clone(),
                        name: tc.name.clone(),
                        input: tc.arguments.clone(),
                    });
                }
                if content.is_empty() {
                    continue;
                }
                messages.push(AnthropicMessage { role: "assistant", content });
            }
            MessageRole::Tool => {
                let block = ContentBlock::ToolResult {
                    tool_use_id: msg.tool_call_id.clone().unwrap_or_default(),
                    content: msg.content.clone(),
                };
                match messages.last_mut() {
                    Some(last) if last.is_tool_result_carrier() => last.content.push(block),
                    _ => messages.push(AnthropicMessage { role: "user", content: vec![block] }),
                }
            }
        }
    }
    messages
}
