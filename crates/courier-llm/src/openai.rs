//! OpenAI-compatible chat client.
//!
//! Works with the OpenAI API and any compatible endpoint (including
//! Ollama's /v1 endpoint) via an overridden API base.

use std::time::Instant;

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
        ChatCompletionTool, ChatCompletionToolType, CreateChatCompletionRequestArgs,
        FunctionCall, FunctionObject,
    },
    Client,
};
use async_trait::async_trait;
use courier_core::{AgentError, Message, MessageRole, ToolCall, ToolSchema};
use tracing::info;

use crate::model::{llm_err, ChatModel, ChatTurn, LlmMetrics};

/// Client for OpenAI-compatible chat completion APIs.
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiClient {
    /// Creates a new client for the given model and optional API base URL.
    ///
    /// Without a base URL the key comes from `OPENAI_API_KEY`; with one, a
    /// placeholder key is used so local endpoints work unauthenticated.
    pub fn new(model: &str, api_base: Option<&str>) -> Self {
        let config = match api_base {
            Some(base) => OpenAIConfig::new().with_api_base(base).with_api_key("local"),
            None => OpenAIConfig::default(),
        };

        Self {
            client: Client::with_config(config),
            model: model.to_string(),
        }
    }

    /// The model this client sends requests for.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    async fn chat(
        &self,
        system_prompt: &str,
        history: &[Message],
        tools: &[ToolSchema],
    ) -> Result<ChatTurn, AgentError> {
        let start = Instant::now();
        let messages = to_request_messages(system_prompt, history)?;

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(&self.model).messages(messages);
        if !tools.is_empty() {
            builder.tools(to_openai_tools(tools));
        }
        let request = builder.build().map_err(llm_err)?;

        let response = self.client.chat().create(request).await.map_err(llm_err)?;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        let (input_tokens, output_tokens) = response
            .usage
            .as_ref()
            .map(|u| (u.prompt_tokens, u.completion_tokens))
            .unwrap_or((0, 0));
        let metrics = LlmMetrics { input_tokens, output_tokens, elapsed_ms };

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Model("no response choices".into()))?;

        let tool_calls: Vec<ToolCall> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| {
                let arguments: serde_json::Value =
                    serde_json::from_str(&tc.function.arguments).unwrap_or(serde_json::Value::Null);
                ToolCall { id: tc.id, name: tc.function.name, arguments }
            })
            .collect();
        let content = choice.message.content.unwrap_or_default();

        info!(
            "LLM: {}ms, tokens: {}/{} (in/out), tool_calls: {}",
            elapsed_ms,
            input_tokens,
            output_tokens,
            tool_calls.len()
        );

        Ok(ChatTurn { content, tool_calls, metrics })
    }
}

fn to_openai_tools(tools: &[ToolSchema]) -> Vec<ChatCompletionTool> {
    tools
        .iter()
        .map(|t| ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: t.name.clone(),
                description: Some(t.description.clone()),
                parameters: Some(t.parameters.clone()),
                strict: None,
            },
        })
        .collect()
}

/// Builds the wire message list: system prompt first, then the history with
/// assistant tool calls and correlated tool results preserved.
fn to_request_messages(
    system_prompt: &str,
    history: &[Message],
) -> Result<Vec<ChatCompletionRequestMessage>, AgentError> {
    let mut messages = vec![ChatCompletionRequestMessage::System(
        ChatCompletionRequestSystemMessageArgs::default()
            .content(system_prompt)
            .build()
            .map_err(llm_err)?,
    )];

    for msg in history {
        let wire = match msg.role {
            MessageRole::User => ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(&*msg.content)
                    .build()
                    .map_err(llm_err)?,
            ),
            MessageRole::Assistant => {
                let mut builder = ChatCompletionRequestAssistantMessageArgs::default();
                if !msg.content.is_empty() {
                    builder.content(&*msg.content);
                }
                if msg.has_tool_calls() {
                    let calls: Vec<ChatCompletionMessageToolCall> = msg
                        .tool_calls
                        .iter()
                        .map(|tc| ChatCompletionMessageToolCall {
                            id: tc.id.clone(),
                            r#type: ChatCompletionToolType::Function,
                            function: FunctionCall {
                                name: tc.name.clone(),
                                arguments: tc.arguments.to_string(),
                            },
                        })
                        .collect();
                    builder.tool_calls(calls);
                }
                ChatCompletionRequestMessage::Assistant(builder.build().map_err(llm_err)?)
            }
            MessageRole::Tool => ChatCompletionRequestMessage::Tool(
                ChatCompletionRequestToolMessageArgs::default()
                    .tool_call_id(msg.tool_call_id.clone().unwrap_or_default())
                    .content(&*msg.content)
                    .build()
                    .map_err(llm_err)?,
            ),
        };
        messages.push(wire);
    }

    Ok(messages)
}
