//! Bounded retry with backoff around the model boundary.

use std::time::Duration;

use async_trait::async_trait;
use courier_core::{AgentError, Message, ToolSchema};
use tracing::warn;

use crate::model::{ChatModel, ChatTurn};

/// How often and how patiently a failed model call is retried.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, the first call included.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles each retry.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3, base_delay: Duration::from_millis(500) }
    }
}

/// Wraps any [`ChatModel`] with a [`RetryPolicy`].
///
/// Only transport failures ([`AgentError::Model`]) are retried; anything
/// else passes straight through. When the budget runs out the last error
/// is surfaced as [`AgentError::RetriesExhausted`].
pub struct Retrying<M> {
    inner: M,
    policy: RetryPolicy,
}

impl<M> Retrying<M> {
    pub fn new(inner: M, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<M: ChatModel> ChatModel for Retrying<M> {
    async fn chat(
        &self,
        system_prompt: &str,
        history: &[Message],
        tools: &[ToolSchema],
    ) -> Result<ChatTurn, AgentError> {
        let mut delay = self.policy.base_delay;
        let mut last = String::new();

        for attempt in 1..=self.policy.max_attempts {
            match self.inner.chat(system_prompt, history, tools).await {
                Ok(turn) => return Ok(turn),
                Err(AgentError::Model(e)) => {
                    warn!("LLM: attempt {}/{} failed: {}", attempt, self.policy.max_attempts, e);
                    last = e;
                    if attempt < self.policy.max_attempts {
                        tokio::time::sleep(delay).await;
                        delay *= 2;
                    }
                }
                Err(other) => return Err(other),
            }
        }

        Err(AgentError::RetriesExhausted { attempts: self.policy.max_attempts, last })
    }
}
