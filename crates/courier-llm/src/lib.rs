//! Model clients for the courier dialog router.
//!
//! The router talks to models through one seam, [`ChatModel`]: system
//! prompt, message history and tool schemas in, a [`ChatTurn`] out. Two
//! providers implement it, [`UnifiedClient`] picks between them by model
//! name, and [`Retrying`] adds a bounded retry with backoff around any of
//! them.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use courier_llm::{ChatModel, Retrying, RetryPolicy, UnifiedClient};
//!
//! let client = UnifiedClient::for_model("gpt-4-turbo", None);
//! let model = Retrying::new(client, RetryPolicy::default());
//!
//! let turn = model.chat("You are a helpful assistant.", &history, &schemas).await?;
//! if turn.has_tool_calls() {
//!     // execute turn.tool_calls, append results, call again
//! }
//! ```
//!
//! # Providers
//!
//! | Model name        | Client |
//! |-------------------|--------|
//! | `claude-*`        | Anthropic messages API over reqwest |
//! | everything else   | OpenAI-compatible chat completions via async-openai |

mod anthropic;
mod model;
mod openai;
mod retry;
mod unified;

pub use anthropic::AnthropicClient;
pub use model::{ChatModel, ChatTurn, LlmMetrics};
pub use openai::OpenAiClient;
pub use retry::{Retrying, RetryPolicy};
pub use unified::UnifiedClient;
