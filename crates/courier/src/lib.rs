//! # Courier — a dialog-routing assistant over a synthetic mailbox
//!
//! Courier runs a two-persona personal assistant against a seeded SQLite
//! mailbox and calendar: a **main assistant** that searches and answers,
//! and a **writer assistant** that sends email and creates events. Control
//! moves between them through dedicated tools, tracked on an explicit
//! persona stack that survives checkpointing.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use courier::prelude::*;
//!
//! // Seeded fixture data and a checkpoint row per session id.
//! let store = Arc::new(FixtureStore::open("data/fixtures.db")?);
//! store.seed_sample_data(chrono::Local::now().naive_local())?;
//! let checkpoints = CheckpointStore::open("data/sessions.db")?;
//!
//! // Any OpenAI-compatible or claude-* model, with bounded retry.
//! let model = UnifiedClient::for_model("gpt-4-turbo", None);
//! let model = Arc::new(Retrying::new(model, RetryPolicy::default()));
//!
//! let router = DialogRouter::new(model, Toolbox::new(store));
//! let ctx = SessionContext::new(DEFAULT_USER, "demo-session");
//! let mut session = Session::resume(ctx, router, checkpoints)?;
//!
//! let reply = session.send("When do I fly out for the offsite?").await?;
//! println!("{reply}");
//! ```
//!
//! ## Crate Structure
//!
//! | Crate | Description |
//! |-------|-------------|
//! | [`courier_core`] | Messages, tool calls, the closed tool set, errors |
//! | [`courier_store`] | SQLite fixtures, seed data, checkpoints |
//! | [`courier_llm`] | Model clients (OpenAI, Anthropic), retry policy |
//! | [`courier_tools`] | Tool schemas, argument parsing, execution |
//! | [`courier_dialog`] | Personas, the turn state machine, sessions |

// Re-export core types
pub use courier_core::{
    AgentError, Message, MessageRole, SessionContext, ToolCall, ToolKind, ToolResult, ToolSchema,
};

// Re-export the fixture and checkpoint stores
pub use courier_store::{
    CheckpointStore, EmailFilter, EmailRecord, EventFilter, EventRecord, FixtureStore, StoreError,
    DEFAULT_USER,
};

// Re-export model clients
pub use courier_llm::{ChatModel, ChatTurn, LlmMetrics, Retrying, RetryPolicy, UnifiedClient};

// Re-export tools
pub use courier_tools::{schema, schemas_for, ToolError, Toolbox};

// Re-export dialog machinery
pub use courier_dialog::{ConversationState, DialogRouter, Persona, Session};

// Provider-specific clients (hidden by default, use UnifiedClient instead)
#[doc(hidden)]
pub use courier_llm::{AnthropicClient, OpenAiClient};

/// Prelude module for convenient imports.
///
/// Import everything you need with a single use statement:
///
/// ```rust,ignore
/// use courier::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use crate::{AgentError, Message, MessageRole, SessionContext, ToolKind};

    // Stores
    pub use crate::{CheckpointStore, FixtureStore, DEFAULT_USER};

    // Model clients
    pub use crate::{ChatModel, ChatTurn, Retrying, RetryPolicy, UnifiedClient};

    // Tools
    pub use crate::{ToolError, Toolbox};

    // Dialog
    pub use crate::{ConversationState, DialogRouter, Persona, Session};
}
