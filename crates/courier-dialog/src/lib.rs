//! Persona routing and session handling for the courier assistant.
//!
//! A conversation is served by two personas: the main assistant, which
//! searches the mailbox and calendar and answers questions, and a writer
//! assistant, which performs the actions that change data. Control moves
//! between them through dedicated tools, tracked on an explicit stack:
//!
//! - [`Persona`] — a role with its own system prompt and permitted tools
//! - [`ConversationState`] — transcript plus the persona stack, serializable
//!   for checkpointing
//! - [`DialogRouter`] — runs one turn: model invocation, concurrent tool
//!   execution, and the hand-off transitions between personas
//! - [`Session`] — binds a conversation to its checkpoint row so it can be
//!   resumed across process restarts
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use courier_core::SessionContext;
//! use courier_dialog::{DialogRouter, Session};
//! use courier_llm::{OpenAiClient, Retrying, RetryPolicy};
//! use courier_store::{CheckpointStore, FixtureStore};
//! use courier_tools::Toolbox;
//!
//! let store = Arc::new(FixtureStore::open("data/fixtures.db")?);
//! let model = Arc::new(Retrying::new(
//!     OpenAiClient::new("gpt-4-turbo", None),
//!     RetryPolicy::default(),
//! ));
//! let router = DialogRouter::new(model, Toolbox::new(store));
//! let checkpoints = CheckpointStore::open("data/sessions.db")?;
//!
//! let ctx = SessionContext::new("avery@driftwood.dev", "session-1");
//! let mut session = Session::resume(ctx, router, checkpoints)?;
//! let reply = session.send("What's on my calendar on Friday?").await?;
//! ```

mod persona;
mod prompts;
mod router;
mod session;
mod state;

pub use persona::Persona;
pub use router::DialogRouter;
pub use session::Session;
pub use state::ConversationState;
