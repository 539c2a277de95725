//! Store-backed tools for the courier assistant.
//!
//! Tool names are a closed set ([`courier_core::ToolKind`]); this crate
//! maps each executable kind to its typed arguments and handler:
//!
//! - [`Toolbox`] — dispatches a parsed kind + JSON arguments against the
//!   fixture store and renders the result string the model sees
//! - [`schema`] / [`schemas_for`] — the JSON schemas advertised per kind
//! - [`ToolError`] — every way a call can fail; the router converts these
//!   into correlated error messages, they are never raised further
//!
//! Control tools (`delegate_writer`, `complete_or_escalate`) have schemas
//! here but no handler: the router intercepts them before dispatch, and a
//! control call that reaches the toolbox anyway is answered with an error
//! telling the model to issue it alone.

use thiserror::Error;

use courier_store::StoreError;

mod args;
mod schemas;
mod toolbox;

pub use args::{
    CompleteOrEscalateArgs, CreateEventArgs, DelegateWriterArgs, Queries, SearchEmailArgs,
    SearchEventArgs, SendEmailArgs,
};
pub use schemas::{schema, schemas_for};
pub use toolbox::Toolbox;

/// Errors from parsing or executing a tool call.
#[derive(Error, Debug)]
pub enum ToolError {
    /// Tool ran but failed.
    #[error("tool execution failed: {0}")]
    ExecutionFailed(String),

    /// Arguments did not deserialize into the tool's parameter struct.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// The model asked for a name outside the closed set.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// The tool exists but the invoking persona may not use it.
    #[error("tool '{tool}' is not available to the {persona} assistant")]
    NotPermitted { tool: String, persona: String },

    /// Fixture store failure (including malformed date bounds).
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
