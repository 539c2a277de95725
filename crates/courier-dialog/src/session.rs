//! A resumable conversation bound to a checkpoint row.

use courier_core::{AgentError, Message, SessionContext};
use courier_store::CheckpointStore;
use tracing::info;

use crate::router::DialogRouter;
use crate::state::ConversationState;

/// One user's conversation: context, state, router, and persistence.
///
/// State is written back after every successful turn, so a process restart
/// (or a crash mid-turn) resumes from the last completed exchange,
/// including a delegation that was still open.
pub struct Session {
    ctx: SessionContext,
    state: ConversationState,
    router: DialogRouter,
    checkpoints: CheckpointStore,
}

impl Session {
    /// Loads prior state for the session id, or starts fresh.
    pub fn resume(
        ctx: SessionContext,
        router: DialogRouter,
        checkpoints: CheckpointStore,
    ) -> Result<Self, AgentError> {
        let state = match checkpoints
            .load(&ctx.session_id)
            .map_err(|e| AgentError::Checkpoint(e.to_string()))?
        {
            Some(json) => {
                let state: ConversationState = serde_json::from_str(&json)?;
                info!(
                    "SESSION: resumed {} with {} messages, stack depth {}",
                    ctx.session_id,
                    state.messages.len(),
                    state.dialog_stack.len()
                );
                state
            }
            None => {
                info!("SESSION: starting fresh session {}", ctx.session_id);
                ConversationState::new()
            }
        };
        Ok(Self {
            ctx,
            state,
            router,
            checkpoints,
        })
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    /// Runs one user turn to completion and persists the updated state.
    ///
    /// A failed turn is not checkpointed; the stored state stays at the
    /// last successful exchange.
    pub async fn send(&mut self, user_text: &str) -> Result<String, AgentError> {
        self.state.push(Message::user(user_text));
        let reply = self.router.run_turn(&mut self.state, &self.ctx).await?;

        let json = serde_json::to_string(&self.state)?;
        self.checkpoints
            .save(&self.ctx.session_id, &json)
            .map_err(|e| AgentError::Checkpoint(e.to_string()))?;
        Ok(reply)
    }
}
