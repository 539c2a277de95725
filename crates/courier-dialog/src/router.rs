//! The per-turn state machine that drives persona hand-off.
//!
//! One user turn walks a small node loop: invoke the active persona's
//! model, then either finish (plain answer), run its tool calls, or move
//! control between personas. Control moves only when the control tool is
//! the sole call of the batch; a control call mixed into a larger batch is
//! answered with an error result like any other failing tool, so every
//! call the model makes gets exactly one correlated response.

use std::sync::Arc;

use chrono::Local;
use courier_core::{AgentError, Message, SessionContext, ToolCall, ToolKind};
use courier_llm::ChatModel;
use courier_tools::{CompleteOrEscalateArgs, DelegateWriterArgs, ToolError, Toolbox};
use futures::future::join_all;
use tracing::{info, warn};

use crate::persona::Persona;
use crate::prompts::{RESUME_MAIN, WRITER_HANDOFF};
use crate::state::ConversationState;

/// Upper bound on node hops within one turn.
const MAX_TURN_HOPS: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DialogNode {
    MainAssistant,
    MainTools,
    EnterWriter,
    WriterAssistant,
    WriterTools,
    LeaveWriter,
    Terminal,
}

/// Drives one conversation turn from user message to assistant answer.
pub struct DialogRouter {
    model: Arc<dyn ChatModel>,
    toolbox: Toolbox,
}

impl DialogRouter {
    pub fn new(model: Arc<dyn ChatModel>, toolbox: Toolbox) -> Self {
        Self { model, toolbox }
    }

    /// Runs the node loop until the active persona answers in plain text.
    ///
    /// The loop starts at the persona on top of the dialog stack, so a
    /// conversation checkpointed mid-delegation resumes with the writer. A
    /// plain answer ends the turn without touching the stack.
    pub async fn run_turn(
        &self,
        state: &mut ConversationState,
        ctx: &SessionContext,
    ) -> Result<String, AgentError> {
        let mut node = match state.active_persona() {
            Persona::Main => DialogNode::MainAssistant,
            Persona::Writer => DialogNode::WriterAssistant,
        };

        for _ in 0..MAX_TURN_HOPS {
            node = match node {
                DialogNode::MainAssistant => {
                    self.invoke_assistant(Persona::Main, state, ctx).await?
                }
                DialogNode::WriterAssistant => {
                    self.invoke_assistant(Persona::Writer, state, ctx).await?
                }
                DialogNode::MainTools => {
                    self.execute_tools(Persona::Main, state, ctx).await?;
                    DialogNode::MainAssistant
                }
                DialogNode::WriterTools => {
                    self.execute_tools(Persona::Writer, state, ctx).await?;
                    DialogNode::WriterAssistant
                }
                DialogNode::EnterWriter => {
                    enter_writer(state)?;
                    DialogNode::WriterAssistant
                }
                DialogNode::LeaveWriter => {
                    leave_writer(state);
                    DialogNode::MainAssistant
                }
                DialogNode::Terminal => {
                    return Ok(state.last_assistant_text().unwrap_or_default().to_string())
                }
            };
        }
        warn!("ROUTER: turn exceeded {} hops, aborting", MAX_TURN_HOPS);
        Err(AgentError::TurnLimit(MAX_TURN_HOPS))
    }

    async fn invoke_assistant(
        &self,
        persona: Persona,
        state: &mut ConversationState,
        ctx: &SessionContext,
    ) -> Result<DialogNode, AgentError> {
        let system = persona.render_prompt(&ctx.user_id, Local::now().naive_local());
        let schemas = persona.schemas();
        info!(
            "ROUTER: invoking {} assistant ({} messages)",
            persona.label(),
            state.messages.len()
        );

        let turn = self.model.chat(&system, &state.messages, &schemas).await?;
        state.push(turn.into_message());

        let calls = state.pending_calls();
        if calls.is_empty() {
            info!("ROUTER: {} assistant answered, turn complete", persona.label());
            return Ok(DialogNode::Terminal);
        }
        Ok(route_calls(persona, calls))
    }

    /// Runs every pending call concurrently and appends one result message
    /// per call, in the order the model issued them. Failures never abort
    /// the batch: each becomes a correlated error result the model can act
    /// on next invocation.
    async fn execute_tools(
        &self,
        persona: Persona,
        state: &mut ConversationState,
        ctx: &SessionContext,
    ) -> Result<(), AgentError> {
        let calls = state.pending_calls().to_vec();
        info!("TOOLS: {} running {} call(s)", persona.label(), calls.len());

        let outcomes = join_all(calls.iter().map(|c| self.run_call(persona, c, ctx))).await;

        for (call, outcome) in calls.iter().zip(outcomes) {
            let content = match outcome {
                Ok(content) => content,
                Err(err) => {
                    warn!("TOOLS: {} failed: {}", call.name, err);
                    format!("Error: {err}\n please fix your mistakes.")
                }
            };
            state.push(Message::tool(call.id.clone(), content));
        }
        Ok(())
    }

    async fn run_call(
        &self,
        persona: Persona,
        call: &ToolCall,
        ctx: &SessionContext,
    ) -> Result<String, ToolError> {
        let kind = call
            .kind()
            .ok_or_else(|| ToolError::UnknownTool(call.name.clone()))?;
        if !persona.permits(kind) {
            return Err(ToolError::NotPermitted {
                tool: call.name.clone(),
                persona: persona.label().to_string(),
            });
        }
        self.toolbox.dispatch(kind, &call.arguments, ctx).await
    }
}

/// Picks the next node for a batch of tool calls from `persona`.
fn route_calls(persona: Persona, calls: &[ToolCall]) -> DialogNode {
    if let [only] = calls {
        match (persona, only.kind()) {
            (Persona::Main, Some(ToolKind::DelegateWriter)) => return DialogNode::EnterWriter,
            (Persona::Writer, Some(ToolKind::CompleteOrEscalate)) => {
                return DialogNode::LeaveWriter
            }
            _ => {}
        }
    }
    match persona {
        Persona::Main => DialogNode::MainTools,
        Persona::Writer => DialogNode::WriterTools,
    }
}

/// Pushes the writer persona and answers the delegation call with the
/// hand-off instruction, keeping the call/response pairing intact.
fn enter_writer(state: &mut ConversationState) -> Result<(), AgentError> {
    let call = state
        .pending_calls()
        .first()
        .cloned()
        .ok_or_else(|| AgentError::State("delegation with no pending tool call".to_string()))?;
    if let Ok(args) = serde_json::from_value::<DelegateWriterArgs>(call.arguments.clone()) {
        info!("ROUTER: delegating to writer: {}", args.request);
    }
    state.push_persona(Persona::Writer);
    state.push(Message::tool(call.id, WRITER_HANDOFF));
    Ok(())
}

/// Pops the writer. When the completion call is still pending it gets the
/// resume message as its response; otherwise nothing is appended.
fn leave_writer(state: &mut ConversationState) {
    if let Some(call) = state.pending_calls().first().cloned() {
        if let Ok(args) = serde_json::from_value::<CompleteOrEscalateArgs>(call.arguments.clone())
        {
            info!("ROUTER: writer done (cancel: {}): {}", args.cancel, args.reason);
        }
        state.push(Message::tool(call.id, RESUME_MAIN));
    }
    state.pop_persona();
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use courier_core::{MessageRole, ToolSchema};
    use courier_llm::ChatTurn;
    use courier_store::FixtureStore;
    use serde_json::json;

    use super::*;

    struct ScriptedModel {
        turns: Mutex<VecDeque<ChatTurn>>,
        seen_systems: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        fn new(turns: Vec<ChatTurn>) -> Self {
            Self {
                turns: Mutex::new(turns.into()),
                seen_systems: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn chat(
            &self,
            system_prompt: &str,
            _history: &[Message],
            _tools: &[ToolSchema],
        ) -> Result<ChatTurn, AgentError> {
            self.seen_systems.lock().unwrap().push(system_prompt.to_string());
            self.turns
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| AgentError::Model("script exhausted".to_string()))
        }
    }

    fn call(id: &str, name: &str, arguments: serde_json::Value) -> ToolCall {
        ToolCall {
            id: id.to_string(),
            name: name.to_string(),
            arguments,
        }
    }

    fn router_with_store(turns: Vec<ChatTurn>) -> (DialogRouter, Arc<FixtureStore>) {
        let store = Arc::new(FixtureStore::open_in_memory().unwrap());
        let router = DialogRouter::new(
            Arc::new(ScriptedModel::new(turns)),
            Toolbox::new(store.clone()),
        );
        (router, store)
    }

    fn ctx() -> SessionContext {
        SessionContext::new("avery@driftwood.dev", "router-test")
    }

    #[tokio::test]
    async fn plain_answer_ends_the_turn_at_once() {
        let (router, _store) = router_with_store(vec![ChatTurn::text("Hello!")]);
        let mut state = ConversationState::new();
        state.push(Message::user("hi"));

        let reply = router.run_turn(&mut state, &ctx()).await.unwrap();
        assert_eq!(reply, "Hello!");
        assert_eq!(state.messages.len(), 2);
        assert!(state.dialog_stack.is_empty());
    }

    #[test]
    fn control_transitions_need_a_sole_call() {
        let delegate = call("c1", "delegate_writer", json!({"request": "send it"}));
        let search = call("c2", "search_emails", json!({}));
        let done = call("c3", "complete_or_escalate", json!({"reason": "done"}));

        assert_eq!(
            route_calls(Persona::Main, &[delegate.clone()]),
            DialogNode::EnterWriter
        );
        assert_eq!(
            route_calls(Persona::Main, &[delegate, search.clone()]),
            DialogNode::MainTools
        );
        assert_eq!(route_calls(Persona::Main, &[search.clone()]), DialogNode::MainTools);

        assert_eq!(route_calls(Persona::Writer, &[done.clone()]), DialogNode::LeaveWriter);
        assert_eq!(route_calls(Persona::Writer, &[done, search]), DialogNode::WriterTools);
    }

    #[tokio::test]
    async fn every_call_gets_a_correlated_result_in_order() {
        let (router, _store) = router_with_store(vec![]);
        let mut state = ConversationState::new();
        state.push(Message::assistant_with_calls(
            "",
            vec![
                call("c1", "search_emails", json!({"queries": "alpha"})),
                call("c2", "search_calendar_events", json!({})),
                call("c3", "search_emails", json!({})),
            ],
        ));

        router.execute_tools(Persona::Main, &mut state, &ctx()).await.unwrap();

        let results = &state.messages[1..];
        assert_eq!(results.len(), 3);
        for (message, id) in results.iter().zip(["c1", "c2", "c3"]) {
            assert_eq!(message.role, MessageRole::Tool);
            assert_eq!(message.tool_call_id.as_deref(), Some(id));
        }
    }

    #[tokio::test]
    async fn failures_become_error_results_not_crashes() {
        let (router, _store) = router_with_store(vec![]);
        let mut state = ConversationState::new();
        state.push(Message::assistant_with_calls(
            "",
            vec![
                call("c1", "frobnicate", json!({})),
                call(
                    "c2",
                    "send_email",
                    json!({"to": "x@y.dev", "subject": "s", "body": "b"}),
                ),
                call("c3", "search_emails", json!({})),
            ],
        ));

        router.execute_tools(Persona::Main, &mut state, &ctx()).await.unwrap();

        let unknown = &state.messages[1];
        assert!(unknown.content.starts_with("Error: unknown tool"));
        assert!(unknown.content.ends_with("please fix your mistakes."));

        // send_email exists but belongs to the writer.
        let not_permitted = &state.messages[2];
        assert!(not_permitted.content.contains("not available to the main assistant"));

        // The rest of the batch still ran.
        let ok = &state.messages[3];
        assert!(ok.content.contains("\"count\":0"));
    }

    #[test]
    fn delegation_pushes_writer_and_answers_the_call() {
        let mut state = ConversationState::new();
        state.push(Message::assistant_with_calls(
            "",
            vec![call("c9", "delegate_writer", json!({"request": "email liam"}))],
        ));

        enter_writer(&mut state).unwrap();

        assert_eq!(state.active_persona(), Persona::Writer);
        let handoff = state.messages.last().unwrap();
        assert_eq!(handoff.role, MessageRole::Tool);
        assert_eq!(handoff.tool_call_id.as_deref(), Some("c9"));
        assert!(handoff.content.contains("Delegating work to the writing assistant"));
    }

    #[test]
    fn pop_answers_the_completion_call() {
        let mut state = ConversationState::new();
        state.push_persona(Persona::Writer);
        state.push(Message::assistant_with_calls(
            "",
            vec![call(
                "c4",
                "complete_or_escalate",
                json!({"cancel": true, "reason": "task finished"}),
            )],
        ));

        leave_writer(&mut state);

        assert_eq!(state.active_persona(), Persona::Main);
        let resume = state.messages.last().unwrap();
        assert_eq!(resume.tool_call_id.as_deref(), Some("c4"));
        assert!(resume.content.contains("Resuming dialog with the assistant"));
    }

    #[test]
    fn pop_without_pending_calls_stays_silent() {
        let mut state = ConversationState::new();
        state.push_persona(Persona::Writer);
        state.push(Message::assistant("All done."));

        leave_writer(&mut state);

        assert_eq!(state.active_persona(), Persona::Main);
        assert_eq!(state.messages.len(), 1);
    }

    #[tokio::test]
    async fn resumed_delegation_starts_with_the_writer() {
        let model = Arc::new(ScriptedModel::new(vec![ChatTurn::text("Draft ready.")]));
        let store = Arc::new(FixtureStore::open_in_memory().unwrap());
        let router = DialogRouter::new(model.clone(), Toolbox::new(store));

        let mut state = ConversationState::new();
        state.push_persona(Persona::Writer);
        state.push(Message::user("go on"));

        let reply = router.run_turn(&mut state, &ctx()).await.unwrap();
        assert_eq!(reply, "Draft ready.");
        // A plain answer ends the turn without popping the stack.
        assert_eq!(state.active_persona(), Persona::Writer);

        let systems = model.seen_systems.lock().unwrap();
        assert!(systems[0].contains("writing tasks"));
    }

    #[tokio::test]
    async fn runaway_tool_loops_hit_the_hop_limit() {
        let searching = ChatTurn::with_calls("", vec![call("c", "search_emails", json!({}))]);
        let (router, _store) = router_with_store(vec![searching; 20]);
        let mut state = ConversationState::new();
        state.push(Message::user("loop forever"));

        let err = router.run_turn(&mut state, &ctx()).await.unwrap_err();
        assert!(matches!(err, AgentError::TurnLimit(_)));
    }
}
