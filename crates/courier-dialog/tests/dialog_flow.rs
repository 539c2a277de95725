//! End-to-end conversation turns over a real in-memory store, with the
//! model replaced by a scripted fake.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use courier_core::{AgentError, Message, MessageRole, SessionContext, ToolCall, ToolSchema};
use courier_dialog::{DialogRouter, Persona, Session};
use courier_llm::{ChatModel, ChatTurn};
use courier_store::{CheckpointStore, EmailFilter, FixtureStore};
use courier_tools::Toolbox;
use serde_json::json;

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

fn router_for(script: Vec<ChatTurn>) -> DialogRouter {
    DialogRouter::new(
        Arc::new(ScriptedModel::new(script)),
        Toolbox::new(Arc::new(FixtureStore::open_in_memory().unwrap())),
    )
}

fn find_tool_response<'a>(messages: &'a [Message], id: &str) -> &'a Message {
    messages
        .iter()
        .find(|m| m.tool_call_id.as_deref() == Some(id))
        .unwrap_or_else(|| panic!("no response for call {id}"))
}

/// Every tool call an assistant message carries must be followed by its
/// correlated tool responses, in the order the calls were issued.
fn assert_every_call_answered(messages: &[Message]) {
    for (i, message) in messages.iter().enumerate() {
        if message.role != MessageRole::Assistant || !message.has_tool_calls() {
            continue;
        }
        for (offset, tool_call) in message.tool_calls.iter().enumerate() {
            let response = messages
                .get(i + 1 + offset)
                .unwrap_or_else(|| panic!("call {} has no response", tool_call.id));
            assert_eq!(response.role, MessageRole::Tool);
            assert_eq!(response.tool_call_id.as_deref(), Some(tool_call.id.as_str()));
        }
    }
}

#[tokio::test]
async fn delegation_round_trip_sends_the_email() {
    let store = Arc::new(FixtureStore::open_in_memory().unwrap());
    let script = vec![
        ChatTurn::with_calls(
            "",
            vec![call(
                "d1",
                "delegate_writer",
                json!({"request": "Send Liam a congratulations email about the wedding."}),
            )],
        ),
        ChatTurn::with_calls(
            "",
            vec![call(
                "w1",
                "send_email",
                json!({
                    "to": "liam@driftwood.dev",
                    "subject": "Congratulations!",
                    "body": "So happy for you both. See you at the wedding!"
                }),
            )],
        ),
        ChatTurn::with_calls(
            "",
            vec![call(
                "w2",
                "complete_or_escalate",
                json!({"cancel": true, "reason": "Email sent as requested."}),
            )],
        ),
        ChatTurn::text("Done! I've sent Liam a congratulations email."),
    ];
    let router = DialogRouter::new(
        Arc::new(ScriptedModel::new(script)),
        Toolbox::new(store.clone()),
    );
    let mut session = Session::resume(
        SessionContext::new("avery@driftwood.dev", "round-trip"),
        router,
        CheckpointStore::open_in_memory().unwrap(),
    )
    .unwrap();

    let reply = session.send("Congratulate Liam on the wedding").await.unwrap();
    assert_eq!(reply, "Done! I've sent Liam a congratulations email.");

    // Delegation opened and closed: the stack is balanced again.
    assert!(session.state().dialog_stack.is_empty());

    let messages = &session.state().messages;
    assert_every_call_answered(messages);

    // Hand-off, confirmation, and resume all landed on the right calls.
    let handoff = find_tool_response(messages, "d1");
    assert!(handoff.content.contains("Delegating work to the writing assistant"));

    let confirmation = find_tool_response(messages, "w1");
    assert_eq!(
        confirmation.content,
        "Email sent to liam@driftwood.dev with subject 'Congratulations!'."
    );

    let resume = find_tool_response(messages, "w2");
    assert!(resume.content.contains("Resuming dialog with the assistant"));

    // The email actually landed in the store, on the first thread.
    let sent = store
        .search_emails(&EmailFilter {
            sender: Some("avery@driftwood.dev".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, "liam@driftwood.dev");
    assert_eq!(sent[0].thread_id, 1);
}

#[tokio::test]
async fn writer_recovers_from_a_bad_tool_call() {
    let store = Arc::new(FixtureStore::open_in_memory().unwrap());
    let script = vec![
        ChatTurn::with_calls(
            "",
            vec![call(
                "d1",
                "delegate_writer",
                json!({"request": "Put the launch party on the calendar."}),
            )],
        ),
        // Missing end_time: rejected and answered with an error result.
        ChatTurn::with_calls(
            "",
            vec![call(
                "w1",
                "create_calendar_event",
                json!({"title": "Launch party", "start_time": "2024-05-09 18:00:00"}),
            )],
        ),
        ChatTurn::with_calls(
            "",
            vec![call(
                "w2",
                "create_calendar_event",
                json!({
                    "title": "Launch party",
                    "start_time": "2024-05-09 18:00:00",
                    "end_time": "2024-05-09 21:00:00"
                }),
            )],
        ),
        ChatTurn::with_calls(
            "",
            vec![call(
                "w3",
                "complete_or_escalate",
                json!({"cancel": true, "reason": "Event created."}),
            )],
        ),
        ChatTurn::text("The launch party is on your calendar."),
    ];
    let router = DialogRouter::new(
        Arc::new(ScriptedModel::new(script)),
        Toolbox::new(store.clone()),
    );
    let mut session = Session::resume(
        SessionContext::new("avery@driftwood.dev", "writer-retry"),
        router,
        CheckpointStore::open_in_memory().unwrap(),
    )
    .unwrap();

    let reply = session.send("Add the launch party").await.unwrap();
    assert_eq!(reply, "The launch party is on your calendar.");

    let error = find_tool_response(&session.state().messages, "w1");
    assert!(error.content.starts_with("Error: invalid arguments"));
    assert!(error.content.ends_with("please fix your mistakes."));

    // Only the corrected call inserted anything.
    assert_eq!(store.event_count().unwrap(), 1);
}

#[tokio::test]
async fn checkpoint_survives_a_process_restart() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("sessions.db");
    let db = db.to_str().unwrap();

    {
        let router = router_for(vec![ChatTurn::text("Hi Avery!")]);
        let mut session = Session::resume(
            SessionContext::new("avery@driftwood.dev", "persist"),
            router,
            CheckpointStore::open(db).unwrap(),
        )
        .unwrap();
        session.send("hello").await.unwrap();
    }

    let session = Session::resume(
        SessionContext::new("avery@driftwood.dev", "persist"),
        router_for(vec![]),
        CheckpointStore::open(db).unwrap(),
    )
    .unwrap();

    let messages = &session.state().messages;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].content, "hello");
    assert_eq!(messages[1].content, "Hi Avery!");
}

#[tokio::test]
async fn open_delegation_resumes_with_the_writer() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("sessions.db");
    let db = db.to_str().unwrap();
    let store = Arc::new(FixtureStore::open_in_memory().unwrap());

    {
        let script = vec![
            ChatTurn::with_calls(
                "",
                vec![call(
                    "d1",
                    "delegate_writer",
                    json!({"request": "Email Priya that the roadmap review moved."}),
                )],
            ),
            // The writer asks a follow-up; the turn ends mid-delegation.
            ChatTurn::text("What time should I say the review moved to?"),
        ];
        let router = DialogRouter::new(
            Arc::new(ScriptedModel::new(script)),
            Toolbox::new(store.clone()),
        );
        let mut session = Session::resume(
            SessionContext::new("avery@driftwood.dev", "open-delegation"),
            router,
            CheckpointStore::open(db).unwrap(),
        )
        .unwrap();

        let reply = session.send("Tell Priya the review moved").await.unwrap();
        assert_eq!(reply, "What time should I say the review moved to?");
        assert_eq!(session.state().active_persona(), Persona::Writer);
    }

    // New process: the open delegation comes back with the writer on top.
    let model = Arc::new(ScriptedModel::new(vec![
        ChatTurn::with_calls(
            "",
            vec![call(
                "w1",
                "send_email",
                json!({
                    "to": "priya@driftwood.dev",
                    "subject": "Roadmap review moved",
                    "body": "The review moved to 3pm today."
                }),
            )],
        ),
        ChatTurn::with_calls(
            "",
            vec![call(
                "w2",
                "complete_or_escalate",
                json!({"cancel": true, "reason": "Email sent."}),
            )],
        ),
        ChatTurn::text("Priya is up to date."),
    ]));
    let router = DialogRouter::new(model.clone(), Toolbox::new(store.clone()));
    let mut session = Session::resume(
        SessionContext::new("avery@driftwood.dev", "open-delegation"),
        router,
        CheckpointStore::open(db).unwrap(),
    )
    .unwrap();
    assert_eq!(session.state().active_persona(), Persona::Writer);

    let reply = session.send("3pm today").await.unwrap();
    assert_eq!(reply, "Priya is up to date.");
    assert!(session.state().dialog_stack.is_empty());

    // The resumed turn went straight to the writer's prompt.
    let systems = model.seen_systems.lock().unwrap();
    assert!(systems[0].contains("writing tasks"));

    assert_eq!(store.email_count().unwrap(), 1);
}
