//! JSON schemas advertised to the model, one per tool kind.

use courier_core::{ToolKind, ToolSchema};
use serde_json::json;

/// All schemas for a persona's permitted kinds, in the given order.
pub fn schemas_for(kinds: &[ToolKind]) -> Vec<ToolSchema> {
    kinds.iter().map(|kind| schema(*kind)).collect()
}

/// The schema for a single tool kind.
pub fn schema(kind: ToolKind) -> ToolSchema {
    let (description, parameters) = match kind {
        ToolKind::SearchEmails => (
            "Search stored emails. Free-text queries match subject, body, sender and \
             recipient; '*' is a wildcard. Returns matching rows and a count.",
            json!({
                "type": "object",
                "properties": {
                    "queries": {
                        "anyOf": [
                            { "type": "string" },
                            { "type": "array", "items": { "type": "string" } }
                        ],
                        "description": "Free-text search terms. Any term matching is enough."
                    },
                    "sender": {
                        "type": "string",
                        "description": "Substring match on the sender address."
                    },
                    "recipient": {
                        "type": "string",
                        "description": "Substring match on the recipient address."
                    },
                    "start_date": {
                        "type": "string",
                        "description": "Inclusive lower bound, YYYY-MM-DD or YYYY-MM-DD HH:MM:SS."
                    },
                    "end_date": {
                        "type": "string",
                        "description": "Exclusive upper bound, YYYY-MM-DD or YYYY-MM-DD HH:MM:SS."
                    },
                    "thread_id": {
                        "type": "integer",
                        "description": "Restrict to one conversation thread."
                    }
                },
                "required": []
            }),
        ),
        ToolKind::SearchCalendarEvents => (
            "Search stored calendar events. Free-text queries match title and \
             description; '*' is a wildcard. Returns matching rows and a count.",
            json!({
                "type": "object",
                "properties": {
                    "queries": {
                        "anyOf": [
                            { "type": "string" },
                            { "type": "array", "items": { "type": "string" } }
                        ],
                        "description": "Free-text search terms. Any term matching is enough."
                    },
                    "start_date": {
                        "type": "string",
                        "description": "Inclusive lower bound on the event start."
                    },
                    "end_date": {
                        "type": "string",
                        "description": "Exclusive upper bound on the event end."
                    }
                },
                "required": []
            }),
        ),
        ToolKind::CreateCalendarEvent => (
            "Create a calendar event for the user.",
            json!({
                "type": "object",
                "properties": {
                    "title": { "type": "string" },
                    "description": { "type": "string" },
                    "start_time": {
                        "type": "string",
                        "description": "YYYY-MM-DD HH:MM:SS."
                    },
                    "end_time": {
                        "type": "string",
                        "description": "YYYY-MM-DD HH:MM:SS."
                    }
                },
                "required": ["title", "start_time", "end_time"]
            }),
        ),
        ToolKind::SendEmail => (
            "Send an email from the user's address. Omit thread_id to start a new \
             thread; pass one to reply on an existing thread.",
            json!({
                "type": "object",
                "properties": {
                    "to": { "type": "string", "description": "Recipient address." },
                    "subject": { "type": "string" },
                    "body": { "type": "string" },
                    "thread_id": {
                        "type": "integer",
                        "description": "Existing thread to reply on."
                    }
                },
                "required": ["to", "subject", "body"]
            }),
        ),
        ToolKind::DelegateWriter => (
            "Hand the conversation to the writing assistant, which composes and sends \
             email and creates calendar events. Pass the full task. If you invoke this \
             tool, do not call any other tool in the same turn.",
            json!({
                "type": "object",
                "properties": {
                    "request": {
                        "type": "string",
                        "description": "Everything the writing assistant needs to act."
                    }
                },
                "required": ["request"]
            }),
        ),
        ToolKind::CompleteOrEscalate => (
            "Return control to the main assistant, marking the writing task finished \
             or abandoned. Call this on its own with no other tools. \
             Example: {\"cancel\": true, \"reason\": \"User changed their mind.\"} \
             Example: {\"cancel\": false, \"reason\": \"Email sent as requested.\"}",
            json!({
                "type": "object",
                "properties": {
                    "cancel": {
                        "type": "boolean",
                        "description": "True when abandoning the task."
                    },
                    "reason": {
                        "type": "string",
                        "description": "Why control is being returned."
                    }
                },
                "required": ["reason"]
            }),
        ),
    };

    ToolSchema {
        name: kind.name().to_string(),
        description: description.to_string(),
        parameters,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ToolKind; 6] = [
        ToolKind::SearchEmails,
        ToolKind::SearchCalendarEvents,
        ToolKind::CreateCalendarEvent,
        ToolKind::SendEmail,
        ToolKind::DelegateWriter,
        ToolKind::CompleteOrEscalate,
    ];

    #[test]
    fn schema_names_match_wire_names() {
        for kind in ALL {
            let advertised = schema(kind);
            assert_eq!(advertised.name, kind.name());
            assert_eq!(advertised.parameters["type"], "object");
            assert!(!advertised.description.is_empty());
        }
    }

    #[test]
    fn schemas_for_preserves_order() {
        let schemas = schemas_for(&[ToolKind::SendEmail, ToolKind::SearchEmails]);
        assert_eq!(schemas[0].name, "send_email");
        assert_eq!(schemas[1].name, "search_emails");
    }
}
