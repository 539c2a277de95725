//! The two assistant roles and what each is allowed to do.

use chrono::NaiveDateTime;
use courier_core::{ToolKind, ToolSchema};
use courier_tools::schemas_for;
use serde::{Deserialize, Serialize};

use crate::prompts::{MAIN_PROMPT, WRITER_PROMPT};

/// An assistant role with its own system prompt and tool set.
///
/// `Main` searches and answers; `Writer` performs the actions that change
/// data (sending email, creating events). Control tools move the dialog
/// between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    Main,
    Writer,
}

impl Persona {
    /// Short name used in logs and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Persona::Main => "main",
            Persona::Writer => "writer",
        }
    }

    /// The tools this persona may call.
    pub fn permitted(&self) -> &'static [ToolKind] {
        match self {
            Persona::Main => &[
                ToolKind::SearchEmails,
                ToolKind::SearchCalendarEvents,
                ToolKind::DelegateWriter,
            ],
            Persona::Writer => &[
                ToolKind::CreateCalendarEvent,
                ToolKind::SendEmail,
                ToolKind::CompleteOrEscalate,
            ],
        }
    }

    pub fn permits(&self, kind: ToolKind) -> bool {
        self.permitted().contains(&kind)
    }

    /// Schemas advertised to the model when this persona is invoked.
    pub fn schemas(&self) -> Vec<ToolSchema> {
        schemas_for(self.permitted())
    }

    /// Fills this persona's system prompt with the session identity and clock.
    pub fn render_prompt(&self, user_id: &str, now: NaiveDateTime) -> String {
        let template = match self {
            Persona::Main => MAIN_PROMPT,
            Persona::Writer => WRITER_PROMPT,
        };
        template
            .replace("{user_id}", user_id)
            .replace("{time}", &now.format("%Y-%m-%d %H:%M:%S").to_string())
    }
}
