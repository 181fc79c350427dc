use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use parley_core::id::{self, Prefix};

use crate::{Annotation, MessageRole, Part};

/// The UI-facing message shape: typed parts plus a flattened `content`
/// string kept as a display fallback and for providers that only take
/// plain text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UIMessage {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    #[serde(default)]
    pub parts: Vec<Part>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl UIMessage {
    pub fn new(role: MessageRole) -> Self {
        Self {
            id: id::create(Prefix::Message, None),
            role,
            content: String::new(),
            parts: Vec::new(),
            created_at: Utc::now(),
            annotations: Vec::new(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        let content = content.into();
        let mut msg = Self::new(MessageRole::User);
        msg.parts.push(Part::text(content.clone()));
        msg.content = content;
        msg
    }

    pub fn first_text(&self) -> Option<&str> {
        self.parts.iter().find_map(|p| match p {
            Part::Text { text } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn has_file_part(&self) -> bool {
        self.parts.iter().any(|p| matches!(p, Part::File { .. }))
    }

    /// Reconcile client-generated ids with persisted ids: a
    /// `message_saved` annotation carries the id assigned at persistence
    /// time, and the in-memory message adopts it.
    pub fn apply_saved_ids(messages: &mut [UIMessage]) {
        for msg in messages.iter_mut() {
            let saved = msg.annotations.iter().find_map(|a| match a {
                Annotation::MessageSaved { database_id } => Some(database_id.clone()),
                _ => None,
            });
            if let Some(database_id) = saved {
                msg.id = database_id;
            }
        }
    }
}
