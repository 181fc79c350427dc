use serde::{Deserialize, Serialize};

/// Wire-format message built fresh for each model invocation. Never
/// persisted; the persisted record and the UI message are separate shapes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoreMessage {
    pub role: Role,
    pub content: CoreContent,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// An assistant turn that is pure text goes over the wire as a bare string;
/// everything else is an ordered item list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CoreContent {
    Text(String),
    Items(Vec<ContentItem>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentItem {
    Text {
        text: String,
    },
    Image {
        /// URL or base64 data payload, depending on how the attachment was
        /// resolved.
        image: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
    },
    File {
        data: String,
        mime_type: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filename: Option<String>,
    },
    ToolCall {
        tool_call_id: String,
        tool_name: String,
        args: serde_json::Value,
    },
    ToolResult {
        tool_call_id: String,
        tool_name: String,
        result: serde_json::Value,
    },
    Reasoning {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        signature: Option<String>,
    },
}

impl CoreMessage {
    pub fn user(items: Vec<ContentItem>) -> Self {
        Self {
            role: Role::User,
            content: CoreContent::Items(items),
        }
    }

    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: CoreContent::Text(text.into()),
        }
    }

    pub fn assistant(items: Vec<ContentItem>) -> Self {
        Self {
            role: Role::Assistant,
            content: CoreContent::Items(items),
        }
    }

    pub fn tool(items: Vec<ContentItem>) -> Self {
        Self {
            role: Role::Tool,
            content: CoreContent::Items(items),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: CoreContent::Text(text.into()),
        }
    }

    pub fn items(&self) -> &[ContentItem] {
        match &self.content {
            CoreContent::Items(items) => items,
            CoreContent::Text(_) => &[],
        }
    }
}
