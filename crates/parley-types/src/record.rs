use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use parley_core::id::{self, Prefix};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
    Tool,
}

/// Per-message model settings chosen by the user at send time.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_level: Option<String>,
    #[serde(default)]
    pub search_enabled: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecordUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecordMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<RecordUsage>,
    /// Provider-supplied evidence (queries, source chunks, confidence)
    /// backing a generated answer. Opaque to this core.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grounding: Option<serde_json::Value>,
}

/// The persisted shape of one conversation message. `parts` stays as raw
/// JSON values so that entries written by newer or older builds survive
/// storage untouched; the Part Codec is the only component that interprets
/// them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRecord {
    pub id: String,
    pub session_id: String,
    pub user_id: String,
    pub role: MessageRole,
    #[serde(default)]
    pub parts: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_config: Option<ModelConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RecordMetadata>,
    pub created_at: DateTime<Utc>,
}

impl ConversationRecord {
    pub fn new(
        session_id: impl Into<String>,
        user_id: impl Into<String>,
        role: MessageRole,
    ) -> Self {
        Self {
            id: id::create(Prefix::Record, None),
            session_id: session_id.into(),
            user_id: user_id.into(),
            role,
            parts: Vec::new(),
            model_used: None,
            model_provider: None,
            model_config: None,
            metadata: None,
            created_at: Utc::now(),
        }
    }
}
