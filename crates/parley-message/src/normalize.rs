use chrono::Utc;

use parley_provider::ModelProfile;
use parley_types::{
    Annotation, ConversationRecord, ModelConfig, Part, RecordMetadata, RecordUsage, UIMessage,
};

use crate::codec;

const FILE_FALLBACK_CONTENT: &str = "[file attachment]";

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("validation error: {0}")]
    Validation(String),
}

/// Everything the caller knows at persistence time that the UI message
/// itself does not carry.
#[derive(Debug, Clone, Default)]
pub struct RecordContext {
    pub session_id: String,
    pub user_id: String,
    pub model: Option<ModelProfile>,
    pub model_config: Option<ModelConfig>,
    pub usage: Option<RecordUsage>,
    pub grounding: Option<serde_json::Value>,
}

/// Reconstruct UI messages from persisted records: typed parts via the
/// codec, a fallback `content` string, and one consolidated provenance
/// annotation.
pub fn to_ui(records: &[ConversationRecord]) -> Vec<UIMessage> {
    records.iter().map(record_to_ui).collect()
}

fn record_to_ui(record: &ConversationRecord) -> UIMessage {
    let parts = codec::decode_parts(&record.parts);

    let content = parts
        .iter()
        .find_map(|p| match p {
            Part::Text { text } => Some(text.clone()),
            _ => None,
        })
        .unwrap_or_else(|| {
            if parts.iter().any(|p| matches!(p, Part::File { .. })) {
                FILE_FALLBACK_CONTENT.to_string()
            } else {
                String::new()
            }
        });

    let mut annotations = Vec::new();
    let grounding = record.metadata.as_ref().and_then(|m| m.grounding.clone());
    if record.model_used.is_some() || record.model_provider.is_some() || grounding.is_some() {
        annotations.push(Annotation::Provenance {
            model_used: record.model_used.clone(),
            model_provider: record.model_provider.clone(),
            has_grounding: grounding.is_some(),
            grounding,
        });
    }

    UIMessage {
        id: record.id.clone(),
        role: record.role,
        content,
        parts,
        created_at: record.created_at,
        annotations,
    }
}

/// Encode a UI message for persistence. Fails only when the required
/// identifiers are absent; every other missing field degrades to
/// empty/None. The persistence boundary owns the final timestamp; the one
/// set here is provisional.
pub fn to_record(
    message: &UIMessage,
    ctx: &RecordContext,
) -> Result<ConversationRecord, NormalizeError> {
    if ctx.session_id.trim().is_empty() {
        return Err(NormalizeError::Validation(
            "sessionId is required to persist a message".to_string(),
        ));
    }
    if ctx.user_id.trim().is_empty() {
        return Err(NormalizeError::Validation(
            "userId is required to persist a message".to_string(),
        ));
    }

    let metadata = if ctx.usage.is_some() || ctx.grounding.is_some() {
        Some(RecordMetadata {
            usage: ctx.usage.clone(),
            grounding: ctx.grounding.clone(),
        })
    } else {
        None
    };

    Ok(ConversationRecord {
        id: message.id.clone(),
        session_id: ctx.session_id.clone(),
        user_id: ctx.user_id.clone(),
        role: message.role,
        parts: codec::encode_values(message),
        model_used: ctx.model.as_ref().map(|m| decorated_model_name(m, ctx)),
        model_provider: ctx.model.as_ref().map(|m| m.provider_id.clone()),
        model_config: ctx.model_config.clone(),
        metadata,
        created_at: Utc::now(),
    })
}

/// Models with more than one selectable reasoning level record which level
/// produced the message, e.g. `claude-opus-4 (high)`.
fn decorated_model_name(model: &ModelProfile, ctx: &RecordContext) -> String {
    let level = ctx
        .model_config
        .as_ref()
        .and_then(|c| c.reasoning_level.as_deref());
    match level {
        Some(level) if model.has_selectable_reasoning() => format!("{} ({})", model.id, level),
        _ => model.id.clone(),
    }
}
