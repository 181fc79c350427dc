use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Out-of-band provenance attached to a UI message. Annotations arrive as
/// loose JSON from the transport layer; every shape check funnels through
/// [`Annotation::decode`] so there is exactly one decoder per kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Annotation {
    #[serde(rename_all = "camelCase")]
    Provenance {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        model_used: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        model_provider: Option<String>,
        #[serde(default)]
        has_grounding: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        grounding: Option<Value>,
    },
    #[serde(rename_all = "camelCase")]
    MessageSaved { database_id: String },
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DecodeError {
    #[error("annotation is missing its `type` tag")]
    MissingTag,

    #[error("unknown annotation type: {0}")]
    UnknownType(String),

    #[error("malformed {kind} annotation: {message}")]
    Malformed { kind: &'static str, message: String },
}

impl Annotation {
    pub fn decode(value: &Value) -> Result<Annotation, DecodeError> {
        let kind = value
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or(DecodeError::MissingTag)?;

        match kind {
            "provenance" => decode_kind(value, "provenance"),
            "message_saved" => decode_kind(value, "message_saved"),
            other => Err(DecodeError::UnknownType(other.to_string())),
        }
    }

    /// Decode a batch, silently dropping anything malformed. Used on the
    /// read path where a bad annotation must never sink the message.
    pub fn decode_all(values: &[Value]) -> Vec<Annotation> {
        values
            .iter()
            .filter_map(|v| Annotation::decode(v).ok())
            .collect()
    }
}

fn decode_kind(value: &Value, kind: &'static str) -> Result<Annotation, DecodeError> {
    serde_json::from_value(value.clone()).map_err(|err| DecodeError::Malformed {
        kind,
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_message_saved() {
        let value = json!({"type": "message_saved", "databaseId": "rec_123"});
        let annotation = Annotation::decode(&value).unwrap();
        assert_eq!(
            annotation,
            Annotation::MessageSaved {
                database_id: "rec_123".to_string()
            }
        );
    }

    #[test]
    fn decodes_provenance_with_grounding_flag() {
        let value = json!({
            "type": "provenance",
            "modelUsed": "sonnet-4",
            "modelProvider": "anthropic",
            "hasGrounding": true,
            "grounding": {"chunks": []}
        });
        match Annotation::decode(&value).unwrap() {
            Annotation::Provenance {
                model_used,
                has_grounding,
                ..
            } => {
                assert_eq!(model_used.as_deref(), Some("sonnet-4"));
                assert!(has_grounding);
            }
            other => panic!("unexpected annotation: {:?}", other),
        }
    }

    #[test]
    fn unknown_type_is_an_error_not_a_panic() {
        let value = json!({"type": "telemetry", "x": 1});
        assert_eq!(
            Annotation::decode(&value),
            Err(DecodeError::UnknownType("telemetry".to_string()))
        );
    }

    #[test]
    fn decode_all_drops_malformed_entries() {
        let values = vec![
            json!({"type": "message_saved", "databaseId": "rec_1"}),
            json!({"no_tag": true}),
            json!({"type": "message_saved"}),
        ];
        let decoded = Annotation::decode_all(&values);
        assert_eq!(decoded.len(), 1);
    }
}
