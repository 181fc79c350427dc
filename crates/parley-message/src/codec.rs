use std::collections::HashSet;

use parley_types::{Part, UIMessage};

/// Decode a record's raw part values into typed parts. Entries that fail
/// to decode (written by another build, hand-edited, corrupted) are
/// dropped, never an error.
pub fn decode_parts(raw: &[serde_json::Value]) -> Vec<Part> {
    raw.iter()
        .filter_map(|value| match serde_json::from_value::<Part>(value.clone()) {
            Ok(part) => Some(part),
            Err(err) => {
                tracing::debug!(error = %err, "dropping unreadable part");
                None
            }
        })
        .collect()
}

fn dedupe_key(part: &Part) -> (&'static str, String) {
    match part {
        Part::Text { text } => ("text", text.clone()),
        Part::File { url, .. } => ("file", url.clone()),
        Part::ToolInvocation { tool_invocation } => {
            ("tool-invocation", tool_invocation.tool_call_id.clone())
        }
        Part::Reasoning { reasoning, .. } => ("reasoning", reasoning.clone()),
    }
}

/// Walk a UI message's parts into their persistence-ready form.
///
/// Within one message no two text parts share their text, no two file
/// parts share a url, no two tool invocations share a call id and no two
/// reasoning parts share their text; later duplicates lose. Tool
/// invocations whose result never arrived (interrupted stream) are dropped
/// so storage only ever sees finished calls. A message with no structured
/// parts falls back to its flattened `content` string; an empty string
/// yields an empty list.
pub fn encode_parts(message: &UIMessage) -> Vec<Part> {
    if message.parts.is_empty() {
        if message.content.is_empty() {
            return Vec::new();
        }
        return vec![Part::text(message.content.clone())];
    }

    let mut seen: HashSet<(&'static str, String)> = HashSet::new();
    let mut out = Vec::new();
    for part in &message.parts {
        if let Part::ToolInvocation { tool_invocation } = part {
            if !tool_invocation.is_complete() {
                tracing::debug!(
                    tool_call_id = %tool_invocation.tool_call_id,
                    "dropping in-flight tool invocation at encode time"
                );
                continue;
            }
        }
        if seen.insert(dedupe_key(part)) {
            out.push(part.clone());
        }
    }
    out
}

/// Serialize encoded parts into the raw values a record stores.
pub fn encode_values(message: &UIMessage) -> Vec<serde_json::Value> {
    encode_parts(message)
        .iter()
        .filter_map(|part| serde_json::to_value(part).ok())
        .collect()
}
