use chrono::Utc;

use parley_provider::{ContentItem, CoreContent, CoreMessage, Role};
use parley_types::{
    InvocationState, MessageRole, Part, ReasoningDetail, ToolInvocation, UIMessage,
};

/// Consolidate the raw segments a provider returned for one turn into a
/// single assistant UI message. The id comes from the caller so it can
/// later be reconciled with the persisted id.
pub fn assemble_response(segments: &[CoreMessage], message_id: impl Into<String>) -> UIMessage {
    let mut content = String::new();
    let mut parts: Vec<Part> = Vec::new();
    let mut text_part_index: Option<usize> = None;
    let mut step: u32 = 0;

    for segment in segments {
        if segment.role != Role::Assistant {
            continue;
        }

        match &segment.content {
            CoreContent::Text(text) => {
                append_text(&mut content, &mut parts, &mut text_part_index, text);
            }
            CoreContent::Items(items) => {
                for item in items {
                    match item {
                        ContentItem::Text { text } => {
                            append_text(&mut content, &mut parts, &mut text_part_index, text);
                        }
                        ContentItem::ToolCall {
                            tool_call_id,
                            tool_name,
                            args,
                        } => {
                            let result = find_tool_result(segments, tool_call_id);
                            parts.push(Part::ToolInvocation {
                                tool_invocation: ToolInvocation {
                                    tool_call_id: tool_call_id.clone(),
                                    tool_name: tool_name.clone(),
                                    args: args.clone(),
                                    result,
                                    state: InvocationState::Result,
                                    step: Some(step),
                                },
                            });
                            step += 1;
                        }
                        ContentItem::Reasoning { text, signature } => {
                            parts.push(Part::Reasoning {
                                reasoning: text.clone(),
                                details: vec![ReasoningDetail::text_detail(
                                    text.clone(),
                                    signature.clone(),
                                )],
                            });
                        }
                        // A provider echoing files back inside a response
                        // segment has no UI counterpart here.
                        ContentItem::Image { .. }
                        | ContentItem::File { .. }
                        | ContentItem::ToolResult { .. } => {}
                    }
                }
            }
        }
    }

    UIMessage {
        id: message_id.into(),
        role: MessageRole::Assistant,
        content,
        parts,
        created_at: Utc::now(),
        annotations: Vec::new(),
    }
}

fn append_text(
    content: &mut String,
    parts: &mut Vec<Part>,
    text_part_index: &mut Option<usize>,
    text: &str,
) {
    content.push_str(text);
    match text_part_index {
        Some(index) => {
            if let Some(Part::Text { text: existing }) = parts.get_mut(*index) {
                existing.push_str(text);
            }
        }
        None => {
            parts.push(Part::text(text));
            *text_part_index = Some(parts.len() - 1);
        }
    }
}

/// Search every tool-role segment for the result matching a call id. The
/// search succeeding is not required: an unmatched call still becomes a
/// part with no result so the step counter stays monotonic.
fn find_tool_result(segments: &[CoreMessage], tool_call_id: &str) -> Option<serde_json::Value> {
    segments
        .iter()
        .filter(|s| s.role == Role::Tool)
        .flat_map(|s| s.items().iter())
        .find_map(|item| match item {
            ContentItem::ToolResult {
                tool_call_id: id,
                result,
                ..
            } if id == tool_call_id => Some(result.clone()),
            _ => None,
        })
}
