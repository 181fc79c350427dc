use std::collections::{HashSet, VecDeque};

use parley_core::settle_ordered;
use parley_provider::{ContentItem, CoreMessage, ModelProfile, ProviderProfile};
use parley_types::{MessageRole, Part, UIMessage};

use crate::attachment::AttachmentResolver;
use crate::codec;

/// Output of one build pass: the ordered wire sequence plus the most
/// recent user message so the caller can persist it.
#[derive(Debug)]
pub struct BuiltMessages {
    pub messages: Vec<CoreMessage>,
    pub last_user: Option<LastUserMessage>,
}

#[derive(Debug, Clone)]
pub struct LastUserMessage {
    pub id: String,
    pub content: String,
    pub parts: Vec<Part>,
}

/// Translate the UI message history into the wire sequence for one
/// provider call. Individual malformed parts are skipped, never fatal;
/// the caller is responsible for rejecting an empty history up front.
pub async fn build_core_messages(
    history: &[UIMessage],
    profile: &ProviderProfile,
    model: &ModelProfile,
    resolver: &AttachmentResolver,
) -> BuiltMessages {
    let mut messages = Vec::new();

    for msg in history {
        match msg.role {
            MessageRole::User => build_user_turn(msg, profile, resolver, &mut messages).await,
            MessageRole::Assistant => {
                build_assistant_turn(msg, profile, model, resolver, &mut messages).await
            }
            MessageRole::System => {
                let text = msg.content.trim();
                if !text.is_empty() {
                    messages.push(CoreMessage::system(text));
                }
            }
            // Tool output is embedded in assistant tool invocations; a
            // bare tool-role UI message has nothing to contribute.
            MessageRole::Tool => {}
        }
    }

    let last_user = history
        .iter()
        .rev()
        .find(|m| m.role == MessageRole::User)
        .map(|m| LastUserMessage {
            id: m.id.clone(),
            content: m.content.clone(),
            parts: codec::encode_parts(m),
        });

    BuiltMessages {
        messages,
        last_user,
    }
}

async fn build_user_turn(
    msg: &UIMessage,
    profile: &ProviderProfile,
    resolver: &AttachmentResolver,
    out: &mut Vec<CoreMessage>,
) {
    let mut items = Vec::new();

    let text = msg.first_text().unwrap_or(&msg.content).trim();
    if !text.is_empty() {
        items.push(ContentItem::Text {
            text: text.to_string(),
        });
    }

    let attachments: Vec<(&str, &str)> = msg
        .parts
        .iter()
        .filter_map(|p| match p {
            Part::File { url, mime_type, .. } => Some((url.as_str(), mime_type.as_str())),
            _ => None,
        })
        .collect();

    let futures: Vec<_> = attachments
        .iter()
        .map(|(url, mime)| async move {
            resolver
                .resolve(url, mime, profile, MessageRole::User)
                .await
                .ok_or(())
        })
        .collect();

    for resolved in settle_ordered(futures).await {
        if let Ok(item) = resolved {
            items.push(item);
        }
    }

    // Neither text nor any surviving attachment: this turn contributes
    // nothing to the wire sequence.
    if !items.is_empty() {
        out.push(CoreMessage::user(items));
    }
}

struct FileRoute<'a> {
    url: &'a str,
    mime: &'a str,
    resolve_role: MessageRole,
    trailing: bool,
}

async fn build_assistant_turn(
    msg: &UIMessage,
    profile: &ProviderProfile,
    model: &ModelProfile,
    resolver: &AttachmentResolver,
    out: &mut Vec<CoreMessage>,
) {
    // 1. Completed tool invocations: one assistant message with the calls,
    // immediately followed by one tool message with the matching results.
    // Calls whose result never arrived are dropped without blocking the
    // rest; duplicate call ids keep their first occurrence.
    let mut seen_calls = HashSet::new();
    let mut calls = Vec::new();
    let mut results = Vec::new();
    for part in &msg.parts {
        if let Part::ToolInvocation {
            tool_invocation: inv,
        } = part
        {
            let Some(result) = inv.result.clone() else {
                continue;
            };
            if !seen_calls.insert(inv.tool_call_id.clone()) {
                continue;
            }
            calls.push(ContentItem::ToolCall {
                tool_call_id: inv.tool_call_id.clone(),
                tool_name: inv.tool_name.clone(),
                args: inv.args.clone(),
            });
            results.push(ContentItem::ToolResult {
                tool_call_id: inv.tool_call_id.clone(),
                tool_name: inv.tool_name.clone(),
                result,
            });
        }
    }
    if !calls.is_empty() {
        out.push(CoreMessage::assistant(calls));
        out.push(CoreMessage::tool(results));
    }

    // Route file parts before fetching: assistant images go to a trailing
    // user message when the provider cannot take them in-place, and are
    // resolved under the user role so they classify as image content.
    let routes: Vec<FileRoute> = msg
        .parts
        .iter()
        .filter_map(|p| match p {
            Part::File { url, mime_type, .. } => {
                let relocate = mime_type.starts_with("image/") && !profile.supports_assistant_images;
                Some(FileRoute {
                    url,
                    mime: mime_type,
                    resolve_role: if relocate {
                        MessageRole::User
                    } else {
                        MessageRole::Assistant
                    },
                    trailing: relocate,
                })
            }
            _ => None,
        })
        .collect();

    let futures: Vec<_> = routes
        .iter()
        .map(|route| async move {
            resolver
                .resolve(route.url, route.mime, profile, route.resolve_role)
                .await
                .ok_or(())
        })
        .collect();
    let mut resolved: VecDeque<(bool, Result<ContentItem, ()>)> = routes
        .iter()
        .map(|r| r.trailing)
        .zip(settle_ordered(futures).await)
        .collect();

    // 2. Remaining content in original part order.
    let mut content = Vec::new();
    let mut trailing = Vec::new();
    for part in &msg.parts {
        match part {
            Part::Text { text } => {
                if !text.is_empty() {
                    content.push(ContentItem::Text { text: text.clone() });
                }
            }
            Part::File { .. } => {
                if let Some((to_trailing, outcome)) = resolved.pop_front() {
                    if let Ok(item) = outcome {
                        if to_trailing {
                            trailing.push(item);
                        } else {
                            content.push(item);
                        }
                    }
                }
            }
            Part::Reasoning { reasoning, details } => {
                let signature = details
                    .iter()
                    .find_map(|d| d.signature.clone())
                    .filter(|_| model.keeps_signature_from(profile));
                content.push(ContentItem::Reasoning {
                    text: reasoning.clone(),
                    signature,
                });
            }
            Part::ToolInvocation { .. } => {}
        }
    }

    let is_single_text = content.len() == 1 && matches!(content[0], ContentItem::Text { .. });
    if is_single_text {
        if let Some(ContentItem::Text { text }) = content.pop() {
            out.push(CoreMessage::assistant_text(text));
        }
    } else if !content.is_empty() {
        out.push(CoreMessage::assistant(content));
    }

    // 3. Relocated images, resubmitted as if from the user, no text.
    if !trailing.is_empty() {
        out.push(CoreMessage::user(trailing));
    }
}
