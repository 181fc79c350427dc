use serde::{Deserialize, Serialize};

/// A typed fragment of message content. The serialized form is what the
/// persistence boundary stores inside a record's `parts` array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Part {
    Text {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    File {
        name: String,
        path: String,
        url: String,
        size: u64,
        mime_type: String,
    },
    #[serde(rename_all = "camelCase")]
    ToolInvocation { tool_invocation: ToolInvocation },
    Reasoning {
        reasoning: String,
        #[serde(default)]
        details: Vec<ReasoningDetail>,
    },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolInvocation {
    pub tool_call_id: String,
    pub tool_name: String,
    pub args: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    pub state: InvocationState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<u32>,
}

impl ToolInvocation {
    /// A call is persistable only once its result has arrived; interrupted
    /// streams leave calls in `Call`/`PartialCall` and those never reach
    /// storage.
    pub fn is_complete(&self) -> bool {
        self.result.is_some() && matches!(self.state, InvocationState::Result)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum InvocationState {
    Call,
    PartialCall,
    Result,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReasoningDetail {
    #[serde(rename = "type")]
    pub detail_type: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl ReasoningDetail {
    pub fn text_detail(text: impl Into<String>, signature: Option<String>) -> Self {
        Self {
            detail_type: "text".to_string(),
            text: text.into(),
            signature,
        }
    }
}
