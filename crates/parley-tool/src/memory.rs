use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{Tool, ToolContext, ToolError, ToolOutput};

const DEFAULT_BASE_URL: &str = "https://api.mem0.ai";
const API_KEY_ENV: &str = "MEM0_API_KEY";
const REQUEST_TIMEOUT_SECS: u64 = 15;
const RETRIEVE_LIMIT: usize = 5;
/// Low on purpose: long-term recall favors surfacing loosely related
/// memories over missing relevant ones.
const RETRIEVE_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub id: String,
    pub memory: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Structured result of a memory operation. Failures of any kind (missing
/// user id, missing credential, transport) land here, never as an
/// exception crossing the tool boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryOutcome {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub memories: Vec<MemoryEntry>,
}

impl MemoryOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            memories: Vec::new(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            memories: Vec::new(),
        }
    }
}

pub struct MemoryClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl MemoryClient {
    pub fn new(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: base_url.into(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(std::env::var(API_KEY_ENV).ok(), DEFAULT_BASE_URL)
    }

    pub async fn save(
        &self,
        content: &str,
        user_id: &str,
        session_id: Option<&str>,
    ) -> MemoryOutcome {
        if user_id.trim().is_empty() {
            return MemoryOutcome::failure("cannot save a memory without a user id");
        }
        let Some(api_key) = self.api_key.as_deref() else {
            return MemoryOutcome::failure(format!(
                "memory service is not configured: missing {}",
                API_KEY_ENV
            ));
        };

        let mut body = json!({
            "messages": [{"role": "user", "content": content}],
            "user_id": user_id,
            "metadata": {
                "importance": "high",
                "timestamp": Utc::now().to_rfc3339(),
            },
        });
        if let Some(run_id) = session_id.filter(|s| !s.is_empty()) {
            body["run_id"] = json!(run_id);
        }

        let response = self
            .client
            .post(format!("{}/v1/memories/", self.base_url))
            .header("Authorization", format!("Token {}", api_key))
            .json(&body)
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => {
                MemoryOutcome::ok("memory saved")
            }
            Ok(response) => {
                let status = response.status();
                tracing::debug!(status = %status, "memory save rejected");
                MemoryOutcome::failure(format!("memory save failed with status {}", status))
            }
            Err(err) => {
                tracing::debug!(error = %err, "memory save request failed");
                MemoryOutcome::failure(format!("memory save failed: {}", err))
            }
        }
    }

    pub async fn retrieve(
        &self,
        query: &str,
        user_id: &str,
        session_id: Option<&str>,
    ) -> MemoryOutcome {
        if user_id.trim().is_empty() {
            return MemoryOutcome::failure("cannot retrieve memories without a user id");
        }
        let Some(api_key) = self.api_key.as_deref() else {
            return MemoryOutcome::failure(format!(
                "memory service is not configured: missing {}",
                API_KEY_ENV
            ));
        };

        let mut filters = vec![json!({"user_id": user_id})];
        if let Some(run_id) = session_id.filter(|s| !s.is_empty()) {
            filters.push(json!({"run_id": run_id}));
        }
        let body = json!({
            "query": query,
            "filters": {"AND": filters},
            "limit": RETRIEVE_LIMIT,
            "threshold": RETRIEVE_THRESHOLD,
        });

        let response = self
            .client
            .post(format!("{}/v2/memories/search/", self.base_url))
            .header("Authorization", format!("Token {}", api_key))
            .json(&body)
            .send()
            .await;

        let response = match response {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                let status = response.status();
                tracing::debug!(status = %status, "memory search rejected");
                return MemoryOutcome::failure(format!(
                    "memory retrieval failed with status {}",
                    status
                ));
            }
            Err(err) => {
                tracing::debug!(error = %err, "memory search request failed");
                return MemoryOutcome::failure(format!("memory retrieval failed: {}", err));
            }
        };

        match response.json::<Vec<MemoryEntry>>().await {
            Ok(memories) => {
                let message = if memories.is_empty() {
                    "no matching memories".to_string()
                } else {
                    format!("found {} memories", memories.len())
                };
                MemoryOutcome {
                    success: true,
                    message,
                    memories,
                }
            }
            Err(err) => {
                MemoryOutcome::failure(format!("memory response was not valid JSON: {}", err))
            }
        }
    }
}

pub struct MemorySaveTool {
    client: MemoryClient,
}

impl MemorySaveTool {
    pub fn new(client: MemoryClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct SaveInput {
    content: String,
}

#[async_trait]
impl Tool for MemorySaveTool {
    fn id(&self) -> &str {
        "save_memory"
    }

    fn description(&self) -> &str {
        "Save an important fact about the user to long-term memory so later \
         conversations can recall it. Use for stable preferences, goals, and \
         personal context the user shares."
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "content": {
                    "type": "string",
                    "description": "The fact to remember, phrased as a standalone statement"
                }
            },
            "required": ["content"]
        })
    }

    async fn execute(
        &self,
        args: serde_json::Value,
        ctx: ToolContext,
    ) -> Result<ToolOutput, ToolError> {
        let input: SaveInput =
            serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

        let outcome = self
            .client
            .save(&input.content, &ctx.user_id, Some(&ctx.session_id))
            .await;

        Ok(ToolOutput::simple("Save memory", outcome.message.clone())
            .with_metadata("success", json!(outcome.success)))
    }
}

pub struct MemoryRetrieveTool {
    client: MemoryClient,
}

impl MemoryRetrieveTool {
    pub fn new(client: MemoryClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct RetrieveInput {
    query: String,
    #[serde(default)]
    session_only: bool,
}

#[async_trait]
impl Tool for MemoryRetrieveTool {
    fn id(&self) -> &str {
        "retrieve_memories"
    }

    fn description(&self) -> &str {
        "Look up previously saved memories about the user relevant to a query. \
         Returns the closest matches with their stored content."
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "What to look for in the user's saved memories"
                },
                "session_only": {
                    "type": "boolean",
                    "default": false,
                    "description": "Restrict matches to memories saved in this session"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(
        &self,
        args: serde_json::Value,
        ctx: ToolContext,
    ) -> Result<ToolOutput, ToolError> {
        let input: RetrieveInput =
            serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

        let session_id = input.session_only.then_some(ctx.session_id.as_str());
        let outcome = self
            .client
            .retrieve(&input.query, &ctx.user_id, session_id)
            .await;

        let output = if outcome.memories.is_empty() {
            outcome.message.clone()
        } else {
            outcome
                .memories
                .iter()
                .map(|m| format!("- {}", m.memory))
                .collect::<Vec<_>>()
                .join("\n")
        };

        Ok(ToolOutput::simple("Retrieve memories", output)
            .with_metadata("success", json!(outcome.success))
            .with_metadata("count", json!(outcome.memories.len())))
    }
}
