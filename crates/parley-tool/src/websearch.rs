use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use parley_core::settle_ordered;

use crate::citations::SourceIndex;
use crate::queries::generate_queries;
use crate::{Tool, ToolContext, ToolError, ToolOutput};

const DEFAULT_BASE_URL: &str = "https://api.tavily.com";
const API_KEY_ENV: &str = "TAVILY_API_KEY";
const REQUEST_TIMEOUT_SECS: u64 = 20;
const DEFAULT_MAX_RESULTS: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub content: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
}

/// Outcome of one query. A failed query still occupies its slot in the
/// merged array, with `error` set and everything else empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResult {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default)]
    pub results: Vec<SearchHit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<serde_json::Value>,
    #[serde(default)]
    pub response_time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchResult {
    pub fn failure(query: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            error: Some(message.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub topic: String,
    pub search_depth: String,
    pub max_results: usize,
    pub include_answer: bool,
    pub include_images: bool,
    pub include_raw_content: bool,
    pub time_range: Option<String>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            topic: "general".to_string(),
            search_depth: "basic".to_string(),
            max_results: DEFAULT_MAX_RESULTS,
            include_answer: true,
            include_images: false,
            include_raw_content: false,
            time_range: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    topic: &'a str,
    search_depth: &'a str,
    max_results: usize,
    include_answer: bool,
    include_images: bool,
    include_raw_content: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_range: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    results: Vec<SearchHit>,
    #[serde(default)]
    images: Option<serde_json::Value>,
    #[serde(default)]
    response_time: f64,
}

pub struct SearchClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl SearchClient {
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

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Issue every query concurrently and merge outcomes in query order.
    /// One query failing never cancels or delays the others. Without a
    /// configured key no request is attempted at all; every slot comes
    /// back as a configuration failure.
    pub async fn search(&self, queries: &[String], options: &SearchOptions) -> Vec<SearchResult> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::warn!("web search invoked without {} configured", API_KEY_ENV);
            return queries
                .iter()
                .map(|q| {
                    SearchResult::failure(
                        q,
                        format!("web search is not configured: missing {}", API_KEY_ENV),
                    )
                })
                .collect();
        };

        let futures: Vec<_> = queries
            .iter()
            .map(|query| self.search_one(query, api_key, options))
            .collect();

        queries
            .iter()
            .zip(settle_ordered(futures).await)
            .map(|(query, outcome)| match outcome {
                Ok(result) => result,
                Err(message) => {
                    tracing::debug!(query = %query, error = %message, "search query failed");
                    SearchResult::failure(query, message)
                }
            })
            .collect()
    }

    async fn search_one(
        &self,
        query: &str,
        api_key: &str,
        options: &SearchOptions,
    ) -> Result<SearchResult, String> {
        let request = SearchRequest {
            query,
            topic: &options.topic,
            search_depth: &options.search_depth,
            max_results: options.max_results,
            include_answer: options.include_answer,
            include_images: options.include_images,
            include_raw_content: options.include_raw_content,
            time_range: options.time_range.as_deref(),
        };

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| format!("search request failed: {}", err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("search request failed with status {}", status));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|err| format!("search response was not valid JSON: {}", err))?;

        Ok(SearchResult {
            query: query.to_string(),
            answer: body.answer.filter(|a| !a.trim().is_empty()),
            results: body.results,
            images: body.images,
            response_time: body.response_time,
            error: None,
        })
    }
}

static DESCRIPTION: &str = r#"Search the web for current information.

The user's request is broken into up to three focused queries, each searched
concurrently. Results come back as a numbered source list starting at [1].

When answering from these results, cite sources inline with their bracketed
number, e.g. "Green tea is rich in catechins [2]." Only cite numbers that
appear in the source list."#;

pub struct WebSearchTool {
    client: SearchClient,
}

impl WebSearchTool {
    pub fn new(client: SearchClient) -> Self {
        Self { client }
    }

    pub fn from_env() -> Self {
        Self::new(SearchClient::from_env())
    }
}

#[derive(Debug, Deserialize)]
struct WebSearchInput {
    query: String,
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    search_depth: Option<String>,
    #[serde(default)]
    max_results: Option<usize>,
    #[serde(default)]
    time_range: Option<String>,
}

#[async_trait]
impl Tool for WebSearchTool {
    fn id(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "What to search for, phrased as the user asked it"
                },
                "topic": {
                    "type": "string",
                    "enum": ["general", "news", "finance"],
                    "default": "general",
                    "description": "Search topic hint"
                },
                "search_depth": {
                    "type": "string",
                    "enum": ["basic", "advanced"],
                    "default": "basic",
                    "description": "How thorough each query should be"
                },
                "max_results": {
                    "type": "integer",
                    "default": DEFAULT_MAX_RESULTS,
                    "description": "Maximum results per query"
                },
                "time_range": {
                    "type": "string",
                    "enum": ["day", "week", "month", "year"],
                    "description": "Restrict results to a recent window"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(
        &self,
        args: serde_json::Value,
        _ctx: ToolContext,
    ) -> Result<ToolOutput, ToolError> {
        let input: WebSearchInput =
            serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

        let mut options = SearchOptions::default();
        if let Some(topic) = input.topic {
            options.topic = topic;
        }
        if let Some(depth) = input.search_depth {
            options.search_depth = depth;
        }
        if let Some(max_results) = input.max_results {
            options.max_results = max_results;
        }
        options.time_range = input.time_range;

        let queries = generate_queries(&input.query);
        let results = self.client.search(&queries, &options).await;

        let errors: Vec<String> = results
            .iter()
            .filter_map(|r| r.error.as_ref().map(|e| format!("{}: {}", r.query, e)))
            .collect();
        let index = SourceIndex::from_results(&results);

        if index.is_empty() {
            let message = if errors.is_empty() {
                "No results found. Try a different phrasing.".to_string()
            } else {
                format!("Web search failed.\n{}", errors.join("\n"))
            };
            return Ok(ToolOutput::simple("Web search", message)
                .with_metadata("success", serde_json::json!(false))
                .with_metadata("queries", serde_json::json!(queries)));
        }

        Ok(ToolOutput::simple("Web search", index.render())
            .with_metadata("success", serde_json::json!(true))
            .with_metadata("queries", serde_json::json!(queries))
            .with_metadata("source_count", serde_json::json!(index.len()))
            .with_metadata("failed_queries", serde_json::json!(errors)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn hit(title: &str, url: &str) -> serde_json::Value {
        json!({"title": title, "url": url, "content": "...", "score": 0.9})
    }

    #[tokio::test]
    async fn missing_credential_returns_per_query_failures_without_any_call() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/search")
            .expect(0)
            .create_async()
            .await;

        let client = SearchClient::new(None, server.url());
        let queries = vec![
            "green tea".to_string(),
            "black tea".to_string(),
            "oolong tea".to_string(),
        ];
        let results = client.search(&queries, &SearchOptions::default()).await;

        mock.assert_async().await;
        assert_eq!(results.len(), 3);
        for (result, query) in results.iter().zip(&queries) {
            assert_eq!(&result.query, query);
            assert!(result.error.as_deref().unwrap().contains("not configured"));
            assert!(result.results.is_empty());
        }
    }

    #[tokio::test]
    async fn one_failing_query_does_not_suppress_the_others() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/search")
            .match_body(Matcher::PartialJson(json!({"query": "green tea"})))
            .with_status(200)
            .with_body(
                json!({
                    "query": "green tea",
                    "answer": "Green tea is healthy.",
                    "results": [hit("Green tea", "https://example.com/green")],
                    "response_time": 0.4
                })
                .to_string(),
            )
            .create_async()
            .await;
        server
            .mock("POST", "/search")
            .match_body(Matcher::PartialJson(json!({"query": "black tea"})))
            .with_status(500)
            .create_async()
            .await;
        server
            .mock("POST", "/search")
            .match_body(Matcher::PartialJson(json!({"query": "oolong tea"})))
            .with_status(200)
            .with_body(
                json!({
                    "query": "oolong tea",
                    "results": [hit("Oolong", "https://example.com/oolong")],
                    "response_time": 0.2
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = SearchClient::new(Some("tvly-test".to_string()), server.url());
        let queries = vec![
            "green tea".to_string(),
            "black tea".to_string(),
            "oolong tea".to_string(),
        ];
        let results = client.search(&queries, &SearchOptions::default()).await;

        assert_eq!(results.len(), 3);
        assert!(results[0].error.is_none());
        assert_eq!(results[0].answer.as_deref(), Some("Green tea is healthy."));
        assert!(results[1].error.as_deref().unwrap().contains("500"));
        assert!(results[2].error.is_none());
        assert_eq!(results[2].results.len(), 1);

        // Citation numbering covers only the successful queries, in query
        // order: the answer for the first, then its hit, then the third
        // query's hit.
        let index = SourceIndex::from_results(&results);
        assert_eq!(index.len(), 3);
        let numbers: Vec<usize> = index.sources().iter().map(|s| s.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(index.sources()[2].title, "Oolong");
    }

    #[tokio::test]
    async fn tool_degrades_to_failure_output_when_unconfigured() {
        let tool = WebSearchTool::new(SearchClient::new(None, "http://127.0.0.1:9"));
        let output = tool
            .execute(
                json!({"query": "latest rust release"}),
                ToolContext::new("ses_1", "usr_1"),
            )
            .await
            .unwrap();

        assert_eq!(output.metadata.get("success"), Some(&json!(false)));
        assert!(output.output.contains("not configured"));
    }

    #[tokio::test]
    async fn tool_renders_numbered_sources_for_the_model() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/search")
            .with_status(200)
            .with_body(
                json!({
                    "query": "rust 1.80 release notes",
                    "answer": "Rust 1.80 shipped LazyCell.",
                    "results": [hit("Rust Blog", "https://blog.rust-lang.org")],
                    "response_time": 0.1
                })
                .to_string(),
            )
            .create_async()
            .await;

        let tool = WebSearchTool::new(SearchClient::new(
            Some("tvly-test".to_string()),
            server.url(),
        ));
        let output = tool
            .execute(
                json!({"query": "rust 1.80 release notes"}),
                ToolContext::new("ses_1", "usr_1"),
            )
            .await
            .unwrap();

        assert_eq!(output.metadata.get("success"), Some(&json!(true)));
        assert!(output.output.contains("[1]"));
        assert!(output.output.contains("[2] Rust Blog"));
    }
}
