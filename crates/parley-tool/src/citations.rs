use serde::{Deserialize, Serialize};

use crate::websearch::SearchResult;

const SNIPPET_MAX_CHARS: usize = 300;

/// One numbered entry in the source list the model cites against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub number: usize,
    pub query: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub snippet: String,
}

/// Citation numbering is positional, never time-based: walk non-error
/// results in query order, numbering each answer summary (when present)
/// and then each hit, sequentially from 1. This exact numbering is the
/// contract the tool description gives the model for `[n]` citations, and
/// what UI consumers use to resolve a citation back to its source.
#[derive(Debug, Clone, Default)]
pub struct SourceIndex {
    sources: Vec<Source>,
}

impl SourceIndex {
    pub fn from_results(results: &[SearchResult]) -> Self {
        let mut sources = Vec::new();
        let mut number = 1;

        for result in results.iter().filter(|r| r.error.is_none()) {
            if let Some(answer) = result.answer.as_deref().filter(|a| !a.trim().is_empty()) {
                sources.push(Source {
                    number,
                    query: result.query.clone(),
                    title: format!("Answer summary for \"{}\"", result.query),
                    url: None,
                    snippet: answer.to_string(),
                });
                number += 1;
            }
            for hit in &result.results {
                sources.push(Source {
                    number,
                    query: result.query.clone(),
                    title: hit.title.clone(),
                    url: Some(hit.url.clone()),
                    snippet: hit.content.clone(),
                });
                number += 1;
            }
        }

        Self { sources }
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn get(&self, number: usize) -> Option<&Source> {
        self.sources.iter().find(|s| s.number == number)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// The numbered block handed to the model.
    pub fn render(&self) -> String {
        let mut out = String::from("Sources:\n");
        for source in &self.sources {
            match &source.url {
                Some(url) => out.push_str(&format!("[{}] {} ({})\n", source.number, source.title, url)),
                None => out.push_str(&format!("[{}] {}\n", source.number, source.title)),
            }
            out.push_str(&format!("    {}\n", truncate(&source.snippet, SNIPPET_MAX_CHARS)));
        }
        out
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}
