use once_cell::sync::Lazy;
use regex::Regex;

const SHORT_UTTERANCE_MAX: usize = 100;
const LONG_UTTERANCE_MIN: usize = 150;
const CLAUSE_MIN: usize = 10;
const CLAUSE_MAX: usize = 100;
const MAX_QUERIES: usize = 3;

static PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(what|how|why|when|where|who|can you|could you|please|tell me|explain)\s+")
        .unwrap()
});

static CONJUNCTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+(and|or|but|however|also)\s+").unwrap());

/// Derive 1-3 search queries from a user utterance.
///
/// A short utterance with no question mark is already a query and passes
/// through untouched. Anything else is cleaned (interrogative/politeness
/// prefix and trailing question marks stripped) and, when the utterance
/// chains topics with conjunctions or runs long, split into per-topic
/// clauses of useful length.
pub fn generate_queries(utterance: &str) -> Vec<String> {
    let trimmed = utterance.trim();
    let lowered = trimmed.to_lowercase();

    if lowered.len() <= SHORT_UTTERANCE_MAX && !lowered.contains('?') {
        return vec![trimmed.to_string()];
    }

    let mut queries = Vec::new();
    let cleaned = clean_utterance(&lowered);
    if !cleaned.is_empty() {
        queries.push(cleaned.clone());
    }

    if lowered.contains(" and ") || lowered.contains(" or ") || lowered.len() > LONG_UTTERANCE_MIN {
        for clause in CONJUNCTION_RE.split(&cleaned) {
            let clause = clause.trim();
            if clause.len() > CLAUSE_MIN && clause.len() < CLAUSE_MAX && clause != cleaned {
                queries.push(clause.to_string());
            }
        }
    }

    if queries.is_empty() {
        queries.push(trimmed.to_string());
    }
    queries.truncate(MAX_QUERIES);
    queries
}

fn clean_utterance(lowered: &str) -> String {
    let mut rest = lowered.trim();
    while let Some(found) = PREFIX_RE.find(rest) {
        rest = &rest[found.end()..];
    }
    rest.trim().trim_end_matches('?').trim().to_string()
}
