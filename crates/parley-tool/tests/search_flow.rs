use mockito::Matcher;
use parley_tool::{generate_queries, SearchClient, SearchOptions, SourceIndex};
use serde_json::json;

fn success_body(query: &str, titles: &[&str]) -> String {
    let results: Vec<_> = titles
        .iter()
        .map(|t| {
            json!({
                "title": t,
                "url": format!("https://example.com/{}", t),
                "content": format!("about {}", t),
                "score": 0.7
            })
        })
        .collect();
    json!({"query": query, "results": results, "response_time": 0.2}).to_string()
}

/// The full multi-query flow: a compound question fans out into three
/// concurrent searches; one transport failure stays isolated to its slot
/// and citation numbering covers only the surviving queries' hits.
#[tokio::test]
async fn compound_question_fans_out_and_isolates_failures() {
    let utterance = "What are the health benefits of green tea and fermented oolong tea \
                     and cold brew coffee and fresh orange juice?";
    let queries = generate_queries(utterance);
    assert_eq!(queries.len(), 3);
    assert!(queries.iter().all(|q| !q.is_empty()));

    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/search")
        .match_body(Matcher::PartialJson(json!({"query": queries[0]})))
        .with_status(200)
        .with_body(success_body(&queries[0], &["overview-a", "overview-b"]))
        .create_async()
        .await;
    server
        .mock("POST", "/search")
        .match_body(Matcher::PartialJson(json!({"query": queries[1]})))
        .with_status(502)
        .create_async()
        .await;
    server
        .mock("POST", "/search")
        .match_body(Matcher::PartialJson(json!({"query": queries[2]})))
        .with_status(200)
        .with_body(success_body(&queries[2], &["coffee-study"]))
        .create_async()
        .await;

    let client = SearchClient::new(Some("tvly-test".to_string()), server.url());
    let results = client.search(&queries, &SearchOptions::default()).await;

    // One result per query, in query order, exactly one error-tagged.
    assert_eq!(results.len(), 3);
    assert_eq!(results.iter().filter(|r| r.error.is_some()).count(), 1);
    assert!(results[1].error.is_some());
    for (result, query) in results.iter().zip(&queries) {
        assert_eq!(&result.query, query);
    }

    // Citations: strictly increasing from 1, failed query contributes
    // nothing, everything else in concatenation order.
    let index = SourceIndex::from_results(&results);
    assert_eq!(index.len(), 3);
    let numbers: Vec<usize> = index.sources().iter().map(|s| s.number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert_eq!(index.get(1).unwrap().title, "overview-a");
    assert_eq!(index.get(3).unwrap().title, "coffee-study");
    assert_eq!(index.get(3).unwrap().query, queries[2]);
}

#[tokio::test]
async fn short_query_passes_through_untouched_and_searches_once() {
    let queries = generate_queries("rust 1.80 changelog");
    assert_eq!(queries, vec!["rust 1.80 changelog".to_string()]);

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/search")
        .with_status(200)
        .with_body(success_body("rust 1.80 changelog", &["release-notes"]))
        .expect(1)
        .create_async()
        .await;

    let client = SearchClient::new(Some("tvly-test".to_string()), server.url());
    let results = client.search(&queries, &SearchOptions::default()).await;

    mock.assert_async().await;
    assert_eq!(results.len(), 1);
    assert!(results[0].error.is_none());
}
