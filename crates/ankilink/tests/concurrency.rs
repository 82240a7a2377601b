//! Tests for concurrent invocations and the response-read admission limit.

mod common;

use std::time::Duration;

use ankilink::AnkiClient;
use common::setup_mock_server;
use serde_json::json;
use tokio::task::JoinSet;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn more_invocations_than_the_limit_all_complete() {
    let limit = 5;
    let calls = limit + 10;

    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "action": "getTags", "version": 6 })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "result": ["tag"], "error": null }))
                .set_delay(Duration::from_millis(20)),
        )
        .expect(calls as u64)
        .mount(&server)
        .await;

    let client = AnkiClient::builder()
        .host("http://127.0.0.1")
        .port(server.address().port())
        .concurrency_limit(limit)
        .build();

    let mut tasks = JoinSet::new();
    for _ in 0..calls {
        let client = client.clone();
        tasks.spawn(async move { client.call("getTags").await });
    }

    let mut completed = 0;
    while let Some(joined) = tasks.join_next().await {
        let result = joined.unwrap().unwrap();
        assert_eq!(result, json!(["tag"]));
        completed += 1;
    }
    assert_eq!(completed, calls);
}

#[tokio::test]
async fn concurrent_invocations_are_independent() {
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "action": "findCards" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "result": [1, 2], "error": null })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "action": "deckNames" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "result": ["Default"], "error": null })),
        )
        .mount(&server)
        .await;

    let client = AnkiClient::builder()
        .host("http://127.0.0.1")
        .port(server.address().port())
        .build();

    let (cards, decks) = tokio::join!(client.call("findCards"), client.call("deckNames"));

    assert_eq!(cards.unwrap(), json!([1, 2]));
    assert_eq!(decks.unwrap(), json!(["Default"]));
}
