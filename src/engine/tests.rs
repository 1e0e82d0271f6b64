//! Tests for the extraction engine

use super::*;
use crate::catalog::{EntityDescriptor, Schema};
use crate::error::Error;
use crate::http::HttpClientConfig;
use crate::pagination::Pagination;
use crate::sink::MemorySink;
use crate::types::{BackoffType, FieldType};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn engine(server_uri: &str, state: StateStore, sink: Arc<MemorySink>) -> ExtractionEngine {
    let config = HttpClientConfig::builder()
        .base_url(server_uri)
        .max_retries(0)
        .backoff(
            BackoffType::Constant,
            Duration::from_millis(1),
            Duration::from_millis(1),
        )
        .no_rate_limit()
        .build();

    let mut path_params = StringMap::new();
    path_params.insert("account_id".to_string(), "1".to_string());

    ExtractionEngine::new(
        Arc::new(HttpClient::with_config(config)),
        state,
        sink,
        path_params,
    )
}

fn runs_entity() -> EntityDescriptor {
    EntityDescriptor::new("runs", "/accounts/{account_id}/runs")
        .with_page_size(100)
        .with_pagination(Pagination::offset_limit(100))
        .with_param("order_by", "finished_at")
        .with_schema(Schema::from_fields([
            ("id", FieldType::Integer),
            ("status", FieldType::Integer),
        ]))
}

fn accounts_entity() -> EntityDescriptor {
    EntityDescriptor::new("accounts", "/accounts/{account_id}").with_schema(Schema::from_fields([
        ("id", FieldType::Integer),
        ("name", FieldType::String),
    ]))
}

fn page_body(start: u64, count: u64) -> serde_json::Value {
    let records: Vec<_> = (start..start + count).map(|i| json!({"id": i})).collect();
    json!({ "data": records, "extra": { "pagination": { "count": count } } })
}

async fn mount_page(server: &MockServer, offset: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/accounts/1/runs"))
        .and(query_param("offset", offset))
        .and(query_param("limit", "100"))
        .and(query_param("order_by", "finished_at"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

// The concrete offset-limit scenario: 100 records, then 37, then an empty
// page. Exactly 3 requests, 137 records emitted once each, in page order.
#[tokio::test]
async fn test_offset_extraction_to_completion() {
    let server = MockServer::start().await;
    mount_page(&server, "0", page_body(0, 100)).await;
    mount_page(&server, "100", page_body(100, 37)).await;
    mount_page(&server, "200", page_body(0, 0)).await;

    let sink = Arc::new(MemorySink::new());
    let engine = engine(&server.uri(), StateStore::in_memory(), Arc::clone(&sink));

    let stats = engine.extract(&runs_entity()).await.unwrap();
    assert_eq!(stats.pages, 3);
    assert_eq!(stats.records, 137);

    let records = sink.records_for("runs").await;
    assert_eq!(records.len(), 137);
    // Emitted exactly once each, in page order
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record["id"], json!(i as u64));
    }

    // Completion clears the resume token
    assert!(engine.state().get_token("runs").await.is_none());
}

#[tokio::test]
async fn test_unpaginated_entity_one_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "id": 1, "name": "acme", "plan": "enterprise" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let sink = Arc::new(MemorySink::new());
    let engine = engine(&server.uri(), StateStore::in_memory(), Arc::clone(&sink));

    let stats = engine.extract(&accounts_entity()).await.unwrap();
    assert_eq!(stats.pages, 1);
    assert_eq!(stats.records, 1);

    let records = sink.records_for("accounts").await;
    assert_eq!(records[0]["name"], json!("acme"));
    // Undeclared field dropped by root-only conformance
    assert!(!records[0].contains_key("plan"));
}

// Resuming from a checkpointed token never re-emits already-checkpointed
// pages and never skips the page that was in flight.
#[tokio::test]
async fn test_resume_from_checkpoint() {
    let server = MockServer::start().await;
    mount_page(&server, "100", page_body(100, 37)).await;
    mount_page(&server, "200", page_body(0, 0)).await;

    let state = StateStore::in_memory();
    state
        .set_token("runs", Some(crate::pagination::PageToken::Offset(100)))
        .await
        .unwrap();

    let sink = Arc::new(MemorySink::new());
    let engine = engine(&server.uri(), state, Arc::clone(&sink));

    let stats = engine.extract(&runs_entity()).await.unwrap();
    assert_eq!(stats.pages, 2);
    assert_eq!(stats.records, 37);

    let records = sink.records_for("runs").await;
    assert_eq!(records[0]["id"], json!(100));
    assert_eq!(records[36]["id"], json!(136));
}

// A failure on page 2 leaves page 1 fully emitted and its successor token
// checkpointed: re-extraction after a crash repeats at most one page.
#[tokio::test]
async fn test_checkpoint_after_every_page() {
    let server = MockServer::start().await;
    mount_page(&server, "0", page_body(0, 100)).await;

    Mock::given(method("GET"))
        .and(path("/accounts/1/runs"))
        .and(query_param("offset", "100"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let sink = Arc::new(MemorySink::new());
    let engine = engine(&server.uri(), StateStore::in_memory(), Arc::clone(&sink));

    let err = engine.extract(&runs_entity()).await.unwrap_err();
    assert!(matches!(err, Error::TransientFetch { .. }));

    // Page 1 was emitted, then checkpointed
    assert_eq!(sink.records_for("runs").await.len(), 100);
    assert_eq!(
        engine.state().get_token("runs").await,
        Some(crate::pagination::PageToken::Offset(100))
    );
}

#[tokio::test]
async fn test_malformed_response_checkpoints_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts/1/runs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .mount(&server)
        .await;

    let sink = Arc::new(MemorySink::new());
    let engine = engine(&server.uri(), StateStore::in_memory(), Arc::clone(&sink));

    let err = engine.extract(&runs_entity()).await.unwrap_err();
    assert!(matches!(err, Error::MalformedResponse { .. }));

    assert!(sink.records_for("runs").await.is_empty());
    assert!(engine.state().get_token("runs").await.is_none());
}

// A non-retriable rejection on one entity aborts only that entity; a
// sibling extracting concurrently still completes.
#[tokio::test]
async fn test_entity_failures_are_isolated() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts/1/jobs"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/accounts/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "id": 1, "name": "acme" }
        })))
        .mount(&server)
        .await;

    let jobs = EntityDescriptor::new("jobs", "/accounts/{account_id}/jobs")
        .with_schema(Schema::from_fields([("id", FieldType::Integer)]));

    let sink = Arc::new(MemorySink::new());
    let engine = engine(&server.uri(), StateStore::in_memory(), Arc::clone(&sink));

    let summary = engine
        .extract_all(&[accounts_entity(), jobs])
        .await;

    assert!(!summary.is_success());
    assert_eq!(summary.records_total(), 1);
    assert!(summary.stats_for("accounts").is_some());

    let failure = summary.failure_for("jobs").unwrap();
    assert!(matches!(
        failure.error,
        Error::RequestRejected { status: 401, .. }
    ));
    assert!(failure.last_token.is_none());
    assert_eq!(failure.attempts, 1);
}

#[tokio::test]
async fn test_post_process_hook_filters_records() {
    let server = MockServer::start().await;
    mount_page(&server, "0", page_body(0, 4)).await;
    mount_page(&server, "100", page_body(0, 0)).await;

    let entity = runs_entity().with_post_process(crate::projector::RecordHook::new(|record| {
        // Keep even ids only
        let even = record["id"].as_u64().is_some_and(|id| id % 2 == 0);
        even.then_some(record)
    }));

    let sink = Arc::new(MemorySink::new());
    let engine = engine(&server.uri(), StateStore::in_memory(), Arc::clone(&sink));

    let stats = engine.extract(&entity).await.unwrap();
    // Two records dropped silently; pagination still advanced on the raw
    // four-record page, so the empty page was probed at offset 100
    assert_eq!(stats.records, 2);
    assert_eq!(stats.pages, 2);
}
