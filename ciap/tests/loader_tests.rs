//! End-to-end loads against a local API.

mod common;

use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use ciap::normalize::DEFAULT_COACHING;
use ciap::{demo_interactions, DiscoveryError, InteractionLoader, LoadState, ResponseShape};
use common::{api_router, spawn_server, test_config};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const LONG_CONTENT: &str = "Customer asked about a duplicate charge and the agent refunded it.";

#[tokio::test]
async fn test_missing_spec_falls_back_to_demo_data() {
    // Health page answers, spec path 404s.
    let router = Router::new().route("/docs", get(|| async { "docs" }));
    let server = spawn_server(router).await;
    let loader = InteractionLoader::new(test_config(&server.base_url)).unwrap();

    let outcome = loader.load_interactions().await;

    assert!(outcome.used_fallback);
    assert_eq!(outcome.data.len(), 10);
    assert_eq!(outcome.data, demo_interactions());
    assert_eq!(outcome.source_endpoint, None);
    assert_eq!(
        loader.state_history().await,
        vec![LoadState::Idle, LoadState::AnalyzingSpec, LoadState::FallbackReady]
    );
}

#[tokio::test]
async fn test_results_shape_is_normalized() {
    let router = api_router(&["/api/v1/agents", "/api/v1/interactions", "/api/v1/calls"])
        .route("/api/v1/agents", get(|| async { Json(json!([])) }))
        .route(
            "/api/v1/interactions",
            get(|| async {
                Json(json!({"results": [{
                    "interaction_id": "X1",
                    "agent": "Pat",
                    "sentiment_start": "10",
                    "sentiment_end": 90
                }]}))
            }),
        )
        .route(
            "/api/v1/calls",
            get(|| async { Json(json!([{"call_id": "C1"}])) }),
        );
    let server = spawn_server(router).await;
    let loader = InteractionLoader::new(test_config(&server.base_url)).unwrap();

    let outcome = loader.load_interactions().await;

    assert!(!outcome.used_fallback);
    assert_eq!(outcome.final_state, LoadState::Ready);
    assert_eq!(outcome.source_endpoint.as_deref(), Some("/api/v1/interactions"));
    assert_eq!(outcome.probe_results.len(), 2);
    assert_eq!(outcome.probe_results[0].shape, ResponseShape::Results);

    assert_eq!(outcome.data.len(), 1);
    let interaction = &outcome.data[0];
    assert_eq!(interaction.id, "X1");
    assert_eq!(interaction.agent_name, "Pat");
    assert_eq!(interaction.sentiment_start, 10.0);
    assert_eq!(interaction.sentiment_end, 90.0);
    assert_eq!(interaction.negative_sentiment, 30.0);
    assert_eq!(interaction.coaching_recommendations, vec![DEFAULT_COACHING]);
    assert_eq!(interaction.date, Utc::now().date_naive());

    assert_eq!(
        loader.state_history().await,
        vec![
            LoadState::Idle,
            LoadState::AnalyzingSpec,
            LoadState::ProbingEndpoints,
            LoadState::Normalizing,
            LoadState::Ready,
        ]
    );
}

#[tokio::test]
async fn test_transcript_threshold_end_to_end() {
    let router = api_router(&["/api/v1/interactions"]).route(
        "/api/v1/interactions",
        get(|| async {
            Json(json!([
                {"id": "T1", "transcript": "hi", "content": LONG_CONTENT},
                {"id": "T2", "transcript": "hi"}
            ]))
        }),
    );
    let server = spawn_server(router).await;
    let loader = InteractionLoader::new(test_config(&server.base_url)).unwrap();

    let outcome = loader.load_interactions().await;

    assert!(!outcome.used_fallback);
    assert_eq!(outcome.data[0].transcript.as_deref(), Some(LONG_CONTENT));
    assert_eq!(outcome.data[1].transcript, None);
}

#[tokio::test]
async fn test_no_usable_endpoints_falls_back() {
    let router = api_router(&["/api/v1/interactions", "/api/v1/reports/batch"])
        .route(
            "/api/v1/interactions",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "down") }),
        )
        .route("/api/v1/reports/batch", get(|| async { Json(json!([{"id": "r"}])) }));
    let server = spawn_server(router).await;
    let loader = InteractionLoader::new(test_config(&server.base_url)).unwrap();

    let outcome = loader.load_interactions().await;

    // The batch endpoint would answer but is excluded by default.
    assert!(outcome.used_fallback);
    assert!(outcome.probe_results.is_empty());
    assert_eq!(
        loader.state_history().await,
        vec![
            LoadState::Idle,
            LoadState::AnalyzingSpec,
            LoadState::ProbingEndpoints,
            LoadState::FallbackReady,
        ]
    );
}

#[tokio::test]
async fn test_scalar_records_fall_back_after_normalizing() {
    let router = api_router(&["/api/v1/interactions"])
        .route("/api/v1/interactions", get(|| async { Json(json!([1, 2, 3])) }));
    let server = spawn_server(router).await;
    let loader = InteractionLoader::new(test_config(&server.base_url)).unwrap();

    let outcome = loader.load_interactions().await;

    assert!(outcome.used_fallback);
    assert_eq!(outcome.probe_results.len(), 1);
    assert_eq!(outcome.final_state, LoadState::FallbackReady);
    assert_eq!(
        loader.state_history().await.last(),
        Some(&LoadState::FallbackReady)
    );
}

#[tokio::test]
async fn test_failed_health_check_skips_discovery() {
    let router = Router::new()
        .route(
            "/docs",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
        )
        .route(
            "/openapi.json",
            get(|| async { Json(common::spec_document(&["/api/v1/interactions"])) }),
        )
        .route(
            "/api/v1/interactions",
            get(|| async { Json(json!([{"id": "L1", "agent_name": "Ana"}])) }),
        );
    let server = spawn_server(router).await;

    let loader = InteractionLoader::new(test_config(&server.base_url)).unwrap();
    assert!(!loader.check_health().await);
    assert!(loader.load_interactions().await.used_fallback);

    let loader =
        InteractionLoader::new(test_config(&server.base_url).with_health_check(false)).unwrap();
    let outcome = loader.load_interactions().await;
    assert!(!outcome.used_fallback);
    assert_eq!(outcome.data[0].agent_name, "Ana");
}

#[tokio::test]
async fn test_stalled_endpoint_is_skipped() {
    let router = api_router(&["/api/v1/stalled", "/api/v1/interactions"])
        .route(
            "/api/v1/stalled",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!([{"id": "S1"}]))
            }),
        )
        .route(
            "/api/v1/interactions",
            get(|| async { Json(json!([{"id": "F1"}])) }),
        );
    let server = spawn_server(router).await;
    let config = test_config(&server.base_url).with_timeout_secs(1);
    let loader = InteractionLoader::new(config).unwrap();

    let started = Instant::now();
    let outcome = loader.load_interactions().await;

    assert!(!outcome.used_fallback);
    assert_eq!(outcome.probe_results.len(), 1);
    assert_eq!(outcome.data[0].id, "F1");
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn test_spec_analysis_is_cached_until_cleared() {
    let hits = Arc::new(AtomicUsize::new(0));
    let spec = common::spec_document(&["/api/v1/interactions"]);
    let counter = Arc::clone(&hits);
    let router = Router::new()
        .route("/docs", get(|| async { "docs" }))
        .route(
            "/openapi.json",
            get(move || {
                let counter = Arc::clone(&counter);
                let spec = spec.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Json(spec)
                }
            }),
        )
        .route(
            "/api/v1/interactions",
            get(|| async { Json(json!([{"id": "A"}])) }),
        );
    let server = spawn_server(router).await;
    let loader = InteractionLoader::new(test_config(&server.base_url)).unwrap();

    loader.load_interactions().await;
    loader.load_interactions().await;
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    loader.clear_spec_cache().await;
    let outcome = loader.load_interactions().await;
    assert_eq!(hits.load(Ordering::SeqCst), 2);
    assert!(!outcome.used_fallback);
}

#[tokio::test]
async fn test_fetch_interaction_by_id() {
    let router = api_router(&["/api/v1/interactions", "/api/v1/interactions/{interaction_id}"])
        .route(
            "/api/v1/interactions/:interaction_id",
            get(|Path(id): Path<String>| async move {
                Json(json!({"data": {"interaction_id": id, "agent_name": "Kim"}}))
            }),
        );
    let server = spawn_server(router).await;
    let loader = InteractionLoader::new(test_config(&server.base_url)).unwrap();

    let interaction = loader.fetch_interaction_by_id("A 1").await.unwrap();
    assert_eq!(interaction.id, "A 1");
    assert_eq!(interaction.agent_name, "Kim");
}

#[tokio::test]
async fn test_fetch_by_id_without_template() {
    let server = spawn_server(api_router(&["/api/v1/interactions"])).await;
    let loader = InteractionLoader::new(test_config(&server.base_url)).unwrap();

    let err = loader.fetch_interaction_by_id("A1").await.unwrap_err();
    assert!(matches!(err, DiscoveryError::EndpointNotFound(_)));
}
