#![allow(dead_code)]

use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use ciap::config::DiscoveryConfig;
use serde_json::{json, Map, Value};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::time::sleep;

/// Local API server that stops when dropped.
pub struct TestServer {
    pub base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn spawn_server(router: Router) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().expect("Failed to get server address");
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .expect("Test server failed");
    });

    sleep(Duration::from_millis(50)).await;
    TestServer {
        base_url: format!("http://{}", addr),
        shutdown: Some(shutdown_tx),
    }
}

/// OpenAPI-style document listing a GET operation for each path.
pub fn spec_document(paths: &[&str]) -> Value {
    let mut listed = Map::new();
    for path in paths {
        listed.insert(
            path.to_string(),
            json!({"get": {"summary": format!("GET {}", path)}}),
        );
    }
    json!({
        "info": {"title": "Test Interaction API", "version": "1.0"},
        "paths": listed
    })
}

/// Router serving an HTML health page and the given spec.
pub fn api_router(paths: &[&str]) -> Router {
    let spec = spec_document(paths);
    Router::new()
        .route("/docs", get(|| async { Html("<html><body>docs</body></html>") }))
        .route("/openapi.json", get(move || async move { Json(spec) }))
}

pub fn test_config(base_url: &str) -> DiscoveryConfig {
    DiscoveryConfig::new(base_url).with_timeout_secs(2)
}
