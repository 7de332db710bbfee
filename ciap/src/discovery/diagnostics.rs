//! Endpoint diagnostics.
//!
//! Unlike probing, diagnostics keep every outcome (status, latency, headers
//! and a body preview) so an operator can see why an endpoint is not usable.

use crate::config::DiscoveryConfig;
use crate::discovery::endpoint_prober::is_parameterized;
use crate::discovery::spec_fetcher::SpecFetcher;
use crate::http::{ApiClient, HTML_ACCEPT, JSON_ACCEPT};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Instant;

/// Body preview length for non-JSON responses.
pub const BODY_PREVIEW_CHARS: usize = 200;

const INTERACTIONS_PATH: &str = "/api/v1/interactions";

/// Outcome of one diagnostic request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticResult {
    pub endpoint: String,
    pub status: Option<u16>,
    pub success: bool,
    pub error: Option<String>,
    pub response_time_ms: u64,
    pub headers: BTreeMap<String, String>,
    pub data: Option<Value>,
}

/// Authentication hints derived from the interactions endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthCheck {
    pub reachable: bool,
    pub auth_required: bool,
    pub suggestions: Vec<String>,
}

pub struct ApiDiagnostics {
    client: ApiClient,
    config: DiscoveryConfig,
}

impl ApiDiagnostics {
    pub fn new(client: ApiClient, config: DiscoveryConfig) -> Self {
        Self { client, config }
    }

    /// Endpoints worth diagnosing: spec paths minus placeholders and exclusions,
    /// or a fixed trio when the spec lists nothing usable.
    pub async fn diagnostic_targets(&self) -> Vec<String> {
        let fetcher = SpecFetcher::new(self.client.clone(), self.config.clone());
        let listed: Vec<String> = match fetcher.fetch_spec().await {
            Ok(spec) => spec
                .get("paths")
                .and_then(Value::as_object)
                .map(|paths| paths.keys().cloned().collect())
                .unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Could not fetch API spec for diagnostics: {}", e);
                Vec::new()
            }
        };

        let targets: Vec<String> = listed
            .into_iter()
            .filter(|path| !is_parameterized(path) && !self.config.is_excluded(path))
            .collect();

        if targets.is_empty() {
            vec![
                self.config.health_path.clone(),
                self.config.spec_path.clone(),
                INTERACTIONS_PATH.to_string(),
            ]
        } else {
            targets
        }
    }

    pub async fn run_diagnostics(&self) -> Vec<DiagnosticResult> {
        let targets = self.diagnostic_targets().await;
        let mut results = Vec::with_capacity(targets.len());
        for endpoint in targets {
            results.push(self.diagnose(&endpoint).await);
        }
        results
    }

    /// Request one endpoint and record whatever happened.
    pub async fn diagnose(&self, endpoint: &str) -> DiagnosticResult {
        let accept = if endpoint == self.config.health_path {
            HTML_ACCEPT
        } else {
            JSON_ACCEPT
        };
        let started = Instant::now();

        match self
            .client
            .get_raw(endpoint, accept, self.config.request_timeout())
            .await
        {
            Ok(resp) => DiagnosticResult {
                endpoint: endpoint.to_string(),
                status: Some(resp.status),
                success: resp.success && resp.body_error.is_none(),
                error: if resp.success {
                    resp.body_error
                } else {
                    Some(format!("HTTP {} {}", resp.status, resp.status_text).trim_end().to_string())
                },
                response_time_ms: resp.elapsed.as_millis() as u64,
                headers: resp.headers,
                data: body_preview(&resp.body),
            },
            Err(e) => DiagnosticResult {
                endpoint: endpoint.to_string(),
                status: None,
                success: false,
                error: Some(e.to_string()),
                response_time_ms: started.elapsed().as_millis() as u64,
                headers: BTreeMap::new(),
                data: None,
            },
        }
    }

    /// Check whether the interactions endpoint demands credentials.
    pub async fn check_auth_requirements(&self) -> AuthCheck {
        let mut suggestions = Vec::new();
        let (reachable, auth_required) = match self
            .client
            .get_raw(INTERACTIONS_PATH, JSON_ACCEPT, self.config.request_timeout())
            .await
        {
            Ok(resp) => (true, resp.status == 401 || resp.status == 403),
            Err(e) => {
                suggestions.push(format!("API is unreachable: {}", e));
                (false, false)
            }
        };

        if auth_required {
            suggestions.push(
                "API requires authentication - check if API keys or tokens are needed".to_string(),
            );
        }

        AuthCheck {
            reachable,
            auth_required,
            suggestions,
        }
    }
}

/// Parsed JSON, or the first [`BODY_PREVIEW_CHARS`] characters of anything else.
pub fn body_preview(body: &str) -> Option<Value> {
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str(body) {
        Ok(json) => Some(json),
        Err(_) => Some(Value::String(body.chars().take(BODY_PREVIEW_CHARS).collect())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_body_preview() {
        assert_eq!(body_preview(""), None);
        assert_eq!(body_preview("{\"ok\":true}"), Some(json!({"ok": true})));
        let html = "<html>".repeat(100);
        let preview = body_preview(&html).unwrap();
        assert_eq!(preview.as_str().unwrap().chars().count(), BODY_PREVIEW_CHARS);
    }
}
