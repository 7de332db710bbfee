//! Interaction loading.
//!
//! Sequences spec analysis, endpoint probing and normalization, and falls back
//! to a static dataset whenever the live API cannot supply records. A load never
//! fails: the worst outcome is the fallback dataset flagged as such.

use crate::config::DiscoveryConfig;
use crate::discovery::endpoint_prober::{first_record, locate_records};
use crate::discovery::{
    ApiDiagnostics, ApiDocumentation, AuthCheck, DiagnosticResult, EndpointProbeResult,
    EndpointProber, FieldMapping, RawRecord, SpecAnalysisCache, SpecFetcher,
};
use crate::error::{DiscoveryError, DiscoveryResult};
use crate::http::{ApiClient, HTML_ACCEPT};
use crate::interaction::{demo_interactions, Interaction};
use crate::normalize::{normalize_records, ResponseNormalizer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Placeholders substituted when looking up one interaction.
const ID_PLACEHOLDERS: &[&str] = &["{id}", "{interaction_id}", "{report_id}", "{uuid}"];

/// Stages of one load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadState {
    Idle,
    AnalyzingSpec,
    ProbingEndpoints,
    Normalizing,
    Ready,
    FallbackReady,
}

impl LoadState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadState::Idle => "idle",
            LoadState::AnalyzingSpec => "analyzing-spec",
            LoadState::ProbingEndpoints => "probing-endpoints",
            LoadState::Normalizing => "normalizing",
            LoadState::Ready => "ready",
            LoadState::FallbackReady => "fallback-ready",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LoadState::Ready | LoadState::FallbackReady)
    }
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Result of [`InteractionLoader::load_interactions`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadOutcome {
    pub data: Vec<Interaction>,
    pub used_fallback: bool,
    /// Endpoint the records came from; `None` on fallback
    pub source_endpoint: Option<String>,
    pub probe_results: Vec<EndpointProbeResult>,
    pub final_state: LoadState,
}

/// State trail of a single load.
struct Trail {
    states: Vec<LoadState>,
}

impl Trail {
    fn new() -> Self {
        Self {
            states: vec![LoadState::Idle],
        }
    }

    fn enter(&mut self, state: LoadState) {
        if let Some(previous) = self.states.last() {
            tracing::debug!("Load state {} -> {}", previous, state);
        }
        self.states.push(state);
    }
}

/// Loads interactions from the remote API, or the fallback dataset.
///
/// The spec analysis is cached across loads until [`clear_spec_cache`] is
/// called; probe results and field mappings are recomputed on every load.
///
/// [`clear_spec_cache`]: InteractionLoader::clear_spec_cache
pub struct InteractionLoader {
    config: DiscoveryConfig,
    client: ApiClient,
    cache: SpecAnalysisCache,
    fallback: Vec<Interaction>,
    history: Mutex<Vec<LoadState>>,
}

impl InteractionLoader {
    pub fn new(config: DiscoveryConfig) -> DiscoveryResult<Self> {
        let client = ApiClient::new(&config)?;
        Ok(Self {
            config,
            client,
            cache: SpecAnalysisCache::new(),
            fallback: demo_interactions(),
            history: Mutex::new(Vec::new()),
        })
    }

    /// Replace the demo dataset with one supplied by the host.
    pub fn with_fallback_data(mut self, data: Vec<Interaction>) -> Self {
        self.fallback = data;
        self
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    pub fn fallback_data(&self) -> &[Interaction] {
        &self.fallback
    }

    /// States visited by the most recent load, starting at `Idle`.
    pub async fn state_history(&self) -> Vec<LoadState> {
        self.history.lock().await.clone()
    }

    pub async fn clear_spec_cache(&self) {
        self.cache.invalidate().await;
    }

    /// True when the health path answers with a 2xx status.
    pub async fn check_health(&self) -> bool {
        self.client
            .is_reachable(
                &self.config.health_path,
                HTML_ACCEPT,
                self.config.request_timeout(),
            )
            .await
    }

    /// Cached spec analysis, computing it on first use.
    pub async fn analysis(&self) -> DiscoveryResult<Arc<ApiDocumentation>> {
        let fetcher = SpecFetcher::new(self.client.clone(), self.config.clone());
        self.cache.get_or_compute(|| fetcher.analyze()).await
    }

    pub async fn load_interactions(&self) -> LoadOutcome {
        let mut trail = Trail::new();
        trail.enter(LoadState::AnalyzingSpec);

        if self.config.health_check && !self.check_health().await {
            tracing::warn!(
                "API at {} failed its health check, using fallback data",
                self.client.base_url()
            );
            return self.finish_with_fallback(trail, Vec::new()).await;
        }

        let doc = match self.analysis().await {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!("{}, using fallback data", e);
                return self.finish_with_fallback(trail, Vec::new()).await;
            }
        };

        trail.enter(LoadState::ProbingEndpoints);
        let candidates = doc.probe_candidates(&self.config.excluded_endpoints);
        let probe_results = EndpointProber::new(self.client.clone(), self.config.request_timeout())
            .with_concurrency(self.config.concurrent_probes)
            .probe_all(&candidates)
            .await;
        if probe_results.is_empty() {
            tracing::warn!("{}, using fallback data", DiscoveryError::NoUsableEndpoints);
            return self.finish_with_fallback(trail, probe_results).await;
        }

        trail.enter(LoadState::Normalizing);
        let mut loaded = None;
        for probe in &probe_results {
            match self.fetch_endpoint(&probe.endpoint, &doc.field_mapping).await {
                Ok(data) if !data.is_empty() => {
                    loaded = Some((probe.endpoint.clone(), data));
                    break;
                }
                Ok(_) => tracing::debug!("{} yielded no normalizable records", probe.endpoint),
                Err(e) => tracing::debug!("Could not load {}: {}", probe.endpoint, e),
            }
        }

        match loaded {
            Some((endpoint, data)) => {
                tracing::info!("Loaded {} interaction(s) from {}", data.len(), endpoint);
                trail.enter(LoadState::Ready);
                self.record_history(trail).await;
                LoadOutcome {
                    data,
                    used_fallback: false,
                    source_endpoint: Some(endpoint),
                    probe_results,
                    final_state: LoadState::Ready,
                }
            }
            None => {
                tracing::warn!("{}, using fallback data", DiscoveryError::NoInteractionData);
                self.finish_with_fallback(trail, probe_results).await
            }
        }
    }

    async fn fetch_endpoint(
        &self,
        path: &str,
        fallback_mapping: &FieldMapping,
    ) -> DiscoveryResult<Vec<Interaction>> {
        let body = self
            .client
            .get_json(path, self.config.request_timeout())
            .await?;
        let records = locate_records(&body)
            .map(|(_, records)| records)
            .unwrap_or_default();
        Ok(normalize_records(records, fallback_mapping))
    }

    async fn finish_with_fallback(
        &self,
        mut trail: Trail,
        probe_results: Vec<EndpointProbeResult>,
    ) -> LoadOutcome {
        trail.enter(LoadState::FallbackReady);
        self.record_history(trail).await;
        LoadOutcome {
            data: self.fallback.clone(),
            used_fallback: true,
            source_endpoint: None,
            probe_results,
            final_state: LoadState::FallbackReady,
        }
    }

    async fn record_history(&self, trail: Trail) {
        *self.history.lock().await = trail.states;
    }

    /// Fetch and normalize one interaction through the spec's by-id path.
    ///
    /// Unlike a load, errors propagate to the caller.
    pub async fn fetch_interaction_by_id(&self, id: &str) -> DiscoveryResult<Interaction> {
        let doc = self.analysis().await?;
        let template = doc.interaction_by_id_path().ok_or_else(|| {
            DiscoveryError::EndpointNotFound("no interaction path takes an identifier".to_string())
        })?;
        let path = substitute_id(template, id);
        tracing::debug!("Fetching interaction {} from {}", id, path);

        let body = self
            .client
            .get_json(&path, self.config.request_timeout())
            .await?;
        let record = single_record(&body).ok_or(DiscoveryError::NoInteractionData)?;
        Ok(ResponseNormalizer::new(FieldMapping::from_sample(record)).normalize(record))
    }

    pub async fn run_diagnostics(&self) -> Vec<DiagnosticResult> {
        self.diagnostics().run_diagnostics().await
    }

    pub async fn check_auth_requirements(&self) -> AuthCheck {
        self.diagnostics().check_auth_requirements().await
    }

    fn diagnostics(&self) -> ApiDiagnostics {
        ApiDiagnostics::new(self.client.clone(), self.config.clone())
    }
}

/// The record in a by-id response: a bare object, an object under `data`, or
/// the first element of a collection.
fn single_record(body: &Value) -> Option<&RawRecord> {
    match body.get("data") {
        Some(Value::Object(inner)) => Some(inner),
        _ => first_record(body).and_then(Value::as_object),
    }
}

/// Fill every known id placeholder in `template` with the URL-encoded `id`.
pub fn substitute_id(template: &str, id: &str) -> String {
    let encoded = urlencoding::encode(id);
    ID_PLACEHOLDERS
        .iter()
        .fold(template.to_string(), |path, placeholder| {
            path.replace(placeholder, &encoded)
        })
}
