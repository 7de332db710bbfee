use crate::error::{DiscoveryError, DiscoveryResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding `base_url`.
pub const BASE_URL_ENV: &str = "CIAP_BASE_URL";
/// Environment variable overriding `request_timeout_secs`.
pub const TIMEOUT_ENV: &str = "CIAP_TIMEOUT_SECS";

/// Endpoints that are listed in the remote spec but are known to reject plain GETs.
pub const DEFAULT_EXCLUDED_ENDPOINTS: &[&str] = &[
    "/api/v1/reports/batch",
    "/api/v1/interactions/search",
    "/api/v1/dsr/requests",
];

/// Configuration for spec discovery, endpoint probing and loading
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Base URL of the remote interaction API
    pub base_url: String,
    /// Path of the machine-readable API description
    pub spec_path: String,
    /// Path used for the availability check
    pub health_path: String,
    /// Timeout for probe and data requests, in seconds
    pub request_timeout_secs: u64,
    /// Timeout for the spec request, in seconds
    pub spec_timeout_secs: u64,
    /// Paths never probed even when the spec lists them
    pub excluded_endpoints: Vec<String>,
    /// How many interaction endpoints are sampled to refine the field mapping
    pub max_sample_endpoints: usize,
    /// Issue probes concurrently instead of one after another
    pub concurrent_probes: bool,
    /// Run the availability check before fetching the spec
    pub health_check: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            spec_path: "/openapi.json".to_string(),
            health_path: "/docs".to_string(),
            request_timeout_secs: 10,
            spec_timeout_secs: 15,
            excluded_endpoints: DEFAULT_EXCLUDED_ENDPOINTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_sample_endpoints: 3,
            concurrent_probes: false,
            health_check: true,
        }
    }
}

impl DiscoveryConfig {
    /// Config pointing at `base_url` with every other setting at its default.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn from_toml_str(content: &str) -> DiscoveryResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> DiscoveryResult<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            DiscoveryError::Config(format!(
                "Failed to read config {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Apply `CIAP_BASE_URL` / `CIAP_TIMEOUT_SECS` on top of the current values.
    pub fn with_env_overrides(mut self) -> DiscoveryResult<Self> {
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                self.base_url = url.trim().to_string();
            }
        }
        if let Ok(secs) = std::env::var(TIMEOUT_ENV) {
            self.request_timeout_secs = secs.trim().parse().map_err(|_| {
                DiscoveryError::Config(format!("{} must be an integer, got '{}'", TIMEOUT_ENV, secs))
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    pub fn with_health_check(mut self, enabled: bool) -> Self {
        self.health_check = enabled;
        self
    }

    pub fn with_concurrent_probes(mut self, enabled: bool) -> Self {
        self.concurrent_probes = enabled;
        self
    }

    pub fn with_excluded_endpoints<I, T>(mut self, endpoints: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.excluded_endpoints = endpoints.into_iter().map(|e| e.into()).collect();
        self
    }

    pub fn validate(&self) -> DiscoveryResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(DiscoveryError::Config("base_url must not be empty".to_string()));
        }
        let parsed = url::Url::parse(&self.base_url)?;
        if parsed.cannot_be_a_base() {
            return Err(DiscoveryError::Config(format!(
                "base_url '{}' cannot be used as a base",
                self.base_url
            )));
        }
        if self.request_timeout_secs == 0 || self.spec_timeout_secs == 0 {
            return Err(DiscoveryError::Config(
                "timeouts must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn spec_timeout(&self) -> Duration {
        Duration::from_secs(self.spec_timeout_secs)
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded_endpoints.iter().any(|e| e == path)
    }
}
