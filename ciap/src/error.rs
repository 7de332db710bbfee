//! Error types for discovery and loading.
//!
//! Only `SpecUnavailable` and `NoUsableEndpoints` ever reach the loader during a
//! dashboard load, and the loader turns both into the fallback path. The other
//! variants surface from explicit calls (lookup by id, diagnostics, config).

use thiserror::Error;

/// Error type for the discovery pipeline.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("API specification unavailable: {0}")]
    SpecUnavailable(String),
    #[error("Endpoint probe failed for {endpoint}: {reason}")]
    EndpointProbeFailure { endpoint: String, reason: String },
    #[error("No usable data endpoints found")]
    NoUsableEndpoints,
    #[error("No endpoint returned interaction data")]
    NoInteractionData,
    #[error("Endpoint not found: {0}")]
    EndpointNotFound(String),
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

impl From<reqwest::Error> for DiscoveryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            DiscoveryError::Http(format!("request timed out: {}", e))
        } else {
            DiscoveryError::Http(e.to_string())
        }
    }
}

impl From<serde_json::Error> for DiscoveryError {
    fn from(e: serde_json::Error) -> Self {
        DiscoveryError::Http(format!("invalid JSON body: {}", e))
    }
}

impl From<toml::de::Error> for DiscoveryError {
    fn from(e: toml::de::Error) -> Self {
        DiscoveryError::Config(e.to_string())
    }
}

impl From<std::io::Error> for DiscoveryError {
    fn from(e: std::io::Error) -> Self {
        DiscoveryError::Config(e.to_string())
    }
}

impl From<url::ParseError> for DiscoveryError {
    fn from(e: url::ParseError) -> Self {
        DiscoveryError::Config(format!("invalid URL: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = DiscoveryError::EndpointProbeFailure {
            endpoint: "/api/v1/calls".to_string(),
            reason: "HTTP 500".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Endpoint probe failed for /api/v1/calls: HTTP 500"
        );
        assert_eq!(
            DiscoveryError::NoUsableEndpoints.to_string(),
            "No usable data endpoints found"
        );
    }

    #[test]
    fn test_toml_error_maps_to_config() {
        let err: DiscoveryError = toml::from_str::<toml::Value>("= nope")
            .unwrap_err()
            .into();
        assert!(matches!(err, DiscoveryError::Config(_)));
    }
}
