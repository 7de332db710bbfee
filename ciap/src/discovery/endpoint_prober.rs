//! Endpoint probing.
//!
//! Calls each candidate endpoint once with a bounded timeout, works out where
//! the record collection sits in the response body, and keeps the endpoints
//! that yielded at least one record. Failures are logged and dropped; they
//! never abort the remaining probes.

use crate::error::DiscoveryError;
use crate::http::ApiClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Where the record collection was found in a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseShape {
    /// Bare JSON array
    Array,
    /// `{ "data": [...] }`
    Paginated,
    /// `{ "items": [...] }`
    Items,
    /// `{ "results": [...] }`
    Results,
    /// Any other non-null object, treated as a single record
    Object,
}

impl ResponseShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseShape::Array => "array",
            ResponseShape::Paginated => "paginated",
            ResponseShape::Items => "items",
            ResponseShape::Results => "results",
            ResponseShape::Object => "object",
        }
    }
}

impl std::fmt::Display for ResponseShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// An endpoint that answered with usable records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointProbeResult {
    pub endpoint: String,
    pub shape: ResponseShape,
    pub record_count: usize,
}

/// Locate the record collection in `body` without copying it.
///
/// Returns `None` for bodies with no usable records (null, scalars).
pub fn locate_records(body: &Value) -> Option<(ResponseShape, &[Value])> {
    match body {
        Value::Array(items) => Some((ResponseShape::Array, items.as_slice())),
        Value::Object(obj) => {
            for (key, shape) in [
                ("data", ResponseShape::Paginated),
                ("items", ResponseShape::Items),
                ("results", ResponseShape::Results),
            ] {
                if let Some(Value::Array(items)) = obj.get(key) {
                    return Some((shape, items.as_slice()));
                }
            }
            Some((ResponseShape::Object, std::slice::from_ref(body)))
        }
        _ => None,
    }
}

pub fn infer_shape(body: &Value) -> Option<(ResponseShape, usize)> {
    locate_records(body).map(|(shape, records)| (shape, records.len()))
}

/// First record of a response body, used as a mapping sample.
pub fn first_record(body: &Value) -> Option<&Value> {
    match body {
        Value::Array(items) => items.first(),
        Value::Object(obj) => match obj.get("data") {
            Some(Value::Array(items)) => items.first(),
            _ => Some(body),
        },
        _ => None,
    }
}

/// Probes candidate endpoints against one API.
pub struct EndpointProber {
    client: ApiClient,
    timeout: Duration,
    concurrent: bool,
}

impl EndpointProber {
    pub fn new(client: ApiClient, timeout: Duration) -> Self {
        Self {
            client,
            timeout,
            concurrent: false,
        }
    }

    pub fn with_concurrency(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    /// Probe every endpoint and keep the ones with at least one record, in input order.
    ///
    /// Parameterized paths are expected to be filtered out by the caller; any that
    /// slip through are skipped here rather than requested with a literal `{id}`.
    pub async fn probe_all(&self, endpoints: &[String]) -> Vec<EndpointProbeResult> {
        let candidates: Vec<&String> = endpoints
            .iter()
            .filter(|path| {
                let parameterized = is_parameterized(path);
                if parameterized {
                    tracing::debug!("Skipping parameterized endpoint: {}", path);
                }
                !parameterized
            })
            .collect();

        tracing::info!(
            "Probing {} endpoint(s) ({})",
            candidates.len(),
            if self.concurrent { "concurrent" } else { "sequential" }
        );

        let outcomes = if self.concurrent {
            // join_all keeps input order, so list order remains the tie-break.
            futures::future::join_all(candidates.iter().map(|path| self.probe(path))).await
        } else {
            let mut outcomes = Vec::with_capacity(candidates.len());
            for path in &candidates {
                outcomes.push(self.probe(path).await);
            }
            outcomes
        };

        let working: Vec<EndpointProbeResult> = outcomes
            .into_iter()
            .filter_map(|outcome| match outcome {
                Ok(Some(result)) => Some(result),
                Ok(None) => None,
                Err(e) => {
                    tracing::debug!("{}", e);
                    None
                }
            })
            .collect();

        tracing::info!("{} working endpoint(s) discovered", working.len());
        working
    }

    /// Probe one endpoint. `Ok(None)` means it answered but held no records.
    pub async fn probe(&self, path: &str) -> Result<Option<EndpointProbeResult>, DiscoveryError> {
        let body = self
            .client
            .get_json(path, self.timeout)
            .await
            .map_err(|e| DiscoveryError::EndpointProbeFailure {
                endpoint: path.to_string(),
                reason: e.to_string(),
            })?;

        match infer_shape(&body) {
            Some((shape, record_count)) if record_count > 0 => {
                tracing::debug!("{} -> {} with {} record(s)", path, shape, record_count);
                Ok(Some(EndpointProbeResult {
                    endpoint: path.to_string(),
                    shape,
                    record_count,
                }))
            }
            _ => {
                tracing::debug!("{} returned no usable records", path);
                Ok(None)
            }
        }
    }
}

/// True for paths carrying `{param}` placeholders.
pub fn is_parameterized(path: &str) -> bool {
    path.contains('{') || path.contains('}')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_shape_precedence() {
        assert_eq!(infer_shape(&json!([1, 2, 3])), Some((ResponseShape::Array, 3)));
        assert_eq!(
            infer_shape(&json!({"data": [1], "items": [1, 2]})),
            Some((ResponseShape::Paginated, 1))
        );
        assert_eq!(
            infer_shape(&json!({"items": [1, 2], "results": []})),
            Some((ResponseShape::Items, 2))
        );
        assert_eq!(
            infer_shape(&json!({"results": [], "total": 0})),
            Some((ResponseShape::Results, 0))
        );
        assert_eq!(
            infer_shape(&json!({"data": "not a list"})),
            Some((ResponseShape::Object, 1))
        );
        assert_eq!(infer_shape(&json!(null)), None);
        assert_eq!(infer_shape(&json!("text")), None);
    }

    #[test]
    fn test_locate_records_wraps_single_object() {
        let body = json!({"id": "X1"});
        let (shape, records) = locate_records(&body).unwrap();
        assert_eq!(shape, ResponseShape::Object);
        assert_eq!(records, &[body.clone()][..]);
    }

    #[test]
    fn test_first_record() {
        assert_eq!(first_record(&json!([{"a": 1}])), Some(&json!({"a": 1})));
        assert_eq!(first_record(&json!({"data": []})), None);
        assert_eq!(first_record(&json!({"x": 1})), Some(&json!({"x": 1})));
        assert_eq!(first_record(&json!(5)), None);
    }

    #[test]
    fn test_parameterized_paths() {
        assert!(is_parameterized("/api/v1/interactions/{id}"));
        assert!(!is_parameterized("/api/v1/interactions"));
    }
}
