//! Spec fetching and API documentation analysis.
//!
//! Retrieves the remote OpenAPI-style description and turns it into an
//! [`ApiDocumentation`]: endpoint list, schema list, interaction-related
//! endpoints and data models, and a spec-derived field mapping. The mapping is
//! then refined from live samples when any interaction endpoint answers.

use crate::config::DiscoveryConfig;
use crate::discovery::endpoint_prober::{first_record, is_parameterized};
use crate::discovery::field_mapping::FieldMapping;
use crate::error::{DiscoveryError, DiscoveryResult};
use crate::http::ApiClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const INTERACTION_PATH_KEYWORDS: &[&str] = &["interaction", "call", "report", "analytics"];

/// One `(path, method)` operation from the spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEndpointInfo {
    pub path: String,
    pub method: String,
    pub summary: String,
    pub description: String,
    pub parameters: Vec<Value>,
    pub responses: Value,
    pub request_body: Option<Value>,
}

/// One entry of `components.schemas`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSchemaInfo {
    pub name: String,
    pub schema_type: String,
    pub properties: serde_json::Map<String, Value>,
    pub required: Vec<String>,
    pub example: Option<Value>,
}

/// Schemas recognised as the main domain models.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataModels {
    pub interaction: Option<ApiSchemaInfo>,
    pub agent: Option<ApiSchemaInfo>,
    pub analytics: Option<ApiSchemaInfo>,
}

/// Analysis of a remote API description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiDocumentation {
    pub title: String,
    pub version: String,
    pub description: String,
    pub base_url: String,
    pub endpoints: Vec<ApiEndpointInfo>,
    pub schemas: Vec<ApiSchemaInfo>,
    pub interaction_endpoints: Vec<ApiEndpointInfo>,
    pub data_models: DataModels,
    pub field_mapping: FieldMapping,
}

impl ApiDocumentation {
    /// Analyse a parsed spec document. Missing sections simply yield empty lists.
    pub fn from_spec(spec: &Value, base_url: &str) -> Self {
        let info = spec.get("info");
        let info_str = |key: &str, default: &str| {
            info.and_then(|i| i.get(key))
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .unwrap_or(default)
                .to_string()
        };

        let endpoints = parse_endpoints(spec);
        let interaction_endpoints: Vec<ApiEndpointInfo> = endpoints
            .iter()
            .filter(|e| is_interaction_path(&e.path))
            .cloned()
            .collect();
        for endpoint in &interaction_endpoints {
            tracing::debug!("Found interaction endpoint: {} {}", endpoint.method, endpoint.path);
        }

        let schemas = parse_schemas(spec);
        let data_models = classify_data_models(&schemas);
        let field_mapping = FieldMapping::from_property_names(
            schemas.iter().flat_map(|schema| schema.properties.keys()),
        );

        Self {
            title: info_str("title", "Unknown API"),
            version: info_str("version", "Unknown Version"),
            description: info_str("description", "No description available"),
            base_url: base_url.to_string(),
            endpoints,
            schemas,
            interaction_endpoints,
            data_models,
            field_mapping,
        }
    }

    /// Distinct spec paths, in document order.
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = Vec::new();
        for endpoint in &self.endpoints {
            if !paths.contains(&endpoint.path) {
                paths.push(endpoint.path.clone());
            }
        }
        paths
    }

    /// Paths safe to probe: no placeholders and not excluded.
    pub fn probe_candidates(&self, excluded: &[String]) -> Vec<String> {
        self.paths()
            .into_iter()
            .filter(|path| !is_parameterized(path))
            .filter(|path| !excluded.iter().any(|e| e == path))
            .collect()
    }

    /// GET interaction endpoints without placeholders, used for mapping samples.
    pub fn sample_candidates(&self, limit: usize) -> Vec<String> {
        self.interaction_endpoints
            .iter()
            .filter(|e| e.method == "GET" && !is_parameterized(&e.path))
            .map(|e| e.path.clone())
            .take(limit)
            .collect()
    }

    /// First interaction path with a placeholder, for lookups by id.
    pub fn interaction_by_id_path(&self) -> Option<&str> {
        self.endpoints
            .iter()
            .map(|e| e.path.as_str())
            .find(|path| path.contains("interaction") && path.contains('{'))
    }
}

fn is_interaction_path(path: &str) -> bool {
    let lower = path.to_lowercase();
    INTERACTION_PATH_KEYWORDS.iter().any(|k| lower.contains(k))
}

fn parse_endpoints(spec: &Value) -> Vec<ApiEndpointInfo> {
    let Some(paths) = spec.get("paths").and_then(Value::as_object) else {
        return Vec::new();
    };

    let mut endpoints = Vec::new();
    for (path, item) in paths {
        let Some(methods) = item.as_object() else {
            continue;
        };
        for (method, operation) in methods {
            if method == "parameters" || method.starts_with('$') || !operation.is_object() {
                continue;
            }
            let text = |key: &str| {
                operation
                    .get(key)
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string()
            };
            endpoints.push(ApiEndpointInfo {
                path: path.clone(),
                method: method.to_uppercase(),
                summary: text("summary"),
                description: text("description"),
                parameters: operation
                    .get("parameters")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default(),
                responses: operation
                    .get("responses")
                    .cloned()
                    .unwrap_or_else(|| Value::Object(Default::default())),
                request_body: operation.get("requestBody").cloned(),
            });
        }
    }
    endpoints
}

fn parse_schemas(spec: &Value) -> Vec<ApiSchemaInfo> {
    let Some(schemas) = spec
        .get("components")
        .and_then(|c| c.get("schemas"))
        .and_then(Value::as_object)
    else {
        return Vec::new();
    };

    schemas
        .iter()
        .map(|(name, schema)| ApiSchemaInfo {
            name: name.clone(),
            schema_type: schema
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("object")
                .to_string(),
            properties: schema
                .get("properties")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
            required: schema
                .get("required")
                .and_then(Value::as_array)
                .map(|r| r.iter().filter_map(|v| v.as_str().map(String::from)).collect())
                .unwrap_or_default(),
            example: schema.get("example").cloned(),
        })
        .collect()
}

fn classify_data_models(schemas: &[ApiSchemaInfo]) -> DataModels {
    let mut models = DataModels::default();
    for schema in schemas {
        let lower = schema.name.to_lowercase();
        if lower.contains("interaction") || lower.contains("call") {
            models.interaction = Some(schema.clone());
        } else if lower.contains("agent") || lower.contains("user") {
            models.agent = Some(schema.clone());
        } else if lower.contains("report") || lower.contains("analytics") {
            models.analytics = Some(schema.clone());
        }
    }
    models
}

/// Fetches and analyses the remote API description.
pub struct SpecFetcher {
    client: ApiClient,
    config: DiscoveryConfig,
}

impl SpecFetcher {
    pub fn new(client: ApiClient, config: DiscoveryConfig) -> Self {
        Self { client, config }
    }

    /// Fetch the raw spec document. Any failure is `SpecUnavailable`.
    pub async fn fetch_spec(&self) -> DiscoveryResult<Value> {
        let spec = self
            .client
            .get_json(&self.config.spec_path, self.config.spec_timeout())
            .await
            .map_err(|e| DiscoveryError::SpecUnavailable(e.to_string()))?;

        if !spec.is_object() {
            return Err(DiscoveryError::SpecUnavailable(
                "spec document is not a JSON object".to_string(),
            ));
        }
        Ok(spec)
    }

    /// Fetch the spec, analyse it, and refine the field mapping from live samples.
    pub async fn analyze(&self) -> DiscoveryResult<ApiDocumentation> {
        tracing::info!("Analyzing API documentation at {}", self.client.base_url());
        let spec = self.fetch_spec().await?;
        let mut doc = ApiDocumentation::from_spec(&spec, self.client.base_url());
        tracing::info!(
            "API: {} v{} ({} endpoints, {} schemas, {} interaction endpoints)",
            doc.title,
            doc.version,
            doc.endpoints.len(),
            doc.schemas.len(),
            doc.interaction_endpoints.len()
        );

        self.refine_from_samples(&mut doc).await;
        Ok(doc)
    }

    /// Rebuild the mapping from the first record of each sampled endpoint.
    /// The last successful sample wins; failures leave the mapping untouched.
    pub async fn refine_from_samples(&self, doc: &mut ApiDocumentation) {
        for path in doc.sample_candidates(self.config.max_sample_endpoints) {
            match self.client.get_json(&path, self.config.request_timeout()).await {
                Ok(body) => {
                    if let Some(sample) = first_record(&body).and_then(Value::as_object) {
                        tracing::debug!("Refining field mapping from {}", path);
                        doc.field_mapping = FieldMapping::from_sample(sample);
                    }
                }
                Err(e) => tracing::debug!("Sample fetch from {} failed: {}", path, e),
            }
        }
    }
}
