//! Thin HTTP layer over `reqwest` shared by the fetcher, prober and loader.
//!
//! Every call carries its own timeout; an expired call is a failure and is
//! never retried here.

use crate::config::DiscoveryConfig;
use crate::error::{DiscoveryError, DiscoveryResult};
use reqwest::header::{HeaderMap, ACCEPT, CONTENT_TYPE};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

pub const JSON_ACCEPT: &str = "application/json";
pub const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Raw response captured for diagnostics.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub success: bool,
    pub status_text: String,
    pub elapsed: Duration,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    /// Set when the status line arrived but the body could not be read.
    pub body_error: Option<String>,
}

/// HTTP client bound to one API base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: url::Url,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: &DiscoveryConfig) -> DiscoveryResult<Self> {
        config.validate()?;
        let base_url = url::Url::parse(config.base_url.trim_end_matches('/'))?;
        let client = reqwest::Client::builder()
            .connect_timeout(config.request_timeout())
            .build()?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Absolute URL for an API path such as `/api/v1/interactions`.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{}", self.base_url(), path)
        } else {
            format!("{}/{}", self.base_url(), path)
        }
    }

    /// GET `path` as JSON. Non-2xx statuses and unparseable bodies are errors.
    pub async fn get_json(&self, path: &str, timeout: Duration) -> DiscoveryResult<serde_json::Value> {
        let url = self.url_for(path);
        let response = self
            .client
            .get(&url)
            .header(ACCEPT, JSON_ACCEPT)
            .header(CONTENT_TYPE, JSON_ACCEPT)
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DiscoveryError::Http(format!(
                "GET {} returned HTTP {}",
                path, status
            )));
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// GET `path` with the given Accept header and keep whatever came back.
    pub async fn get_raw(&self, path: &str, accept: &str, timeout: Duration) -> DiscoveryResult<RawResponse> {
        let url = self.url_for(path);
        let started = Instant::now();
        let mut request = self.client.get(&url).header(ACCEPT, accept).timeout(timeout);
        if accept == JSON_ACCEPT {
            request = request.header(CONTENT_TYPE, JSON_ACCEPT);
        }
        let response = request.send().await?;

        let status = response.status();
        let headers = header_map_to_btree(response.headers());
        let (body, body_error) = match response.text().await {
            Ok(body) => (body, None),
            Err(e) => {
                tracing::debug!("Reading body of {} failed: {}", path, e);
                (String::new(), Some(format!("failed to read response body: {}", e)))
            }
        };

        Ok(RawResponse {
            status: status.as_u16(),
            success: status.is_success(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            elapsed: started.elapsed(),
            headers,
            body,
            body_error,
        })
    }

    /// True when `path` answers with a 2xx status within `timeout`.
    pub async fn is_reachable(&self, path: &str, accept: &str, timeout: Duration) -> bool {
        match self.get_raw(path, accept, timeout).await {
            Ok(resp) => resp.success && resp.body_error.is_none(),
            Err(e) => {
                tracing::debug!("Reachability check for {} failed: {}", path, e);
                false
            }
        }
    }
}

fn header_map_to_btree(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
        .collect()
}
