//! In-process cache for the spec analysis.
//!
//! The analysis is expensive (spec fetch plus sample requests) and rarely
//! changes, so it lives for the lifetime of the owning loader until
//! [`SpecAnalysisCache::invalidate`] is called. Failed computations are never
//! cached.

use crate::discovery::spec_fetcher::ApiDocumentation;
use crate::error::DiscoveryResult;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
pub struct SpecAnalysisCache {
    entry: Mutex<Option<Arc<ApiDocumentation>>>,
}

impl SpecAnalysisCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached analysis, or run `compute` and cache its success.
    ///
    /// The lock is held across `compute`, so concurrent callers share one fetch.
    pub async fn get_or_compute<F, Fut>(&self, compute: F) -> DiscoveryResult<Arc<ApiDocumentation>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = DiscoveryResult<ApiDocumentation>>,
    {
        let mut entry = self.entry.lock().await;
        if let Some(doc) = entry.as_ref() {
            tracing::debug!("Using cached API analysis for {}", doc.base_url);
            return Ok(Arc::clone(doc));
        }

        let doc = Arc::new(compute().await?);
        *entry = Some(Arc::clone(&doc));
        Ok(doc)
    }

    pub async fn get(&self) -> Option<Arc<ApiDocumentation>> {
        self.entry.lock().await.clone()
    }

    pub async fn invalidate(&self) {
        if self.entry.lock().await.take().is_some() {
            tracing::info!("API analysis cache cleared");
        }
    }

    pub async fn is_cached(&self) -> bool {
        self.entry.lock().await.is_some()
    }
}
