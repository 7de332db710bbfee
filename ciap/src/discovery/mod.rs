//! Schema discovery for an undocumented-at-compile-time interaction API.
//!
//! - `spec_fetcher`: fetch and analyse the remote API description
//! - `field_mapping`: classify property names into semantic categories
//! - `endpoint_prober`: find endpoints that yield record collections
//! - `analysis_cache`: keep the analysis between loads until invalidated
//! - `diagnostics`: per-endpoint status reports for operators

pub mod analysis_cache;
pub mod diagnostics;
pub mod endpoint_prober;
pub mod field_mapping;
pub mod spec_fetcher;

pub use analysis_cache::SpecAnalysisCache;
pub use diagnostics::{ApiDiagnostics, AuthCheck, DiagnosticResult};
pub use endpoint_prober::{EndpointProbeResult, EndpointProber, ResponseShape};
pub use field_mapping::{classify_field, FieldCategory, FieldMapping, RawRecord};
pub use spec_fetcher::{ApiDocumentation, ApiEndpointInfo, ApiSchemaInfo, DataModels, SpecFetcher};
