//! Schema discovery and response normalization for contact-center interaction APIs.
//!
//! The [`InteractionLoader`] asks a remote API for its description, probes the
//! endpoints it lists, infers which JSON fields carry identifiers, agents,
//! transcripts, sentiment and dates, and normalizes whatever records it finds
//! into [`Interaction`]s. When the API cannot supply records the loader
//! returns a static demo dataset instead, flagged as such.

pub mod config;
pub mod discovery;
pub mod error;
pub mod http;
pub mod interaction;
pub mod loader;
pub mod normalize;

pub use config::DiscoveryConfig;
pub use discovery::{
    ApiDocumentation, EndpointProbeResult, EndpointProber, FieldCategory, FieldMapping, RawRecord,
    ResponseShape, SpecAnalysisCache, SpecFetcher,
};
pub use error::{DiscoveryError, DiscoveryResult};
pub use http::ApiClient;
pub use interaction::{
    demo_interactions, distinct_agents, distinct_issue_types, AnalyticsSummary, Interaction,
};
pub use loader::{InteractionLoader, LoadOutcome, LoadState};
pub use normalize::{normalize, normalize_records, FieldSource, NormalizationReport, ResponseNormalizer};
