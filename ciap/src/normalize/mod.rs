//! Response normalization into the canonical [`Interaction`](crate::interaction::Interaction).

pub mod cascade;
pub mod extractors;
pub mod normalizer;

pub use cascade::{Cascade, FieldSource, Resolved};
pub use normalizer::{
    normalize, normalize_records, synthesize_id, Metric, NormalizationReport, ResponseNormalizer,
    DEFAULT_AGENT_NAME, DEFAULT_COACHING, DEFAULT_ISSUE_TYPE,
};
