//! Canonical interaction record, the demo dataset, and derived summaries.

pub mod demo_data;
pub mod summary;
pub mod types;

pub use demo_data::demo_interactions;
pub use summary::{distinct_agents, distinct_issue_types, AnalyticsSummary};
pub use types::Interaction;
