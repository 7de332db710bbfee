//! Catalogues and aggregate figures derived from a loaded interaction set.

use super::types::Interaction;
use crate::normalize::{DEFAULT_AGENT_NAME, DEFAULT_ISSUE_TYPE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Sorted unique agent names, without the placeholder agent.
pub fn distinct_agents(interactions: &[Interaction]) -> Vec<String> {
    distinct(interactions, |i| &i.agent_name, DEFAULT_AGENT_NAME)
}

/// Sorted unique issue types, without the catch-all category.
pub fn distinct_issue_types(interactions: &[Interaction]) -> Vec<String> {
    distinct(interactions, |i| &i.issue_type, DEFAULT_ISSUE_TYPE)
}

fn distinct<'a, F>(interactions: &'a [Interaction], field: F, placeholder: &str) -> Vec<String>
where
    F: Fn(&'a Interaction) -> &'a String,
{
    interactions
        .iter()
        .map(field)
        .filter(|value| !value.is_empty() && value.as_str() != placeholder)
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Dashboard headline figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub total_interactions: usize,
    /// Mean of `sentiment_end - sentiment_start`, rounded to an integer
    pub avg_sentiment_improvement: f64,
    /// Rounded to one decimal
    pub avg_crosstalk: f64,
    /// Rounded to one decimal
    pub avg_mutual_silence: f64,
    /// Rounded to an integer
    pub avg_positive_sentiment: f64,
}

impl AnalyticsSummary {
    pub fn from_interactions(interactions: &[Interaction]) -> Self {
        if interactions.is_empty() {
            return Self::default();
        }

        let mean = |f: fn(&Interaction) -> f64| {
            interactions.iter().map(f).sum::<f64>() / interactions.len() as f64
        };

        Self {
            total_interactions: interactions.len(),
            avg_sentiment_improvement: mean(Interaction::sentiment_improvement).round(),
            avg_crosstalk: round_tenths(mean(|i| i.crosstalk_score)),
            avg_mutual_silence: round_tenths(mean(|i| i.mutual_silence_score)),
            avg_positive_sentiment: mean(|i| i.positive_sentiment).round(),
        }
    }
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
