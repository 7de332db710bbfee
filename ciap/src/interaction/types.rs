use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One normalized customer-service contact record.
///
/// Every numeric field is finite and `id` is never empty; missing source data
/// is replaced by a default during normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: String,
    /// Serialized as `YYYY-MM-DD`
    pub date: NaiveDate,
    pub agent_name: String,
    pub issue_type: String,
    pub description: String,
    pub sentiment_start: f64,
    pub sentiment_end: f64,
    pub positive_sentiment: f64,
    pub negative_sentiment: f64,
    pub crosstalk_score: f64,
    pub mutual_silence_score: f64,
    pub nontalk_score: f64,
    pub resolution: String,
    pub coaching_recommendations: Vec<String>,
    pub greeting_text: String,
    pub has_greeting: bool,
    pub behavior: String,
    pub compliance_score: String,
    /// Raw transcript when one was discovered. Absent means callers should
    /// show a generated placeholder narrative instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
}

impl Interaction {
    /// The numeric metrics, in declaration order.
    pub fn metrics(&self) -> [f64; 7] {
        [
            self.sentiment_start,
            self.sentiment_end,
            self.positive_sentiment,
            self.negative_sentiment,
            self.crosstalk_score,
            self.mutual_silence_score,
            self.nontalk_score,
        ]
    }

    pub fn sentiment_improvement(&self) -> f64 {
        self.sentiment_end - self.sentiment_start
    }
}
