//! Field mapping inference.
//!
//! Classifies property names into the semantic categories the normalizer
//! cares about. Classification is non-exclusive: one name can land in several
//! categories, and the normalizer's first-match-wins order disambiguates.
//!
//! Two inputs are supported:
//! - declared schema property names (no values known), from the API spec
//! - one concrete sample record, whose values tighten the value-dependent rules

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A raw record as received from the API, keys kept in wire order.
pub type RawRecord = serde_json::Map<String, Value>;

/// Strings this long or shorter are treated as labels, not transcript text.
pub const TRANSCRIPT_MIN_CHARS: usize = 50;

const IDENTIFIER_KEYWORDS: &[&str] = &["id", "uuid", "key", "reference"];
const AGENT_KEYWORDS: &[&str] = &[
    "agent",
    "user",
    "rep",
    "employee",
    "staff",
    "operator",
    "analyst",
    "specialist",
];
const TRANSCRIPT_KEYWORDS: &[&str] = &["transcript", "conversation", "dialogue", "recording"];
const TRANSCRIPT_VALUE_KEYWORDS: &[&str] = &["text", "content"];
const SENTIMENT_KEYWORDS: &[&str] = &["sentiment", "emotion", "mood", "score", "rating"];
const DATE_KEYWORDS: &[&str] = &["date", "time", "created", "updated", "timestamp"];

pub(crate) static LEADING_ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").expect("static regex"));

/// Semantic category a source field may belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldCategory {
    Identifier,
    Agent,
    Transcript,
    Sentiment,
    Date,
}

impl FieldCategory {
    pub const ALL: [FieldCategory; 5] = [
        FieldCategory::Identifier,
        FieldCategory::Agent,
        FieldCategory::Transcript,
        FieldCategory::Sentiment,
        FieldCategory::Date,
    ];
}

/// Source field names per semantic category, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub identifier: Vec<String>,
    pub agent: Vec<String>,
    pub transcript: Vec<String>,
    pub sentiment: Vec<String>,
    pub date: Vec<String>,
}

impl FieldMapping {
    /// Mapping from declared property names, where no values are known.
    pub fn from_property_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut mapping = Self::default();
        for name in names {
            mapping.add(name.as_ref(), None);
        }
        mapping
    }

    /// Mapping rebuilt from a live record's actual keys and values.
    pub fn from_sample(sample: &RawRecord) -> Self {
        let mut mapping = Self::default();
        for (name, value) in sample {
            mapping.add(name, Some(value));
        }
        tracing::debug!(
            "Field mapping from sample: id={:?} agent={:?} transcript={:?} sentiment={:?} date={:?}",
            mapping.identifier,
            mapping.agent,
            mapping.transcript,
            mapping.sentiment,
            mapping.date
        );
        mapping
    }

    /// Like [`FieldMapping::from_sample`] for any JSON value; non-objects map to nothing.
    pub fn from_sample_value(sample: &Value) -> Self {
        match sample.as_object() {
            Some(record) => Self::from_sample(record),
            None => Self::default(),
        }
    }

    fn add(&mut self, name: &str, value: Option<&Value>) {
        for category in classify_field(name, value) {
            let bucket = self.fields_mut(category);
            if !bucket.iter().any(|existing| existing == name) {
                bucket.push(name.to_string());
            }
        }
    }

    pub fn fields(&self, category: FieldCategory) -> &[String] {
        match category {
            FieldCategory::Identifier => &self.identifier,
            FieldCategory::Agent => &self.agent,
            FieldCategory::Transcript => &self.transcript,
            FieldCategory::Sentiment => &self.sentiment,
            FieldCategory::Date => &self.date,
        }
    }

    fn fields_mut(&mut self, category: FieldCategory) -> &mut Vec<String> {
        match category {
            FieldCategory::Identifier => &mut self.identifier,
            FieldCategory::Agent => &mut self.agent,
            FieldCategory::Transcript => &mut self.transcript,
            FieldCategory::Sentiment => &mut self.sentiment,
            FieldCategory::Date => &mut self.date,
        }
    }

    pub fn is_empty(&self) -> bool {
        FieldCategory::ALL
            .iter()
            .all(|category| self.fields(*category).is_empty())
    }
}

/// Every category `name` qualifies for. `value` is `None` when only the
/// declared name is known; value-dependent rules then behave as documented
/// on each predicate.
pub fn classify_field(name: &str, value: Option<&Value>) -> Vec<FieldCategory> {
    let lower = name.to_lowercase();
    FieldCategory::ALL
        .iter()
        .copied()
        .filter(|category| match category {
            FieldCategory::Identifier => is_identifier_field(&lower),
            FieldCategory::Agent => is_agent_field(&lower, value),
            FieldCategory::Transcript => is_transcript_field(&lower, value),
            FieldCategory::Sentiment => contains_any(&lower, SENTIMENT_KEYWORDS),
            FieldCategory::Date => is_date_field(&lower, value),
        })
        .collect()
}

fn contains_any(lower: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| lower.contains(keyword))
}

fn is_identifier_field(lower: &str) -> bool {
    contains_any(lower, IDENTIFIER_KEYWORDS) || lower == "id" || lower.ends_with("_id")
}

// A bare "name" only counts when its value, if known, is a string.
fn is_agent_field(lower: &str, value: Option<&Value>) -> bool {
    if contains_any(lower, AGENT_KEYWORDS) {
        return true;
    }
    lower == "name" && value.map_or(true, Value::is_string)
}

/// True when the name alone marks a transcript, without looking at a value.
pub fn is_named_transcript_field(name: &str) -> bool {
    contains_any(&name.to_lowercase(), TRANSCRIPT_KEYWORDS)
}

// "text"/"content" need a known string value longer than the label threshold.
fn is_transcript_field(lower: &str, value: Option<&Value>) -> bool {
    if contains_any(lower, TRANSCRIPT_KEYWORDS) {
        return true;
    }
    contains_any(lower, TRANSCRIPT_VALUE_KEYWORDS)
        && matches!(value, Some(Value::String(s)) if s.chars().count() > TRANSCRIPT_MIN_CHARS)
}

fn is_date_field(lower: &str, value: Option<&Value>) -> bool {
    contains_any(lower, DATE_KEYWORDS)
        || matches!(value, Some(Value::String(s)) if LEADING_ISO_DATE.is_match(s))
}
