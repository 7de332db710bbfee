//! Response normalization.
//!
//! Turns one arbitrarily-shaped record into an [`Interaction`]. Every field is
//! resolved through a cascade that ends in a default, so normalization never
//! fails: a malformed record still produces a displayable interaction.

use super::cascade::{Cascade, FieldSource, Resolved, ValueParser};
use super::extractors::{
    boolean, calendar_date, calendar_date_or_epoch, lenient_number, non_empty_string, string_list,
    transcript_text, trimmed_string,
};
use crate::discovery::field_mapping::{is_named_transcript_field, FieldMapping, RawRecord};
use crate::interaction::Interaction;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const ID_PREFIX: &str = "INT";
pub const DEFAULT_AGENT_NAME: &str = "Unknown Agent";
pub const DEFAULT_ISSUE_TYPE: &str = "General Inquiry";
pub const DEFAULT_DESCRIPTION: &str = "No description available";
pub const DEFAULT_RESOLUTION: &str = "Completed";
pub const DEFAULT_COACHING: &str = "No coaching recommendations available";
pub const DEFAULT_GREETING_TEXT: &str = "Standard greeting";
pub const DEFAULT_HAS_GREETING: bool = true;
pub const DEFAULT_BEHAVIOR: &str = "Professional";
pub const DEFAULT_COMPLIANCE: &str = "Good";

/// Agent name variants tried when no mapped agent field matches. Order is part of the contract.
pub const COMMON_AGENT_FIELDS: &[&str] = &[
    "agent_name",
    "agentName",
    "agent",
    "user_name",
    "userName",
    "name",
    "representative",
    "rep_name",
    "employee_name",
    "staff_name",
    "operator",
];
pub const ISSUE_TYPE_FIELDS: &[&str] = &["issue_type", "issueType", "category", "type"];
pub const DESCRIPTION_FIELDS: &[&str] = &["description", "summary", "notes", "details"];
pub const RESOLUTION_FIELDS: &[&str] = &["resolution", "outcome", "status", "result"];
pub const COACHING_FIELDS: &[&str] = &[
    "coaching_recommendations",
    "recommendations",
    "coaching",
    "feedback",
    "suggestions",
];
pub const GREETING_TEXT_FIELDS: &[&str] = &["greeting_text", "greetingText", "greeting"];
pub const HAS_GREETING_FIELDS: &[&str] = &["has_greeting"];
pub const BEHAVIOR_FIELDS: &[&str] = &["behavior", "greeting_behavior", "greetingBehavior"];
pub const COMPLIANCE_FIELDS: &[&str] = &["compliance_score", "complianceScore", "score"];

/// Numeric metrics carried by every interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    SentimentStart,
    SentimentEnd,
    PositiveSentiment,
    NegativeSentiment,
    Crosstalk,
    MutualSilence,
    Nontalk,
}

impl Metric {
    pub const ALL: [Metric; 7] = [
        Metric::SentimentStart,
        Metric::SentimentEnd,
        Metric::PositiveSentiment,
        Metric::NegativeSentiment,
        Metric::Crosstalk,
        Metric::MutualSilence,
        Metric::Nontalk,
    ];

    /// Keyword matched against mapped sentiment field names, and the stem of
    /// the literal fallback names.
    pub fn keyword(&self) -> &'static str {
        match self {
            Metric::SentimentStart => "sentiment_start",
            Metric::SentimentEnd => "sentiment_end",
            Metric::PositiveSentiment => "positive_sentiment",
            Metric::NegativeSentiment => "negative_sentiment",
            Metric::Crosstalk => "crosstalk",
            Metric::MutualSilence => "mutual_silence",
            Metric::Nontalk => "nontalk",
        }
    }

    /// Fixed default. `SentimentEnd` is offset from the resolved start instead;
    /// see [`sentiment_end_default`].
    pub fn fixed_default(&self) -> f64 {
        match self {
            Metric::SentimentStart => 50.0,
            Metric::SentimentEnd => 75.0,
            Metric::PositiveSentiment => 70.0,
            Metric::NegativeSentiment => 30.0,
            Metric::Crosstalk => 2.5,
            Metric::MutualSilence => 5.0,
            Metric::Nontalk => 3.0,
        }
    }

    /// Name of the corresponding `Interaction` field.
    pub fn field_name(&self) -> &'static str {
        match self {
            Metric::SentimentStart => "sentiment_start",
            Metric::SentimentEnd => "sentiment_end",
            Metric::PositiveSentiment => "positive_sentiment",
            Metric::NegativeSentiment => "negative_sentiment",
            Metric::Crosstalk => "crosstalk_score",
            Metric::MutualSilence => "mutual_silence_score",
            Metric::Nontalk => "nontalk_score",
        }
    }

    /// `{m}_score`, `{m}Score`, `{m}`, `{m}_value`, `{m}Value`.
    pub fn literal_fields(&self) -> Vec<String> {
        let m = self.keyword();
        vec![
            format!("{}_score", m),
            format!("{}Score", m),
            m.to_string(),
            format!("{}_value", m),
            format!("{}Value", m),
        ]
    }
}

/// Sentiment end defaults to the resolved start plus 25.
pub fn sentiment_end_default(sentiment_start: f64) -> f64 {
    sentiment_start + 25.0
}

/// Provenance of every field in one normalized record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizationReport {
    pub fields: Vec<(String, FieldSource)>,
}

impl NormalizationReport {
    fn record<T>(&mut self, field: &str, resolved: Resolved<T>) -> T {
        self.fields.push((field.to_string(), resolved.source));
        resolved.value
    }

    pub fn source(&self, field: &str) -> Option<&FieldSource> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, source)| source)
    }

    /// Fields that fell back to a default, synthesized or absent value.
    pub fn defaulted(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, source)| source.is_fallback())
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Normalizer bound to one field mapping; reuse it for every record of a payload.
pub struct ResponseNormalizer {
    mapping: FieldMapping,
    id: Cascade<String>,
    agent_name: Cascade<String>,
    transcript: Cascade<String>,
    date: Cascade<NaiveDate>,
    metrics: Vec<(Metric, Cascade<f64>)>,
    issue_type: Cascade<String>,
    description: Cascade<String>,
    resolution: Cascade<String>,
    coaching: Cascade<Vec<String>>,
    greeting_text: Cascade<String>,
    has_greeting: Cascade<bool>,
    behavior: Cascade<String>,
    compliance: Cascade<String>,
}

impl ResponseNormalizer {
    pub fn new(mapping: FieldMapping) -> Self {
        let metrics: Vec<(Metric, Cascade<f64>)> = Metric::ALL
            .iter()
            .map(|metric| {
                let keyword = metric.keyword();
                let mapped = mapping
                    .sentiment
                    .iter()
                    .filter(|field| field.to_lowercase().contains(keyword))
                    .cloned();
                let cascade = Cascade::new()
                    .mapped(mapped, lenient_number)
                    .literal(metric.literal_fields(), lenient_number);
                (*metric, cascade)
            })
            .collect();

        // Fields named as transcripts outrank ones that only qualified by value length.
        let (named, by_value): (Vec<String>, Vec<String>) = mapping
            .transcript
            .iter()
            .cloned()
            .partition(|field| is_named_transcript_field(field));

        // Sentiment-mapped fields only match dates as strings, so a numeric score
        // is never read as an epoch timestamp.
        let date = mapping.date.iter().fold(Cascade::new(), |cascade, field| {
            let parse: ValueParser<NaiveDate> = if mapping.sentiment.contains(field) {
                calendar_date
            } else {
                calendar_date_or_epoch
            };
            cascade.mapped([field.clone()], parse)
        });

        Self {
            id: Cascade::new().mapped(mapping.identifier.clone(), non_empty_string),
            agent_name: Cascade::new()
                .mapped(mapping.agent.clone(), trimmed_string)
                .literal(COMMON_AGENT_FIELDS.iter().copied(), trimmed_string),
            transcript: Cascade::new()
                .mapped(named, transcript_text)
                .mapped(by_value, transcript_text),
            date,
            metrics,
            issue_type: literal_cascade(ISSUE_TYPE_FIELDS, non_empty_string),
            description: literal_cascade(DESCRIPTION_FIELDS, non_empty_string),
            resolution: literal_cascade(RESOLUTION_FIELDS, non_empty_string),
            coaching: literal_cascade(COACHING_FIELDS, string_list),
            greeting_text: literal_cascade(GREETING_TEXT_FIELDS, non_empty_string),
            has_greeting: literal_cascade(HAS_GREETING_FIELDS, boolean),
            behavior: literal_cascade(BEHAVIOR_FIELDS, non_empty_string),
            compliance: literal_cascade(COMPLIANCE_FIELDS, non_empty_string),
            mapping,
        }
    }

    pub fn mapping(&self) -> &FieldMapping {
        &self.mapping
    }

    pub fn normalize(&self, record: &RawRecord) -> Interaction {
        self.normalize_with_report(record).0
    }

    /// Normalize any JSON value; non-objects are treated as an empty record.
    pub fn normalize_value(&self, value: &Value) -> Interaction {
        match value.as_object() {
            Some(record) => self.normalize(record),
            None => self.normalize(&RawRecord::new()),
        }
    }

    pub fn normalize_with_report(&self, record: &RawRecord) -> (Interaction, NormalizationReport) {
        let mut report = NormalizationReport::default();

        let id = report.record(
            "id",
            self.id.resolve_or_else(record, || Resolved {
                value: synthesize_id(),
                source: FieldSource::Synthesized,
            }),
        );
        let agent_name = report.record(
            "agent_name",
            self.agent_name.resolve_or(record, DEFAULT_AGENT_NAME.to_string()),
        );
        let transcript = report.record(
            "transcript",
            self.transcript
                .resolve(record)
                .map(|r| Resolved {
                    value: Some(r.value),
                    source: r.source,
                })
                .unwrap_or(Resolved {
                    value: None,
                    source: FieldSource::Missing,
                }),
        );
        let date = report.record(
            "date",
            self.date.resolve_or_else(record, || Resolved {
                value: Utc::now().date_naive(),
                source: FieldSource::Defaulted,
            }),
        );

        let mut values = [0.0_f64; 7];
        let mut resolved_start = Metric::SentimentStart.fixed_default();
        for (slot, (metric, cascade)) in values.iter_mut().zip(&self.metrics) {
            let default = match metric {
                Metric::SentimentEnd => sentiment_end_default(resolved_start),
                _ => metric.fixed_default(),
            };
            *slot = report.record(metric.field_name(), cascade.resolve_or(record, default));
            if *metric == Metric::SentimentStart {
                resolved_start = *slot;
            }
        }
        let [sentiment_start, sentiment_end, positive_sentiment, negative_sentiment, crosstalk_score, mutual_silence_score, nontalk_score] =
            values;

        let issue_type = report.record(
            "issue_type",
            self.issue_type.resolve_or(record, DEFAULT_ISSUE_TYPE.to_string()),
        );
        let description = report.record(
            "description",
            self.description.resolve_or(record, DEFAULT_DESCRIPTION.to_string()),
        );
        let resolution = report.record(
            "resolution",
            self.resolution.resolve_or(record, DEFAULT_RESOLUTION.to_string()),
        );
        let coaching_recommendations = report.record(
            "coaching_recommendations",
            self.coaching.resolve_or(record, vec![DEFAULT_COACHING.to_string()]),
        );
        let greeting_text = report.record(
            "greeting_text",
            self.greeting_text.resolve_or(record, DEFAULT_GREETING_TEXT.to_string()),
        );
        let has_greeting = report.record(
            "has_greeting",
            self.has_greeting.resolve_or(record, DEFAULT_HAS_GREETING),
        );
        let behavior = report.record(
            "behavior",
            self.behavior.resolve_or(record, DEFAULT_BEHAVIOR.to_string()),
        );
        let compliance_score = report.record(
            "compliance_score",
            self.compliance.resolve_or(record, DEFAULT_COMPLIANCE.to_string()),
        );

        let defaulted = report.defaulted();
        if !defaulted.is_empty() {
            tracing::trace!("Interaction {} used fallbacks for {:?}", id, defaulted);
        }

        let interaction = Interaction {
            id,
            date,
            agent_name,
            issue_type,
            description,
            sentiment_start,
            sentiment_end,
            positive_sentiment,
            negative_sentiment,
            crosstalk_score,
            mutual_silence_score,
            nontalk_score,
            resolution,
            coaching_recommendations,
            greeting_text,
            has_greeting,
            behavior,
            compliance_score,
            transcript,
        };
        (interaction, report)
    }
}

/// Normalize one record against `mapping`.
pub fn normalize(record: &RawRecord, mapping: &FieldMapping) -> Interaction {
    ResponseNormalizer::new(mapping.clone()).normalize(record)
}

/// Normalize every object in `records`, deriving the mapping from the first
/// object when one exists and falling back to `fallback_mapping` otherwise.
/// Non-object elements are skipped.
pub fn normalize_records(records: &[Value], fallback_mapping: &FieldMapping) -> Vec<Interaction> {
    let objects: Vec<&RawRecord> = records.iter().filter_map(Value::as_object).collect();
    let mapping = objects
        .first()
        .map(|sample| FieldMapping::from_sample(sample))
        .unwrap_or_else(|| fallback_mapping.clone());
    let normalizer = ResponseNormalizer::new(mapping);
    objects
        .into_iter()
        .map(|record| normalizer.normalize(record))
        .collect()
}

fn literal_cascade<T: 'static>(fields: &[&str], parse: fn(&Value) -> Option<T>) -> Cascade<T> {
    Cascade::new().literal(fields.iter().copied(), parse)
}

/// `INT-<unix millis>-<9 random hex chars>`.
pub fn synthesize_id() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", ID_PREFIX, Utc::now().timestamp_millis(), &suffix[..9])
}
