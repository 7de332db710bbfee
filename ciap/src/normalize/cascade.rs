//! First-success-wins extraction chains.
//!
//! A [`Cascade`] is an ordered list of steps; each step either produces a
//! value with its provenance or passes. Every cascade used by the normalizer
//! ends in a default, so resolution never fails.

use crate::discovery::field_mapping::RawRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a normalized value came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "field", rename_all = "snake_case")]
pub enum FieldSource {
    /// A field named by the inferred field mapping
    Mapped(String),
    /// A field from a fixed list of common names
    Literal(String),
    /// Generated because no source field matched
    Synthesized,
    /// Documented default value
    Defaulted,
    /// Left absent on purpose
    Missing,
}

impl FieldSource {
    pub fn is_fallback(&self) -> bool {
        matches!(
            self,
            FieldSource::Synthesized | FieldSource::Defaulted | FieldSource::Missing
        )
    }
}

/// A resolved value and its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    pub value: T,
    pub source: FieldSource,
}

/// Parses one JSON value into a field value.
pub type ValueParser<T> = fn(&Value) -> Option<T>;

type Step<T> = Box<dyn Fn(&RawRecord) -> Option<(T, FieldSource)> + Send + Sync>;

pub struct Cascade<T> {
    steps: Vec<Step<T>>,
}

impl<T: 'static> Cascade<T> {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Try each mapped field in order.
    pub fn mapped<I, S>(self, fields: I, parse: ValueParser<T>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        self.step(move |record| {
            first_parsed(record, &fields, parse).map(|(v, f)| (v, FieldSource::Mapped(f)))
        })
    }

    /// Try each literal field name in order.
    pub fn literal<I, S>(self, fields: I, parse: ValueParser<T>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        self.step(move |record| {
            first_parsed(record, &fields, parse).map(|(v, f)| (v, FieldSource::Literal(f)))
        })
    }

    /// Append an arbitrary step.
    pub fn step<F>(mut self, step: F) -> Self
    where
        F: Fn(&RawRecord) -> Option<(T, FieldSource)> + Send + Sync + 'static,
    {
        self.steps.push(Box::new(step));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// First step that yields a value, if any.
    pub fn resolve(&self, record: &RawRecord) -> Option<Resolved<T>> {
        self.steps
            .iter()
            .find_map(|step| step(record))
            .map(|(value, source)| Resolved { value, source })
    }

    pub fn resolve_or(&self, record: &RawRecord, default: T) -> Resolved<T> {
        self.resolve(record).unwrap_or(Resolved {
            value: default,
            source: FieldSource::Defaulted,
        })
    }

    pub fn resolve_or_else<F>(&self, record: &RawRecord, default: F) -> Resolved<T>
    where
        F: FnOnce() -> Resolved<T>,
    {
        self.resolve(record).unwrap_or_else(default)
    }
}

impl<T: 'static> Default for Cascade<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn first_parsed<T>(
    record: &RawRecord,
    fields: &[String],
    parse: ValueParser<T>,
) -> Option<(T, String)> {
    fields.iter().find_map(|field| {
        record
            .get(field)
            .and_then(parse)
            .map(|value| (value, field.clone()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_string(v: &Value) -> Option<String> {
        v.as_str().map(String::from)
    }

    fn record(value: Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_mapped_before_literal() {
        let cascade = Cascade::new()
            .mapped(["a", "b"], as_string)
            .literal(["c"], as_string);

        let r = cascade.resolve_or(&record(json!({"b": "from-b", "c": "from-c"})), "d".into());
        assert_eq!(r.value, "from-b");
        assert_eq!(r.source, FieldSource::Mapped("b".into()));

        let r = cascade.resolve_or(&record(json!({"c": "from-c"})), "d".into());
        assert_eq!(r.source, FieldSource::Literal("c".into()));

        let r = cascade.resolve_or(&record(json!({"a": 1})), "d".into());
        assert_eq!(r.value, "d");
        assert_eq!(r.source, FieldSource::Defaulted);
    }

    #[test]
    fn test_parse_failure_falls_through() {
        let cascade = Cascade::new().literal(["x", "y"], as_string);
        let r = cascade.resolve(&record(json!({"x": 5, "y": "ok"}))).unwrap();
        assert_eq!(r.value, "ok");
        assert_eq!(cascade.len(), 1);
    }

    #[test]
    fn test_custom_step_and_lazy_default() {
        let cascade: Cascade<f64> = Cascade::new().step(|r| {
            r.get("n").and_then(Value::as_f64).map(|n| (n * 2.0, FieldSource::Synthesized))
        });
        assert_eq!(cascade.resolve(&record(json!({"n": 2}))).unwrap().value, 4.0);
        let r = cascade.resolve_or_else(&record(json!({})), || Resolved {
            value: 7.0,
            source: FieldSource::Defaulted,
        });
        assert_eq!(r.value, 7.0);
        assert!(r.source.is_fallback());
    }
}
