//! Condition evaluation against records.
//!
//! This module provides the [`QueryEvaluator`] for testing compiled
//! conditions against card records.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use recall_search::Record;
//! use recall_search::search::{QueryEvaluator, QueryParser};
//! use serde_json::json;
//!
//! let query = QueryParser::new(Utc::now()).parse("deck:japanese -tag:skip").unwrap();
//! let evaluator = QueryEvaluator::new(&query.condition);
//!
//! let card = Record::from_value(json!({
//!     "front": "猫",
//!     "deck": "Japanese::Animals",
//!     "tag": ["noun"],
//! }))
//! .unwrap();
//!
//! assert!(evaluator.matches(&card));
//! ```

use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::{Regex, RegexBuilder};
use serde_json::Value as JsonValue;

use super::ast::{Condition, Operator, Value};
use super::resolve::{resolve_field, Resolved};
use crate::record::Record;

/// Layouts accepted for timestamps without an offset. Read as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Evaluates a compiled condition against records.
///
/// Regex operands are compiled once, when the evaluator is built. The
/// evaluator holds no mutable state and can be shared between threads.
#[derive(Debug)]
pub struct QueryEvaluator<'a> {
    condition: &'a Condition,
    patterns: HashMap<String, Regex>,
}

impl<'a> QueryEvaluator<'a> {
    /// Creates an evaluator for `condition`.
    ///
    /// Patterns that fail to compile are logged and never match.
    pub fn new(condition: &'a Condition) -> Self {
        let mut patterns = HashMap::new();
        condition.visit_field_ops(&mut |_, op, value| {
            if op != Operator::Regex {
                return;
            }
            let pattern = value.to_string();
            if patterns.contains_key(&pattern) {
                return;
            }
            match RegexBuilder::new(&pattern).case_insensitive(true).build() {
                Ok(re) => {
                    patterns.insert(pattern, re);
                }
                Err(err) => log::debug!("pattern {pattern:?} never matches: {err}"),
            }
        });

        Self {
            condition,
            patterns,
        }
    }

    /// Returns the condition being evaluated.
    pub fn condition(&self) -> &'a Condition {
        self.condition
    }

    /// Returns true if the record matches the condition.
    pub fn matches(&self, record: &Record) -> bool {
        self.evaluate(self.condition, record)
    }

    /// Filters a slice of records, returning only those that match.
    pub fn filter_records<'b>(&self, records: &'b [Record]) -> Vec<&'b Record> {
        records.iter().filter(|r| self.matches(r)).collect()
    }

    fn evaluate(&self, condition: &Condition, record: &Record) -> bool {
        match condition {
            Condition::And(children) => children.iter().all(|c| self.evaluate(c, record)),
            Condition::Or(children) => children.iter().any(|c| self.evaluate(c, record)),
            Condition::Not(inner) => !self.evaluate(inner, record),
            Condition::FieldOp { field, op, value } => {
                let resolved = resolve_field(record, field, true);
                self.compare(&resolved, *op, value)
            }
        }
    }

    /// Applies one operator to a resolved field value.
    fn compare(&self, resolved: &Resolved<'_>, op: Operator, operand: &Value) -> bool {
        match op {
            Operator::Equals => match resolved {
                Resolved::Absent => *operand == Value::Null,
                Resolved::One(v) => json_equals(v, operand),
                Resolved::Many(items) => items.iter().any(|v| json_equals(v, operand)),
            },
            Operator::Regex => {
                let Some(re) = self.patterns.get(&operand.to_string()) else {
                    return false;
                };
                any_text(resolved, |text| re.is_match(text))
            }
            Operator::Substring => {
                let needle = operand.to_string();
                any_text(resolved, |text| text.contains(needle.as_str()))
            }
            Operator::StartsWith => {
                let prefix = operand.to_string();
                any_text(resolved, |text| text.starts_with(prefix.as_str()))
            }
            Operator::Exists => !resolved.is_absent() == truthy(operand),
            Operator::Gte | Operator::Gt | Operator::Lte | Operator::Lt => {
                let Resolved::One(v) = resolved else {
                    return false;
                };
                let Some(ordering) = compare_values(v, operand) else {
                    log::trace!("cannot compare {v} with {operand}");
                    return false;
                };
                match op {
                    Operator::Gte => ordering != Ordering::Less,
                    Operator::Gt => ordering == Ordering::Greater,
                    Operator::Lte => ordering != Ordering::Greater,
                    _ => ordering == Ordering::Less,
                }
            }
        }
    }
}

/// Returns true if `condition` matches `record`.
///
/// Compiles the condition's patterns on every call; build a
/// [`QueryEvaluator`] once when testing many records.
pub fn matches(condition: &Condition, record: &Record) -> bool {
    QueryEvaluator::new(condition).matches(record)
}

/// Tests a text predicate against a scalar, or against any element of a list.
fn any_text(resolved: &Resolved<'_>, predicate: impl Fn(&str) -> bool) -> bool {
    match resolved {
        Resolved::Absent => false,
        Resolved::One(v) => predicate(&text_of(v)),
        Resolved::Many(items) => items.iter().any(|v| predicate(&text_of(v))),
    }
}

/// Renders a JSON value as the text that text operators see.
fn text_of(value: &JsonValue) -> Cow<'_, str> {
    match value {
        JsonValue::String(s) => Cow::Borrowed(s),
        JsonValue::Null => Cow::Borrowed(""),
        other => Cow::Owned(other.to_string()),
    }
}

fn json_equals(value: &JsonValue, operand: &Value) -> bool {
    match (value, operand) {
        (JsonValue::Null, Value::Null) => true,
        (JsonValue::String(a), Value::String(b)) => a == b,
        (JsonValue::Bool(a), Value::Bool(b)) => a == b,
        (JsonValue::Number(a), Value::Number(b)) => {
            a.as_i64() == Some(*b) || a.as_f64().is_some_and(|f| f == *b as f64)
        }
        _ => false,
    }
}

fn truthy(operand: &Value) -> bool {
    match operand {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => *n != 0,
        Value::String(s) => !s.is_empty(),
    }
}

/// Orders a record value against an operand.
///
/// Both sides are first coerced to integers; if either side does not
/// coerce, they are compared as given. Returns `None` when the two values
/// have no common ordering.
fn compare_values(value: &JsonValue, operand: &Value) -> Option<Ordering> {
    if let (Some(a), Some(b)) = (json_as_int(value), value_as_int(operand)) {
        return Some(a.cmp(&b));
    }

    match (value, operand) {
        (JsonValue::String(a), Value::String(b)) => Some(compare_text(a, b)),
        (JsonValue::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&(*b as f64)),
        _ => None,
    }
}

fn json_as_int(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Bool(b) => Some(i64::from(*b)),
        JsonValue::Number(n) => n.as_i64().or_else(|| {
            let f = n.as_f64()?.trunc();
            (f.is_finite() && f >= i64::MIN as f64 && f <= i64::MAX as f64).then_some(f as i64)
        }),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Number(n) => Some(*n),
        Value::String(s) => s.trim().parse().ok(),
    }
}

/// Compares two strings as instants when both look like dates, else as text.
fn compare_text(a: &str, b: &str) -> Ordering {
    match (parse_instant(a), parse_instant(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

/// Parses RFC 3339, `YYYY-MM-DD HH:MM[:SS[.f]]` or `YYYY-MM-DD`.
///
/// Timestamps without an offset are read as UTC.
pub fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod instant_tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_instant_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(parse_instant("2024-03-01T12:30:00Z"), Some(expected));
        assert_eq!(parse_instant("2024-03-01T14:30:00+02:00"), Some(expected));
        assert_eq!(parse_instant("2024-03-01T12:30:00"), Some(expected));
        assert_eq!(parse_instant("2024-03-01 12:30:00.000"), Some(expected));
        assert_eq!(parse_instant("2024-03-01 12:30"), Some(expected));
        assert_eq!(
            parse_instant("2024-03-01"),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_instant("yesterday"), None);
        assert_eq!(parse_instant("2024"), None);
    }

    #[test]
    fn test_compare_text_uses_instants() {
        // Lexically ' ' < 'T', but 13:00 is later than 12:00.
        assert_eq!(
            compare_text("2024-03-01 13:00:00", "2024-03-01T12:00:00Z"),
            Ordering::Greater
        );
        assert_eq!(compare_text("apple", "banana"), Ordering::Less);
    }

    #[test]
    fn test_compare_values_coerces_integers() {
        assert_eq!(compare_values(&JsonValue::from("10"), &Value::from("9")), Some(Ordering::Greater));
        assert_eq!(compare_values(&JsonValue::from(3), &Value::from("3")), Some(Ordering::Equal));
        assert_eq!(compare_values(&JsonValue::from(3.7), &Value::Number(3)), Some(Ordering::Equal));
        assert_eq!(compare_values(&JsonValue::from(true), &Value::Number(1)), Some(Ordering::Equal));
    }

    #[test]
    fn test_compare_values_type_mismatch() {
        assert_eq!(compare_values(&JsonValue::from(3), &Value::from("abc")), None);
        assert_eq!(compare_values(&JsonValue::from("abc"), &Value::Number(3)), None);
        assert_eq!(compare_values(&JsonValue::Null, &Value::Number(3)), None);
    }
}
