//! Type-aware ordering of records by one field.
//!
//! Field values of any shape are normalized into a [`SortKey`]:
//!
//! - absent and `false` sort first (negative infinity)
//! - integers sort numerically
//! - everything else sorts as text, after all numbers
//! - `true` sorts last, after all text

use std::cmp::Ordering;

use serde_json::Value as JsonValue;

use super::resolve::{resolve_field, Resolved};
use crate::record::Record;

/// A normalized sort key.
#[derive(Debug, Clone)]
pub enum SortKey {
    /// Numeric keys, including the negative infinity used for absent and `false`.
    Number(f64),
    /// Text keys. Always greater than any number.
    Text(String),
    /// `true`. Greater than everything else.
    Top,
}

impl SortKey {
    /// Normalizes a resolved field value.
    pub fn from_resolved(resolved: &Resolved<'_>) -> Self {
        match resolved {
            Resolved::Absent => SortKey::Number(f64::NEG_INFINITY),
            Resolved::One(value) => Self::from_value(value),
            Resolved::Many(items) => {
                SortKey::Text(serde_json::to_string(items).unwrap_or_default())
            }
        }
    }

    fn from_value(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => SortKey::Number(f64::NEG_INFINITY),
            JsonValue::Bool(true) => SortKey::Top,
            JsonValue::Bool(false) => SortKey::Number(f64::NEG_INFINITY),
            JsonValue::Number(n) if n.is_i64() || n.is_u64() => {
                SortKey::Number(n.as_f64().unwrap_or_default())
            }
            JsonValue::String(s) => SortKey::Text(s.clone()),
            other => SortKey::Text(other.to_string()),
        }
    }

    /// Computes the key for `field` on `record`.
    pub fn for_record(record: &Record, field: &str) -> Self {
        Self::from_resolved(&resolve_field(record, field, true))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Top, SortKey::Top) => Ordering::Equal,
            (SortKey::Top, _) => Ordering::Greater,
            (_, SortKey::Top) => Ordering::Less,
            (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
            (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey {}

/// Returns a comparator ordering records by `field`.
///
/// # Example
///
/// ```
/// use recall_search::Record;
/// use recall_search::search::compare_key;
/// use serde_json::json;
///
/// let mut cards: Vec<Record> = [json!({"srsLevel": 3}), json!({"srsLevel": 1})]
///     .into_iter()
///     .filter_map(Record::from_value)
///     .collect();
///
/// cards.sort_by(compare_key("srsLevel", false));
/// assert_eq!(cards[0].get("srsLevel"), Some(&json!(1)));
/// ```
pub fn compare_key(field: &str, descending: bool) -> impl Fn(&Record, &Record) -> Ordering + '_ {
    move |a: &Record, b: &Record| {
        let ordering = SortKey::for_record(a, field).cmp(&SortKey::for_record(b, field));
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

/// Stably sorts records by `field`, computing each key once.
pub fn sort_records(records: &mut Vec<&Record>, field: &str, descending: bool) {
    let mut keyed: Vec<(SortKey, &Record)> = records
        .iter()
        .map(|r| (SortKey::for_record(r, field), *r))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| {
        let ordering = a.cmp(b);
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    });

    *records = keyed.into_iter().map(|(_, r)| r).collect();
}
