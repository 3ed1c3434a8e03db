//! Card records as supplied by the external store.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Field holding the ordered list of `{key, value}` custom-field entries.
pub const CUSTOM_FIELDS_KEY: &str = "data";

/// Prefix marking a custom-field value as excluded from `@*` searches.
pub const NO_SEARCH_MARKER: &str = "@nosearch\n";

/// One searchable card.
///
/// A record is an opaque JSON object. Besides its fixed columns (`front`,
/// `deck`, `tag`, `nextReview`, ...) it may carry custom fields under
/// `data` as `[{"key": "...", "value": "..."}]`. Records are never mutated
/// by the search code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, JsonValue>);

impl Record {
    /// Wraps a JSON object.
    pub fn new(fields: Map<String, JsonValue>) -> Self {
        Self(fields)
    }

    /// Wraps a JSON value if it is an object.
    pub fn from_value(value: JsonValue) -> Option<Self> {
        match value {
            JsonValue::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    /// Returns the underlying object.
    pub fn fields(&self) -> &Map<String, JsonValue> {
        &self.0
    }

    /// Returns a top-level field. JSON `null` reads as absent.
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// Returns a top-level field if it is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(JsonValue::as_str)
    }

    /// Iterates the well-formed `{key, value}` custom-field entries in order.
    ///
    /// Returns `None` if the record has no custom-field list at all.
    fn custom_entries(&self) -> Option<impl Iterator<Item = (&str, &JsonValue)> + '_> {
        let entries = self.0.get(CUSTOM_FIELDS_KEY)?.as_array()?;
        Some(entries.iter().filter_map(|entry| {
            let key = entry.get("key")?.as_str()?;
            let value = entry.get("value")?;
            Some((key, value))
        }))
    }

    /// Looks up a custom field by key, ignoring case. The first match wins.
    pub fn custom_field(&self, key: &str) -> Option<&JsonValue> {
        let key = key.to_lowercase();
        self.custom_entries()?
            .find(|(k, _)| k.to_lowercase() == key)
            .map(|(_, v)| v)
    }

    /// Returns every string custom-field value not marked `@nosearch`.
    ///
    /// Returns `None` if the record has no custom-field list at all.
    pub fn searchable_custom_values(&self) -> Option<Vec<&JsonValue>> {
        let values = self
            .custom_entries()?
            .map(|(_, v)| v)
            .filter(|v| v.as_str().is_some_and(|s| !s.starts_with(NO_SEARCH_MARKER)))
            .collect();
        Some(values)
    }
}

impl From<Map<String, JsonValue>> for Record {
    fn from(fields: Map<String, JsonValue>) -> Self {
        Self(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: JsonValue) -> Record {
        Record::from_value(value).unwrap()
    }

    #[test]
    fn test_from_value_requires_object() {
        assert!(Record::from_value(json!({"front": "a"})).is_some());
        assert!(Record::from_value(json!(["front"])).is_none());
        assert!(Record::from_value(json!("front")).is_none());
    }

    #[test]
    fn test_get_treats_null_as_absent() {
        let r = record(json!({"front": "a", "nextReview": null}));
        assert_eq!(r.get_str("front"), Some("a"));
        assert!(r.get("nextReview").is_none());
        assert!(r.get("missing").is_none());
    }

    #[test]
    fn test_custom_field_is_case_insensitive() {
        let r = record(json!({
            "data": [
                {"key": "Reading", "value": "かんじ"},
                {"key": "reading", "value": "second"}
            ]
        }));
        assert_eq!(r.custom_field("READING"), Some(&json!("かんじ")));
        assert_eq!(r.custom_field("meaning"), None);
    }

    #[test]
    fn test_custom_field_skips_malformed_entries() {
        let r = record(json!({
            "data": [
                "garbage",
                {"key": 1, "value": "x"},
                {"key": "meaning"},
                {"key": "meaning", "value": "kanji"}
            ]
        }));
        assert_eq!(r.custom_field("meaning"), Some(&json!("kanji")));
    }

    #[test]
    fn test_searchable_values_skip_nosearch() {
        let r = record(json!({
            "data": [
                {"key": "a", "value": "visible"},
                {"key": "b", "value": "@nosearch\nhidden"},
                {"key": "c", "value": 3}
            ]
        }));
        assert_eq!(r.searchable_custom_values(), Some(vec![&json!("visible")]));
    }

    #[test]
    fn test_no_custom_fields() {
        let r = record(json!({"front": "a"}));
        assert_eq!(r.custom_field("front"), None);
        assert_eq!(r.searchable_custom_values(), None);

        let r = record(json!({"data": "not a list"}));
        assert_eq!(r.searchable_custom_values(), None);
    }

    #[test]
    fn test_serde_transparent() {
        let r: Record = serde_json::from_str(r#"{"front": "a", "tag": ["x"]}"#).unwrap();
        assert_eq!(r.get_str("front"), Some("a"));
        assert_eq!(serde_json::to_value(&r).unwrap(), json!({"front": "a", "tag": ["x"]}));
    }
}
