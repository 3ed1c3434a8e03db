//! Field resolution against records.
//!
//! A field name is resolved in two steps: a dotted-path lookup on the
//! record's own columns, then a lookup in its custom fields under the same
//! name. The two results are merged into one [`Resolved`] value.

use serde_json::Value as JsonValue;

use crate::record::Record;

/// Fields that never fall back to custom fields.
pub const NO_CUSTOM_FALLBACK: &[&str] = &["nextReview", "srsLevel"];

/// Prefix addressing custom fields directly.
pub const CUSTOM_FIELD_PREFIX: char = '@';

/// The value a field name resolves to on one record.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<'a> {
    /// Nothing found, or JSON `null`, or an empty object.
    Absent,
    /// A single non-list value.
    One(&'a JsonValue),
    /// A list: a JSON array, a `*` fan-out, or several merged sources.
    Many(Vec<&'a JsonValue>),
}

impl<'a> Resolved<'a> {
    /// Classifies a JSON value.
    pub fn from_value(value: &'a JsonValue) -> Self {
        match value {
            JsonValue::Null => Resolved::Absent,
            JsonValue::Object(map) if map.is_empty() => Resolved::Absent,
            JsonValue::Array(items) => Resolved::Many(items.iter().collect()),
            other => Resolved::One(other),
        }
    }

    /// Returns true if nothing was found.
    pub fn is_absent(&self) -> bool {
        matches!(self, Resolved::Absent)
    }

    /// Combines a column value with a custom-field value.
    ///
    /// Absent sides are dropped; anything else is concatenated into a list,
    /// column values first.
    pub fn merge(self, other: Resolved<'a>) -> Resolved<'a> {
        match (self, other) {
            (left, Resolved::Absent) => left,
            (Resolved::Absent, right) => right,
            (Resolved::One(a), Resolved::One(b)) => Resolved::Many(vec![a, b]),
            (Resolved::One(a), Resolved::Many(mut bs)) => {
                bs.insert(0, a);
                Resolved::Many(bs)
            }
            (Resolved::Many(mut a), Resolved::One(b)) => {
                a.push(b);
                Resolved::Many(a)
            }
            (Resolved::Many(mut a), Resolved::Many(b)) => {
                a.extend(b);
                Resolved::Many(a)
            }
        }
    }
}

/// Position reached while walking a dotted path.
enum Cursor<'a> {
    Node(&'a JsonValue),
    Fan(Vec<&'a JsonValue>),
    /// A missing key; behaves like an empty object.
    Missing,
}

/// Resolves a dotted path against a record's columns.
///
/// - A segment on an object selects a key; `*` selects all its values.
/// - A segment on a list must be an integer index; negative indexes count
///   from the end. A bad index resolves to absent.
/// - A segment on a scalar stops the walk at that scalar.
pub fn resolve_path<'a>(record: &'a Record, path: &str) -> Resolved<'a> {
    let mut segments = path.split('.');
    let Some(first) = segments.next() else {
        return Resolved::Absent;
    };

    let fields = record.fields();
    let mut cursor = if first == "*" {
        Cursor::Fan(fields.values().collect())
    } else {
        fields.get(first).map_or(Cursor::Missing, Cursor::Node)
    };

    for segment in segments {
        cursor = match cursor {
            Cursor::Node(JsonValue::Object(map)) => {
                if segment == "*" {
                    Cursor::Fan(map.values().collect())
                } else {
                    map.get(segment).map_or(Cursor::Missing, Cursor::Node)
                }
            }
            Cursor::Node(JsonValue::Array(items)) => match index(items.len(), segment) {
                Some(i) => Cursor::Node(&items[i]),
                None => return Resolved::Absent,
            },
            Cursor::Fan(items) => match index(items.len(), segment) {
                Some(i) => Cursor::Node(items[i]),
                None => return Resolved::Absent,
            },
            Cursor::Missing if segment == "*" => Cursor::Fan(Vec::new()),
            Cursor::Missing => Cursor::Missing,
            Cursor::Node(scalar) => return Resolved::from_value(scalar),
        };
    }

    match cursor {
        Cursor::Node(value) => Resolved::from_value(value),
        Cursor::Fan(items) => Resolved::Many(items),
        Cursor::Missing => Resolved::Absent,
    }
}

/// Converts a path segment into a list index.
fn index(len: usize, segment: &str) -> Option<usize> {
    let i: i64 = segment.trim().parse().ok()?;
    let len = i64::try_from(len).ok()?;
    let i = if i < 0 { len + i } else { i };
    if (0..len).contains(&i) {
        usize::try_from(i).ok()
    } else {
        None
    }
}

/// Resolves a name against the record's custom fields.
///
/// `*` returns every searchable value; any other name is matched against
/// entry keys, ignoring case.
pub fn resolve_custom<'a>(record: &'a Record, key: &str) -> Resolved<'a> {
    if key == "*" {
        return record
            .searchable_custom_values()
            .map_or(Resolved::Absent, Resolved::Many);
    }

    record
        .custom_field(key)
        .map_or(Resolved::Absent, Resolved::from_value)
}

/// Resolves a field name the way conditions and sort keys see it.
///
/// `@name` reads only custom fields. Other names read the dotted path and,
/// when `merge_custom` is set and the field is not in
/// [`NO_CUSTOM_FALLBACK`], also the custom field of the same name.
pub fn resolve_field<'a>(record: &'a Record, field: &str, merge_custom: bool) -> Resolved<'a> {
    if let Some(key) = field.strip_prefix(CUSTOM_FIELD_PREFIX) {
        return resolve_custom(record, key);
    }

    let resolved = resolve_path(record, field);
    if !merge_custom || NO_CUSTOM_FALLBACK.contains(&field) {
        return resolved;
    }

    resolved.merge(resolve_custom(record, field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: JsonValue) -> Record {
        Record::from_value(value).unwrap()
    }

    #[test]
    fn test_top_level_field() {
        let r = record(json!({"front": "漢字", "srsLevel": 2}));
        assert_eq!(resolve_path(&r, "front"), Resolved::One(&json!("漢字")));
        assert_eq!(resolve_path(&r, "srsLevel"), Resolved::One(&json!(2)));
    }

    #[test]
    fn test_missing_and_null_are_absent() {
        let r = record(json!({"nextReview": null, "stat": {}}));
        assert_eq!(resolve_path(&r, "nextReview"), Resolved::Absent);
        assert_eq!(resolve_path(&r, "missing"), Resolved::Absent);
        assert_eq!(resolve_path(&r, "missing.deeper"), Resolved::Absent);
        assert_eq!(resolve_path(&r, "stat"), Resolved::Absent);
    }

    #[test]
    fn test_list_field_resolves_to_many() {
        let r = record(json!({"tag": ["a", "b"]}));
        assert_eq!(
            resolve_path(&r, "tag"),
            Resolved::Many(vec![&json!("a"), &json!("b")])
        );
    }

    #[test]
    fn test_nested_object_and_index() {
        let r = record(json!({
            "stat": {"streak": {"right": 3, "wrong": 1}},
            "tag": ["first", "second", "last"]
        }));
        assert_eq!(resolve_path(&r, "stat.streak.right"), Resolved::One(&json!(3)));
        assert_eq!(resolve_path(&r, "tag.0"), Resolved::One(&json!("first")));
        assert_eq!(resolve_path(&r, "tag.-1"), Resolved::One(&json!("last")));
        assert_eq!(resolve_path(&r, "tag.3"), Resolved::Absent);
        assert_eq!(resolve_path(&r, "tag.x"), Resolved::Absent);
    }

    #[test]
    fn test_wildcard_fans_out_object() {
        let r = record(json!({"stat": {"right": 3, "wrong": 1}}));
        assert_eq!(
            resolve_path(&r, "stat.*"),
            Resolved::Many(vec![&json!(3), &json!(1)])
        );
        assert_eq!(resolve_path(&r, "stat.*.1"), Resolved::One(&json!(1)));
        assert_eq!(resolve_path(&r, "missing.*"), Resolved::Many(vec![]));
    }

    #[test]
    fn test_segment_on_scalar_stops_walk() {
        let r = record(json!({"front": "text"}));
        assert_eq!(resolve_path(&r, "front.length"), Resolved::One(&json!("text")));
    }

    #[test]
    fn test_merge_rules() {
        let a = json!("a");
        let b = json!("b");
        let c = json!("c");

        assert_eq!(Resolved::Absent.merge(Resolved::Absent), Resolved::Absent);
        assert_eq!(Resolved::One(&a).merge(Resolved::Absent), Resolved::One(&a));
        assert_eq!(Resolved::Absent.merge(Resolved::One(&a)), Resolved::One(&a));
        assert_eq!(
            Resolved::One(&a).merge(Resolved::One(&b)),
            Resolved::Many(vec![&a, &b])
        );
        assert_eq!(
            Resolved::One(&a).merge(Resolved::Many(vec![&b, &c])),
            Resolved::Many(vec![&a, &b, &c])
        );
        assert_eq!(
            Resolved::Many(vec![&a, &b]).merge(Resolved::One(&c)),
            Resolved::Many(vec![&a, &b, &c])
        );
        assert_eq!(
            Resolved::Many(vec![&a]).merge(Resolved::Many(vec![&b, &c])),
            Resolved::Many(vec![&a, &b, &c])
        );
    }

    #[test]
    fn test_field_merges_custom_field() {
        let r = record(json!({
            "front": "column",
            "tag": ["t1"],
            "data": [
                {"key": "Front", "value": "custom"},
                {"key": "tag", "value": "t2"},
                {"key": "reading", "value": "よみ"}
            ]
        }));
        assert_eq!(
            resolve_field(&r, "front", true),
            Resolved::Many(vec![&json!("column"), &json!("custom")])
        );
        assert_eq!(
            resolve_field(&r, "tag", true),
            Resolved::Many(vec![&json!("t1"), &json!("t2")])
        );
        assert_eq!(resolve_field(&r, "reading", true), Resolved::One(&json!("よみ")));
        assert_eq!(resolve_field(&r, "front", false), Resolved::One(&json!("column")));
    }

    #[test]
    fn test_excluded_fields_skip_custom_fallback() {
        let r = record(json!({
            "data": [
                {"key": "nextReview", "value": "2020-01-01"},
                {"key": "srsLevel", "value": "3"}
            ]
        }));
        assert_eq!(resolve_field(&r, "nextReview", true), Resolved::Absent);
        assert_eq!(resolve_field(&r, "srsLevel", true), Resolved::Absent);
    }

    #[test]
    fn test_custom_prefix_bypasses_columns() {
        let r = record(json!({
            "front": "column",
            "data": [
                {"key": "front", "value": "custom"},
                {"key": "hidden", "value": "@nosearch\nsecret"}
            ]
        }));
        assert_eq!(resolve_field(&r, "@front", true), Resolved::One(&json!("custom")));
        assert_eq!(
            resolve_field(&r, "@*", true),
            Resolved::Many(vec![&json!("custom")])
        );
        assert_eq!(resolve_field(&r, "@missing", true), Resolved::Absent);
    }

    #[test]
    fn test_custom_wildcard_without_data_is_absent() {
        let r = record(json!({"front": "a"}));
        assert_eq!(resolve_field(&r, "@*", true), Resolved::Absent);
    }
}
