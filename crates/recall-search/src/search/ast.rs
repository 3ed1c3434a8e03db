//! Condition tree produced by the query parser.

use std::fmt;

use serde::Serialize;

/// A compiled query condition.
///
/// Trees are built once per query and never mutated; the evaluator walks
/// them read-only for every record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// True iff every child matches. An empty `And` matches everything.
    And(Vec<Condition>),

    /// True iff any child matches. An empty `Or` matches nothing.
    Or(Vec<Condition>),

    /// True iff the child does not match.
    Not(Box<Condition>),

    /// Compares the value resolved for `field` against `value`.
    ///
    /// A field starting with `@` is looked up in the record's custom fields
    /// only; `@*` stands for all searchable custom-field values.
    FieldOp {
        /// Dotted path or `@`-prefixed custom-field name.
        field: String,
        /// How the resolved value is compared.
        op: Operator,
        /// The operand.
        value: Value,
    },
}

impl Condition {
    /// Creates an AND over the given conditions.
    pub fn and(children: Vec<Condition>) -> Self {
        Condition::And(children)
    }

    /// Creates an OR over the given conditions.
    pub fn or(children: Vec<Condition>) -> Self {
        Condition::Or(children)
    }

    /// Creates a NOT of the given condition.
    ///
    /// # Example
    ///
    /// ```
    /// use recall_search::search::{Condition, Operator};
    ///
    /// let cond = Condition::negate(Condition::field("tag", Operator::Equals, "skip"));
    /// assert!(matches!(cond, Condition::Not(_)));
    /// ```
    pub fn negate(inner: Condition) -> Self {
        Condition::Not(Box::new(inner))
    }

    /// Creates a field comparison.
    pub fn field(field: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        Condition::FieldOp {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// Matches records where `field` is the empty string or absent.
    pub fn is_null(field: &str) -> Self {
        Condition::or(vec![
            Condition::field(field, Operator::Equals, ""),
            Condition::field(field, Operator::Exists, false),
        ])
    }

    /// Calls `f` for every `FieldOp` in the tree, depth first.
    pub fn visit_field_ops<'a>(&'a self, f: &mut impl FnMut(&'a str, Operator, &'a Value)) {
        match self {
            Condition::And(children) | Condition::Or(children) => {
                for child in children {
                    child.visit_field_ops(f);
                }
            }
            Condition::Not(inner) => inner.visit_field_ops(f),
            Condition::FieldOp { field, op, value } => f(field, *op, value),
        }
    }
}

/// Comparison applied by a [`Condition::FieldOp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// Equality, or membership when the field resolves to a list.
    Equals,
    /// Case-insensitive regex search.
    Regex,
    /// Plain substring containment.
    Substring,
    /// Plain prefix test.
    StartsWith,
    /// Presence test; the operand is a boolean.
    Exists,
    /// `>=`
    Gte,
    /// `>`
    Gt,
    /// `<=`
    Lte,
    /// `<`
    Lt,
}

/// Operand of a [`Condition::FieldOp`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// The absence marker.
    Null,
    /// A boolean.
    Bool(bool),
    /// An integer.
    Number(i64),
    /// A string; comparisons may still coerce it to an integer or a date.
    String(String),
}

impl Value {
    /// Returns the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Set-level modifier applied to the whole collection before filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SetModifier {
    /// `is:duplicate`: only records whose front is shared with another record.
    Duplicate,
    /// `is:distinct`: one record per note key.
    Distinct,
}

/// The result of compiling a query string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedQuery {
    /// The filter condition.
    pub condition: Condition,

    /// Sort field requested with `sortBy:`, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,

    /// Whether the `sortBy:` term was negated. Meaningless without `sort_by`.
    pub descending: bool,

    /// Set-level modifier requested with `is:duplicate` or `is:distinct`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier: Option<SetModifier>,
}

impl ParsedQuery {
    /// Wraps a condition with no sort request and no modifier.
    pub fn new(condition: Condition) -> Self {
        Self {
            condition,
            sort_by: None,
            descending: false,
            modifier: None,
        }
    }

    /// Returns the sort field, falling back to `default`.
    pub fn sort_field_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.sort_by.as_deref().unwrap_or(default)
    }
}
