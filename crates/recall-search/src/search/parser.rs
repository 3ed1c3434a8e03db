//! Compiles query strings into condition trees.

use chrono::{DateTime, SecondsFormat, Utc};
use regex::RegexBuilder;
use strsim::levenshtein;

use super::ast::{Condition, Operator, ParsedQuery, SetModifier, Value};
use super::error::{QueryError, QueryResult};
use super::lexer::{split, strip_brackets};
use super::timedelta::parse_timedelta;

/// Separator for alternatives. Binds loosest.
const OR_SEPARATOR: &str = " OR ";

/// Separators between AND-ed terms.
const TERM_SEPARATORS: &[&str] = &[" ", "\t", "\n"];

/// Operators that split a term into `field op value`.
const OPERATORS: &[&str] = &[":", ">=", ">", "<=", "<", "=", "~"];

/// Fields searched by a bare term, besides all custom fields.
pub const ANY_OF_FIELDS: &[&str] = &["template", "front", "mnemonic", "key", "deck", "tag"];

/// Fields holding timestamps; relative literals like `-3d` are resolved for these.
pub const DATE_FIELDS: &[&str] = &["created", "modified", "nextReview"];

/// Fields always matched as text by `:`.
pub const STRING_FIELDS: &[&str] = &["template", "front", "back", "mnemonic", "deck", "tag", "key"];

/// Field name standing for every searchable custom-field value.
pub const ANY_CUSTOM_FIELD: &str = "@*";

/// Literal that compiles to "empty or absent".
const NULL_LITERAL: &str = "NULL";

/// Recognised `is:` values.
const IS_VALUES: &[&str] = &["due", "leech", "new", "marked", "duplicate", "distinct"];

/// Maximum edit distance for "did you mean" suggestions.
const MAX_SUGGESTION_DISTANCE: usize = 2;

/// Formats an instant the way the parser embeds it into conditions.
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parser for card search queries.
///
/// # Grammar
///
/// ```text
/// query   ::= branch (" OR " branch)*
/// branch  ::= term (WS term)*
/// term    ::= "-"? (value | field op value)
/// op      ::= ":" | ">=" | ">" | "<=" | "<" | "=" | "~"
/// ```
///
/// Quotes and parentheses group text so that it is not split. `OR` binds
/// loosest; terms within a branch are AND-ed. A leading `-` negates a term,
/// except for `sortBy:` where it requests descending order.
///
/// # Special forms
///
/// - `is:due` - `nextReview <= now`
/// - `is:leech` - `srsLevel = 0`
/// - `is:new` - `nextReview` is NULL
/// - `is:marked` - `tag = marked`
/// - `is:duplicate`, `is:distinct` - set modifiers, see [`SetModifier`]
/// - `due:<v>` - `nextReview <= <v>`
/// - `sortBy:<field>` - sort request, no filter
/// - `<date field>:<delta>` - relative date, e.g. `created:-1w`
/// - `<field>:NULL` - empty or absent
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use recall_search::search::{Condition, QueryParser};
///
/// let parser = QueryParser::new(Utc::now());
/// let query = parser.parse("is:leech OR is:due").unwrap();
/// assert!(matches!(query.condition, Condition::Or(_)));
///
/// let query = parser.parse("deck:Japanese -sortBy:created").unwrap();
/// assert_eq!(query.sort_by.as_deref(), Some("created"));
/// assert!(query.descending);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct QueryParser {
    now: DateTime<Utc>,
}

/// One compiled term.
enum Term {
    Filter(Condition),
    Sort(String),
    Modifier(SetModifier),
}

/// Operator token as typed, before field-specific rewriting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TermOp {
    Colon,
    Gte,
    Gt,
    Lte,
    Lt,
    Eq,
    Tilde,
}

impl TermOp {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            ":" => Some(TermOp::Colon),
            ">=" => Some(TermOp::Gte),
            ">" => Some(TermOp::Gt),
            "<=" => Some(TermOp::Lte),
            "<" => Some(TermOp::Lt),
            "=" => Some(TermOp::Eq),
            "~" => Some(TermOp::Tilde),
            _ => None,
        }
    }
}

impl QueryParser {
    /// Creates a parser resolving `is:due` and relative dates against `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// Returns the instant this parser treats as "now".
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Parses a query string.
    ///
    /// An empty query compiles to an empty `And`, which matches every record.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidQuery`] if a term splits into neither one
    /// nor three tokens, [`QueryError::InvalidOperator`] if a triple has no
    /// operator in the middle, and [`QueryError::InvalidRegex`] if a `~`
    /// pattern does not compile.
    pub fn parse(&self, input: &str) -> QueryResult<ParsedQuery> {
        let query = self.parse_branches(input)?;
        log::debug!("compiled query {input:?} into {query:?}");
        Ok(query)
    }

    fn parse_branches(&self, input: &str) -> QueryResult<ParsedQuery> {
        let input = strip_brackets(input.trim());

        let parts = split(input, &[OR_SEPARATOR], true);
        if parts.iter().any(|p| p == OR_SEPARATOR) {
            return self.parse_alternatives(&parts);
        }

        let mut query = ParsedQuery::new(Condition::and(Vec::new()));
        let mut children = Vec::new();

        for term in split(input, TERM_SEPARATORS, false) {
            let (negated, body) = match term.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, term.as_str()),
            };

            match self.parse_term(&term, body)? {
                Term::Filter(cond) if negated => children.push(Condition::negate(cond)),
                Term::Filter(cond) => children.push(cond),
                Term::Sort(field) => {
                    query.sort_by = Some(field);
                    query.descending = negated;
                }
                Term::Modifier(modifier) => query.modifier = Some(modifier),
            }
        }

        query.condition = Condition::and(children);
        Ok(query)
    }

    /// Combines `OR` branches.
    ///
    /// `sortBy:` and set modifiers apply to the whole query wherever they
    /// appear. A branch made only of such terms adds no alternative.
    fn parse_alternatives(&self, parts: &[String]) -> QueryResult<ParsedQuery> {
        let mut query = ParsedQuery::new(Condition::and(Vec::new()));
        let mut branches = Vec::new();

        for part in parts.iter().filter(|p| *p != OR_SEPARATOR) {
            let branch = self.parse_branches(part)?;
            let directives_only = branch.condition == Condition::and(Vec::new())
                && (branch.sort_by.is_some() || branch.modifier.is_some());

            if branch.sort_by.is_some() {
                query.sort_by = branch.sort_by;
                query.descending = branch.descending;
            }
            if branch.modifier.is_some() {
                query.modifier = branch.modifier;
            }
            if !directives_only {
                branches.push(branch.condition);
            }
        }

        if !branches.is_empty() {
            query.condition = Condition::or(branches);
        }
        Ok(query)
    }

    fn parse_term(&self, term: &str, body: &str) -> QueryResult<Term> {
        let tokens = split(body, OPERATORS, true);
        match tokens.as_slice() {
            [value] => Ok(Term::Filter(any_of(value))),
            [field, op, value] => {
                let op = TermOp::from_token(op)
                    .ok_or_else(|| QueryError::invalid_operator(term, op.as_str()))?;
                self.parse_triple(field, op, value)
            }
            _ => Err(QueryError::invalid_query(term)),
        }
    }

    fn parse_triple(&self, field: &str, op: TermOp, value: &str) -> QueryResult<Term> {
        let (field, mut op, mut value) = match (field, value) {
            ("sortBy", v) => return Ok(Term::Sort(v.to_string())),
            ("is", "due") => (
                "nextReview",
                TermOp::Lte,
                Value::String(format_instant(self.now)),
            ),
            ("is", "leech") => ("srsLevel", TermOp::Eq, Value::Number(0)),
            ("is", "new") => ("nextReview", op, Value::from(NULL_LITERAL)),
            ("is", "marked") => ("tag", TermOp::Eq, Value::from("marked")),
            ("is", "duplicate") => return Ok(Term::Modifier(SetModifier::Duplicate)),
            ("is", "distinct") => return Ok(Term::Modifier(SetModifier::Distinct)),
            ("is", other) => {
                warn_unknown_is(other);
                ("is", op, Value::from(other))
            }
            ("due", v) => ("nextReview", TermOp::Lte, Value::from(v)),
            (f, v) => (f, op, Value::from(v)),
        };

        if value.as_str() == Some(NULL_LITERAL) {
            return Ok(Term::Filter(Condition::is_null(field)));
        }

        if DATE_FIELDS.contains(&field) {
            if let Some(instant) = value.as_str().and_then(|v| self.resolve_relative(v)) {
                value = Value::String(instant);
                if op == TermOp::Colon {
                    op = if field == "nextReview" {
                        TermOp::Lte
                    } else {
                        TermOp::Gte
                    };
                }
            }
        }

        let cond = match op {
            TermOp::Colon => {
                if value.as_str().is_some() || STRING_FIELDS.contains(&field) {
                    let pattern = regex::escape(&value.to_string());
                    Condition::field(field, Operator::Regex, pattern)
                } else {
                    Condition::field(field, Operator::Equals, value)
                }
            }
            TermOp::Tilde => {
                let pattern = value.to_string();
                validate_regex(&pattern)?;
                Condition::field(field, Operator::Regex, pattern)
            }
            TermOp::Gte => Condition::field(field, Operator::Gte, value),
            TermOp::Gt => Condition::field(field, Operator::Gt, value),
            TermOp::Lte => Condition::field(field, Operator::Lte, value),
            TermOp::Lt => Condition::field(field, Operator::Lt, value),
            TermOp::Eq => Condition::field(field, Operator::Equals, value),
        };

        Ok(Term::Filter(cond))
    }

    /// Resolves a relative literal to an absolute instant string.
    ///
    /// Values that are not relative literals are valid for date fields too
    /// (e.g. an absolute date), so failure is not an error here.
    fn resolve_relative(&self, literal: &str) -> Option<String> {
        match parse_timedelta(literal) {
            Ok(delta) => self.now.checked_add_signed(delta).map(format_instant),
            Err(err) => {
                log::debug!("treating {literal:?} as a plain value: {err}");
                None
            }
        }
    }
}

/// Compiles a bare term: a literal search over the usual text fields and
/// every custom field.
fn any_of(value: &str) -> Condition {
    let pattern = regex::escape(value);
    let mut children: Vec<Condition> = ANY_OF_FIELDS
        .iter()
        .map(|field| Condition::field(*field, Operator::Regex, pattern.as_str()))
        .collect();
    children.push(Condition::field(ANY_CUSTOM_FIELD, Operator::Regex, pattern));
    Condition::or(children)
}

fn validate_regex(pattern: &str) -> QueryResult<()> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map(|_| ())
        .map_err(|err| QueryError::InvalidRegex {
            pattern: pattern.to_string(),
            message: err.to_string(),
        })
}

fn warn_unknown_is(value: &str) {
    match suggest_is_value(value) {
        Some(suggestion) => log::warn!(
            "unknown is:{value}, matching it as a field; did you mean is:{suggestion}?"
        ),
        None => log::warn!("unknown is:{value}, matching it as a field"),
    }
}

/// Finds the closest known `is:` value within the suggestion distance.
fn suggest_is_value(value: &str) -> Option<&'static str> {
    let lower = value.to_lowercase();
    let (best, distance) = IS_VALUES
        .iter()
        .map(|candidate| (*candidate, levenshtein(&lower, candidate)))
        .min_by_key(|(_, d)| *d)?;

    if distance > 0 && distance <= MAX_SUGGESTION_DISTANCE {
        Some(best)
    } else {
        None
    }
}

/// Parses `input` against `now`. Shorthand for [`QueryParser::parse`].
pub fn parse(input: &str, now: DateTime<Utc>) -> QueryResult<ParsedQuery> {
    QueryParser::new(now).parse(input)
}

#[cfg(test)]
mod suggestion_tests {
    use super::*;

    #[test]
    fn test_suggest_close_is_value() {
        assert_eq!(suggest_is_value("deu"), Some("due"));
        assert_eq!(suggest_is_value("leeches"), Some("leech"));
        assert_eq!(suggest_is_value("Marekd"), Some("marked"));
    }

    #[test]
    fn test_no_suggestion_for_exact_or_distant() {
        assert_eq!(suggest_is_value("due"), None);
        assert_eq!(suggest_is_value("random"), None);
    }
}
