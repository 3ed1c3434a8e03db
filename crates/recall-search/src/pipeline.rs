//! Filter, sort and paginate a record collection with one query.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::record::Record;
use crate::search::{
    sort_records, ParsedQuery, QueryError, QueryEvaluator, QueryParser, SetModifier,
};
use crate::store::RecordSource;

/// Sort field that shuffles instead of ordering.
pub const RANDOM_SORT: &str = "random";

/// Sort field used when neither the query nor the caller picks one.
pub const DEFAULT_SORT: &str = "deck";

/// Page size used when the caller does not pick one.
pub const DEFAULT_LIMIT: usize = 10;

/// Caller-side defaults and pagination for a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Sort field when the query has no `sortBy:` term.
    pub sort_by: String,
    /// Sort direction when the query has no `sortBy:` term.
    pub descending: bool,
    /// Number of matches to skip.
    pub offset: usize,
    /// Maximum number of matches to return; `None` returns all.
    pub limit: Option<usize>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            sort_by: DEFAULT_SORT.to_string(),
            descending: false,
            offset: 0,
            limit: Some(DEFAULT_LIMIT),
        }
    }
}

/// One window of search results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchPage<R> {
    /// The records inside the offset/limit window, in sorted order.
    pub records: Vec<R>,
    /// Total number of matches before windowing.
    pub count: usize,
}

impl SearchPage<&Record> {
    /// Clones the borrowed records into an owned page.
    pub fn into_owned(self) -> SearchPage<Record> {
        SearchPage {
            records: self.records.into_iter().cloned().collect(),
            count: self.count,
        }
    }
}

/// Errors from [`run_source`].
#[derive(Debug, Error)]
pub enum SearchError<E>
where
    E: std::error::Error + 'static,
{
    /// The record source could not produce its records.
    #[error("record source error: {0}")]
    Source(#[source] E),

    /// The query did not compile.
    #[error("query error: {0}")]
    Query(#[from] QueryError),
}

/// Parses `query` against `now` and runs it over `records`.
///
/// # Errors
///
/// Returns a [`QueryError`] if the query does not compile. Matching and
/// sorting never fail.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use recall_search::{run, Record, SearchOptions};
/// use serde_json::json;
///
/// let records: Vec<Record> = (0..25)
///     .map(|i| json!({"front": format!("card {i}"), "deck": "Default", "srsLevel": i}))
///     .filter_map(Record::from_value)
///     .collect();
///
/// let options = SearchOptions { offset: 5, ..SearchOptions::default() };
/// let page = run(&records, "-sortBy:srsLevel", &options, Utc::now()).unwrap();
///
/// assert_eq!(page.count, 25);
/// assert_eq!(page.records.len(), 10);
/// assert_eq!(page.records[0].get_str("front"), Some("card 19"));
/// ```
pub fn run<'a>(
    records: &'a [Record],
    query: &str,
    options: &SearchOptions,
    now: DateTime<Utc>,
) -> Result<SearchPage<&'a Record>, QueryError> {
    let parsed = QueryParser::new(now).parse(query)?;
    Ok(execute(records, &parsed, options))
}

/// Snapshots the records of `source`, then runs `query` over them.
///
/// # Errors
///
/// Returns [`SearchError::Source`] if the source fails and
/// [`SearchError::Query`] if the query does not compile.
pub fn run_source<S>(
    source: &S,
    query: &str,
    options: &SearchOptions,
    now: DateTime<Utc>,
) -> Result<SearchPage<Record>, SearchError<S::Error>>
where
    S: RecordSource + ?Sized,
    S::Error: std::error::Error + 'static,
{
    let parsed = QueryParser::new(now).parse(query)?;
    let records = source.all_records().map_err(SearchError::Source)?;
    Ok(execute(&records, &parsed, options).into_owned())
}

/// Runs an already compiled query over `records`.
pub fn execute<'a>(
    records: &'a [Record],
    query: &ParsedQuery,
    options: &SearchOptions,
) -> SearchPage<&'a Record> {
    let (candidates, forced_sort) = match query.modifier {
        Some(SetModifier::Duplicate) => (duplicates(records), Some("front")),
        Some(SetModifier::Distinct) => (distinct(records), Some(RANDOM_SORT)),
        None => (records.iter().collect(), None),
    };

    let evaluator = QueryEvaluator::new(&query.condition);
    let mut matched: Vec<&Record> = candidates
        .into_iter()
        .filter(|r| evaluator.matches(r))
        .collect();

    let (sort_by, descending) = match (&query.sort_by, forced_sort) {
        (Some(_), Some(forced)) => (forced, query.descending),
        (None, Some(forced)) => (forced, options.descending),
        (Some(field), None) => (field.as_str(), query.descending),
        (None, None) => (options.sort_by.as_str(), options.descending),
    };

    if sort_by == RANDOM_SORT {
        matched.sort_by_cached_key(|_| Uuid::new_v4());
    } else {
        sort_records(&mut matched, sort_by, descending);
    }

    let count = matched.len();
    let records: Vec<&Record> = matched
        .into_iter()
        .skip(options.offset)
        .take(options.limit.unwrap_or(usize::MAX))
        .collect();

    log::debug!(
        "search matched {count} records, returning {} from offset {} sorted by {sort_by}{}",
        records.len(),
        options.offset,
        if descending { " (descending)" } else { "" }
    );

    SearchPage { records, count }
}

/// Records whose `front` occurs more than once, in store order.
fn duplicates(records: &[Record]) -> Vec<&Record> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for front in records.iter().filter_map(|r| r.get_str("front")) {
        *counts.entry(front).or_default() += 1;
    }

    records
        .iter()
        .filter(|r| {
            r.get_str("front")
                .is_some_and(|front| counts.get(front).copied().unwrap_or_default() > 1)
        })
        .collect()
}

/// The first record per note `key` (or `front` when there is no key).
///
/// Records with neither are all kept.
fn distinct(records: &[Record]) -> Vec<&Record> {
    let mut seen: HashSet<&str> = HashSet::new();
    records
        .iter()
        .filter(|r| match r.get_str("key").or_else(|| r.get_str("front")) {
            Some(key) => seen.insert(key),
            None => true,
        })
        .collect()
}
