//! Search queries over spaced-repetition card collections.
//!
//! This crate compiles free-text queries such as
//! `deck:japanese is:due -tag:skip sortBy:srsLevel` into a condition tree,
//! evaluates it against card records and orders the matches.
//!
//! # Modules
//!
//! - [`search`] - query lexer, parser, evaluator and sort comparator
//! - [`CardStore`] - read-only JSON card file
//! - [`run`] - the full filter, sort and paginate pipeline
//!
//! # Example
//!
//! ```
//! use chrono::{TimeDelta, Utc};
//! use recall_search::{run, Record, SearchOptions};
//! use serde_json::json;
//!
//! let now = Utc::now();
//! let past = (now - TimeDelta::hours(1)).to_rfc3339();
//! let future = (now + TimeDelta::hours(1)).to_rfc3339();
//!
//! let cards: Vec<Record> = vec![
//!     json!({"front": "猫", "deck": "Japanese", "nextReview": past}),
//!     json!({"front": "犬", "deck": "Japanese", "nextReview": future}),
//! ]
//! .into_iter()
//! .filter_map(Record::from_value)
//! .collect();
//!
//! let page = run(&cards, "is:due", &SearchOptions::default(), now).unwrap();
//! assert_eq!(page.count, 1);
//! assert_eq!(page.records[0].get_str("front"), Some("猫"));
//! ```

pub mod search;

mod pipeline;
mod record;
mod store;

pub use pipeline::{
    execute, run, run_source, SearchError, SearchOptions, SearchPage, DEFAULT_LIMIT,
    DEFAULT_SORT, RANDOM_SORT,
};
pub use record::{Record, CUSTOM_FIELDS_KEY, NO_SEARCH_MARKER};
pub use store::{CardStore, CardStoreError, RecordSource};
