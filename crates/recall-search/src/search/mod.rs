//! Query parser, evaluator and sorter for card searches.
//!
//! A query is a free-text string compiled into a [`Condition`] tree, which is
//! then matched against [`Record`](crate::Record)s and used to order them.
//!
//! # Supported Syntax
//!
//! ## Terms
//! - `word` - matches template, front, mnemonic, key, deck, tag or any custom field
//! - `field:value` - case-insensitive substring match
//! - `field~regex` - case-insensitive regex match
//! - `field=value` - exact match (membership for list fields)
//! - `field>=v`, `field>v`, `field<=v`, `field<v` - comparisons
//! - `field:NULL` - field is empty or absent
//! - `@key:value` - custom field only
//!
//! ## Shortcuts
//! - `is:due`, `is:new`, `is:leech`, `is:marked`
//! - `is:duplicate`, `is:distinct`
//! - `due:<delta>`, `created:<delta>`, `modified:<delta>` with deltas like `-3d`, `1wk`, `NOW`
//! - `sortBy:<field>` and `-sortBy:<field>`
//!
//! ## Boolean Operators
//! - whitespace - AND
//! - ` OR ` - OR (binds loosest)
//! - `-` prefix - NOT
//! - `"..."` and `(...)` - grouping
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use recall_search::Record;
//! use recall_search::search::{sort_records, QueryEvaluator, QueryParser};
//! use serde_json::json;
//!
//! let records: Vec<Record> = vec![
//!     json!({"front": "犬", "deck": "Japanese", "srsLevel": 2}),
//!     json!({"front": "dog", "deck": "English", "srsLevel": 1}),
//!     json!({"front": "猫", "deck": "Japanese", "srsLevel": 0}),
//! ]
//! .into_iter()
//! .filter_map(Record::from_value)
//! .collect();
//!
//! let query = QueryParser::new(Utc::now()).parse("deck:japanese sortBy:srsLevel").unwrap();
//! let evaluator = QueryEvaluator::new(&query.condition);
//!
//! let mut matched = evaluator.filter_records(&records);
//! sort_records(&mut matched, query.sort_field_or("deck"), query.descending);
//!
//! assert_eq!(matched.len(), 2);
//! assert_eq!(matched[0].get_str("front"), Some("猫"));
//! ```

mod ast;
mod error;
mod evaluator;
mod lexer;
mod parser;
mod resolve;
mod sort;
mod timedelta;

pub use ast::{Condition, Operator, ParsedQuery, SetModifier, Value};
pub use error::{QueryError, QueryResult};
pub use evaluator::{matches, parse_instant, QueryEvaluator};
pub use lexer::{split, strip_brackets};
pub use parser::{
    format_instant, parse, QueryParser, ANY_CUSTOM_FIELD, ANY_OF_FIELDS, DATE_FIELDS,
    STRING_FIELDS,
};
pub use resolve::{resolve_custom, resolve_field, resolve_path, Resolved, NO_CUSTOM_FALLBACK};
pub use sort::{compare_key, sort_records, SortKey};
pub use timedelta::parse_timedelta;
