//! Error types for the query parser.

use thiserror::Error;

/// A specialized Result type for query parsing operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors that can occur while compiling a query string.
///
/// Evaluation never fails: type mismatches found while matching a record are
/// swallowed by the evaluator and only exclude that record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    /// A term split into neither a bare value nor a `field op value` triple.
    #[error("invalid query term: {term}")]
    InvalidQuery {
        /// The offending term, as typed.
        term: String,
    },

    /// The middle token of a triple was not a known operator.
    #[error("invalid operator '{operator}' in term: {term}")]
    InvalidOperator {
        /// The offending term, as typed.
        term: String,
        /// The token found in operator position.
        operator: String,
    },

    /// A user-supplied `~` pattern does not compile.
    #[error("invalid regex '{pattern}': {message}")]
    InvalidRegex {
        /// The pattern as typed.
        pattern: String,
        /// The compiler's message.
        message: String,
    },

    /// A relative time literal could not be parsed.
    #[error("invalid timedelta: {value}")]
    InvalidTimedelta {
        /// The literal that failed to parse.
        value: String,
    },
}

impl QueryError {
    /// Creates an invalid query error.
    pub fn invalid_query(term: impl Into<String>) -> Self {
        QueryError::InvalidQuery { term: term.into() }
    }

    /// Creates an invalid operator error.
    pub fn invalid_operator(term: impl Into<String>, operator: impl Into<String>) -> Self {
        QueryError::InvalidOperator {
            term: term.into(),
            operator: operator.into(),
        }
    }

    /// Creates an invalid timedelta error.
    pub fn invalid_timedelta(value: impl Into<String>) -> Self {
        QueryError::InvalidTimedelta {
            value: value.into(),
        }
    }
}
