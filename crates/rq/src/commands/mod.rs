//! Command implementations for the rq CLI.
//!
//! This module contains the actual command handlers that are invoked by the CLI.

pub mod completions;
pub mod config;
pub mod parse;
pub mod search;

use recall_search::search::QueryError;
use recall_search::{CardStore, CardStoreError, SearchError};

use crate::cli::Cli;
use config::Config;

/// Error type for command execution.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Query compilation error.
    #[error("query error: {0}")]
    Query(#[from] QueryError),

    /// Card store error.
    #[error("card store error: {0}")]
    Store(#[from] CardStoreError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<SearchError<CardStoreError>> for CommandError {
    fn from(err: SearchError<CardStoreError>) -> Self {
        match err {
            SearchError::Source(e) => CommandError::Store(e),
            SearchError::Query(e) => CommandError::Query(e),
        }
    }
}

/// Result type for command execution.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Context for command execution, containing common dependencies.
pub struct CommandContext {
    /// Whether to output JSON.
    pub json_output: bool,
    /// Whether to use colors.
    pub use_colors: bool,
    /// Whether to be quiet (errors only).
    pub quiet: bool,
    /// Whether to be verbose.
    pub verbose: bool,
}

impl CommandContext {
    /// Creates a command context from CLI arguments and the loaded config.
    ///
    /// Colors are off if `--no-color` is given, `NO_COLOR` is set, or the
    /// config sets `output.color = false`.
    pub fn from_cli(cli: &Cli, config: &Config) -> Self {
        let no_color_env = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        Self {
            json_output: cli.json,
            use_colors: !cli.no_color && !no_color_env && config.output.color.unwrap_or(true),
            quiet: cli.quiet,
            verbose: cli.verbose,
        }
    }
}

/// Joins the words of a query given as several arguments.
pub fn join_query(words: &[String]) -> String {
    words.join(" ")
}

/// Opens the card store: `--cards`/`RQ_CARDS` first, then the config file,
/// then the default XDG data path.
pub fn open_store(cli: &Cli, config: &Config) -> Result<CardStore> {
    if let Some(path) = &cli.cards {
        return Ok(CardStore::with_path(path));
    }
    if let Some(path) = &config.cards {
        return Ok(CardStore::with_path(path));
    }
    Ok(CardStore::new()?)
}
