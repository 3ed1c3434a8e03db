//! Search command implementation.
//!
//! Loads cards from the store, runs one query over them and prints a page
//! of matches.

use chrono::Utc;
use recall_search::{run_source, CardStore, SearchOptions, DEFAULT_LIMIT, DEFAULT_SORT};

use super::config::SearchConfig;
use super::{CommandContext, Result};
use crate::output::{format_page_json, format_page_table};

/// Options for the search command.
#[derive(Debug, Default)]
pub struct SearchCommandOptions {
    /// The query string.
    pub query: String,
    /// Sort field override.
    pub sort: Option<String>,
    /// Sort descending.
    pub desc: bool,
    /// Matches to skip.
    pub offset: usize,
    /// Page size override.
    pub limit: Option<usize>,
    /// Show every match.
    pub all: bool,
}

/// Merges command flags over configured defaults.
///
/// Flags beat the config file, which beats the built-in defaults. A
/// `sortBy:` term in the query still beats all of these.
pub fn search_options(opts: &SearchCommandOptions, defaults: &SearchConfig) -> SearchOptions {
    let limit = if opts.all {
        None
    } else {
        Some(opts.limit.or(defaults.limit).unwrap_or(DEFAULT_LIMIT))
    };

    SearchOptions {
        sort_by: opts
            .sort
            .clone()
            .or_else(|| defaults.sort_by.clone())
            .unwrap_or_else(|| DEFAULT_SORT.to_string()),
        descending: opts.desc || defaults.descending.unwrap_or(false),
        offset: opts.offset,
        limit,
    }
}

/// Executes the search command.
///
/// # Errors
///
/// Returns an error if the query does not compile or the card file cannot
/// be read.
pub fn execute(
    ctx: &CommandContext,
    opts: &SearchCommandOptions,
    store: &CardStore,
    defaults: &SearchConfig,
) -> Result<()> {
    let options = search_options(opts, defaults);
    let now = Utc::now();

    if ctx.verbose {
        eprintln!("Searching {}", store.path().display());
    }

    let page = run_source(store, &opts.query, &options, now)?;

    if ctx.json_output {
        let output = format_page_json(&page, &options)?;
        println!("{output}");
    } else if !ctx.quiet {
        let output = format_page_table(&page, &options, now, ctx.use_colors);
        print!("{output}");
    }

    Ok(())
}
