//! Parse command implementation.
//!
//! Compiles a query without touching the card store and prints the
//! resulting condition tree, sort request and set modifier.

use chrono::Utc;
use recall_search::search::QueryParser;

use super::{CommandContext, Result};
use crate::output::{format_parsed_json, format_parsed_tree};

/// Executes the parse command.
///
/// # Errors
///
/// Returns an error if the query does not compile.
pub fn execute(ctx: &CommandContext, query: &str) -> Result<()> {
    let parser = QueryParser::new(Utc::now());
    let parsed = parser.parse(query)?;

    if ctx.json_output {
        let output = format_parsed_json(&parsed, parser.now())?;
        println!("{output}");
    } else if !ctx.quiet {
        print!("{}", format_parsed_tree(&parsed, ctx.use_colors));
    }

    Ok(())
}
