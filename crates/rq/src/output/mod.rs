//! Output formatting utilities for the rq CLI.
//!
//! This module provides functions for formatting data as tables or JSON:
//!
//! - [`cards`] - Search result pages
//! - [`query`] - Parsed query trees
//! - [`helpers`] - Common formatting utilities (truncation, field columns, review dates)

mod cards;
pub mod helpers;
mod query;

pub use cards::{format_page_json, format_page_table};
pub use query::{format_parsed_json, format_parsed_tree, operator_symbol};
