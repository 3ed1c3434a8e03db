//! Search result output formatting.

use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;
use recall_search::{Record, SearchOptions, SearchPage};
use serde::Serialize;

use super::helpers::{card_id, format_next_review, text_field, truncate_str};

/// JSON output structure for the search command.
#[derive(Serialize)]
pub struct SearchPageOutput<'a> {
    pub cards: &'a [Record],
    pub count: usize,
    pub offset: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    pub has_more: bool,
}

/// Formats a page of search results as JSON.
pub fn format_page_json(
    page: &SearchPage<Record>,
    options: &SearchOptions,
) -> Result<String, serde_json::Error> {
    let output = SearchPageOutput {
        cards: &page.records,
        count: page.count,
        offset: options.offset,
        limit: options.limit,
        has_more: options.offset + page.records.len() < page.count,
    };

    serde_json::to_string_pretty(&output)
}

/// Formats a page of search results as a table.
pub fn format_page_table(
    page: &SearchPage<Record>,
    options: &SearchOptions,
    now: DateTime<Utc>,
    use_colors: bool,
) -> String {
    if page.records.is_empty() {
        return if page.count == 0 {
            "No cards found.\n".to_string()
        } else {
            format!(
                "No cards on this page ({} matches, offset {}).\n",
                page.count, options.offset
            )
        };
    }

    let mut output = String::new();

    // Header
    let header = format!(
        "{:<8} {:<16} {:<30} {:<20} {}",
        "ID", "Deck", "Front", "Tags", "Next review"
    );
    if use_colors {
        output.push_str(&format!("{}\n", header.dimmed()));
    } else {
        output.push_str(&header);
        output.push('\n');
    }

    for record in &page.records {
        let id = truncate_str(&card_id(record), 8);
        let deck = truncate_str(&text_field(record, "deck"), 16);
        let front = truncate_str(&text_field(record, "front"), 30);
        let tags = truncate_str(&text_field(record, "tag"), 20);
        let review = format_next_review(record.get_str("nextReview"), now, use_colors);

        let line = format!("{id:<8} {deck:<16} {front:<30} {tags:<20} {review}");
        output.push_str(&line);
        output.push('\n');
    }

    let first = options.offset + 1;
    let last = options.offset + page.records.len();
    let footer = if first == 1 && last == page.count {
        match page.count {
            1 => "1 card".to_string(),
            n => format!("{n} cards"),
        }
    } else {
        format!("Showing {first}-{last} of {} cards", page.count)
    };

    if use_colors {
        output.push_str(&format!("\n{}\n", footer.dimmed()));
    } else {
        output.push('\n');
        output.push_str(&footer);
        output.push('\n');
    }

    output
}
