//! Common helper functions for output formatting.

use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;
use recall_search::search::parse_instant;
use recall_search::Record;
use serde_json::Value as JsonValue;

/// Truncates a string to a maximum number of characters.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        s.to_string()
    }
}

/// Returns the first line of a multi-line field.
pub fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or_default()
}

/// Returns the card's identifier, from `id` or `_id`.
pub fn card_id(record: &Record) -> String {
    match record.get("id").or_else(|| record.get("_id")) {
        Some(JsonValue::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Renders a text column, reducing lists to a comma-separated line.
pub fn text_field(record: &Record, field: &str) -> String {
    match record.get(field) {
        Some(JsonValue::String(s)) => first_line(s).to_string(),
        Some(JsonValue::Array(items)) => items
            .iter()
            .map(|v| match v {
                JsonValue::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Formats a `nextReview` value relative to `now`.
pub fn format_next_review(value: Option<&str>, now: DateTime<Utc>, use_colors: bool) -> String {
    let Some(raw) = value else {
        return if use_colors {
            "new".dimmed().to_string()
        } else {
            "new".to_string()
        };
    };

    let Some(instant) = parse_instant(raw) else {
        return raw.to_string();
    };

    if instant <= now {
        let display = match (now - instant).num_days() {
            0 => "due".to_string(),
            1 => "due 1 day ago".to_string(),
            days => format!("due {days} days ago"),
        };
        return if use_colors {
            display.red().to_string()
        } else {
            display
        };
    }

    let ahead = instant - now;
    let display = if ahead.num_hours() < 1 {
        format!("in {}m", ahead.num_minutes().max(1))
    } else if ahead.num_days() < 1 {
        format!("in {}h", ahead.num_hours())
    } else if ahead.num_days() < 30 {
        format!("in {}d", ahead.num_days())
    } else {
        instant.format("%Y-%m-%d").to_string()
    };

    if use_colors && ahead.num_days() < 1 {
        display.yellow().to_string()
    } else {
        display
    }
}
