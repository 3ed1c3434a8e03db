//! Parsed query output formatting.

use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;
use recall_search::search::{format_instant, Condition, Operator, ParsedQuery, SetModifier, Value};
use serde::Serialize;

/// JSON output structure for the parse command.
#[derive(Serialize)]
pub struct ParsedQueryOutput<'a> {
    pub now: String,
    #[serde(flatten)]
    pub query: &'a ParsedQuery,
}

/// Formats a parsed query as JSON, including the instant relative dates
/// were resolved against.
pub fn format_parsed_json(
    parsed: &ParsedQuery,
    now: DateTime<Utc>,
) -> Result<String, serde_json::Error> {
    let output = ParsedQueryOutput {
        now: format_instant(now),
        query: parsed,
    };

    serde_json::to_string_pretty(&output)
}

/// Formats a parsed query as an indented condition tree.
pub fn format_parsed_tree(parsed: &ParsedQuery, use_colors: bool) -> String {
    let mut output = String::new();
    write_condition(&mut output, &parsed.condition, 0, use_colors);

    if let Some(sort_by) = &parsed.sort_by {
        let direction = if parsed.descending {
            "descending"
        } else {
            "ascending"
        };
        output.push_str(&format!("sort: {sort_by} {direction}\n"));
    }

    if let Some(modifier) = parsed.modifier {
        let name = match modifier {
            SetModifier::Duplicate => "duplicate",
            SetModifier::Distinct => "distinct",
        };
        output.push_str(&format!("modifier: {name}\n"));
    }

    output
}

fn write_condition(output: &mut String, condition: &Condition, depth: usize, use_colors: bool) {
    let indent = "  ".repeat(depth);

    match condition {
        Condition::And(children) | Condition::Or(children) => {
            let keyword = if matches!(condition, Condition::And(_)) {
                "and"
            } else {
                "or"
            };
            let label = match (children.is_empty(), keyword) {
                (true, "and") => "and (matches everything)".to_string(),
                (true, _) => "or (matches nothing)".to_string(),
                _ => keyword.to_string(),
            };
            push_keyword(output, &indent, &label, use_colors);
            for child in children {
                write_condition(output, child, depth + 1, use_colors);
            }
        }
        Condition::Not(inner) => {
            push_keyword(output, &indent, "not", use_colors);
            write_condition(output, inner, depth + 1, use_colors);
        }
        Condition::FieldOp { field, op, value } => {
            let field = if use_colors {
                field.cyan().to_string()
            } else {
                field.clone()
            };
            output.push_str(&format!(
                "{indent}{field} {} {}\n",
                operator_symbol(*op),
                format_operand(value)
            ));
        }
    }
}

fn push_keyword(output: &mut String, indent: &str, keyword: &str, use_colors: bool) {
    if use_colors {
        output.push_str(&format!("{indent}{}\n", keyword.bold()));
    } else {
        output.push_str(&format!("{indent}{keyword}\n"));
    }
}

/// Returns the display symbol for an operator.
pub fn operator_symbol(op: Operator) -> &'static str {
    match op {
        Operator::Equals => "=",
        Operator::Regex => "~",
        Operator::Substring => "contains",
        Operator::StartsWith => "starts with",
        Operator::Exists => "exists",
        Operator::Gte => ">=",
        Operator::Gt => ">",
        Operator::Lte => "<=",
        Operator::Lt => "<",
    }
}

fn format_operand(value: &Value) -> String {
    match value {
        Value::String(s) => format!("{s:?}"),
        other => other.to_string(),
    }
}
