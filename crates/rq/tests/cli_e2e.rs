//! End-to-end tests for the `rq` binary.
//!
//! Each test runs the real binary against a card file and config file in a
//! temporary sandbox.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

use serde_json::{json, Value};
use tempfile::TempDir;

struct CliContext {
    sandbox: TempDir,
    cards_path: PathBuf,
    config_path: PathBuf,
}

impl CliContext {
    fn new() -> Self {
        let sandbox = TempDir::new().expect("failed to create temporary sandbox");
        let cards_path = sandbox.path().join("cards.json");
        let config_path = sandbox.path().join("rq").join("config.toml");

        let cards = json!({
            "cards": [
                {
                    "id": "c1",
                    "deck": "Japanese/N5",
                    "front": "猫",
                    "template": "vocab",
                    "tag": ["animal"],
                    "srsLevel": 2,
                    "nextReview": "2020-01-01T00:00:00Z"
                },
                {
                    "id": "c2",
                    "deck": "Japanese/N4",
                    "front": "犬",
                    "template": "vocab",
                    "tag": ["animal", "skip"],
                    "srsLevel": 5,
                    "nextReview": "2099-01-01T00:00:00Z"
                },
                {
                    "id": "c3",
                    "deck": "French",
                    "front": "chat",
                    "srsLevel": 1,
                    "nextReview": "2021-06-01T00:00:00Z"
                }
            ]
        });
        fs::write(&cards_path, cards.to_string()).expect("failed to write cards");

        Self {
            sandbox,
            cards_path,
            config_path,
        }
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_rq"))
            .args(args)
            .env("RQ_CARDS", &self.cards_path)
            .env("RQ_CONFIG", &self.config_path)
            .env("XDG_CONFIG_HOME", self.sandbox.path())
            .env("XDG_DATA_HOME", self.sandbox.path())
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .output()
            .expect("failed to run rq")
    }

    fn run_json(&self, args: &[&str]) -> Value {
        let mut full = vec!["--json"];
        full.extend_from_slice(args);
        let output = self.run(&full);
        assert!(
            output.status.success(),
            "rq {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
    }
}

fn ids(page: &Value) -> Vec<&str> {
    page["cards"]
        .as_array()
        .expect("cards array")
        .iter()
        .map(|c| c["id"].as_str().expect("id"))
        .collect()
}

// ==================== Search Tests ====================

#[test]
fn test_search_due_cards_sorted() {
    let ctx = CliContext::new();
    let page = ctx.run_json(&["search", "is:due", "sortBy:srsLevel"]);

    assert_eq!(ids(&page), vec!["c3", "c1"]);
    assert_eq!(page["count"], 2);
    assert_eq!(page["has_more"], false);
}

#[test]
fn test_search_negated_term_after_separator() {
    let ctx = CliContext::new();
    let page = ctx.run_json(&["search", "--", "deck:Japanese", "-tag:skip"]);
    assert_eq!(ids(&page), vec!["c1"]);
}

#[test]
fn test_search_paging_flags() {
    let ctx = CliContext::new();
    let page = ctx.run_json(&[
        "search", "--sort", "srsLevel", "--desc", "--limit", "1", "--offset", "1", "",
    ]);

    assert_eq!(ids(&page), vec!["c1"]);
    assert_eq!(page["count"], 3);
    assert_eq!(page["offset"], 1);
    assert_eq!(page["limit"], 1);
    assert_eq!(page["has_more"], true);
}

#[test]
fn test_search_table_output() {
    let ctx = CliContext::new();
    let output = ctx.run(&["search", "deck:french"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("ID"));
    assert!(stdout.contains("chat"));
    assert!(stdout.contains("1 card"));
}

#[test]
fn test_search_query_error_exit_code() {
    let ctx = CliContext::new();
    let output = ctx.run(&["--json", "search", "a:b:c"]);

    assert_eq!(output.status.code(), Some(1));
    let error: Value = serde_json::from_slice(&output.stderr).expect("stderr is not JSON");
    assert_eq!(error["error"]["code"], "QUERY_ERROR");
}

#[test]
fn test_search_corrupt_card_file_exit_code() {
    let ctx = CliContext::new();
    fs::write(&ctx.cards_path, "{ not json").unwrap();

    let output = ctx.run(&["search", "cat"]);
    assert_eq!(output.status.code(), Some(5));
}

#[test]
fn test_search_missing_card_file_is_empty() {
    let ctx = CliContext::new();
    fs::remove_file(&ctx.cards_path).unwrap();

    let page = ctx.run_json(&["search", "cat"]);
    assert_eq!(page["count"], 0);
}

// ==================== Parse Tests ====================

#[test]
fn test_parse_command_json() {
    let ctx = CliContext::new();
    let parsed = ctx.run_json(&["parse", "srsLevel>=2 sortBy:front"]);

    assert_eq!(parsed["sort_by"], "front");
    assert_eq!(
        parsed["condition"]["and"][0]["field_op"]["field"],
        "srsLevel"
    );
    assert!(parsed["now"].as_str().unwrap().ends_with('Z'));
}

#[test]
fn test_parse_command_tree() {
    let ctx = CliContext::new();
    let output = ctx.run(&["parse", "deck:x OR tag:y"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("or\n"));
    assert!(stdout.contains("deck ~ \"x\""));
}

// ==================== Config Tests ====================

#[test]
fn test_config_set_changes_search_defaults() {
    let ctx = CliContext::new();

    let set = ctx.run(&["config", "set", "search.limit", "1"]);
    assert!(set.status.success());
    assert!(ctx.config_path.exists());

    let page = ctx.run_json(&["search", "sortBy:srsLevel"]);
    assert_eq!(ids(&page), vec!["c3"]);
    assert_eq!(page["has_more"], true);
}

#[test]
fn test_config_set_invalid_key() {
    let ctx = CliContext::new();
    let output = ctx.run(&["config", "set", "search.order", "x"]);
    assert_eq!(output.status.code(), Some(5));
}

#[test]
fn test_config_path() {
    let ctx = CliContext::new();
    let value = ctx.run_json(&["config", "path"]);
    assert_eq!(value["path"], ctx.config_path.display().to_string());
    assert_eq!(value["exists"], false);
}
