//! Integration tests for searching a card file on disk.
//!
//! These tests write a card dump into a temp directory, load it through
//! `CardStore` and run queries over it through the full pipeline.

use std::fs;
use std::path::Path;

use chrono::{TimeZone, Utc};
use recall_search::{
    run, run_source, CardStore, CardStoreError, RecordSource, SearchError, SearchOptions,
};
use serde_json::json;
use tempfile::tempdir;

fn write_cards(dir: &Path, cards: serde_json::Value) -> CardStore {
    let path = dir.join("cards.json");
    fs::write(&path, serde_json::to_string_pretty(&cards).unwrap())
        .expect("failed to write card file");
    CardStore::with_path(path)
}

fn deck() -> serde_json::Value {
    json!({
        "cards": [
            {
                "id": "c1",
                "front": "猫",
                "deck": "Japanese::Animals",
                "tag": ["noun"],
                "srsLevel": 2,
                "nextReview": "2026-10-19T08:00:00Z",
                "created": "2026-10-18T08:00:00Z",
                "data": [{"key": "reading", "value": "ねこ"}]
            },
            {
                "id": "c2",
                "front": "犬",
                "deck": "Japanese::Animals",
                "tag": ["noun", "marked"],
                "srsLevel": 0,
                "nextReview": "2026-10-25T08:00:00Z",
                "created": "2026-01-02T08:00:00Z",
                "data": [{"key": "reading", "value": "いぬ"}]
            },
            {
                "id": "c3",
                "front": "食べる",
                "deck": "Japanese::Verbs",
                "tag": ["verb", "skip"],
                "srsLevel": 5,
                "nextReview": "2026-10-01T08:00:00Z",
                "created": "2025-06-01T08:00:00Z"
            },
            {
                "id": "c4",
                "front": "猫",
                "deck": "Review",
                "srsLevel": 1
            }
        ]
    })
}

fn ids(page: &recall_search::SearchPage<recall_search::Record>) -> Vec<&str> {
    page.records.iter().filter_map(|r| r.get_str("id")).collect()
}

#[test]
fn test_due_cards_sorted_by_level() {
    let temp_dir = tempdir().expect("failed to create temp dir");
    let store = write_cards(temp_dir.path(), deck());
    let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();

    let page = run_source(
        &store,
        "deck:japanese is:due -tag:skip sortBy:srsLevel",
        &SearchOptions::default(),
        now,
    )
    .expect("search should succeed");

    assert_eq!(page.count, 1);
    assert_eq!(ids(&page), vec!["c1"]);
}

#[test]
fn test_descending_sort_and_window() {
    let temp_dir = tempdir().expect("failed to create temp dir");
    let store = write_cards(temp_dir.path(), deck());
    let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();

    let options = SearchOptions {
        offset: 1,
        limit: Some(2),
        ..SearchOptions::default()
    };
    let page = run_source(&store, "-sortBy:srsLevel", &options, now).expect("search should succeed");

    assert_eq!(page.count, 4);
    assert_eq!(ids(&page), vec!["c1", "c4"]);
}

#[test]
fn test_custom_field_and_or_query() {
    let temp_dir = tempdir().expect("failed to create temp dir");
    let store = write_cards(temp_dir.path(), deck());
    let now = Utc::now();

    let options = SearchOptions {
        sort_by: "id".to_string(),
        ..SearchOptions::default()
    };
    let page = run_source(&store, "reading:いぬ OR tag=verb", &options, now).unwrap();
    assert_eq!(ids(&page), vec!["c2", "c3"]);
}

#[test]
fn test_created_within_last_week() {
    let temp_dir = tempdir().expect("failed to create temp dir");
    let store = write_cards(temp_dir.path(), deck());
    let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();

    let page = run_source(&store, "created:-1w", &SearchOptions::default(), now).unwrap();
    assert_eq!(ids(&page), vec!["c1"]);
}

#[test]
fn test_duplicate_fronts() {
    let temp_dir = tempdir().expect("failed to create temp dir");
    let store = write_cards(temp_dir.path(), deck());

    let page = run_source(&store, "is:duplicate", &SearchOptions::default(), Utc::now()).unwrap();
    assert_eq!(page.count, 2);
    assert!(page.records.iter().all(|r| r.get_str("front") == Some("猫")));
}

#[test]
fn test_bare_array_file() {
    let temp_dir = tempdir().expect("failed to create temp dir");
    let store = write_cards(
        temp_dir.path(),
        json!([{"id": "a", "front": "x"}, {"id": "b", "front": "y"}]),
    );

    let records = store.all_records().expect("load should succeed");
    let page = run(&records, "y", &SearchOptions::default(), Utc::now()).unwrap();
    assert_eq!(page.count, 1);
    assert_eq!(page.records[0].get_str("id"), Some("b"));
}

#[test]
fn test_missing_file_searches_nothing() {
    let temp_dir = tempdir().expect("failed to create temp dir");
    let store = CardStore::with_path(temp_dir.path().join("nonexistent.json"));

    let page = run_source(&store, "", &SearchOptions::default(), Utc::now()).unwrap();
    assert_eq!(page.count, 0);
    assert!(page.records.is_empty());
}

#[test]
fn test_corrupt_file_is_source_error() {
    let temp_dir = tempdir().expect("failed to create temp dir");
    let path = temp_dir.path().join("cards.json");
    fs::write(&path, "[{").unwrap();
    let store = CardStore::with_path(path);

    let err = run_source(&store, "", &SearchOptions::default(), Utc::now()).unwrap_err();
    assert!(
        matches!(err, SearchError::Source(CardStoreError::Json(_))),
        "unexpected error: {err}"
    );
}

#[test]
fn test_query_error_wins_over_source() {
    let temp_dir = tempdir().expect("failed to create temp dir");
    let store = CardStore::with_path(temp_dir.path());

    let err = run_source(&store, "a:b:c", &SearchOptions::default(), Utc::now()).unwrap_err();
    assert!(matches!(err, SearchError::Query(_)));
}
