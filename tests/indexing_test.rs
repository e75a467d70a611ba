mod common;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use lexidex::{QuerySegment, SearchFilters};
use serde_json::json;
use tempfile::TempDir;
use common::{ids, open, post};

fn snapshot(dir: &Path, files: &mut BTreeMap<String, Vec<u8>>) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            snapshot(&path, files);
        } else {
            files.insert(path.display().to_string(), fs::read(&path).unwrap());
        }
    }
}

fn index_files(db: &lexidex::Database) -> BTreeMap<String, Vec<u8>> {
    let mut files = BTreeMap::new();
    snapshot(&db.layout().unwrap().index_dir, &mut files);
    files
}

#[test]
fn test_update_then_search() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);

    let id = db.update(&post(1, "Hello World", "2020-01-01T00:00:00+00:00", &["a"])).unwrap();
    assert_eq!(id.as_str(), "1");

    let response = db.search("hello", &SearchFilters::default()).unwrap();
    assert_eq!(response.num_found, 1);
    assert_eq!(ids(&response), vec!["1"]);
    assert_eq!(response.max_score, 10.0);
    assert_eq!(response.documents[0]["_score"], json!(10.0));
    assert_eq!(response.documents[0]["title"], json!("Hello World"));
}

#[test]
fn test_stored_document_is_normalized() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);

    db.update(&json!({
        "id": "p1",
        "type": "post",
        "title": "Dates",
        "date": "2020-01-01",
        "unknown": "dropped",
        "author": {"name": "Ada", "age": 36},
    })).unwrap();

    let stored = db.get_document("p1").unwrap().unwrap();
    assert_eq!(stored["date"], json!("2020-01-01T00:00:00+00:00"));
    assert_eq!(stored["author"], json!({"name": "Ada"}));
    assert!(stored.get("unknown").is_none());
    assert!(db.get_document("missing").unwrap().is_none());
}

#[test]
fn test_nested_fields_are_searchable() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);

    db.update(&json!({"id": 1, "type": "post", "title": "x", "author": {"name": "Grace Hopper"}})).unwrap();

    let response = db.search(QuerySegment::exact("author.name", "Grace Hopper"), &SearchFilters::default()).unwrap();
    assert_eq!(ids(&response), vec!["1"]);
    assert_eq!(response.max_score, 3.0);

    let response = db.search("hopper", &SearchFilters::default()).unwrap();
    assert_eq!(ids(&response), vec!["1"]);
}

#[test]
fn test_missing_header_is_rejected() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);

    let err = db.update(&json!({"type": "post", "title": "no id"})).unwrap_err();
    assert!(err.is_validation());

    let err = db.update(&json!({"id": 1, "title": "no type"})).unwrap_err();
    assert!(err.is_validation());

    let err = db.update(&json!({"id": 1, "type": "comment"})).unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn test_unsupported_value_is_rejected() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);

    let err = db.update(&json!({"id": 1, "type": "post", "title": {"nested": true}})).unwrap_err();
    assert!(err.is_validation());

    let err = db.update(&json!({"id": 1, "type": "post", "date": "not a date"})).unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn test_rejected_update_keeps_previous_version() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);

    db.update(&post(1, "Hello World", "2020-01-01", &[])).unwrap();
    assert!(db.update(&json!({"id": 1, "type": "post", "date": "garbage"})).is_err());

    let response = db.search("hello", &SearchFilters::default()).unwrap();
    assert_eq!(ids(&response), vec!["1"]);
}

#[test]
fn test_delete_leaves_no_residue() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);

    db.update(&post(1, "Hello World", "2020-01-01", &["a", "b"])).unwrap();
    assert!(db.delete(1u64).unwrap());

    let stats = db.stats().unwrap();
    assert_eq!(stats.document_count, 0);
    assert_eq!(stats.total_tokens, 0);
    assert_eq!(stats.shard_count, 0);

    // Only the (empty) token registry survives
    let files: Vec<String> = index_files(&db).into_keys().collect();
    assert_eq!(files.len(), 1, "{:?}", files);
    assert!(files[0].ends_with("all.bin"));

    let response = db.search(QuerySegment::exact("title", "Hello World"), &SearchFilters::default()).unwrap();
    assert_eq!(response.num_found, 0);
}

#[test]
fn test_delete_keeps_other_documents() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);

    db.update(&post(1, "Hello World", "2020-01-01", &["a"])).unwrap();
    db.update(&post(2, "Hello There", "2021-01-01", &["a"])).unwrap();
    db.delete(1u64).unwrap();

    let response = db.search("hello", &SearchFilters::default()).unwrap();
    assert_eq!(ids(&response), vec!["2"]);

    let response = db.search("world", &SearchFilters::default()).unwrap();
    assert_eq!(response.num_found, 0);
}

#[test]
fn test_delete_missing_is_a_noop() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);

    assert!(!db.delete("ghost").unwrap());
    assert_eq!(db.stats().unwrap().document_count, 0);
}

#[test]
fn test_reindexing_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);

    db.update(&post(2, "Other Post", "2019-05-01", &["b"])).unwrap();
    db.update(&post(1, "Hello World", "2020-01-01", &["a", "b"])).unwrap();
    let once = index_files(&db);
    let first = db.search("hello", &SearchFilters::default()).unwrap();

    db.update(&post(1, "Hello World", "2020-01-01", &["a", "b"])).unwrap();
    assert_eq!(index_files(&db), once);

    let second = db.search("hello", &SearchFilters::default()).unwrap();
    assert_eq!(first.max_score, second.max_score);
}

#[test]
fn test_update_replaces_terms() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);

    db.update(&post(1, "Hello World", "2020-01-01", &[])).unwrap();
    db.update(&post(1, "Goodbye World", "2020-01-01", &[])).unwrap();

    assert_eq!(db.search("hello", &SearchFilters::default()).unwrap().num_found, 0);
    assert_eq!(ids(&db.search("goodbye", &SearchFilters::default()).unwrap()), vec!["1"]);
}

#[test]
fn test_index_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let db = open(&dir);
        db.update(&post(1, "Hello World", "2020-01-01", &[])).unwrap();
    }

    let db = open(&dir);
    let response = db.search("world", &SearchFilters::default()).unwrap();
    assert_eq!(ids(&response), vec!["1"]);
}
