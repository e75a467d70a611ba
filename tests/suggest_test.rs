mod common;

use lexidex::{Database, SpanWrap};
use tempfile::TempDir;
use common::{open, post};

fn corpus(dir: &TempDir) -> Database {
    let db = open(dir);
    db.update(&post(1, "Hello World", "2020-01-01", &[])).unwrap();
    db.update(&post(2, "Goodbye World", "2020-01-01", &[])).unwrap();
    db.update(&post(3, "Shell Script", "2020-01-01", &[])).unwrap();
    db
}

#[test]
fn test_suggest_token_orders_by_position() {
    let dir = TempDir::new().unwrap();
    let db = corpus(&dir);

    let matches = db.suggest_token("ell").unwrap();
    assert_eq!(matches, vec![("hello".to_string(), 1), ("shell".to_string(), 2)]);
    assert!(db.suggest_token("").unwrap().is_empty());

    // Served from cache the second time
    assert_eq!(db.suggest_token("ell").unwrap(), matches);
    assert_eq!(db.stats().unwrap().cache.hit_count, 1);
}

#[test]
fn test_suggest_completes_last_word() {
    let dir = TempDir::new().unwrap();
    let db = corpus(&dir);

    assert_eq!(db.suggest("say wor").unwrap(), vec!["say world"]);
    assert_eq!(db.suggest("good").unwrap(), vec!["goodbye"]);
    assert!(db.suggest("say xyz").unwrap().is_empty());
}

#[test]
fn test_suggest_field_values() {
    let dir = TempDir::new().unwrap();
    let db = corpus(&dir);

    let plain = db.suggest_field("title", "World", &SpanWrap::Plain).unwrap();
    assert_eq!(plain, vec!["hello world", "goodbye world"]);

    let wrapped = db.suggest_field("title", "world", &SpanWrap::Class("hl".to_string())).unwrap();
    assert_eq!(wrapped[0], "hello <span class=\"hl\">world</span>");

    let span = db.suggest_field("title", "shell", &SpanWrap::Span).unwrap();
    assert_eq!(span, vec!["<span>shell</span> script"]);

    assert!(db.suggest_field("unknown", "world", &SpanWrap::Plain).unwrap().is_empty());
}

#[test]
fn test_tokenize_query() {
    let dir = TempDir::new().unwrap();
    let db = corpus(&dir);

    assert_eq!(db.tokenize_query("Hello, World! hello"), vec!["hello", "world"]);
}
