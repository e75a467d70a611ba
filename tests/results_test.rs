mod common;

use lexidex::{Database, Direction, QueryBuilder, QuerySegment, SearchFilters};
use lexidex::core::config::ConnexConfig;
use serde_json::{json, Value};
use tempfile::TempDir;
use common::{ids, open, post};

fn corpus(dir: &TempDir) -> Database {
    let db = open(dir);
    db.update(&post(1, "Hello World", "2020-01-01T00:00:00+00:00", &["a"])).unwrap();
    db.update(&post(2, "Hello There", "2021-06-01T00:00:00+00:00", &["a", "b"])).unwrap();
    db.update(&post(3, "Goodbye World", "2019-03-01T00:00:00+00:00", &["b"])).unwrap();
    db
}

fn page(limit: usize, offset: usize) -> SearchFilters {
    SearchFilters {
        limit: Some(limit),
        offset,
        ..SearchFilters::default()
    }
}

#[test]
fn test_pagination() {
    let dir = TempDir::new().unwrap();
    let db = corpus(&dir);

    let first = db.search("", &page(2, 0)).unwrap();
    assert_eq!(first.num_found, 3);
    assert_eq!(ids(&first), vec!["1", "2"]);

    let second = db.search("", &page(2, 2)).unwrap();
    assert_eq!(second.num_found, 3);
    assert_eq!(ids(&second), vec!["3"]);

    let past_end = db.search("", &page(2, 3)).unwrap();
    assert_eq!(past_end.num_found, 3);
    assert!(past_end.documents.is_empty());
}

#[test]
fn test_default_order_is_descending_score() {
    let dir = TempDir::new().unwrap();
    let db = corpus(&dir);

    let response = db.search("hello world", &SearchFilters::default()).unwrap();
    assert_eq!(ids(&response)[0], "1");
    assert_eq!(response.max_score, 20.0);
}

#[test]
fn test_order_walks_exact_index() {
    let dir = TempDir::new().unwrap();
    let db = corpus(&dir);

    let asc = db.search_with(QueryBuilder::new("", None).order_by("date", Direction::Asc)).unwrap();
    assert_eq!(ids(&asc), vec!["3", "1", "2"]);

    let desc = db.search_with(QueryBuilder::new("", None).order_by("date", Direction::Desc)).unwrap();
    assert_eq!(ids(&desc), vec!["2", "1", "3"]);

    // Only ids of the result are emitted, in index order
    let titles = db.search_with(QueryBuilder::new("hello", None).order_by("title", Direction::Asc)).unwrap();
    assert_eq!(ids(&titles), vec!["2", "1"]);
}

#[test]
fn test_unrestricted_facets() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);
    db.update(&post(1, "One", "2020-01-01", &["a"])).unwrap();
    db.update(&post(2, "Two", "2020-01-02", &["a", "b"])).unwrap();

    let mut builder = QueryBuilder::new("", None);
    builder.add_facet("categories");
    let response = db.search_with(builder).unwrap();

    assert_eq!(
        response.facets["categories"],
        vec![("a".to_string(), 2), ("b".to_string(), 1)]
    );
}

#[test]
fn test_restricted_facets_keep_empty_buckets() {
    let dir = TempDir::new().unwrap();
    let db = corpus(&dir);

    let mut builder = QueryBuilder::from_segment(QuerySegment::exact("title", "Hello World"));
    builder.add_facet("categories");
    builder.add_facet("categories");
    builder.add_facet("unknown");
    let response = db.search_with(builder).unwrap();

    assert_eq!(response.facets.len(), 1);
    assert_eq!(
        response.facets["categories"],
        vec![("a".to_string(), 1), ("b".to_string(), 0)]
    );
}

#[test]
fn test_connex_expansion() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);
    db.update(&json!({"id": 1, "type": "post", "title": "alpha beta"})).unwrap();
    db.update(&json!({"id": 2, "type": "post", "title": "beta gamma"})).unwrap();
    db.update(&json!({"id": 3, "type": "post", "title": "delta epsilon"})).unwrap();

    let plain = db.search("alpha", &SearchFilters::default()).unwrap();
    assert!(plain.connex.is_none());

    let mut builder = QueryBuilder::new("alpha", None);
    builder.enable_connex();
    let response = db.search_with(builder).unwrap();
    assert_eq!(ids(&response), vec!["1"]);

    let connex = response.connex.unwrap();
    assert_eq!(connex.tokens, vec![("beta".to_string(), 10.0)]);
    assert_eq!(connex.documents.len(), 1);
    assert_eq!(connex.documents[0]["id"], json!(2));
    assert_eq!(connex.documents[0]["_score"], json!(20.0));
}

fn connex_corpus(dir: &TempDir, connex: ConnexConfig) -> Database {
    let mut config = common::config(dir);
    config.connex = connex;
    let db = Database::open(config).unwrap();
    let titles = [
        "alpha alpha beta gamma",
        "alpha beta delta",
        "alpha epsilon",
        "beta zeta",
        "gamma eta",
        "delta theta",
    ];
    for (i, title) in titles.iter().enumerate() {
        db.update(&json!({"id": i + 1, "type": "post", "title": title})).unwrap();
    }
    db
}

fn connex_alpha(db: &Database) -> (Vec<(String, f64)>, Vec<Value>) {
    let mut builder = QueryBuilder::new("alpha", None);
    builder.enable_connex();
    let response = db.search_with(builder).unwrap();
    assert_eq!(ids(&response), vec!["1", "2", "3"]);
    let connex = response.connex.unwrap();
    (connex.tokens, connex.documents)
}

fn scored(documents: &[Value]) -> Vec<(Value, Value)> {
    documents.iter().map(|doc| (doc["id"].clone(), doc["_score"].clone())).collect()
}

#[test]
fn test_connex_seeds_below_threshold_until_min() {
    // Doc 2 (ratio 0.5) is seeded only to reach `min`, doc 3 is not
    let dir = TempDir::new().unwrap();
    let db = connex_corpus(&dir, ConnexConfig {
        threshold: 0.9,
        min: 2,
        max: 10,
        limit_token: 2,
        limit_docs: 1,
    });

    let (tokens, documents) = connex_alpha(&db);
    // beta: 20 * 1.0 + 20 * 0.5, gamma: 10 * 1.0, delta cut by limit_token
    assert_eq!(tokens, vec![("beta".to_string(), 30.0), ("gamma".to_string(), 10.0)]);
    // doc 4: 10 + 30, doc 5 (10 + 10) cut by limit_docs
    assert_eq!(scored(&documents), vec![(json!(4), json!(40.0))]);
}

#[test]
fn test_connex_stops_at_max_seeds() {
    // Every primary result clears the threshold, `max` stops after doc 2
    let dir = TempDir::new().unwrap();
    let db = connex_corpus(&dir, ConnexConfig {
        threshold: 0.4,
        min: 1,
        max: 2,
        limit_token: 10,
        limit_docs: 2,
    });

    let (tokens, documents) = connex_alpha(&db);
    assert_eq!(tokens, vec![
        ("beta".to_string(), 30.0),
        ("gamma".to_string(), 10.0),
        ("delta".to_string(), 5.0),
    ]);
    assert_eq!(scored(&documents), vec![(json!(4), json!(40.0)), (json!(5), json!(20.0))]);

    // Without the cap doc 3 is seeded and brings epsilon
    let dir = TempDir::new().unwrap();
    let db = connex_corpus(&dir, ConnexConfig {
        threshold: 0.4,
        min: 1,
        max: 10,
        limit_token: 10,
        limit_docs: 10,
    });

    let (tokens, documents) = connex_alpha(&db);
    assert_eq!(tokens, vec![
        ("beta".to_string(), 30.0),
        ("gamma".to_string(), 10.0),
        ("delta".to_string(), 5.0),
        ("epsilon".to_string(), 5.0),
    ]);
    assert_eq!(scored(&documents), vec![
        (json!(4), json!(40.0)),
        (json!(5), json!(20.0)),
        (json!(6), json!(15.0)),
    ]);
}

#[test]
fn test_connex_without_results() {
    let dir = TempDir::new().unwrap();
    let db = corpus(&dir);

    let mut builder = QueryBuilder::from_segment(QuerySegment::exact("title", "nothing"));
    builder.enable_connex();
    let response = db.search_with(builder).unwrap();
    assert_eq!(response.num_found, 0);
    assert!(response.connex.is_none());
}
