#![allow(dead_code)]

use lexidex::{Config, Database, FieldDefinition, FieldType};
use serde_json::{json, Value};
use tempfile::TempDir;

pub fn post_schema() -> Vec<FieldDefinition> {
    vec![
        FieldDefinition::string("title").indexed().boost(10.0),
        FieldDefinition::datetime("date").indexed().boost(2.0),
        FieldDefinition::text("content").indexed(),
        FieldDefinition::list("categories", FieldType::String).filterable(),
        FieldDefinition::new("rank", FieldType::Number),
        FieldDefinition::array("author", vec![
            FieldDefinition::string("name").indexed().boost(3.0),
        ]),
    ]
}

pub fn config(dir: &TempDir) -> Config {
    Config::default()
        .with_storage_path(dir.path())
        .with_schema("post", post_schema())
}

pub fn open(dir: &TempDir) -> Database {
    Database::open(config(dir)).unwrap()
}

pub fn post(id: u64, title: &str, date: &str, categories: &[&str]) -> Value {
    json!({
        "id": id,
        "type": "post",
        "title": title,
        "date": date,
        "categories": categories,
    })
}

/// Ids of a response page, in page order.
pub fn ids(response: &lexidex::SearchResponse) -> Vec<String> {
    response.ids()
}

pub fn sorted(mut ids: Vec<String>) -> Vec<String> {
    ids.sort();
    ids
}
