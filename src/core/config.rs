use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use serde::{Serialize, Deserialize};
use crate::core::error::{Error, Result};
use crate::schema::schema::{FieldDefinition, FieldType};
use crate::storage::codec::CompressionType;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage_path: PathBuf,
    pub index_dir: String,
    pub documents_dir: String,
    pub cache_dir: String,

    pub fuzzy_cost: usize,                      // 0 disables approximate lookups
    pub approximate_limit: Option<usize>,       // None = unlimited per query
    pub connex: ConnexConfig,

    pub cache_size: usize,                      // in-memory LRU tier
    pub batch_free_interval: usize,             // release handles every N docs
    pub compression: CompressionType,
    pub keep_files_open: bool,

    pub schemas: BTreeMap<String, Vec<FieldDefinition>>,
    pub types: BTreeMap<String, Vec<String>>,
}

/// Tuning of the related-documents expansion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnexConfig {
    pub threshold: f64,
    pub min: usize,
    pub max: usize,
    pub limit_token: usize,
    pub limit_docs: usize,
}

impl Default for ConnexConfig {
    fn default() -> Self {
        ConnexConfig {
            threshold: 0.9,
            min: 3,
            max: 10,
            limit_token: 20,
            limit_docs: 10,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            storage_path: PathBuf::from("./data"),
            index_dir: "index".to_string(),
            documents_dir: "documents".to_string(),
            cache_dir: "cache".to_string(),

            fuzzy_cost: 1,
            approximate_limit: Some(5),
            connex: ConnexConfig::default(),

            cache_size: 1000,
            batch_free_interval: 50,
            compression: CompressionType::Lz4,
            keep_files_open: true,

            schemas: BTreeMap::new(),
            types: default_types(),
        }
    }
}

pub fn default_types() -> BTreeMap<String, Vec<String>> {
    let mut types = BTreeMap::new();
    types.insert(
        FieldType::Datetime.name().to_string(),
        vec!["date_format".to_string(), "date_split".to_string()],
    );
    types.insert(
        "_default".to_string(),
        ["lowercase", "whitespace", "single_quote", "trim_punctuation"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    );
    types
}

impl Config {
    pub fn with_storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path = path.into();
        self
    }

    pub fn with_schema(mut self, doc_type: &str, fields: Vec<FieldDefinition>) -> Self {
        self.schemas.insert(doc_type.to_string(), fields);
        self
    }

    pub fn with_fuzzy_cost(mut self, cost: usize) -> Self {
        self.fuzzy_cost = cost;
        self
    }

    /// Missing keys fall back to their defaults. A malformed schema is a
    /// validation failure since it describes the documents being ingested.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)
            .map_err(|e| Error::validation(format!("Invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.types.contains_key("_default") {
            return Err(Error::configuration("Tokenizer types must define a '_default' pipeline"));
        }
        for (doc_type, fields) in &self.schemas {
            for field in fields {
                field.validate()
                    .map_err(|e| Error::validation(format!("Schema '{}': {}", doc_type, e.context)))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_config_keeps_defaults_for_missing_keys() {
        let config = Config::from_json_str(r#"{
            "fuzzy_cost": 2,
            "schemas": {
                "post": [
                    {"name": "title", "type": "string", "indexed": true, "boost": 10}
                ]
            }
        }"#).unwrap();

        assert_eq!(config.fuzzy_cost, 2);
        assert_eq!(config.connex.limit_docs, 10);
        assert!(config.types.contains_key("_default"));
        assert_eq!(config.schemas["post"][0].boost, 10.0);
    }

    #[test]
    fn unknown_field_type_is_a_validation_error() {
        let err = Config::from_json_str(r#"{
            "schemas": {"post": [{"name": "title", "type": "blob"}]}
        }"#).unwrap_err();
        assert!(err.is_validation());
    }
}
