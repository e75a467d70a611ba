use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use crate::core::error::{Error, Result};

/// Field definition of a document schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub indexed: bool,       // contributes terms to the inverted index
    #[serde(default)]
    pub filterable: bool,    // maintains a facet index
    #[serde(default = "default_boost")]
    pub boost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<FieldType>,                  // element type of a `list`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_schema: Option<Vec<FieldDefinition>>,      // fields of an `array`
}

fn default_boost() -> f64 {
    1.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Text,
    Number,
    Boolean,
    Datetime,
    List,
    Array,
}

impl FieldType {
    /// Key of the tokenizer pipeline used for values of this type.
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Datetime => "datetime",
            FieldType::List => "list",
            FieldType::Array => "array",
        }
    }
}

impl FieldDefinition {
    pub fn new(name: &str, field_type: FieldType) -> Self {
        FieldDefinition {
            name: name.to_string(),
            field_type,
            indexed: false,
            filterable: false,
            boost: default_boost(),
            item_type: None,
            sub_schema: None,
        }
    }

    pub fn string(name: &str) -> Self {
        Self::new(name, FieldType::String)
    }

    pub fn text(name: &str) -> Self {
        Self::new(name, FieldType::Text)
    }

    pub fn datetime(name: &str) -> Self {
        Self::new(name, FieldType::Datetime)
    }

    pub fn list(name: &str, item_type: FieldType) -> Self {
        let mut def = Self::new(name, FieldType::List);
        def.item_type = Some(item_type);
        def
    }

    pub fn array(name: &str, fields: Vec<FieldDefinition>) -> Self {
        let mut def = Self::new(name, FieldType::Array);
        def.sub_schema = Some(fields);
        def
    }

    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    pub fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    pub fn boost(mut self, boost: f64) -> Self {
        self.boost = boost;
        self
    }

    pub fn with_sub_schema(mut self, fields: Vec<FieldDefinition>) -> Self {
        self.sub_schema = Some(fields);
        self
    }

    /// Definition applied to each element of a list.
    pub fn item_definition(&self) -> Result<FieldDefinition> {
        let item_type = self.item_type
            .ok_or_else(|| Error::validation(format!("List field '{}' has no item type", self.name)))?;
        let mut def = self.clone();
        def.field_type = item_type;
        def.item_type = None;
        Ok(def)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::validation("Field definitions need a name"));
        }
        match self.field_type {
            FieldType::List => {
                let item = self.item_definition()?;
                if item.field_type == FieldType::List {
                    return Err(Error::validation(format!(
                        "List field '{}' cannot contain lists", self.name
                    )));
                }
                item.validate()
            }
            FieldType::Array => {
                let fields = self.sub_schema.as_ref().ok_or_else(|| {
                    Error::validation(format!("Array field '{}' has no sub-schema", self.name))
                })?;
                fields.iter().try_for_each(FieldDefinition::validate)
            }
            _ => Ok(()),
        }
    }
}

/// Document type → ordered field definitions.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, Vec<FieldDefinition>>,
}

impl SchemaRegistry {
    pub fn new(schemas: BTreeMap<String, Vec<FieldDefinition>>) -> Self {
        SchemaRegistry { schemas }
    }

    pub fn get(&self, doc_type: &str) -> Result<&[FieldDefinition]> {
        self.schemas.get(doc_type)
            .map(Vec::as_slice)
            .ok_or_else(|| {
                let known: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
                Error::validation(format!(
                    "Document type '{}' does not match any of the existing types: {}",
                    doc_type,
                    known.join(", ")
                ))
            })
    }

    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }
}
