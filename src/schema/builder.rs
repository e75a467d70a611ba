use serde_json::{Map, Value};
use crate::analysis::analyzer::AnalyzerRegistry;
use crate::analysis::token::TermVector;
use crate::core::error::{Error, Result};
use crate::core::types::{format_date, parse_date, DocId, ValueKey};
use crate::index::field_index::FieldEntry;
use crate::schema::schema::{FieldDefinition, FieldType};

/// Per-field index contribution, mirroring the shape of the document.
#[derive(Debug, Clone, PartialEq)]
pub enum Contribution {
    Empty,
    Terms(TermVector),
    Nested(Vec<Contribution>),
}

impl Contribution {
    /// Sums every term depth-first into one vector.
    pub fn flatten(&self) -> TermVector {
        let mut vector = TermVector::new();
        self.flatten_into(&mut vector);
        vector
    }

    fn flatten_into(&self, vector: &mut TermVector) {
        match self {
            Contribution::Empty => {}
            Contribution::Terms(terms) => vector.merge(terms),
            Contribution::Nested(children) => {
                for child in children {
                    child.flatten_into(vector);
                }
            }
        }
    }
}

/// State threaded through one document's build.
#[derive(Debug)]
pub struct IndexingContext {
    pub doc_id: DocId,
    pub entries: Vec<FieldEntry>,
}

impl IndexingContext {
    pub fn new(doc_id: DocId) -> Self {
        IndexingContext {
            doc_id,
            entries: Vec::new(),
        }
    }

    fn unsupported(&self, field: &str, value: &Value) -> Error {
        let kind = match value {
            Value::Array(_) => "an array",
            Value::Object(_) => "an object",
            _ => "a value",
        };
        Error::validation(format!(
            "Field '{}' of document '{}' is {} that cannot be indexed",
            field, self.doc_id, kind
        ))
    }
}

/// Extracts the `id` and `type` every ingested document must carry.
pub fn document_header(document: &Value) -> Result<(DocId, String, &Map<String, Value>)> {
    let data = document.as_object()
        .ok_or_else(|| Error::validation("Document should be an object"))?;

    let doc_id = data.get("id")
        .and_then(DocId::from_json)
        .ok_or_else(|| Error::validation("Document should have an 'id' property"))?;

    let doc_type = data.get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::validation(format!("Document '{}' should have a 'type' property", doc_id)))?;

    Ok((doc_id, doc_type.to_string(), data))
}

/// Walks a document against its schema, producing the stored document and
/// its index contribution in one pass.
pub struct DocumentBuilder<'a> {
    analyzers: &'a AnalyzerRegistry,
}

impl<'a> DocumentBuilder<'a> {
    pub fn new(analyzers: &'a AnalyzerRegistry) -> Self {
        DocumentBuilder { analyzers }
    }

    pub fn build(
        &self,
        data: &Map<String, Value>,
        schema: &[FieldDefinition],
        ctx: &mut IndexingContext,
    ) -> Result<(Map<String, Value>, Contribution)> {
        self.build_object(data, schema, "", ctx)
    }

    fn build_object(
        &self,
        data: &Map<String, Value>,
        schema: &[FieldDefinition],
        prefix: &str,
        ctx: &mut IndexingContext,
    ) -> Result<(Map<String, Value>, Contribution)> {
        let mut stored = Map::new();
        for key in ["id", "type"] {
            if let Some(value) = data.get(key) {
                stored.insert(key.to_string(), value.clone());
            }
        }

        let mut contributions = Vec::with_capacity(schema.len());
        for def in schema {
            let path = if prefix.is_empty() {
                def.name.clone()
            } else {
                format!("{}.{}", prefix, def.name)
            };

            match data.get(&def.name) {
                None | Some(Value::Null) => contributions.push(Contribution::Empty),
                Some(value) => {
                    let (value, contribution) = self.build_field(def, &path, value, ctx)?;
                    stored.insert(def.name.clone(), value);
                    contributions.push(contribution);
                }
            }
        }

        Ok((stored, Contribution::Nested(contributions)))
    }

    fn build_field(
        &self,
        def: &FieldDefinition,
        path: &str,
        value: &Value,
        ctx: &mut IndexingContext,
    ) -> Result<(Value, Contribution)> {
        match def.field_type {
            FieldType::Datetime => {
                let date = value.as_str()
                    .and_then(parse_date)
                    .ok_or_else(|| Error::validation(format!(
                        "Field '{}' of document '{}' is not a valid date", path, ctx.doc_id
                    )))?;
                let rendered = format_date(&date);
                let contribution = self.register(def, path, ValueKey::new(rendered.clone()), ctx);
                Ok((Value::String(rendered), contribution))
            }
            FieldType::List => {
                let item = def.item_definition()?;
                let items = match value {
                    Value::Array(items) => items,
                    other => return Err(ctx.unsupported(path, other)),
                };

                let mut stored = Vec::with_capacity(items.len());
                let mut contributions = Vec::with_capacity(items.len());
                for element in items.iter().filter(|v| !v.is_null()) {
                    let (value, contribution) = self.build_field(&item, path, element, ctx)?;
                    stored.push(value);
                    contributions.push(contribution);
                }
                Ok((Value::Array(stored), Contribution::Nested(contributions)))
            }
            FieldType::Array => {
                let fields = def.sub_schema.as_deref().ok_or_else(|| {
                    Error::validation(format!("Array field '{}' has no sub-schema", path))
                })?;
                let object = match value {
                    Value::Object(object) => object,
                    other => return Err(ctx.unsupported(path, other)),
                };

                let (stored, contribution) = self.build_object(object, fields, path, ctx)?;
                Ok((Value::Object(stored), contribution))
            }
            _ => {
                let key = ValueKey::from_json(value).ok_or_else(|| ctx.unsupported(path, value))?;
                let contribution = self.register(def, path, key, ctx);
                Ok((value.clone(), contribution))
            }
        }
    }

    /// Records the exact/value/facet entry of a primitive value and returns
    /// its contribution.
    fn register(
        &self,
        def: &FieldDefinition,
        path: &str,
        value: ValueKey,
        ctx: &mut IndexingContext,
    ) -> Contribution {
        let tokens = self.analyzers.tokenize(
            def.field_type.name(),
            vec![value.as_str().to_string()],
            def.boost,
        );

        let contribution = if def.indexed {
            Contribution::Terms(tokens.clone())
        } else {
            Contribution::Empty
        };

        ctx.entries.push(FieldEntry {
            field: path.to_string(),
            value,
            boost: def.boost,
            tokens,
            filterable: def.filterable,
        });
        contribution
    }
}
