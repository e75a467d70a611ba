use std::sync::Arc;
use log::{debug, info, warn};
use parking_lot::Mutex;
use serde::{Serialize, Deserialize};
use serde_json::Value;
use crate::analysis::analyzer::AnalyzerRegistry;
use crate::core::error::Result;
use crate::core::types::DocId;
use crate::index::field_index::FieldIndexes;
use crate::index::inverted::InvertedIndex;
use crate::query::cache::ResponseCache;
use crate::schema::builder::{document_header, DocumentBuilder, IndexingContext};
use crate::schema::schema::SchemaRegistry;
use crate::storage::directory::Directory;

/// Per-document failure collected by `IndexWriter::rebuild`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebuildError {
    pub key: String,
    pub message: String,
}

/// Single writer over the index, field indexes and stored documents.
///
/// Mutations are serialized by `lock`. They are not transactional: a
/// storage failure midway leaves the index and stored documents out of step
/// until the next `rebuild`.
pub struct IndexWriter {
    pub inverted: Arc<InvertedIndex>,
    pub fields: Arc<FieldIndexes>,
    pub documents: Arc<Directory>,
    pub analyzers: Arc<AnalyzerRegistry>,
    pub schemas: Arc<SchemaRegistry>,
    pub cache: Arc<ResponseCache>,
    lock: Mutex<()>,
}

impl IndexWriter {
    pub fn new(
        inverted: Arc<InvertedIndex>,
        fields: Arc<FieldIndexes>,
        documents: Arc<Directory>,
        analyzers: Arc<AnalyzerRegistry>,
        schemas: Arc<SchemaRegistry>,
        cache: Arc<ResponseCache>,
    ) -> Self {
        IndexWriter {
            inverted,
            fields,
            documents,
            analyzers,
            schemas,
            cache,
            lock: Mutex::new(()),
        }
    }

    /// Indexes `document`, replacing any previous version, and clears the
    /// cache.
    pub fn update(&self, document: &Value) -> Result<DocId> {
        let doc_id = self.index_document(document)?;
        self.cache.clear()?;
        Ok(doc_id)
    }

    /// Like `update` but leaves the cache to the caller.
    pub fn update_deferred(&self, document: &Value) -> Result<DocId> {
        self.index_document(document)
    }

    fn index_document(&self, document: &Value) -> Result<DocId> {
        let (doc_id, doc_type, data) = document_header(document)?;
        let schema = self.schemas.get(&doc_type)?;

        // Built before retraction so a rejected document leaves the
        // previous version indexed
        let builder = DocumentBuilder::new(&self.analyzers);
        let mut ctx = IndexingContext::new(doc_id.clone());
        let (stored, contribution) = builder.build(data, schema, &mut ctx)?;
        let vector = contribution.flatten();

        let _guard = self.lock.lock();
        if self.documents.contains(doc_id.as_str())? {
            self.retract(&doc_id)?;
        }

        self.fields.apply(&doc_id, &ctx.entries)?;
        self.inverted.upsert(&doc_id, &vector)?;
        self.documents.replace_json(doc_id.as_str(), &Value::Object(stored))?;

        debug!("Updated document {} ({} terms, {} field values)", doc_id, vector.len(), ctx.entries.len());
        Ok(doc_id)
    }

    fn retract(&self, doc_id: &DocId) -> Result<()> {
        self.documents.mark_deleted(doc_id.as_str())?;
        self.inverted.remove(doc_id)?;
        self.fields.remove(doc_id)
    }

    /// Removes every trace of `doc_id`. Returns whether a stored document
    /// existed.
    pub fn delete(&self, doc_id: &DocId) -> Result<bool> {
        let existed = {
            let _guard = self.lock.lock();
            let existed = self.documents.contains(doc_id.as_str())?;
            self.retract(doc_id)?;
            existed
        };
        self.cache.clear()?;

        debug!("Deleted document {} (existed: {})", doc_id, existed);
        Ok(existed)
    }

    /// Reindexes every stored document, collecting failures instead of
    /// stopping at the first one.
    pub fn rebuild(&self) -> Result<Vec<RebuildError>> {
        let keys = self.documents.list_keys()?;
        let mut errors = Vec::new();

        for key in &keys {
            let outcome = self.documents.open_json::<Value>(key)
                .and_then(|document| match document {
                    Some(document) => self.index_document(&document).map(|_| ()),
                    None => Ok(()),
                });

            if let Err(e) = outcome {
                warn!("Failed to rebuild document '{}': {}", key, e);
                errors.push(RebuildError {
                    key: key.clone(),
                    message: e.to_string(),
                });
            }
            self.documents.free();
        }

        self.cache.clear()?;
        info!("Rebuilt {} documents ({} failures)", keys.len() - errors.len(), errors.len());
        Ok(errors)
    }

    pub fn clear_cache(&self) -> Result<()> {
        self.cache.clear()
    }

    /// Releases resident file contents of every namespace.
    pub fn free(&self) {
        self.inverted.free();
        self.documents.free();
        self.cache.persisted.free();
    }
}
