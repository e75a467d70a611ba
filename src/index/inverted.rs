use std::collections::BTreeMap;
use std::sync::Arc;
use log::debug;
use crate::analysis::token::TermVector;
use crate::core::error::Result;
use crate::core::types::DocId;
use crate::index::posting::{shard_key, Posting, Shard, TokenRegistry, SHARD_PREFIX};
use crate::storage::directory::Directory;

pub const REGISTRY_KEY: &str = "all";

/// Sharded term postings plus the token registry and per-document vectors.
///
/// Callers serialize mutations: `upsert` and `remove` read-modify-write
/// shared shards without internal locking.
pub struct InvertedIndex {
    index: Arc<Directory>,
    vectors: Arc<Directory>,
}

impl InvertedIndex {
    pub fn new(index: Arc<Directory>, vectors: Arc<Directory>) -> Self {
        InvertedIndex { index, vectors }
    }

    /// Routes every term of `vector` to its shard and records the document's
    /// own vector. The document is expected to be retracted beforehand.
    pub fn upsert(&self, doc_id: &DocId, vector: &TermVector) -> Result<()> {
        let mut shards: BTreeMap<String, Shard> = BTreeMap::new();
        let mut registered = TokenRegistry::new();

        for (term, score) in vector.iter() {
            let key = shard_key(term);
            shards.entry(key.clone())
                .or_default()
                .entry(term.to_string())
                .or_default()
                .insert(doc_id.clone(), score);
            registered.insert(term.to_string(), key);
        }

        for (key, shard) in shards {
            self.index.merge(&key, shard)?;
        }
        self.index.merge(REGISTRY_KEY, registered)?;
        self.vectors.replace(doc_id.as_str(), vector)?;

        debug!("Indexed {} terms for document {}", vector.len(), doc_id);
        Ok(())
    }

    /// Scans every shard, since the registry alone does not say which
    /// shards hold the document.
    pub fn remove(&self, doc_id: &DocId) -> Result<()> {
        self.vectors.mark_deleted(doc_id.as_str())?;

        let mut registry = self.registry()?;
        let mut pruned = 0;

        for key in self.index.list_keys_with_prefix(SHARD_PREFIX)? {
            let Some(mut shard) = self.index.open::<Shard>(&key)? else {
                continue;
            };

            let mut touched = false;
            shard.retain(|term, posting| {
                if posting.remove(doc_id).is_some() {
                    touched = true;
                }
                if posting.is_empty() {
                    registry.remove(term);
                    pruned += 1;
                    false
                } else {
                    true
                }
            });

            if shard.is_empty() {
                self.index.mark_deleted(&key)?;
            } else if touched {
                self.index.replace(&key, &shard)?;
            }
        }

        self.index.replace(REGISTRY_KEY, &registry)?;
        debug!("Retracted document {} ({} terms pruned)", doc_id, pruned);
        Ok(())
    }

    /// Exact posting of `term`.
    pub fn lookup(&self, term: &str) -> Result<Option<Posting>> {
        if term.is_empty() {
            return Ok(None);
        }
        let shard: Option<Shard> = self.index.open(&shard_key(term))?;
        Ok(shard.and_then(|mut shard| shard.remove(term)))
    }

    pub fn registry(&self) -> Result<TokenRegistry> {
        self.index.open_or_default(REGISTRY_KEY)
    }

    pub fn token_vector(&self, doc_id: &DocId) -> Result<Option<TermVector>> {
        self.vectors.open(doc_id.as_str())
    }

    pub fn shard_count(&self) -> Result<usize> {
        Ok(self.index.list_keys_with_prefix(SHARD_PREFIX)?.len())
    }

    pub fn free(&self) {
        self.index.free();
        self.vectors.free();
    }
}
