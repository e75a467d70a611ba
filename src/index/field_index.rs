use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use crate::analysis::token::TermVector;
use crate::core::error::Result;
use crate::core::types::{DocId, ValueKey};
use crate::index::posting::Posting;
use crate::storage::directory::Directory;

pub const EXACT_PREFIX: &str = "exact_";
pub const VALUES_PREFIX: &str = "values_";
pub const FACET_PREFIX: &str = "facet_";

/// Raw value → scored documents, ordered by `ValueKey`.
pub type ExactIndex = BTreeMap<ValueKey, Posting>;

/// Tokenized raw value → scored documents.
pub type ValueTokenIndex = BTreeMap<String, Posting>;

/// Raw value → unscored documents.
pub type FacetIndex = BTreeMap<ValueKey, BTreeSet<DocId>>;

/// One field value registered while building a document.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldEntry {
    pub field: String,
    pub value: ValueKey,
    pub boost: f64,
    pub tokens: TermVector,
    pub filterable: bool,
}

/// Per-field exact-value, value-token and facet indexes.
pub struct FieldIndexes {
    index: Arc<Directory>,
}

impl FieldIndexes {
    pub fn new(index: Arc<Directory>) -> Self {
        FieldIndexes { index }
    }

    pub fn apply(&self, doc_id: &DocId, entries: &[FieldEntry]) -> Result<()> {
        let mut exact: BTreeMap<&str, ExactIndex> = BTreeMap::new();
        let mut values: BTreeMap<&str, ValueTokenIndex> = BTreeMap::new();
        let mut facets: BTreeMap<&str, FacetIndex> = BTreeMap::new();

        for entry in entries {
            let field = entry.field.as_str();

            exact.entry(field)
                .or_default()
                .entry(entry.value.clone())
                .or_default()
                .insert(doc_id.clone(), entry.boost);

            let tokens = values.entry(field).or_default();
            for (term, score) in entry.tokens.iter() {
                tokens.entry(term.to_string())
                    .or_default()
                    .insert(doc_id.clone(), score);
            }

            if entry.filterable {
                facets.entry(field)
                    .or_default()
                    .entry(entry.value.clone())
                    .or_default()
                    .insert(doc_id.clone());
            }
        }

        for (field, content) in exact {
            self.index.merge(&format!("{}{}", EXACT_PREFIX, field), content)?;
        }
        for (field, content) in values {
            if !content.is_empty() {
                self.index.merge(&format!("{}{}", VALUES_PREFIX, field), content)?;
            }
        }
        for (field, content) in facets {
            self.index.merge(&format!("{}{}", FACET_PREFIX, field), content)?;
        }
        Ok(())
    }

    /// Strips `doc_id` from every field index, pruning emptied values.
    pub fn remove(&self, doc_id: &DocId) -> Result<()> {
        for key in self.index.list_keys_with_prefix(EXACT_PREFIX)? {
            self.retract_scored::<ValueKey>(&key, doc_id)?;
        }
        for key in self.index.list_keys_with_prefix(VALUES_PREFIX)? {
            self.retract_scored::<String>(&key, doc_id)?;
        }
        for key in self.index.list_keys_with_prefix(FACET_PREFIX)? {
            let Some(mut facet) = self.index.open::<FacetIndex>(&key)? else {
                continue;
            };
            let before = facet.values().map(BTreeSet::len).sum::<usize>();
            facet.retain(|_, ids| {
                ids.remove(doc_id);
                !ids.is_empty()
            });
            let after = facet.values().map(BTreeSet::len).sum::<usize>();
            self.store(&key, &facet, before != after)?;
        }
        Ok(())
    }

    fn retract_scored<K>(&self, key: &str, doc_id: &DocId) -> Result<()>
    where
        K: Ord + serde::Serialize + serde::de::DeserializeOwned,
    {
        let Some(mut index) = self.index.open::<BTreeMap<K, Posting>>(key)? else {
            return Ok(());
        };
        let mut touched = false;
        index.retain(|_, posting| {
            touched |= posting.remove(doc_id).is_some();
            !posting.is_empty()
        });
        self.store(key, &index, touched)
    }

    fn store<T>(&self, key: &str, content: &BTreeMap<T, impl serde::Serialize>, touched: bool) -> Result<()>
    where
        T: serde::Serialize,
    {
        if content.is_empty() {
            self.index.mark_deleted(key)
        } else if touched {
            self.index.replace(key, content)
        } else {
            Ok(())
        }
    }

    pub fn exact(&self, field: &str) -> Result<Option<ExactIndex>> {
        self.index.open(&format!("{}{}", EXACT_PREFIX, field))
    }

    pub fn values(&self, field: &str) -> Result<Option<ValueTokenIndex>> {
        self.index.open(&format!("{}{}", VALUES_PREFIX, field))
    }

    pub fn facet(&self, field: &str) -> Result<Option<FacetIndex>> {
        self.index.open(&format!("{}{}", FACET_PREFIX, field))
    }
}
