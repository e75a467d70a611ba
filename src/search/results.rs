use std::collections::{BTreeMap, HashSet};
use serde::{Serialize, Deserialize};
use serde_json::Value;
use crate::core::error::Result;
use crate::core::types::DocId;
use crate::index::field_index::FieldIndexes;
use crate::index::posting::ScoreMap;
use crate::query::builder::{Direction, SearchFilters};
use crate::storage::directory::Directory;

/// Key injected into every materialized document.
pub const SCORE_KEY: &str = "_score";

/// Field → (value, count) buckets, most frequent first.
pub type Facets = BTreeMap<String, Vec<(String, usize)>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub num_found: usize,
    pub max_score: f64,
    pub documents: Vec<Value>,
    pub facets: Facets,
    pub connex: Option<ConnexResponse>,
}

/// Related documents found through terms shared by the top results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnexResponse {
    pub tokens: Vec<(String, f64)>,
    pub documents: Vec<Value>,
}

impl SearchResponse {
    pub fn ids(&self) -> Vec<String> {
        self.documents.iter()
            .filter_map(|doc| doc.get("id"))
            .map(|id| match id {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect()
    }
}

/// Descending score; ties keep id order.
pub fn rank(results: &ScoreMap) -> Vec<(DocId, f64)> {
    let mut ranked: Vec<(DocId, f64)> = results.iter()
        .map(|(id, score)| (id.clone(), *score))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
}

/// `[offset, offset + limit)`, empty past the end.
pub fn paginate<T: Clone>(ranked: &[T], offset: usize, limit: Option<usize>) -> Vec<T> {
    ranked.iter()
        .skip(offset)
        .take(limit.unwrap_or(usize::MAX))
        .cloned()
        .collect()
}

/// Turns a score map into a response page.
pub struct ResultCompiler<'a> {
    fields: &'a FieldIndexes,
    documents: &'a Directory,
}

impl<'a> ResultCompiler<'a> {
    pub fn new(fields: &'a FieldIndexes, documents: &'a Directory) -> Self {
        ResultCompiler { fields, documents }
    }

    /// Without an order, descending score. Otherwise each field's exact
    /// index is walked in the requested direction and only ids present in
    /// `results` are emitted, in index order.
    pub fn order(&self, results: &ScoreMap, order: &[(String, Direction)]) -> Result<Vec<(DocId, f64)>> {
        if order.is_empty() {
            return Ok(rank(results));
        }

        let mut ordered = Vec::new();
        let mut seen = HashSet::new();
        for (field, direction) in order {
            let Some(index) = self.fields.exact(field)? else {
                continue;
            };
            let postings: Box<dyn Iterator<Item = _>> = match direction {
                Direction::Asc => Box::new(index.values()),
                Direction::Desc => Box::new(index.values().rev()),
            };
            for posting in postings {
                for doc_id in posting.keys() {
                    if let Some(score) = results.get(doc_id) {
                        if seen.insert(doc_id.clone()) {
                            ordered.push((doc_id.clone(), *score));
                        }
                    }
                }
            }
        }
        Ok(ordered)
    }

    /// Stored documents with their score injected; ids without a stored
    /// document are skipped.
    pub fn materialize(&self, page: &[(DocId, f64)]) -> Result<Vec<Value>> {
        let mut documents = Vec::with_capacity(page.len());
        for (doc_id, score) in page {
            if let Some(Value::Object(mut document)) = self.documents.open_json::<Value>(doc_id.as_str())? {
                document.insert(SCORE_KEY.to_string(), Value::from(*score));
                documents.push(Value::Object(document));
            }
        }
        Ok(documents)
    }

    /// Bucket counts per requested field. A restricted count only includes
    /// ids of `results` and keeps empty buckets.
    pub fn facets(&self, results: &ScoreMap, fields: &[String], restricted: bool) -> Result<Facets> {
        let mut facets = Facets::new();

        for field in fields {
            let Some(index) = self.fields.facet(field)? else {
                continue;
            };
            let mut counts: Vec<(String, usize)> = index.iter()
                .map(|(value, ids)| {
                    let count = if restricted {
                        ids.iter().filter(|id| results.contains_key(*id)).count()
                    } else {
                        ids.len()
                    };
                    (value.to_string(), count)
                })
                .collect();
            counts.sort_by(|a, b| b.1.cmp(&a.1));
            facets.insert(field.clone(), counts);
        }

        Ok(facets)
    }

    pub fn compile(
        &self,
        results: &ScoreMap,
        filters: &SearchFilters,
        restricted: bool,
        connex: Option<ConnexResponse>,
    ) -> Result<SearchResponse> {
        let ordered = self.order(results, &filters.order)?;
        let page = paginate(&ordered, filters.offset, filters.limit);

        Ok(SearchResponse {
            num_found: results.len(),
            max_score: results.values().copied().fold(0.0, f64::max),
            documents: self.materialize(&page)?,
            facets: self.facets(results, &filters.facets, restricted)?,
            connex,
        })
    }
}
