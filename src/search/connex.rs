use std::collections::HashMap;
use log::debug;
use crate::analysis::token::TermVector;
use crate::core::config::ConnexConfig;
use crate::core::error::Result;
use crate::core::types::DocId;
use crate::index::inverted::InvertedIndex;
use crate::index::posting::ScoreMap;
use crate::search::fuzzy::FuzzyMatcher;

/// Weighted terms and scored documents of a connex expansion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnexExpansion {
    pub tokens: Vec<(String, f64)>,
    pub documents: ScoreMap,
}

/// Finds documents related to the top results through their shared terms.
pub struct ConnexExpander<'a> {
    index: &'a InvertedIndex,
    config: &'a ConnexConfig,
}

impl<'a> ConnexExpander<'a> {
    pub fn new(index: &'a InvertedIndex, config: &'a ConnexConfig) -> Self {
        ConnexExpander { index, config }
    }

    /// `ranked` is the primary result in descending score order. Terms of
    /// `search_terms` are never expanded, and primary ids never come back.
    pub fn expand(&self, ranked: &[(DocId, f64)], search_terms: &[String]) -> Result<Option<ConnexExpansion>> {
        let Some(&(_, top)) = ranked.first() else {
            return Ok(None);
        };
        let max_score = if top == 0.0 { 1.0 } else { top };

        let mut tokens = TermVector::new();
        let mut ratios: HashMap<String, Vec<f64>> = HashMap::new();
        let mut seeds = 0;

        for (doc_id, score) in ranked {
            let ratio = score / max_score;
            if ratio <= self.config.threshold && seeds >= self.config.min {
                break;
            }

            let vector = self.index.token_vector(doc_id)?.unwrap_or_default();
            tokens.merge(&vector);
            for term in vector.terms() {
                ratios.entry(term.to_string()).or_default().push(ratio);
            }

            seeds += 1;
            if seeds >= self.config.max {
                break;
            }
        }

        tokens.retain(|term| !search_terms.iter().any(|t| t == term));

        let mut matcher = FuzzyMatcher::disabled(self.index);
        let mut weighted = Vec::new();
        let mut documents = ScoreMap::new();

        for (term, score) in tokens.iter().take(self.config.limit_token) {
            let weight: f64 = ratios.get(term)
                .map(|r| r.iter().map(|ratio| score * ratio).sum())
                .unwrap_or(0.0);

            for (doc_id, found) in matcher.find(term)? {
                *documents.entry(doc_id).or_insert(0.0) += found + weight;
            }
            weighted.push((term.to_string(), weight));
        }

        weighted.sort_by(|a, b| b.1.total_cmp(&a.1));
        for (doc_id, _) in ranked {
            documents.remove(doc_id);
        }

        debug!("Connex expanded {} seeds into {} documents", seeds, documents.len());
        Ok(Some(ConnexExpansion {
            tokens: weighted,
            documents,
        }))
    }
}
