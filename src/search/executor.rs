use crate::analysis::analyzer::AnalyzerRegistry;
use crate::core::error::Result;
use crate::core::types::{DocId, FieldValue};
use crate::index::field_index::FieldIndexes;
use crate::index::posting::{accumulate, complement, intersect, ScoreMap};
use crate::query::segment::{Compiled, FieldDescriptor, FieldMode, QuerySegment};
use crate::search::fuzzy::FuzzyMatcher;
use crate::storage::directory::Directory;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    And,
    Or,
}

impl Operator {
    /// Folds `child` into `running`: intersection keeping running scores,
    /// or union summing shared scores.
    fn combine(self, running: &mut Option<ScoreMap>, child: ScoreMap) {
        if let Some(results) = running.as_mut() {
            match self {
                Operator::And => intersect(results, &child),
                Operator::Or => accumulate(results, &child),
            }
        } else {
            *running = Some(child);
        }
    }
}

/// Walks a query segment tree against the index.
pub struct QueryExecutor<'a> {
    fields: &'a FieldIndexes,
    analyzers: &'a AnalyzerRegistry,
    documents: &'a Directory,
}

impl<'a> QueryExecutor<'a> {
    pub fn new(fields: &'a FieldIndexes, analyzers: &'a AnalyzerRegistry, documents: &'a Directory) -> Self {
        QueryExecutor {
            fields,
            analyzers,
            documents,
        }
    }

    /// Every stored document, scored 0.
    pub fn match_all(&self) -> Result<ScoreMap> {
        Ok(self.documents.list_keys()?
            .into_iter()
            .map(|key| (DocId::new(key), 0.0))
            .collect())
    }

    /// Free text that tokenizes to nothing, with no restriction.
    pub fn is_match_all(&self, segment: &QuerySegment) -> bool {
        matches!(segment, QuerySegment::Search { text, child: None }
            if self.analyzers.tokenize_query(text).is_empty())
    }

    pub fn evaluate(&self, segment: &QuerySegment, matcher: &mut FuzzyMatcher) -> Result<ScoreMap> {
        match segment {
            QuerySegment::Nothing => Ok(ScoreMap::new()),
            QuerySegment::Search { text, child } => self.evaluate_search(text, child.as_deref(), matcher),
            QuerySegment::Not(inner) => {
                let matched = self.evaluate(inner, matcher)?;
                Ok(complement(&self.match_all()?, &matched))
            }
            QuerySegment::Or(_) => self.evaluate_group(segment, Operator::Or, matcher),
            QuerySegment::And(_) | QuerySegment::Field { .. } => {
                self.evaluate_group(segment, Operator::And, matcher)
            }
        }
    }

    /// Free-text terms are summed; a child segment only restricts.
    fn evaluate_search(
        &self,
        text: &str,
        child: Option<&QuerySegment>,
        matcher: &mut FuzzyMatcher,
    ) -> Result<ScoreMap> {
        let terms = self.analyzers.tokenize_query(text);
        if terms.is_empty() && child.is_none() {
            return self.match_all();
        }

        let mut scores = ScoreMap::new();
        for term in &terms {
            accumulate(&mut scores, &matcher.find(term)?);
        }

        match child {
            None => Ok(scores),
            Some(child) => {
                let restriction = self.evaluate(child, matcher)?;
                if terms.is_empty() {
                    Ok(restriction)
                } else {
                    intersect(&mut scores, &restriction);
                    Ok(scores)
                }
            }
        }
    }

    fn evaluate_group(
        &self,
        segment: &QuerySegment,
        operator: Operator,
        matcher: &mut FuzzyMatcher,
    ) -> Result<ScoreMap> {
        let mut results = None;

        for entry in segment.compile() {
            let (negated, child) = match entry {
                Compiled::Values(descriptor, values) => {
                    let mut matched = None;
                    for value in &values {
                        operator.combine(&mut matched, self.evaluate_field(&descriptor, value)?);
                    }
                    (descriptor.negated, matched.unwrap_or_default())
                }
                Compiled::Nested(node) => (false, self.evaluate(node, matcher)?),
            };

            let child = if negated {
                complement(&self.match_all()?, &child)
            } else {
                child
            };
            operator.combine(&mut results, child);
        }

        Ok(results.unwrap_or_default())
    }

    /// Field comparison against the field's indexes. Unindexed fields
    /// match nothing.
    pub fn evaluate_field(&self, descriptor: &FieldDescriptor, value: &FieldValue) -> Result<ScoreMap> {
        let mut results = ScoreMap::new();
        let field = descriptor.field.as_str();

        if descriptor.mode == FieldMode::Prefix {
            let Some(index) = self.fields.values(field)? else {
                return Ok(results);
            };
            for term in self.analyzers.tokenize_query(&value.as_text()) {
                for (indexed, posting) in &index {
                    if indexed.contains(term.as_str()) {
                        accumulate(&mut results, posting);
                    }
                }
            }
            return Ok(results);
        }

        let Some(index) = self.fields.exact(field)? else {
            return Ok(results);
        };
        let key = value.to_key();

        match descriptor.mode {
            FieldMode::Exact => {
                if let Some(posting) = index.get(&key) {
                    accumulate(&mut results, posting);
                }
            }
            FieldMode::Lt => {
                for (_, posting) in index.iter().take_while(|(k, _)| **k < key) {
                    accumulate(&mut results, posting);
                }
            }
            FieldMode::Lte => {
                for (_, posting) in index.iter().take_while(|(k, _)| **k <= key) {
                    accumulate(&mut results, posting);
                }
            }
            FieldMode::Gt => {
                for (_, posting) in index.iter().skip_while(|(k, _)| **k <= key) {
                    accumulate(&mut results, posting);
                }
            }
            FieldMode::Gte => {
                for (_, posting) in index.iter().skip_while(|(k, _)| **k < key) {
                    accumulate(&mut results, posting);
                }
            }
            FieldMode::Neq => {
                for (_, posting) in index.iter().filter(|(k, _)| **k != key) {
                    accumulate(&mut results, posting);
                }
            }
            FieldMode::Prefix => {}
        }

        Ok(results)
    }
}
