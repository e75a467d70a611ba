use std::collections::BTreeMap;
use log::trace;
use crate::core::error::Result;
use crate::index::inverted::InvertedIndex;
use crate::index::posting::Posting;

/// Term lookup with approximate fallback, scoped to one query.
///
/// Approximate lookups are budgeted per matcher. Once the budget is spent
/// a missing term matches nothing.
pub struct FuzzyMatcher<'a> {
    index: &'a InvertedIndex,
    cost: usize,
    approximate_limit: Option<usize>,
    approximate_calls: usize,
    registry: Option<Vec<String>>,
}

impl<'a> FuzzyMatcher<'a> {
    pub fn new(index: &'a InvertedIndex, cost: usize, approximate_limit: Option<usize>) -> Self {
        FuzzyMatcher {
            index,
            cost,
            approximate_limit,
            approximate_calls: 0,
            registry: None,
        }
    }

    /// Exact lookups only.
    pub fn disabled(index: &'a InvertedIndex) -> Self {
        Self::new(index, 0, Some(0))
    }

    pub fn is_enabled(&self) -> bool {
        self.cost > 0
    }

    pub fn approximate_calls(&self) -> usize {
        self.approximate_calls
    }

    /// Posting of `term`, approximated when the term is not indexed.
    pub fn find(&mut self, term: &str) -> Result<Posting> {
        if term.is_empty() {
            return Ok(Posting::new());
        }
        match self.index.lookup(term)? {
            Some(posting) => Ok(posting),
            None => self.fuzzy_find(term, true),
        }
    }

    fn fuzzy_find(&mut self, term: &str, allow_truncation: bool) -> Result<Posting> {
        if term.is_empty() || !self.is_enabled() || !self.has_budget() {
            return Ok(Posting::new());
        }

        let mut matching = suggest_terms(self.registry_terms()?, term);
        if matching.is_empty() {
            self.approximate_calls += 1;
            let cost = self.cost;
            matching = approximate(self.registry_terms()?, term, cost);
            trace!("Approximated '{}' to {} candidates", term, matching.len());
        }

        if let Some(&(_, best)) = matching.first() {
            let mut found = Posting::new();
            for (candidate, _) in matching.iter().take_while(|(_, weight)| *weight == best) {
                if let Some(posting) = self.index.lookup(candidate)? {
                    for (doc_id, score) in posting {
                        let entry = found.entry(doc_id).or_insert(score);
                        *entry = entry.max(score);
                    }
                }
            }
            return Ok(found);
        }

        if !allow_truncation {
            return Ok(Posting::new());
        }

        let mut truncated: Vec<char> = term.chars().collect();
        truncated.pop();
        let truncated: String = truncated.into_iter().collect();
        trace!("Retrying '{}' as '{}'", term, truncated);

        match self.index.lookup(&truncated)? {
            Some(posting) => Ok(posting),
            None => self.fuzzy_find(&truncated, false),
        }
    }

    fn has_budget(&self) -> bool {
        self.approximate_limit
            .is_none_or(|limit| self.approximate_calls < limit)
    }

    fn registry_terms(&mut self) -> Result<&[String]> {
        if self.registry.is_none() {
            self.registry = Some(self.index.registry()?.into_keys().collect());
        }
        Ok(self.registry.as_deref().unwrap_or_default())
    }
}

/// Char position of `needle` in `haystack`.
pub fn char_position(haystack: &str, needle: &str) -> Option<usize> {
    haystack.find(needle).map(|byte| haystack[..byte].chars().count())
}

/// Every term containing `token`, weighted by match position, best first.
pub fn suggest_terms<S: AsRef<str>>(terms: &[S], token: &str) -> Vec<(String, usize)> {
    let mut matching: Vec<(String, usize)> = terms.iter()
        .filter_map(|term| {
            let term = term.as_ref();
            char_position(term, token).map(|pos| (term.to_string(), pos))
        })
        .collect();
    matching.sort_by_key(|(_, pos)| *pos);
    matching
}

fn without(chars: &[char], index: usize) -> Vec<char> {
    let mut reduced = chars.to_vec();
    if index < reduced.len() {
        reduced.remove(index);
    }
    reduced
}

fn find_chars(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}

/// Deletion-distance matches of `term` among `terms`, weighted by match
/// position (lowest kept per term), best first. Terms of one character are
/// never approximated.
pub fn approximate<S: AsRef<str>>(terms: &[S], term: &str, cost: usize) -> Vec<(String, usize)> {
    let candidates: Vec<(&str, Vec<char>)> = terms.iter()
        .map(|t| (t.as_ref(), t.as_ref().chars().collect()))
        .collect();
    let term: Vec<char> = term.chars().collect();

    let mut found = BTreeMap::new();
    approximate_round(&candidates, &term, cost, &[], &mut found);

    let mut matching: Vec<(String, usize)> = found.into_iter()
        .map(|(term, weight)| (term.to_string(), weight))
        .collect();
    matching.sort_by_key(|(_, weight)| *weight);
    matching
}

fn approximate_round<'t>(
    candidates: &[(&'t str, Vec<char>)],
    term: &[char],
    cost: usize,
    positions: &[usize],
    found: &mut BTreeMap<&'t str, usize>,
) {
    let len = term.len();
    if len <= 1 {
        return;
    }
    let cost = cost.min(len - 1);

    for i in 0..len {
        let reduced = without(term, i);

        for (original, chars) in candidates {
            let mut token = chars.clone();
            for &position in positions {
                if position < token.len() {
                    token.remove(position);
                }
            }
            if token.len() < len {
                continue;
            }

            if let Some(pos) = find_chars(&without(&token, i), &reduced) {
                found.entry(*original)
                    .and_modify(|weight| *weight = (*weight).min(pos))
                    .or_insert(pos);
            }
        }

        if cost > 1 {
            let mut deeper = positions.to_vec();
            deeper.push(i);
            approximate_round(candidates, &reduced, cost - 1, &deeper, found);
        }
    }
}
