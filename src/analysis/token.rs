use std::collections::HashMap;
use serde::{Serialize, Deserialize};

/// Term → cumulative boost, kept in first-seen order.
///
/// Used both for a single field's tokenization result and for a whole
/// document's flattened contribution (the persisted token vector).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<(String, f64)>", into = "Vec<(String, f64)>")]
pub struct TermVector {
    entries: Vec<(String, f64)>,
    positions: HashMap<String, usize>,
}

impl TermVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `score` to the term, inserting it at the end when unseen.
    pub fn add(&mut self, term: &str, score: f64) {
        match self.positions.get(term) {
            Some(&pos) => self.entries[pos].1 += score,
            None => {
                self.positions.insert(term.to_string(), self.entries.len());
                self.entries.push((term.to_string(), score));
            }
        }
    }

    pub fn merge(&mut self, other: &TermVector) {
        for (term, score) in other.iter() {
            self.add(term, score);
        }
    }

    pub fn get(&self, term: &str) -> Option<f64> {
        self.positions.get(term).map(|&pos| self.entries[pos].1)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.positions.contains_key(term)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(t, s)| (t.as_str(), *s))
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(t, _)| t.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every term for which `keep` returns false, preserving order.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        let entries = std::mem::take(&mut self.entries);
        self.positions.clear();
        for (term, score) in entries {
            if keep(&term) {
                self.add(&term, score);
            }
        }
    }
}

impl PartialEq for TermVector {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl From<Vec<(String, f64)>> for TermVector {
    fn from(entries: Vec<(String, f64)>) -> Self {
        let mut vector = TermVector::new();
        for (term, score) in entries {
            vector.add(&term, score);
        }
        vector
    }
}

impl From<TermVector> for Vec<(String, f64)> {
    fn from(vector: TermVector) -> Self {
        vector.entries
    }
}

impl<'a> FromIterator<(&'a str, f64)> for TermVector {
    fn from_iter<I: IntoIterator<Item = (&'a str, f64)>>(iter: I) -> Self {
        let mut vector = TermVector::new();
        for (term, score) in iter {
            vector.add(term, score);
        }
        vector
    }
}
