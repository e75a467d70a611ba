use std::collections::BTreeMap;
use crate::core::types::DocId;

/// Document → contribution score for one term or value.
pub type Posting = BTreeMap<DocId, f64>;

/// Term → posting, for every term of one shard.
pub type Shard = BTreeMap<String, Posting>;

/// Term → shard key, for every indexed term.
pub type TokenRegistry = BTreeMap<String, String>;

/// Document → accumulated relevance score.
pub type ScoreMap = BTreeMap<DocId, f64>;

pub const SHARD_PREFIX: &str = "t_";

/// Shard key of a term: its first character, hex encoded.
pub fn shard_key(term: &str) -> String {
    let mut buf = [0u8; 4];
    let first = term.chars().next()
        .map(|c| hex::encode(c.encode_utf8(&mut buf).as_bytes()))
        .unwrap_or_default();
    format!("{}{}", SHARD_PREFIX, first)
}

/// Adds every score of `other` into `results`.
pub fn accumulate(results: &mut ScoreMap, other: &Posting) {
    for (doc_id, score) in other {
        *results.entry(doc_id.clone()).or_insert(0.0) += score;
    }
}

/// Keeps the entries of `results` whose id is also in `other`; scores of
/// `results` are retained.
pub fn intersect(results: &mut ScoreMap, other: &ScoreMap) {
    results.retain(|doc_id, _| other.contains_key(doc_id));
}

/// Entries of `all` whose id is not in `matched`, scored 0.
pub fn complement(all: &ScoreMap, matched: &ScoreMap) -> ScoreMap {
    all.keys()
        .filter(|doc_id| !matched.contains_key(*doc_id))
        .map(|doc_id| (doc_id.clone(), 0.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, f64)]) -> ScoreMap {
        entries.iter().map(|(id, s)| (DocId::from(*id), *s)).collect()
    }

    #[test]
    fn shard_keys_follow_first_character() {
        assert_eq!(shard_key("hello"), "t_68");
        assert_eq!(shard_key("hat"), shard_key("house"));
        assert_eq!(shard_key("étoile"), "t_c3a9");
    }

    #[test]
    fn set_algebra_on_score_maps() {
        let mut results = map(&[("1", 1.0), ("2", 2.0)]);
        accumulate(&mut results, &map(&[("2", 3.0), ("3", 1.0)]));
        assert_eq!(results, map(&[("1", 1.0), ("2", 5.0), ("3", 1.0)]));

        intersect(&mut results, &map(&[("2", 100.0), ("4", 1.0)]));
        assert_eq!(results, map(&[("2", 5.0)]));

        let all = map(&[("1", 9.0), ("2", 9.0), ("3", 9.0)]);
        assert_eq!(complement(&all, &results), map(&[("1", 0.0), ("3", 0.0)]));
    }
}
