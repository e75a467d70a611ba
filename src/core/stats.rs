use serde::{Serialize, Deserialize};
use crate::query::cache::CacheStats;

/// Index statistics for monitoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    // Storage metrics
    pub document_count: usize,
    pub total_tokens: usize,
    pub shard_count: usize,

    // Query metrics
    pub cache_entries: usize,
    pub cache: CacheStats,
}

impl IndexStats {
    /// Average number of registry terms per shard.
    pub fn tokens_per_shard(&self) -> f64 {
        if self.shard_count == 0 {
            0.0
        } else {
            self.total_tokens as f64 / self.shard_count as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_index_has_no_tokens_per_shard() {
        let stats = IndexStats {
            document_count: 0,
            total_tokens: 0,
            shard_count: 0,
            cache_entries: 0,
            cache: CacheStats { hit_count: 0, miss_count: 0, size: 0, capacity: 10 },
        };
        assert_eq!(stats.tokens_per_shard(), 0.0);
        assert_eq!(stats.cache.hit_rate(), 0.0);
    }
}
