use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use log::debug;
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sha2::{Digest, Sha256};
use crate::core::error::Result;
use crate::storage::directory::Directory;

/// Response cache: an in-memory LRU tier in front of the persisted cache
/// namespace. Cleared wholesale on every mutation.
pub struct ResponseCache {
    pub memory: Mutex<LruCache<String, Value>>,
    pub persisted: Arc<Directory>,
    pub size_limit: usize,
    pub hit_count: AtomicUsize,
    pub miss_count: AtomicUsize,
}

/// `<namespace>_<sha256 hex of the canonical JSON of request>`.
pub fn cache_key<T: Serialize>(namespace: &str, request: &T) -> Result<String> {
    let canonical = serde_json::to_vec(request)?;
    let digest = Sha256::digest(&canonical);
    Ok(format!("{}_{}", namespace, hex::encode(digest)))
}

impl ResponseCache {
    pub fn new(persisted: Arc<Directory>, size_limit: usize) -> Self {
        let cap = NonZeroUsize::new(size_limit.max(1)).unwrap_or(NonZeroUsize::MIN);
        ResponseCache {
            memory: Mutex::new(LruCache::new(cap)),
            persisted,
            size_limit,
            hit_count: AtomicUsize::new(0),
            miss_count: AtomicUsize::new(0),
        }
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let resident = self.memory.lock().get(key).cloned();
        let value = match resident {
            Some(value) => Some(value),
            None => {
                let stored: Option<Value> = self.persisted.open_json(key)?;
                if let Some(value) = &stored {
                    self.memory.lock().put(key.to_string(), value.clone());
                }
                stored
            }
        };

        match value {
            Some(value) => {
                self.hit_count.fetch_add(1, Ordering::Relaxed);
                debug!("Cache hit for {}", key);
                Ok(Some(serde_json::from_value(value)?))
            }
            None => {
                self.miss_count.fetch_add(1, Ordering::Relaxed);
                debug!("Cache miss for {}", key);
                Ok(None)
            }
        }
    }

    pub fn put<T: Serialize>(&self, key: &str, response: &T) -> Result<()> {
        let value = serde_json::to_value(response)?;
        self.persisted.replace_json(key, &value)?;
        self.memory.lock().put(key.to_string(), value);
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        self.memory.lock().clear();
        self.persisted.clear()
    }

    /// Persisted entries.
    pub fn len(&self) -> Result<usize> {
        self.persisted.len()
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
            size: self.memory.lock().len(),
            capacity: self.size_limit,
        }
    }
}

#[derive(Debug, Clone, Serialize, serde::Deserialize)]
pub struct CacheStats {
    pub hit_count: usize,
    pub miss_count: usize,
    pub size: usize,
    pub capacity: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total == 0 {
            0.0
        } else {
            self.hit_count as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::codec::CompressionType;
    use crate::storage::store::MemoryStore;

    fn cache(size: usize) -> ResponseCache {
        let dir = Directory::new(Box::new(MemoryStore::new()), CompressionType::None, false);
        ResponseCache::new(Arc::new(dir), size)
    }

    #[test]
    fn keys_are_deterministic() {
        let a = cache_key("search", &("hello", 10)).unwrap();
        let b = cache_key("search", &("hello", 10)).unwrap();
        let c = cache_key("search", &("hello", 20)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("search_"));
        assert_eq!(a.len(), "search_".len() + 64);
    }

    #[test]
    fn persisted_tier_backs_the_lru() {
        let cache = cache(1);
        cache.put("a", &vec![1, 2]).unwrap();
        cache.put("b", &vec![3]).unwrap();

        // "a" was evicted from memory but survives on disk
        assert_eq!(cache.get::<Vec<i32>>("a").unwrap(), Some(vec![1, 2]));
        assert_eq!(cache.get::<Vec<i32>>("missing").unwrap(), None);

        let stats = cache.stats();
        assert_eq!(stats.hit_count, 1);
        assert_eq!(stats.miss_count, 1);
        assert_eq!(cache.len().unwrap(), 2);

        cache.clear().unwrap();
        assert!(cache.is_empty().unwrap());
        assert_eq!(cache.get::<Vec<i32>>("b").unwrap(), None);
    }
}
