use std::collections::{BTreeMap, BTreeSet, HashMap};
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use crate::core::error::Result;
use crate::storage::codec::{self, CompressionType};
use crate::storage::store::Store;

/// Map-union merge used by `Directory::merge`.
///
/// Maps merge key by key, sets union, scalars are overwritten by the
/// incoming value.
pub trait Mergeable {
    fn merge(&mut self, other: Self);
}

impl Mergeable for f64 {
    fn merge(&mut self, other: Self) {
        *self = other;
    }
}

impl Mergeable for String {
    fn merge(&mut self, other: Self) {
        *self = other;
    }
}

impl<T: Ord> Mergeable for BTreeSet<T> {
    fn merge(&mut self, other: Self) {
        self.extend(other);
    }
}

impl<K: Ord, V: Mergeable> Mergeable for BTreeMap<K, V> {
    fn merge(&mut self, other: Self) {
        for (key, value) in other {
            match self.get_mut(&key) {
                Some(existing) => existing.merge(value),
                None => {
                    self.insert(key, value);
                }
            }
        }
    }
}

/// Typed view over one storage namespace.
///
/// With `keep_open` the encoded bytes of every file touched stay resident
/// until `free` is called.
pub struct Directory {
    store: Box<dyn Store>,
    compression: CompressionType,
    keep_open: bool,
    open_files: Mutex<HashMap<String, Vec<u8>>>,
}

impl Directory {
    pub fn new(store: Box<dyn Store>, compression: CompressionType, keep_open: bool) -> Self {
        Directory {
            store,
            compression,
            keep_open,
            open_files: Mutex::new(HashMap::new()),
        }
    }

    fn read_raw(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if self.keep_open {
            if let Some(bytes) = self.open_files.lock().get(key) {
                return Ok(Some(bytes.clone()));
            }
        }

        let bytes = self.store.read(key)?;
        if self.keep_open {
            if let Some(bytes) = &bytes {
                self.open_files.lock().insert(key.to_string(), bytes.clone());
            }
        }
        Ok(bytes)
    }

    fn write_raw(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        self.store.write(key, &bytes)?;
        if self.keep_open {
            self.open_files.lock().insert(key.to_string(), bytes);
        }
        Ok(())
    }

    pub fn open<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_raw(key)? {
            Some(bytes) => Ok(Some(codec::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn open_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        Ok(self.open(key)?.unwrap_or_default())
    }

    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.read_raw(key)?.is_some())
    }

    pub fn replace<T: Serialize>(&self, key: &str, content: &T) -> Result<()> {
        let bytes = codec::encode(content, self.compression)?;
        self.write_raw(key, bytes)
    }

    /// Merges `content` into the stored value (missing files start empty).
    pub fn merge<T>(&self, key: &str, content: T) -> Result<()>
    where
        T: Mergeable + Serialize + DeserializeOwned + Default,
    {
        let mut current: T = self.open_or_default(key)?;
        current.merge(content);
        self.replace(key, &current)
    }

    pub fn mark_deleted(&self, key: &str) -> Result<()> {
        self.open_files.lock().remove(key);
        self.store.delete(key)
    }

    pub fn list_keys(&self) -> Result<Vec<String>> {
        self.store.keys()
    }

    pub fn list_keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self.list_keys()?
            .into_iter()
            .filter(|key| key.starts_with(prefix))
            .collect())
    }

    pub fn open_all<T: DeserializeOwned>(&self) -> Result<Vec<(String, T)>> {
        let mut files = Vec::new();
        for key in self.list_keys()? {
            if let Some(content) = self.open(&key)? {
                files.push((key, content));
            }
        }
        Ok(files)
    }

    /// JSON values are not self-describing in bincode, so they travel as strings.
    pub fn open_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.open::<String>(key)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub fn replace_json<T: Serialize>(&self, key: &str, content: &T) -> Result<()> {
        let json = serde_json::to_string(content)?;
        self.replace(key, &json)
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.list_keys()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn clear(&self) -> Result<()> {
        self.open_files.lock().clear();
        self.store.clear()
    }

    /// Releases resident file contents.
    pub fn free(&self) {
        self.open_files.lock().clear();
    }

    pub fn resident_files(&self) -> usize {
        self.open_files.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::store::MemoryStore;

    fn directory(keep_open: bool) -> Directory {
        Directory::new(Box::new(MemoryStore::new()), CompressionType::Lz4, keep_open)
    }

    #[test]
    fn merge_unions_nested_maps() {
        let dir = directory(true);

        let mut first: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
        first.entry("hello".to_string()).or_default().insert("1".to_string(), 10.0);
        dir.merge("t", first).unwrap();

        let mut second: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
        second.entry("hello".to_string()).or_default().insert("2".to_string(), 5.0);
        second.entry("world".to_string()).or_default().insert("2".to_string(), 1.0);
        dir.merge("t", second).unwrap();

        let merged: BTreeMap<String, BTreeMap<String, f64>> = dir.open("t").unwrap().unwrap();
        assert_eq!(merged["hello"].len(), 2);
        assert_eq!(merged["world"]["2"], 1.0);
    }

    #[test]
    fn free_releases_resident_files() {
        let dir = directory(true);
        dir.replace("a", &1.0f64).unwrap();
        assert_eq!(dir.resident_files(), 1);
        dir.free();
        assert_eq!(dir.resident_files(), 0);
        assert_eq!(dir.open::<f64>("a").unwrap(), Some(1.0));

        let transient = directory(false);
        transient.replace("a", &1.0f64).unwrap();
        assert_eq!(transient.resident_files(), 0);
    }

    #[test]
    fn json_values_round_trip_through_strings() {
        let dir = directory(false);
        let doc = serde_json::json!({"id": 1, "tags": ["a", "b"]});
        dir.replace_json("1", &doc).unwrap();
        assert_eq!(dir.open_json::<serde_json::Value>("1").unwrap(), Some(doc));
        dir.mark_deleted("1").unwrap();
        assert!(dir.open_json::<serde_json::Value>("1").unwrap().is_none());
    }
}
