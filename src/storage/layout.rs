use std::path::PathBuf;
use std::fs;
use crate::core::config::Config;
use crate::core::error::Result;

/// Directory structure for data files
#[derive(Debug, Clone)]
pub struct StorageLayout {
    pub base_dir: PathBuf,       // Root directory
    pub index_dir: PathBuf,      // Shards, registry and field indexes
    pub vectors_dir: PathBuf,    // Per-document token vectors
    pub documents_dir: PathBuf,  // Stored documents
    pub cache_dir: PathBuf,      // Persisted responses
}

impl StorageLayout {
    pub fn new(config: &Config) -> Result<Self> {
        let base_dir = config.storage_path.clone();
        let index_dir = base_dir.join(&config.index_dir);
        let vectors_dir = index_dir.join("docs");
        let documents_dir = base_dir.join(&config.documents_dir);
        let cache_dir = base_dir.join(&config.cache_dir);

        fs::create_dir_all(&vectors_dir)?;
        fs::create_dir_all(&documents_dir)?;
        fs::create_dir_all(&cache_dir)?;

        Ok(StorageLayout {
            base_dir,
            index_dir,
            vectors_dir,
            documents_dir,
            cache_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn creates_every_namespace() {
        let dir = TempDir::new().unwrap();
        let config = Config::default().with_storage_path(dir.path());
        let layout = StorageLayout::new(&config).unwrap();

        assert!(layout.vectors_dir.is_dir());
        assert!(layout.documents_dir.is_dir());
        assert!(layout.cache_dir.is_dir());
        assert_eq!(layout.vectors_dir, dir.path().join("index").join("docs"));
    }
}
