//! Cache backends

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::debug;

use crate::cache::{CacheEntry, CacheMap};
use crate::Result;

/// Whole-map persistence for the result cache
pub trait CacheStore: Send + Sync {
    /// Read every entry. A missing backing file is an empty map.
    fn load(&self) -> Result<CacheMap>;

    /// Replace the stored map with `entries`
    fn save(&self, entries: &CacheMap) -> Result<()>;
}

/// A single JSON object on disk, keyed by absolute target path
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CacheStore for JsonFileStore {
    fn load(&self) -> Result<CacheMap> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(CacheMap::new()),
            Err(e) => return Err(e.into()),
        };

        // Entries that don't match the schema are dropped one by one
        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_slice(&bytes)?;
        let entries = raw
            .into_iter()
            .filter_map(|(key, value)| match serde_json::from_value::<CacheEntry>(value) {
                Ok(entry) => Some((key, entry)),
                Err(e) => {
                    debug!("Dropping malformed cache entry for {}: {}", key, e);
                    None
                }
            })
            .collect();

        Ok(entries)
    }

    fn save(&self, entries: &CacheMap) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_vec(entries)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

/// In-process store; nothing outlives the value
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<CacheMap>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheStore for MemoryStore {
    fn load(&self) -> Result<CacheMap> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory store lock poisoned"))?;
        Ok(entries.clone())
    }

    fn save(&self, entries: &CacheMap) -> Result<()> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory store lock poisoned"))?;
        *guard = entries.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StorageError;

    fn entry(count: usize, timestamp: f64) -> CacheEntry {
        CacheEntry {
            count,
            timestamp,
            report: None,
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("cache.json"));

        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(".cache").join("cache.json");
        let store = JsonFileStore::new(&path);

        let mut entries = CacheMap::new();
        entries.insert("/repo".to_string(), entry(42, 1000.0));
        store.save(&entries).unwrap();

        assert!(path.exists());
        let loaded = store.load().unwrap();
        assert_eq!(loaded["/repo"].count, 42);
    }

    #[test]
    fn test_file_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let store = JsonFileStore::new(&path);

        let mut entries = CacheMap::new();
        entries.insert("/repo".to_string(), entry(7, 1700000000.5));
        store.save(&entries).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["/repo"]["count"], 7);
        assert_eq!(json["/repo"]["timestamp"], 1700000000.5);
    }

    #[test]
    fn test_garbage_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, b"\x00\xffnot json{{").unwrap();

        let err = JsonFileStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StorageError::Corrupt(_)));
    }

    #[test]
    fn test_malformed_entries_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(
            &path,
            r#"{"/good": {"count": 3, "timestamp": 10.0}, "/bad": {"count": "many"}, "/worse": 5}"#,
        )
        .unwrap();

        let loaded = JsonFileStore::new(&path).load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded["/good"].count, 3);
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        let mut entries = CacheMap::new();
        entries.insert("/a".to_string(), entry(1, 1.0));
        store.save(&entries).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.load().unwrap()["/a"].count, 1);
    }
}
