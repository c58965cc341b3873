//! Local key-value storage, the on-disk analogue of a browser's per-origin
//! `localStorage`: string keys to string values, whole-value overwrites.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::StoreError;

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

/// Key-value store kept as a single JSON object file.
///
/// Every `set` rewrites the whole file through a temp file + rename so a
/// crash mid-write never leaves a truncated store behind.  There is no
/// locking; two processes writing the same file are last-write-wins.
pub struct FileKvStore {
    path: PathBuf,
}

impl FileKvStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(StoreError::Io(e)),
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        match serde_json::from_str(&content) {
            Ok(map) => Ok(map),
            Err(e) => {
                // A damaged store file is treated as empty; the next write replaces it.
                warn!("storage file {} is not a JSON object: {}", self.path.display(), e);
                Ok(BTreeMap::new())
            }
        }
    }
}

impl KeyValueStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_map()?.remove(key))
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let mut map = self.read_map()?;
        map.insert(key.to_string(), value);

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&map).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        debug!("storage: wrote key {} to {}", key, self.path.display());
        Ok(())
    }
}

/// In-memory store.  `set_unavailable(true)` makes every operation fail the
/// way a disabled or full storage backend would.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    values: BTreeMap<String, String>,
    unavailable: bool,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }

    /// Write a raw value, bypassing the availability switch.
    pub fn insert_raw(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable("storage disabled".to_string()));
        }
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable("quota exceeded".to_string()));
        }
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let mut store = FileKvStore::open(&path);
        assert_eq!(store.get("favorites").unwrap(), None);
        store.set("favorites", "[]".to_string()).unwrap();
        store.set("other", "x".to_string()).unwrap();

        let reopened = FileKvStore::open(&path);
        assert_eq!(reopened.get("favorites").unwrap().as_deref(), Some("[]"));
        assert_eq!(reopened.get("other").unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn test_file_store_overwrites_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileKvStore::open(dir.path().join("s.json"));
        store.set("k", "1".to_string()).unwrap();
        store.set("k", "2".to_string()).unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_file_store_damaged_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");
        std::fs::write(&path, "not json {").unwrap();
        let mut store = FileKvStore::open(&path);
        assert_eq!(store.get("favorites").unwrap(), None);
        store.set("favorites", "[]".to_string()).unwrap();
        assert_eq!(store.get("favorites").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_file_store_unwritable_location_errors() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the parent directory should be.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();
        let mut store = FileKvStore::open(blocker.join("storage.json"));
        assert!(store.set("favorites", "[]".to_string()).is_err());
    }

    #[test]
    fn test_memory_store_unavailable() {
        let mut store = MemoryKvStore::new();
        store.set("k", "v".to_string()).unwrap();
        store.set_unavailable(true);
        assert!(matches!(store.get("k"), Err(StoreError::Unavailable(_))));
        assert!(matches!(
            store.set("k", "w".to_string()),
            Err(StoreError::Unavailable(_))
        ));
        store.set_unavailable(false);
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }
}
