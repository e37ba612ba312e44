//! Durable key → string cache, written through on every mutation.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use tracing::{error, warn};

use crate::error::CacheError;

/// Key order of the serialized file. Lookups are hashed either way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheOrdering {
    #[default]
    Sorted,
    Unordered,
}

/// Persistent string map stored as a JSON object.
///
/// The file is read lazily on first access. Every mutation rewrites the whole
/// file; a failed write is logged and leaves the in-memory value in place.
pub struct CacheStore {
    path: PathBuf,
    ordering: CacheOrdering,
    entries: HashMap<String, String>,
    loaded: bool,
}

impl CacheStore {
    pub fn new(path: impl Into<PathBuf>, ordering: CacheOrdering) -> Self {
        Self {
            path: path.into(),
            ordering,
            entries: HashMap::new(),
            loaded: false,
        }
    }

    pub fn get(&mut self, key: &str) -> Option<String> {
        self.ensure_loaded();
        self.entries.get(key).cloned()
    }

    pub fn get_or(&mut self, key: &str, default: impl ToString) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    pub fn set(&mut self, key: &str, value: impl ToString) {
        self.ensure_loaded();
        self.entries.insert(key.to_string(), value.to_string());
        self.store();
    }

    pub fn delete(&mut self, key: &str) {
        self.ensure_loaded();
        if self.entries.remove(key).is_some() {
            self.store();
        }
    }

    pub fn clear(&mut self) {
        self.loaded = true;
        self.entries.clear();
        self.store();
    }

    pub fn len(&mut self) -> usize {
        self.ensure_loaded();
        self.entries.len()
    }

    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    fn ensure_loaded(&mut self) {
        if self.loaded {
            return;
        }
        self.loaded = true;
        match self.read() {
            Ok(entries) => self.entries = entries,
            Err(e) => warn!(
                "Failed to load cache from {}, starting empty: {e}",
                self.path.display()
            ),
        }
    }

    fn read(&self) -> Result<HashMap<String, String>, CacheError> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let data = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&data)?)
    }

    fn store(&self) {
        if let Err(e) = self.persist() {
            error!("Failed to write cache to {}: {e}", self.path.display());
        }
    }

    fn persist(&self) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = match self.ordering {
            CacheOrdering::Sorted => {
                let sorted: BTreeMap<&String, &String> = self.entries.iter().collect();
                serde_json::to_string_pretty(&sorted)?
            }
            CacheOrdering::Unordered => serde_json::to_string_pretty(&self.entries)?,
        };
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("playerlogs_cache_{}", rand::random::<u64>()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn set_then_get() {
        let dir = temp_dir();
        let mut cache = CacheStore::new(dir.join(".cache.json"), CacheOrdering::Sorted);

        assert!(cache.get("ram-timer").is_none());
        cache.set("ram-timer", 12);
        assert_eq!(cache.get("ram-timer").as_deref(), Some("12"));
        cache.set("label", "hello");
        assert_eq!(cache.get("label").as_deref(), Some("hello"));
        assert_eq!(cache.get_or("missing", 0), "0");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn survives_reopen() {
        let dir = temp_dir();
        let path = dir.join(".cache.json");

        let mut cache = CacheStore::new(&path, CacheOrdering::Unordered);
        cache.set("update-timer", 29);
        drop(cache);

        let mut reopened = CacheStore::new(&path, CacheOrdering::Unordered);
        assert_eq!(reopened.get("update-timer").as_deref(), Some("29"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn loads_lazily_on_first_read() {
        let dir = temp_dir();
        let path = dir.join(".cache.json");

        let mut cache = CacheStore::new(&path, CacheOrdering::Sorted);
        // Written after construction but before the first read.
        std::fs::write(&path, r#"{"ram-timer":"7"}"#).unwrap();
        assert_eq!(cache.get("ram-timer").as_deref(), Some("7"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn first_write_keeps_existing_entries() {
        let dir = temp_dir();
        let path = dir.join(".cache.json");
        std::fs::write(&path, r#"{"a":"1"}"#).unwrap();

        let mut cache = CacheStore::new(&path, CacheOrdering::Sorted);
        cache.set("b", 2);

        let mut reopened = CacheStore::new(&path, CacheOrdering::Sorted);
        assert_eq!(reopened.get("a").as_deref(), Some("1"));
        assert_eq!(reopened.get("b").as_deref(), Some("2"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn sorted_file_orders_keys() {
        let dir = temp_dir();
        let path = dir.join(".cache.json");

        let mut cache = CacheStore::new(&path, CacheOrdering::Sorted);
        cache.set("zeta", 1);
        cache.set("alpha", 2);
        cache.set("mid", 3);

        let raw = std::fs::read_to_string(&path).unwrap();
        let alpha = raw.find("alpha").unwrap();
        let mid = raw.find("mid").unwrap();
        let zeta = raw.find("zeta").unwrap();
        assert!(alpha < mid && mid < zeta);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn delete_and_clear() {
        let dir = temp_dir();
        let path = dir.join(".cache.json");

        let mut cache = CacheStore::new(&path, CacheOrdering::Sorted);
        cache.set("a", 1);
        cache.set("b", 2);
        cache.delete("a");
        assert!(cache.get("a").is_none());
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
        let mut reopened = CacheStore::new(&path, CacheOrdering::Sorted);
        assert!(reopened.get("b").is_none());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = temp_dir();
        let path = dir.join(".cache.json");
        std::fs::write(&path, "not json {{{").unwrap();

        let mut cache = CacheStore::new(&path, CacheOrdering::Sorted);
        assert!(cache.get("anything").is_none());
        cache.set("ram-timer", 3);

        let mut reopened = CacheStore::new(&path, CacheOrdering::Sorted);
        assert_eq!(reopened.get("ram-timer").as_deref(), Some("3"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn failed_write_keeps_memory_value() {
        let dir = temp_dir();
        // The cache path is a directory, so every write fails.
        let path = dir.join("blocked");
        std::fs::create_dir_all(&path).unwrap();

        let mut cache = CacheStore::new(&path, CacheOrdering::Sorted);
        cache.set("ram-timer", 4);
        assert_eq!(cache.get("ram-timer").as_deref(), Some("4"));
        assert!(path.is_dir());

        std::fs::remove_dir_all(&dir).ok();
    }
}
