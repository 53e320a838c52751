use anyhow::Result;
use log::{debug, warn};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::utils::ensure_directory;

const STORE_FILE: &str = "storage.json";

/// Durable string key/value storage for user preferences.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Store backed by a flat JSON object on disk. Every `set` rewrites the file.
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    pub fn open(dir: &Path) -> Self {
        let path = dir.join(STORE_FILE);
        let values = match Self::read_values(&path) {
            Ok(values) => values,
            Err(e) => {
                warn!("Starting with empty preferences, {} unreadable: {}", path.display(), e);
                BTreeMap::new()
            }
        };
        debug!("Opened store {} with {} keys", path.display(), values.len());
        Self { path, values }
    }

    fn read_values(path: &Path) -> Result<BTreeMap<String, String>> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            ensure_directory(parent)?;
        }
        let contents = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: std::collections::HashMap<String, String>,
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_persists_across_open() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::open(dir.path());
        assert_eq!(store.get("selectedColor"), None);

        store.set("selectedColor", "cyan").unwrap();
        store.set("pomodoroTime", "30").unwrap();

        let reopened = JsonFileStore::open(dir.path());
        assert_eq!(reopened.get("selectedColor").as_deref(), Some("cyan"));
        assert_eq!(reopened.get("pomodoroTime").as_deref(), Some("30"));
    }

    #[test]
    fn test_file_store_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("pomodoro");
        let mut store = JsonFileStore::open(&nested);
        store.set("selectedFont", "space").unwrap();
        assert!(nested.join(STORE_FILE).exists());
    }

    #[test]
    fn test_malformed_file_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(STORE_FILE), "{ broken").unwrap();
        let store = JsonFileStore::open(dir.path());
        assert_eq!(store.get("selectedFont"), None);
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::default();
        store.set("shortTime", "5").unwrap();
        store.set("shortTime", "7").unwrap();
        assert_eq!(store.get("shortTime").as_deref(), Some("7"));
        assert_eq!(store.get("longTime"), None);
    }
}
