//! File-backed store with atomic commits.
//!
//! The whole key space is one JSON object. Every `put` rewrites the file to a
//! sibling temp path and renames it over the original, so a crash mid-write
//! leaves either the old state or the new state, never a torn file.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{KvStore, Slot, StoreError};

/// JSON-file [`KvStore`].
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    slots: Mutex<HashMap<String, Slot>>,
}

impl JsonStore {
    /// Opens the store at `path`, loading existing contents if the file
    /// exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let slots = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            slots: Mutex::new(slots),
        })
    }

    /// The file this store commits to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn commit(&self, slots: &HashMap<String, Slot>) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(slots)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn put(&self, key: &str, value: Slot) -> Result<(), StoreError> {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.insert(key.to_string(), value);
        self.commit(&slots)
    }

    fn get(&self, key: &str) -> Option<Slot> {
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.get(key).copied()
    }
}

impl KvStore for JsonStore {
    fn get_i64(&self, key: &str) -> Result<Option<i64>, StoreError> {
        match self.get(key) {
            None => Ok(None),
            Some(Slot::I64(v)) => Ok(Some(v)),
            Some(Slot::Bool(_)) => Err(StoreError::TypeMismatch {
                key: key.to_string(),
            }),
        }
    }

    fn put_i64(&self, key: &str, value: i64) -> Result<(), StoreError> {
        self.put(key, Slot::I64(value))
    }

    fn get_bool(&self, key: &str) -> Result<Option<bool>, StoreError> {
        match self.get(key) {
            None => Ok(None),
            Some(Slot::Bool(v)) => Ok(Some(v)),
            Some(Slot::I64(_)) => Err(StoreError::TypeMismatch {
                key: key.to_string(),
            }),
        }
    }

    fn put_bool(&self, key: &str, value: bool) -> Result<(), StoreError> {
        self.put(key, Slot::Bool(value))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        if slots.remove(key).is_some() {
            self.commit(&slots)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::keys;

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let store = JsonStore::open(&path).unwrap();
        store.put_i64(keys::SEED, 987_654_321).unwrap();
        store.put_bool(keys::RUNNING, true).unwrap();
        store.put_i64(&keys::every("news"), 300_000).unwrap();
        drop(store);

        let reopened = JsonStore::open(&path).unwrap();
        assert_eq!(reopened.get_i64(keys::SEED).unwrap(), Some(987_654_321));
        assert_eq!(reopened.get_bool(keys::RUNNING).unwrap(), Some(true));
        assert_eq!(
            reopened.get_i64(&keys::every("news")).unwrap(),
            Some(300_000)
        );
    }

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path().join("absent.json")).unwrap();
        assert_eq!(store.get_i64(keys::SEED).unwrap(), None);
    }

    #[test]
    fn remove_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let store = JsonStore::open(&path).unwrap();
        store.put_bool(keys::POWER_CONNECTED, true).unwrap();
        store.remove(keys::POWER_CONNECTED).unwrap();
        drop(store);

        let reopened = JsonStore::open(&path).unwrap();
        assert_eq!(reopened.get_bool(keys::POWER_CONNECTED).unwrap(), None);
    }
}
