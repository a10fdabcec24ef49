//! In-memory store for tests and embeddings that do not need durability.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{KvStore, Slot, StoreError};

/// Map-backed [`KvStore`] with no persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, Slot>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_slots<R>(&self, f: impl FnOnce(&mut HashMap<String, Slot>) -> R) -> R {
        let mut guard = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }
}

impl KvStore for MemoryStore {
    fn get_i64(&self, key: &str) -> Result<Option<i64>, StoreError> {
        self.with_slots(|slots| match slots.get(key) {
            None => Ok(None),
            Some(Slot::I64(v)) => Ok(Some(*v)),
            Some(Slot::Bool(_)) => Err(StoreError::TypeMismatch {
                key: key.to_string(),
            }),
        })
    }

    fn put_i64(&self, key: &str, value: i64) -> Result<(), StoreError> {
        self.with_slots(|slots| {
            slots.insert(key.to_string(), Slot::I64(value));
            Ok(())
        })
    }

    fn get_bool(&self, key: &str) -> Result<Option<bool>, StoreError> {
        self.with_slots(|slots| match slots.get(key) {
            None => Ok(None),
            Some(Slot::Bool(v)) => Ok(Some(*v)),
            Some(Slot::I64(_)) => Err(StoreError::TypeMismatch {
                key: key.to_string(),
            }),
        })
    }

    fn put_bool(&self, key: &str, value: bool) -> Result<(), StoreError> {
        self.with_slots(|slots| {
            slots.insert(key.to_string(), Slot::Bool(value));
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.with_slots(|slots| {
            slots.remove(key);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_keys_read_as_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get_i64("nope").unwrap(), None);
        assert_eq!(store.get_bool("nope").unwrap(), None);
    }

    #[test]
    fn round_trips_both_types() {
        let store = MemoryStore::new();
        store.put_i64("n", -42).unwrap();
        store.put_bool("b", true).unwrap();
        assert_eq!(store.get_i64("n").unwrap(), Some(-42));
        assert_eq!(store.get_bool("b").unwrap(), Some(true));
    }

    #[test]
    fn type_confusion_is_an_error() {
        let store = MemoryStore::new();
        store.put_i64("n", 1).unwrap();
        assert!(matches!(
            store.get_bool("n"),
            Err(StoreError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn remove_clears_the_key() {
        let store = MemoryStore::new();
        store.put_bool("b", false).unwrap();
        store.remove("b").unwrap();
        assert_eq!(store.get_bool("b").unwrap(), None);
    }
}
