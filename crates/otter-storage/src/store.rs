//! Flat string store primitives

use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::error::{StoreError, StoreResult};

/// The primitive surface of a flat, string-only key/value store.
///
/// Keys map to strings or are absent. `delete` of an absent key is a no-op.
pub trait RawStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    fn delete(&self, key: &str) -> StoreResult<()>;

    fn clear(&self) -> StoreResult<()>;

    /// Number of stored keys
    fn count(&self) -> StoreResult<usize>;

    /// Name of the key at `index` in enumeration order
    fn key_at(&self, index: usize) -> StoreResult<Option<String>>;
}

macro_rules! forward_raw_store {
    ($($wrapper:ty),*) => {
        $(
            impl<S: RawStore + ?Sized> RawStore for $wrapper {
                fn get(&self, key: &str) -> StoreResult<Option<String>> {
                    (**self).get(key)
                }

                fn set(&self, key: &str, value: &str) -> StoreResult<()> {
                    (**self).set(key, value)
                }

                fn delete(&self, key: &str) -> StoreResult<()> {
                    (**self).delete(key)
                }

                fn clear(&self) -> StoreResult<()> {
                    (**self).clear()
                }

                fn count(&self) -> StoreResult<usize> {
                    (**self).count()
                }

                fn key_at(&self, index: usize) -> StoreResult<Option<String>> {
                    (**self).key_at(index)
                }
            }
        )*
    };
}

forward_raw_store!(&S, Box<S>, Arc<S>);

/// In-memory store keeping keys in insertion order
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<IndexMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store refusing writes that would take keys plus values over `limit` bytes
    pub fn with_quota(limit: usize) -> Self {
        Self {
            entries: RwLock::new(IndexMap::new()),
            quota: Some(limit),
        }
    }

    pub fn quota(&self) -> Option<usize> {
        self.quota
    }

    /// Bytes currently used by keys and values
    pub fn used_bytes(&self) -> usize {
        self.entries
            .read()
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl RawStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = self.entries.write();
        if let Some(limit) = self.quota {
            let used: usize = entries.iter().map(|(k, v)| k.len() + v.len()).sum();
            let replaced = entries.get(key).map(|old| key.len() + old.len()).unwrap_or(0);
            if used - replaced + key.len() + value.len() > limit {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                    limit,
                });
            }
        }
        // Overwrites keep the original enumeration position
        match entries.get_mut(key) {
            Some(existing) => *existing = value.to_string(),
            None => {
                entries.insert(key.to_string(), value.to_string());
            }
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        self.entries.write().shift_remove(key);
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        self.entries.write().clear();
        Ok(())
    }

    fn count(&self) -> StoreResult<usize> {
        Ok(self.entries.read().len())
    }

    fn key_at(&self, index: usize) -> StoreResult<Option<String>> {
        Ok(self
            .entries
            .read()
            .get_index(index)
            .map(|(k, _)| k.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_basic() {
        let store = MemoryStore::new();

        store.set("key1", "value1").unwrap();
        assert_eq!(store.get("key1").unwrap().as_deref(), Some("value1"));
        assert_eq!(store.get("missing").unwrap(), None);

        store.delete("key1").unwrap();
        assert_eq!(store.get("key1").unwrap(), None);
        // Deleting again is a no-op
        store.delete("key1").unwrap();
    }

    #[test]
    fn test_memory_enumeration_order() {
        let store = MemoryStore::new();
        store.set("b", "1").unwrap();
        store.set("a", "2").unwrap();
        store.set("c", "3").unwrap();
        store.set("b", "4").unwrap();
        store.delete("a").unwrap();

        assert_eq!(store.count().unwrap(), 2);
        assert_eq!(store.key_at(0).unwrap().as_deref(), Some("b"));
        assert_eq!(store.key_at(1).unwrap().as_deref(), Some("c"));
        assert_eq!(store.key_at(2).unwrap(), None);
    }

    #[test]
    fn test_memory_clear() {
        let store = MemoryStore::new();
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        store.clear().unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_memory_quota() {
        let store = MemoryStore::with_quota(10);
        store.set("key", "12345").unwrap();
        assert_eq!(store.used_bytes(), 8);

        let err = store.set("other", "123").unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { limit: 10, .. }));
        assert_eq!(store.get("other").unwrap(), None);

        // Overwriting frees the old value's bytes first
        store.set("key", "1234567").unwrap();
        assert_eq!(store.get("key").unwrap().as_deref(), Some("1234567"));
    }

    #[test]
    fn test_forwarding_impls() {
        let store = Arc::new(MemoryStore::new());
        let shared: Arc<MemoryStore> = Arc::clone(&store);
        shared.set("a", "1").unwrap();
        let boxed: Box<dyn RawStore> = Box::new(MemoryStore::new());
        boxed.set("b", "2").unwrap();

        assert_eq!((&*store).get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(boxed.count().unwrap(), 1);
    }
}
