//! Persistent string store using redb

use redb::{Database, ReadableTable, TableDefinition};
use std::path::{Path, PathBuf};

use crate::error::{StoreError, StoreResult};
use crate::store::RawStore;

// Table definition for the string store
const TABLE: TableDefinition<&str, &str> = TableDefinition::new("storage");

/// String store backed by a redb database file
pub struct RedbStore {
    db: Database,
    path: PathBuf,
}

impl RedbStore {
    /// Open or create a store at `path`, creating parent directories as needed
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StoreError::InvalidPath(e.to_string()))?;
            }
        }

        let db = Database::create(path).map_err(StoreError::backend)?;

        // Initialize the table so read transactions can open it
        let write_txn = db.begin_write().map_err(StoreError::backend)?;
        {
            write_txn.open_table(TABLE).map_err(StoreError::backend)?;
        }
        write_txn.commit().map_err(StoreError::backend)?;

        tracing::debug!("Opened storage database at {:?}", path);
        Ok(Self {
            db,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        let read_txn = self.db.begin_read().map_err(StoreError::backend)?;
        let table = read_txn.open_table(TABLE).map_err(StoreError::backend)?;

        let mut keys = Vec::new();
        for item in table.iter().map_err(StoreError::backend)? {
            let (key, _) = item.map_err(StoreError::backend)?;
            keys.push(key.value().to_string());
        }
        Ok(keys)
    }
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").field("path", &self.path).finish()
    }
}

impl RawStore for RedbStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let read_txn = self.db.begin_read().map_err(StoreError::backend)?;
        let table = read_txn.open_table(TABLE).map_err(StoreError::backend)?;

        let value = table.get(key).map_err(StoreError::backend)?;
        Ok(value.map(|guard| guard.value().to_string()))
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let write_txn = self.db.begin_write().map_err(StoreError::backend)?;
        {
            let mut table = write_txn.open_table(TABLE).map_err(StoreError::backend)?;
            table.insert(key, value).map_err(StoreError::backend)?;
        }
        write_txn.commit().map_err(StoreError::backend)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        let write_txn = self.db.begin_write().map_err(StoreError::backend)?;
        {
            let mut table = write_txn.open_table(TABLE).map_err(StoreError::backend)?;
            table.remove(key).map_err(StoreError::backend)?;
        }
        write_txn.commit().map_err(StoreError::backend)?;
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        let keys = self.keys()?;
        let write_txn = self.db.begin_write().map_err(StoreError::backend)?;
        {
            let mut table = write_txn.open_table(TABLE).map_err(StoreError::backend)?;
            for key in keys {
                table.remove(key.as_str()).map_err(StoreError::backend)?;
            }
        }
        write_txn.commit().map_err(StoreError::backend)?;
        Ok(())
    }

    fn count(&self) -> StoreResult<usize> {
        let read_txn = self.db.begin_read().map_err(StoreError::backend)?;
        let table = read_txn.open_table(TABLE).map_err(StoreError::backend)?;

        // Count items by iterating
        let iter = table.iter().map_err(StoreError::backend)?;
        Ok(iter.count())
    }

    /// Keys enumerate in byte order, not insertion order
    fn key_at(&self, index: usize) -> StoreResult<Option<String>> {
        let read_txn = self.db.begin_read().map_err(StoreError::backend)?;
        let table = read_txn.open_table(TABLE).map_err(StoreError::backend)?;

        let key = match table.iter().map_err(StoreError::backend)?.nth(index) {
            Some(item) => {
                let (key, _) = item.map_err(StoreError::backend)?;
                Some(key.value().to_string())
            }
            None => None,
        };
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, RedbStore) {
        let dir = TempDir::new().unwrap();
        let store = RedbStore::open(dir.path().join("nested/storage.redb")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_redb_basic() {
        let (_dir, store) = temp_store();

        store.set("key1", "value1").unwrap();
        assert_eq!(store.get("key1").unwrap().as_deref(), Some("value1"));

        store.set("key1", "value2").unwrap();
        assert_eq!(store.get("key1").unwrap().as_deref(), Some("value2"));

        store.delete("key1").unwrap();
        assert_eq!(store.get("key1").unwrap(), None);
        store.delete("key1").unwrap();
    }

    #[test]
    fn test_redb_enumeration() {
        let (_dir, store) = temp_store();

        store.set("b", "2").unwrap();
        store.set("a", "1").unwrap();

        assert_eq!(store.count().unwrap(), 2);
        assert_eq!(store.key_at(0).unwrap().as_deref(), Some("a"));
        assert_eq!(store.key_at(1).unwrap().as_deref(), Some("b"));
        assert_eq!(store.key_at(2).unwrap(), None);
    }

    #[test]
    fn test_redb_clear() {
        let (_dir, store) = temp_store();

        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        store.clear().unwrap();

        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_redb_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.redb");
        {
            let store = RedbStore::open(&path).unwrap();
            store.set("count", "2.2").unwrap();
        }
        let store = RedbStore::open(&path).unwrap();
        assert_eq!(store.get("count").unwrap().as_deref(), Some("2.2"));
        assert_eq!(store.path(), path.as_path());
    }
}
