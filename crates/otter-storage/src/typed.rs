//! Compile-time checked storage facade
//!
//! Keys are types declared with [`storage_schema!`](crate::storage_schema).
//! Using a key in a mode its domain does not support is a type error, so
//! the only runtime failures left are store errors and bad stored text.

use otter_storage_schema::{JsonDomain, JsonSlot, Nullable, RawDomain, StorageKey};

use crate::error::{StorageError, StorageResult};
use crate::store::RawStore;

/// A string store accessed through statically declared keys
#[derive(Debug, Default)]
pub struct TypedStorage<S> {
    store: S,
}

impl<S: RawStore> TypedStorage<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Raw-mode read
    pub fn get_item<K>(&self) -> StorageResult<Option<String>>
    where
        K: StorageKey,
        K::Value: RawDomain,
    {
        tracing::trace!(key = K::NAME, "typed get_item");
        Ok(self.store.get(K::NAME)?)
    }

    /// Raw-mode write of the coerced input
    pub fn set_item<K>(&self, value: &<K::Value as RawDomain>::Input) -> StorageResult<()>
    where
        K: StorageKey,
        K::Value: RawDomain,
    {
        let text = <K::Value as RawDomain>::to_raw(value);
        tracing::trace!(key = K::NAME, "typed set_item");
        Ok(self.store.set(K::NAME, &text)?)
    }

    pub fn remove_item<K>(&self) -> StorageResult<()>
    where
        K: StorageKey,
        K::Value: Nullable,
    {
        tracing::trace!(key = K::NAME, "typed remove_item");
        Ok(self.store.delete(K::NAME)?)
    }

    /// JSON-mode read.
    ///
    /// Absent keys decode as `None`, the sentinel as `Optional::Undefined`.
    /// Reading the sentinel for a key whose domain has no `undefined` is a
    /// domain violation.
    pub fn get_json_item<K>(&self) -> StorageResult<<K::Value as JsonDomain>::Output>
    where
        K: StorageKey,
        K::Value: JsonDomain,
    {
        let raw = self.store.get(K::NAME)?;
        tracing::trace!(key = K::NAME, "typed get_json_item");
        <K::Value as JsonDomain>::from_json(JsonSlot::from_raw(raw.as_deref())).map_err(|err| {
            tracing::warn!(key = K::NAME, "failed to decode stored value: {}", err);
            StorageError::from_codec(K::NAME, err)
        })
    }

    pub fn set_json_item<K>(&self, value: &K::Value) -> StorageResult<()>
    where
        K: StorageKey,
        K::Value: JsonDomain,
    {
        let text = value
            .to_json()
            .map_err(|err| StorageError::from_codec(K::NAME, err))?;
        tracing::trace!(key = K::NAME, "typed set_json_item");
        Ok(self.store.set(K::NAME, &text.into_raw())?)
    }

    pub fn clear(&self) -> StorageResult<()> {
        Ok(self.store.clear()?)
    }

    pub fn len(&self) -> StorageResult<usize> {
        Ok(self.store.count()?)
    }

    pub fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }

    pub fn key(&self, index: usize) -> StorageResult<Option<String>> {
        Ok(self.store.key_at(index)?)
    }
}

// Keys used in a mode their domain does not allow must not compile.

/// ```
/// use otter_storage::{storage_schema, MemoryStore, TypedStorage};
///
/// storage_schema! {
///     fn schema;
///     Name: "name" => String;
///     Count: "count" => f64;
/// }
///
/// let storage = TypedStorage::new(MemoryStore::new());
/// storage.set_item::<Name>("otter").unwrap();
/// storage.set_json_item::<Count>(&2.0).unwrap();
/// assert!(schema().is_ok());
/// ```
#[cfg(doctest)]
fn _modes_allowed_by_domain() {}

/// ```compile_fail
/// use otter_storage::{storage_schema, MemoryStore, TypedStorage};
///
/// storage_schema! {
///     fn schema;
///     Name: "name" => String;
/// }
///
/// let storage = TypedStorage::new(MemoryStore::new());
/// // Plain strings have no JSON mode
/// storage.set_json_item::<Name>(&"otter".to_string()).unwrap();
/// ```
#[cfg(doctest)]
fn _string_key_rejects_json_write() {}

/// ```compile_fail
/// use otter_storage::{storage_schema, MemoryStore, TypedStorage};
///
/// storage_schema! {
///     fn schema;
///     When: "when" => chrono::DateTime<chrono::Utc>;
/// }
///
/// let storage = TypedStorage::new(MemoryStore::new());
/// // Dates have no JSON mode
/// let _ = storage.get_json_item::<When>();
/// ```
#[cfg(doctest)]
fn _date_key_rejects_json_read() {}

/// ```compile_fail
/// use otter_storage::{storage_schema, MemoryStore, TypedStorage};
///
/// storage_schema! {
///     fn schema;
///     Count: "count" => f64;
/// }
///
/// let storage = TypedStorage::new(MemoryStore::new());
/// // `number` admits neither undefined nor null
/// storage.remove_item::<Count>().unwrap();
/// ```
#[cfg(doctest)]
fn _non_nullable_key_rejects_remove() {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use otter_storage_schema::{storage_schema, Optional};

    storage_schema! {
        fn schema;
        Count: "count" => f64;
        CountOpt: "countOpt" => Optional<f64>;
        Label: "label" => Option<String>;
    }

    #[test]
    fn test_schema_fn_lists_keys() {
        let schema = schema().unwrap();
        assert_eq!(schema.len(), 3);
        assert!(schema.get("countOpt").unwrap().is_nullable());
    }

    #[test]
    fn test_raw_round_trip() {
        let storage = TypedStorage::new(MemoryStore::new());
        storage.set_item::<Count>(&2.2).unwrap();
        assert_eq!(storage.get_item::<Count>().unwrap().as_deref(), Some("2.2"));

        storage.set_item::<Label>("hi").unwrap();
        assert_eq!(storage.get_item::<Label>().unwrap().as_deref(), Some("hi"));
        storage.remove_item::<Label>().unwrap();
        assert_eq!(storage.get_item::<Label>().unwrap(), None);
    }

    #[test]
    fn test_json_absent_and_sentinel() {
        let storage = TypedStorage::new(MemoryStore::new());
        assert_eq!(storage.get_json_item::<Count>().unwrap(), None);
        assert_eq!(
            storage.get_json_item::<CountOpt>().unwrap(),
            Optional::Defined(None)
        );

        storage.set_json_item::<CountOpt>(&Optional::Undefined).unwrap();
        assert_eq!(storage.get_item::<CountOpt>().unwrap().as_deref(), Some("undefined"));
        assert_eq!(storage.get_json_item::<CountOpt>().unwrap(), Optional::Undefined);
    }

    #[test]
    fn test_sentinel_outside_domain_is_rejected() {
        let storage = TypedStorage::new(MemoryStore::new());
        storage.set_item::<CountOpt>(&1.0).unwrap();
        storage.store().set("count", "undefined").unwrap();
        assert!(matches!(
            storage.get_json_item::<Count>(),
            Err(StorageError::DomainViolation { .. })
        ));
    }

    #[test]
    fn test_decode_syntax_error() {
        let storage = TypedStorage::new(MemoryStore::new());
        storage.store().set("count", "not json").unwrap();
        assert!(matches!(
            storage.get_json_item::<Count>(),
            Err(StorageError::DecodeSyntax { .. })
        ));
    }
}
