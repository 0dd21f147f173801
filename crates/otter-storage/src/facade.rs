//! Schema-checked storage facade over dynamic values
//!
//! Every operation validates the key against the classification set it
//! needs and the value against the key's derived input type before the
//! store is touched. Rejected calls leave the store unchanged.

use std::sync::Arc;

use otter_storage_schema::codec::{decode_value, encode_value};
use otter_storage_schema::coerce::to_raw_string;
use otter_storage_schema::{
    JsonSlot, KeyClass, KeyContract, ModeContract, Schema, TypeDesc, Value,
};

use crate::error::{StorageError, StorageResult};
use crate::store::RawStore;

/// A string store paired with the schema governing its keys
pub struct Storage<S> {
    store: S,
    schema: Arc<Schema>,
}

impl<S: RawStore> Storage<S> {
    pub fn new(store: S, schema: Schema) -> Self {
        Self::with_shared_schema(store, Arc::new(schema))
    }

    pub fn with_shared_schema(store: S, schema: Arc<Schema>) -> Self {
        Self { store, schema }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    fn raw_mode(&self, key: &str) -> StorageResult<&ModeContract> {
        self.schema
            .get(key)
            .and_then(KeyContract::raw)
            .ok_or_else(|| StorageError::classification(key, KeyClass::RawMode))
    }

    fn json_mode(&self, key: &str) -> StorageResult<&ModeContract> {
        self.schema
            .get(key)
            .and_then(KeyContract::json)
            .ok_or_else(|| StorageError::classification(key, KeyClass::JsonMode))
    }

    /// Raw-mode read: the stored string, or `None` when the key is absent
    pub fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        self.raw_mode(key)?;
        tracing::trace!(key, "storage get_item");
        Ok(self.store.get(key)?)
    }

    /// Raw-mode write through native string coercion
    pub fn set_item(&self, key: &str, value: &Value) -> StorageResult<()> {
        let mode = self.raw_mode(key)?;
        check_domain(key, &mode.input, value)?;
        let text = to_raw_string(value).ok_or_else(|| domain_violation(key, &mode.input, value))?;
        tracing::trace!(key, "storage set_item");
        Ok(self.store.set(key, &text)?)
    }

    /// Delete a nullable key; absent keys are left absent
    pub fn remove_item(&self, key: &str) -> StorageResult<()> {
        if !self.schema.get(key).is_some_and(KeyContract::is_nullable) {
            return Err(StorageError::classification(key, KeyClass::Nullable));
        }
        tracing::trace!(key, "storage remove_item");
        Ok(self.store.delete(key)?)
    }

    /// JSON-mode read.
    ///
    /// An absent key reads as `Null` and the sentinel as `Undefined`; any other
    /// text is decoded and returned as-is. Undecodable text is an error.
    pub fn get_json_item(&self, key: &str) -> StorageResult<Value> {
        self.json_mode(key)?;
        let raw = self.store.get(key)?;
        tracing::trace!(key, "storage get_json_item");
        decode_value(JsonSlot::from_raw(raw.as_deref())).map_err(|err| {
            tracing::warn!(key, "stored value is not valid JSON");
            StorageError::from_codec(key, err)
        })
    }

    /// JSON-mode write. `Undefined` is stored as the sentinel.
    pub fn set_json_item(&self, key: &str, value: &Value) -> StorageResult<()> {
        let mode = self.json_mode(key)?;
        let text = encode_value(value).map_err(|err| StorageError::from_codec(key, err))?;
        check_domain(key, &mode.input, value)?;
        tracing::trace!(key, "storage set_json_item");
        Ok(self.store.set(key, &text.into_raw())?)
    }

    /// Remove every key, declared or not
    pub fn clear(&self) -> StorageResult<()> {
        Ok(self.store.clear()?)
    }

    pub fn len(&self) -> StorageResult<usize> {
        Ok(self.store.count()?)
    }

    pub fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Name of the stored key at `index`
    pub fn key(&self, index: usize) -> StorageResult<Option<String>> {
        Ok(self.store.key_at(index)?)
    }
}

fn check_domain(key: &str, expected: &TypeDesc, value: &Value) -> StorageResult<()> {
    if expected.accepts(value) {
        Ok(())
    } else {
        Err(domain_violation(key, expected, value))
    }
}

fn domain_violation(key: &str, expected: &TypeDesc, value: &Value) -> StorageError {
    StorageError::DomainViolation {
        key: key.to_string(),
        expected: expected.to_string(),
        found: value.type_name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use otter_storage_schema::{Domain, Member};
    use serde_json::json;

    fn storage() -> Storage<MemoryStore> {
        let schema = Schema::builder()
            .key("count", Domain::number())
            .key("numberOpt", Domain::number().or_undefined())
            .key("string", Domain::string())
            .key("numberLiteral", Domain::literals([1, 2, 3]))
            .key("obj", Domain::structured())
            .key("fn", Domain::function())
            .build()
            .unwrap();
        Storage::new(MemoryStore::new(), schema)
    }

    #[test]
    fn test_set_then_get_coerces() {
        let storage = storage();
        storage.set_item("count", &Value::Number(2.2)).unwrap();
        assert_eq!(storage.get_item("count").unwrap().as_deref(), Some("2.2"));
    }

    #[test]
    fn test_set_rejects_absence_markers() {
        let storage = storage();
        for value in [Value::Undefined, Value::Null] {
            let err = storage.set_item("numberOpt", &value).unwrap_err();
            assert!(matches!(err, StorageError::DomainViolation { .. }));
        }
        assert!(storage.is_empty().unwrap());
    }

    #[test]
    fn test_set_rejects_values_outside_literal_set() {
        let storage = storage();
        storage.set_item("numberLiteral", &Value::from(1)).unwrap();
        let err = storage.set_item("numberLiteral", &Value::from(-1)).unwrap_err();
        assert!(
            matches!(&err, StorageError::DomainViolation { expected, .. } if expected == "1 | 2 | 3")
        );
        assert_eq!(storage.get_item("numberLiteral").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn test_structured_raw_input_is_text() {
        let storage = storage();
        let err = storage
            .set_item("obj", &Value::Structured(json!({"a": 1})))
            .unwrap_err();
        assert!(matches!(err, StorageError::DomainViolation { .. }));
        storage.set_item("obj", &Value::from(r#"{ "a": 1 }"#)).unwrap();
    }

    #[test]
    fn test_unrepresentable_keys_are_refused() {
        let storage = storage();
        let err = storage.set_item("fn", &Value::Null).unwrap_err();
        assert!(matches!(
            err,
            StorageError::ClassificationViolation { class: KeyClass::RawMode, .. }
        ));
        let err = storage.get_json_item("fn").unwrap_err();
        assert!(matches!(
            err,
            StorageError::ClassificationViolation { class: KeyClass::JsonMode, .. }
        ));
    }

    #[test]
    fn test_unknown_keys_are_refused() {
        let storage = storage();
        assert!(matches!(
            storage.get_item("missing"),
            Err(StorageError::ClassificationViolation { .. })
        ));
    }

    #[test]
    fn test_json_mode_refuses_string_keys() {
        let storage = storage();
        let err = storage
            .set_json_item("string", &Value::from("str"))
            .unwrap_err();
        assert!(matches!(err, StorageError::ClassificationViolation { .. }));
    }

    #[test]
    fn test_remove_requires_nullable_key() {
        let storage = storage();
        storage.set_item("count", &Value::from(1)).unwrap();
        assert!(matches!(
            storage.remove_item("count"),
            Err(StorageError::ClassificationViolation { class: KeyClass::Nullable, .. })
        ));
        assert_eq!(storage.get_item("count").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn test_json_encoding_error_leaves_store_unchanged() {
        let schema = Schema::builder()
            .key(
                "numeric",
                Domain::number().with(Member::BigInt),
            )
            .build()
            .unwrap();
        let storage = Storage::new(MemoryStore::new(), schema);
        storage.set_json_item("numeric", &Value::from(2)).unwrap();

        let err = storage
            .set_json_item("numeric", &Value::BigInt(3.into()))
            .unwrap_err();
        assert!(matches!(err, StorageError::Encoding { .. }));
        assert_eq!(storage.get_item("numeric").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_enumeration() {
        let storage = storage();
        storage.set_item("count", &Value::from(1)).unwrap();
        storage.set_item("string", &Value::from("s")).unwrap();
        assert_eq!(storage.len().unwrap(), 2);
        assert_eq!(storage.key(1).unwrap().as_deref(), Some("string"));
        storage.clear().unwrap();
        assert!(storage.is_empty().unwrap());
    }
}
