//! Storage error types

use otter_storage_schema::{CodecError, KeyClass};
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

pub type StorageResult<T> = Result<T, StorageError>;

/// Failures of the underlying string store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Quota exceeded while setting '{key}': limit is {limit} bytes")]
    QuotaExceeded { key: String, limit: usize },

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Invalid storage path: {0}")]
    InvalidPath(String),
}

impl StoreError {
    pub fn backend(err: impl std::fmt::Display) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// Failures of a typed storage operation
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Value for '{key}' is outside its domain: expected {expected}, found {found}")]
    DomainViolation {
        key: String,
        expected: String,
        found: String,
    },

    #[error("Key '{key}' is not a {class} key")]
    ClassificationViolation { key: String, class: KeyClass },

    #[error("Stored value for '{key}' is not valid JSON: {source}")]
    DecodeSyntax {
        key: String,
        source: serde_json::Error,
    },

    #[error("Value for '{key}' has no JSON representation: {reason}")]
    Encoding { key: String, reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl StorageError {
    pub fn classification(key: &str, class: KeyClass) -> Self {
        StorageError::ClassificationViolation {
            key: key.to_string(),
            class,
        }
    }

    /// Attach the key name to a codec failure
    pub fn from_codec(key: &str, err: CodecError) -> Self {
        match err {
            CodecError::Syntax(source) => StorageError::DecodeSyntax {
                key: key.to_string(),
                source,
            },
            CodecError::Domain(found) => StorageError::DomainViolation {
                key: key.to_string(),
                expected: "a value of the declared domain".to_string(),
                found,
            },
            CodecError::Encoding(reason) => StorageError::Encoding {
                key: key.to_string(),
                reason,
            },
        }
    }
}
