//! Schema and codec error types

use thiserror::Error;

pub type SchemaResult<T> = Result<T, SchemaError>;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Duplicate schema key: {0}")]
    DuplicateKey(String),

    #[error("Schema key '{0}' has an empty domain")]
    EmptyDomain(String),

    #[error("Schema key '{key}' has an invalid literal: {reason}")]
    InvalidLiteral { key: String, reason: String },

    #[error("Schema parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure of a JSON-mode encode or decode, before a key name is attached
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("JSON syntax error: {0}")]
    Syntax(#[source] serde_json::Error),

    #[error("Decoded value is outside the domain: {0}")]
    Domain(String),

    #[error("No JSON representation: {0}")]
    Encoding(String),
}
