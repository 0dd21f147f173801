//! JSON-mode encoding on top of serde_json
//!
//! The JSON codec cannot express `undefined`, so JSON mode reserves the raw
//! string `"undefined"` as a sentinel. Reads check for the sentinel with an
//! exact match before any decoding happens.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::coerce::number_to_string;
use crate::error::CodecError;
use crate::value::Value;

/// Stored text standing for an explicit `undefined` written in JSON mode
pub const UNDEFINED_SENTINEL: &str = "undefined";

/// What JSON mode sees when it reads a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonSlot<'a> {
    /// The key is not in the store
    Absent,
    /// The stored text is exactly the sentinel
    Undefined,
    /// Any other stored text, to be decoded
    Text(&'a str),
}

impl<'a> JsonSlot<'a> {
    pub fn from_raw(raw: Option<&'a str>) -> Self {
        match raw {
            None => JsonSlot::Absent,
            Some(UNDEFINED_SENTINEL) => JsonSlot::Undefined,
            Some(text) => JsonSlot::Text(text),
        }
    }
}

/// What JSON mode writes for a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonText {
    Undefined,
    Text(String),
}

impl JsonText {
    pub fn into_raw(self) -> String {
        match self {
            JsonText::Undefined => UNDEFINED_SENTINEL.to_string(),
            JsonText::Text(text) => text,
        }
    }
}

/// Numbers are written with `Number.prototype.toString`; non-finite values become `null`
pub fn json_number_text(n: f64) -> String {
    if n.is_finite() {
        number_to_string(n)
    } else {
        "null".to_string()
    }
}

/// Encode any serde value as JSON text
pub fn encode_serde<T: Serialize + ?Sized>(value: &T) -> Result<JsonText, CodecError> {
    serde_json::to_string(value)
        .map(JsonText::Text)
        .map_err(|e| CodecError::Encoding(e.to_string()))
}

/// Decode a slot for a domain that does not admit `undefined`.
///
/// An absent key and stored `null` both decode to `None`.
pub fn decode_serde<T: DeserializeOwned>(slot: JsonSlot<'_>) -> Result<Option<T>, CodecError> {
    match slot {
        JsonSlot::Absent => Ok(None),
        JsonSlot::Undefined => Err(CodecError::Domain(
            "stored value is undefined, which the domain does not admit".to_string(),
        )),
        JsonSlot::Text(text) => {
            // Malformed text is a syntax error even when the prefix already mismatches T
            let json: JsonValue = serde_json::from_str(text).map_err(CodecError::Syntax)?;
            serde_json::from_value::<Option<T>>(json)
                .map_err(|err| CodecError::Domain(err.to_string()))
        }
    }
}

/// Encode a runtime value. Bigints, callables and symbols have no JSON form.
pub fn encode_value(value: &Value) -> Result<JsonText, CodecError> {
    match value {
        Value::Undefined => Ok(JsonText::Undefined),
        Value::Null => Ok(JsonText::Text("null".to_string())),
        Value::Boolean(b) => Ok(JsonText::Text(b.to_string())),
        Value::Number(n) => Ok(JsonText::Text(json_number_text(*n))),
        Value::String(s) => encode_serde(s),
        Value::Date(d) => encode_serde(
            &d.with_timezone(&Utc)
                .format("%Y-%m-%dT%H:%M:%S%.3fZ")
                .to_string(),
        ),
        Value::Structured(json) => encode_serde(json),
        Value::BigInt(_) => Err(CodecError::Encoding(
            "Do not know how to serialize a BigInt".to_string(),
        )),
        Value::Function(name) => Err(CodecError::Encoding(format!(
            "function {} cannot be serialized",
            name
        ))),
        Value::Symbol(_) => Err(CodecError::Encoding(
            "symbols cannot be serialized".to_string(),
        )),
    }
}

/// Decode a slot into a runtime value, returning the decoded document as-is
pub fn decode_value(slot: JsonSlot<'_>) -> Result<Value, CodecError> {
    match slot {
        JsonSlot::Absent => Ok(Value::Null),
        JsonSlot::Undefined => Ok(Value::Undefined),
        JsonSlot::Text(text) => serde_json::from_str::<JsonValue>(text)
            .map(Value::from_json)
            .map_err(CodecError::Syntax),
    }
}
