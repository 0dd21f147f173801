//! Compile-time schema
//!
//! A key is a type implementing [`StorageKey`]; its value type picks the
//! legal access modes through trait impls:
//!
//! - [`RawDomain`] for raw mode, with the accepted input type
//! - [`JsonDomain`] for JSON mode, with the decoded output type
//! - [`Nullable`] for removal
//!
//! Plain strings, bigints and dates never implement [`JsonDomain`], so using
//! them with JSON mode fails to compile instead of failing at runtime.
//!
//! ```ignore
//! storage_schema! {
//!     pub fn app_schema;
//!     pub Count: "count" => f64;
//!     pub Name: "name" => Optional<String>;
//!     pub Prefs: "prefs" => Option<Prefs>;
//! }
//! ```

use std::convert::Infallible;

use chrono::{DateTime, FixedOffset, Utc};
use num_bigint::BigInt;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec::{decode_serde, encode_serde, json_number_text, JsonSlot, JsonText};
use crate::coerce::{date_to_string, number_to_string};
use crate::domain::Domain;
use crate::error::CodecError;

/// A Rust type standing for a logical domain
pub trait LogicalDomain {
    fn domain() -> Domain;
}

/// A declared key: its stored name and its value type
pub trait StorageKey {
    const NAME: &'static str;
    type Value: LogicalDomain;
}

/// Domains usable in raw mode
pub trait RawDomain: LogicalDomain {
    /// What raw-mode `set` accepts
    type Input: ?Sized;

    /// Native string coercion of the input
    fn to_raw(input: &Self::Input) -> String;
}

/// Domains usable in JSON mode
pub trait JsonDomain: LogicalDomain + Sized {
    /// What JSON-mode `get` produces
    type Output;

    fn to_json(&self) -> Result<JsonText, CodecError>;

    fn from_json(slot: JsonSlot<'_>) -> Result<Self::Output, CodecError>;
}

/// Domains admitting `undefined` or `null`; only these keys may be removed
pub trait Nullable: LogicalDomain {}

/// Object or array shaped data stored as JSON text.
///
/// Raw mode takes pre-serialized text for these keys; JSON mode takes the
/// value itself. A value serializing to anything but an object or array is
/// a domain error, since the key's domain admits neither `null` nor scalars.
pub trait Structured: Serialize + DeserializeOwned {}

impl Structured for serde_json::Map<String, serde_json::Value> {}
impl<T: Serialize + DeserializeOwned> Structured for Vec<T> {}
impl<V: Serialize + DeserializeOwned> Structured for std::collections::BTreeMap<String, V> {}
impl<V: Serialize + DeserializeOwned> Structured for std::collections::HashMap<String, V> {}

impl<T: Structured> LogicalDomain for T {
    fn domain() -> Domain {
        Domain::structured()
    }
}

impl<T: Structured> RawDomain for T {
    type Input = str;

    fn to_raw(input: &str) -> String {
        input.to_owned()
    }
}

impl<T: Structured> JsonDomain for T {
    type Output = Option<T>;

    fn to_json(&self) -> Result<JsonText, CodecError> {
        let text = encode_serde(self)?;
        if let JsonText::Text(json) = &text {
            if !json.starts_with('{') && !json.starts_with('[') {
                return Err(CodecError::Domain(format!(
                    "{} is not an object or array",
                    json
                )));
            }
        }
        Ok(text)
    }

    fn from_json(slot: JsonSlot<'_>) -> Result<Option<T>, CodecError> {
        decode_serde(slot)
    }
}

// ---------------------------------------------------------------------------
// Primitives
// ---------------------------------------------------------------------------

impl LogicalDomain for f64 {
    fn domain() -> Domain {
        Domain::number()
    }
}

impl RawDomain for f64 {
    type Input = f64;

    fn to_raw(input: &f64) -> String {
        number_to_string(*input)
    }
}

impl JsonDomain for f64 {
    type Output = Option<f64>;

    fn to_json(&self) -> Result<JsonText, CodecError> {
        Ok(JsonText::Text(json_number_text(*self)))
    }

    fn from_json(slot: JsonSlot<'_>) -> Result<Option<f64>, CodecError> {
        decode_serde(slot)
    }
}

macro_rules! integer_domain {
    ($($ty:ty),* $(,)?) => {
        $(
            impl LogicalDomain for $ty {
                fn domain() -> Domain {
                    Domain::number()
                }
            }

            impl RawDomain for $ty {
                type Input = $ty;

                fn to_raw(input: &$ty) -> String {
                    input.to_string()
                }
            }

            impl JsonDomain for $ty {
                type Output = Option<$ty>;

                fn to_json(&self) -> Result<JsonText, CodecError> {
                    Ok(JsonText::Text(self.to_string()))
                }

                fn from_json(slot: JsonSlot<'_>) -> Result<Option<$ty>, CodecError> {
                    decode_serde(slot)
                }
            }
        )*
    };
}

integer_domain!(i8, i16, i32, i64, u8, u16, u32, u64);

impl LogicalDomain for bool {
    fn domain() -> Domain {
        Domain::boolean()
    }
}

impl RawDomain for bool {
    type Input = bool;

    fn to_raw(input: &bool) -> String {
        input.to_string()
    }
}

impl JsonDomain for bool {
    type Output = Option<bool>;

    fn to_json(&self) -> Result<JsonText, CodecError> {
        Ok(JsonText::Text(self.to_string()))
    }

    fn from_json(slot: JsonSlot<'_>) -> Result<Option<bool>, CodecError> {
        decode_serde(slot)
    }
}

impl LogicalDomain for String {
    fn domain() -> Domain {
        Domain::string()
    }
}

impl RawDomain for String {
    type Input = str;

    fn to_raw(input: &str) -> String {
        input.to_owned()
    }
}

impl LogicalDomain for BigInt {
    fn domain() -> Domain {
        Domain::bigint()
    }
}

impl RawDomain for BigInt {
    type Input = BigInt;

    fn to_raw(input: &BigInt) -> String {
        input.to_string()
    }
}

impl LogicalDomain for DateTime<FixedOffset> {
    fn domain() -> Domain {
        Domain::date()
    }
}

impl RawDomain for DateTime<FixedOffset> {
    type Input = DateTime<FixedOffset>;

    fn to_raw(input: &DateTime<FixedOffset>) -> String {
        date_to_string(input)
    }
}

impl LogicalDomain for DateTime<Utc> {
    fn domain() -> Domain {
        Domain::date()
    }
}

impl RawDomain for DateTime<Utc> {
    type Input = DateTime<Utc>;

    fn to_raw(input: &DateTime<Utc>) -> String {
        date_to_string(&input.fixed_offset())
    }
}

/// `number | bigint`. Raw mode prints either as numeric text; JSON mode
/// accepts the key but fails to encode the bigint member.
#[derive(Debug, Clone, PartialEq)]
pub enum NumberOrBigInt {
    Number(f64),
    BigInt(BigInt),
}

impl LogicalDomain for NumberOrBigInt {
    fn domain() -> Domain {
        Domain::number().union(Domain::bigint())
    }
}

impl RawDomain for NumberOrBigInt {
    type Input = NumberOrBigInt;

    fn to_raw(input: &NumberOrBigInt) -> String {
        match input {
            NumberOrBigInt::Number(n) => number_to_string(*n),
            NumberOrBigInt::BigInt(n) => n.to_string(),
        }
    }
}

impl JsonDomain for NumberOrBigInt {
    type Output = Option<NumberOrBigInt>;

    fn to_json(&self) -> Result<JsonText, CodecError> {
        match self {
            NumberOrBigInt::Number(n) => Ok(JsonText::Text(json_number_text(*n))),
            NumberOrBigInt::BigInt(_) => Err(CodecError::Encoding(
                "Do not know how to serialize a BigInt".to_string(),
            )),
        }
    }

    fn from_json(slot: JsonSlot<'_>) -> Result<Option<NumberOrBigInt>, CodecError> {
        Ok(decode_serde::<f64>(slot)?.map(NumberOrBigInt::Number))
    }
}

// ---------------------------------------------------------------------------
// Absence
// ---------------------------------------------------------------------------

/// `T | undefined`, the shape of an optional property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Optional<T> {
    Undefined,
    Defined(T),
}

impl<T> Default for Optional<T> {
    fn default() -> Self {
        Optional::Undefined
    }
}

impl<T> Optional<T> {
    pub fn is_undefined(&self) -> bool {
        matches!(self, Optional::Undefined)
    }

    pub fn as_ref(&self) -> Optional<&T> {
        match self {
            Optional::Undefined => Optional::Undefined,
            Optional::Defined(v) => Optional::Defined(v),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Optional<U> {
        match self {
            Optional::Undefined => Optional::Undefined,
            Optional::Defined(v) => Optional::Defined(f(v)),
        }
    }

    pub fn defined(self) -> Option<T> {
        match self {
            Optional::Undefined => None,
            Optional::Defined(v) => Some(v),
        }
    }
}

impl<T> From<T> for Optional<T> {
    fn from(value: T) -> Self {
        Optional::Defined(value)
    }
}

impl<T: LogicalDomain> LogicalDomain for Optional<T> {
    fn domain() -> Domain {
        T::domain().or_undefined()
    }
}

impl<T: RawDomain> RawDomain for Optional<T> {
    type Input = T::Input;

    fn to_raw(input: &T::Input) -> String {
        T::to_raw(input)
    }
}

impl<T: JsonDomain> JsonDomain for Optional<T> {
    type Output = Optional<T::Output>;

    fn to_json(&self) -> Result<JsonText, CodecError> {
        match self {
            Optional::Undefined => Ok(JsonText::Undefined),
            Optional::Defined(value) => value.to_json(),
        }
    }

    fn from_json(slot: JsonSlot<'_>) -> Result<Self::Output, CodecError> {
        match slot {
            JsonSlot::Undefined => Ok(Optional::Undefined),
            other => T::from_json(other).map(Optional::Defined),
        }
    }
}

impl<T: LogicalDomain> Nullable for Optional<T> {}

impl<T: LogicalDomain> LogicalDomain for Option<T> {
    fn domain() -> Domain {
        T::domain().or_null()
    }
}

impl<T: RawDomain> RawDomain for Option<T> {
    type Input = T::Input;

    fn to_raw(input: &T::Input) -> String {
        T::to_raw(input)
    }
}

impl<T> JsonDomain for Option<T>
where
    T: JsonDomain<Output = Option<T>>,
{
    type Output = Option<T>;

    fn to_json(&self) -> Result<JsonText, CodecError> {
        match self {
            None => Ok(JsonText::Text("null".to_string())),
            Some(value) => value.to_json(),
        }
    }

    fn from_json(slot: JsonSlot<'_>) -> Result<Option<T>, CodecError> {
        T::from_json(slot)
    }
}

impl<T: LogicalDomain> Nullable for Option<T> {}

/// The domain `undefined`: readable, removable, never writable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Undefined;

/// The domain `null`: readable, removable, never writable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Null;

impl LogicalDomain for Undefined {
    fn domain() -> Domain {
        Domain::undefined()
    }
}

impl RawDomain for Undefined {
    type Input = Infallible;

    fn to_raw(input: &Infallible) -> String {
        match *input {}
    }
}

impl Nullable for Undefined {}

impl LogicalDomain for Null {
    fn domain() -> Domain {
        Domain::null()
    }
}

impl RawDomain for Null {
    type Input = Infallible;

    fn to_raw(input: &Infallible) -> String {
        match *input {}
    }
}

impl Nullable for Null {}

// ---------------------------------------------------------------------------
// Literal sets
// ---------------------------------------------------------------------------

/// Decode a number and map it onto a closed integer literal set
pub fn decode_number_literal<T>(
    slot: JsonSlot<'_>,
    from_value: fn(i64) -> Option<T>,
) -> Result<Option<T>, CodecError> {
    let Some(n) = decode_serde::<f64>(slot)? else {
        return Ok(None);
    };
    let literal = if n.fract() == 0.0 && n.abs() <= i64::MAX as f64 {
        from_value(n as i64)
    } else {
        None
    };
    literal
        .map(Some)
        .ok_or_else(|| CodecError::Domain(format!("{} is not in the literal set", number_to_string(n))))
}

/// Declare a closed set of string literals, e.g. `"a" | "b" | "c"`.
///
/// String literal keys are raw-mode only.
#[macro_export]
macro_rules! string_literals {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident { $($variant:ident = $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant),+
        }

        impl $name {
            pub const MEMBERS: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            pub fn from_text(text: &str) -> ::std::option::Option<Self> {
                match text {
                    $($text => ::std::option::Option::Some($name::$variant),)+
                    _ => ::std::option::Option::None,
                }
            }
        }

        impl $crate::typed::LogicalDomain for $name {
            fn domain() -> $crate::Domain {
                $crate::Domain::literals([$($text),+])
            }
        }

        impl $crate::typed::RawDomain for $name {
            type Input = $name;

            fn to_raw(input: &$name) -> ::std::string::String {
                input.as_str().to_string()
            }
        }
    };
}

/// Declare a closed set of integer literals, e.g. `1 | 2 | 3`.
///
/// Number literal keys support both modes; decoding a number outside the set
/// is a domain error.
#[macro_export]
macro_rules! number_literals {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident { $($variant:ident = $value:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant),+
        }

        impl $name {
            pub const MEMBERS: &'static [$name] = &[$($name::$variant),+];

            pub fn value(&self) -> i64 {
                match self {
                    $($name::$variant => $value),+
                }
            }

            pub fn from_value(value: i64) -> ::std::option::Option<Self> {
                match value {
                    $($value => ::std::option::Option::Some($name::$variant),)+
                    _ => ::std::option::Option::None,
                }
            }
        }

        impl $crate::typed::LogicalDomain for $name {
            fn domain() -> $crate::Domain {
                $crate::Domain::literals([$($value as f64),+])
            }
        }

        impl $crate::typed::RawDomain for $name {
            type Input = $name;

            fn to_raw(input: &$name) -> ::std::string::String {
                input.value().to_string()
            }
        }

        impl $crate::typed::JsonDomain for $name {
            type Output = ::std::option::Option<$name>;

            fn to_json(&self) -> ::std::result::Result<$crate::JsonText, $crate::CodecError> {
                ::std::result::Result::Ok($crate::JsonText::Text(self.value().to_string()))
            }

            fn from_json(
                slot: $crate::JsonSlot<'_>,
            ) -> ::std::result::Result<::std::option::Option<$name>, $crate::CodecError> {
                $crate::typed::decode_number_literal(slot, $name::from_value)
            }
        }
    };
}

/// Declare key types and a function building the matching runtime [`Schema`](crate::Schema).
#[macro_export]
macro_rules! storage_schema {
    (
        $(#[$fmeta:meta])*
        $fvis:vis fn $schema_fn:ident;
        $(
            $(#[$kmeta:meta])*
            $kvis:vis $key:ident : $name:literal => $ty:ty;
        )*
    ) => {
        $(
            $(#[$kmeta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            $kvis struct $key;

            impl $crate::typed::StorageKey for $key {
                const NAME: &'static str = $name;
                type Value = $ty;
            }
        )*

        $(#[$fmeta])*
        $fvis fn $schema_fn() -> ::std::result::Result<$crate::Schema, $crate::SchemaError> {
            $crate::Schema::builder()
                $(.typed::<$key>())*
                .build()
        }
    };
}
