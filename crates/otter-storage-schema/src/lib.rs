//! Otter Storage Schema - classification for typed storage keys
//!
//! A flat string store only ever holds strings. This crate decides, per
//! declared key, which access modes are legal and what each mode accepts
//! and produces:
//!
//! - **raw mode** coerces values to their native string form
//! - **JSON mode** goes through serde_json, with `"undefined"` reserved as a sentinel
//!
//! Keys are declared either statically (see [`typed`] and [`storage_schema!`])
//! or at runtime through [`Schema::builder`] / [`Schema::from_json_str`].
//!
//! # Usage
//!
//! ```ignore
//! use otter_storage_schema::{Domain, Schema};
//!
//! let schema = Schema::builder()
//!     .key("count", Domain::number())
//!     .key("objOpt", Domain::structured().or_undefined())
//!     .build()?;
//!
//! let contract = schema.get("objOpt").unwrap();
//! assert_eq!(contract.json().unwrap().output.to_string(), "object | undefined | null");
//! ```

pub mod classify;
pub mod codec;
pub mod coerce;
pub mod typed;

mod desc;
mod domain;
mod error;
mod schema;
mod value;

pub use classify::{KeyClass, KeyContract, ModeContract};
pub use codec::{JsonSlot, JsonText, UNDEFINED_SENTINEL};
pub use desc::TypeDesc;
pub use domain::{Domain, DomainKind, Literal, Member};
pub use error::{CodecError, SchemaError, SchemaResult};
pub use schema::{Schema, SchemaBuilder};
pub use typed::{
    JsonDomain, LogicalDomain, Null, Nullable, NumberOrBigInt, Optional, RawDomain, StorageKey,
    Structured, Undefined,
};
pub use value::Value;
