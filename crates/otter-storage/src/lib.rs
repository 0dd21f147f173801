//! Otter Storage - typed localStorage-style access over a flat string store
//!
//! Two facades share one store abstraction ([`RawStore`]):
//!
//! - [`Storage`] validates keys and [`Value`]s at runtime against a [`Schema`]
//! - [`TypedStorage`] checks keys at compile time through [`StorageKey`] types
//!
//! Both offer raw mode (native string coercion) and JSON mode (serde_json
//! with an `"undefined"` sentinel).
//!
//! # Usage
//!
//! ```ignore
//! use otter_storage::{storage_schema, MemoryStore, Optional, TypedStorage};
//!
//! storage_schema! {
//!     pub fn app_schema;
//!     pub Count: "count" => f64;
//!     pub CountOpt: "countOpt" => Optional<f64>;
//! }
//!
//! let storage = TypedStorage::new(MemoryStore::new());
//! storage.set_json_item::<Count>(&2.0)?;
//! assert_eq!(storage.get_json_item::<Count>()?, Some(2.0));
//! ```
//!
//! Backends are chosen with [`StorageConfig`]: `:memory:` for an in-memory
//! store, anything else for a redb database file.

mod config;
mod error;
mod facade;
mod redb_store;
mod store;
mod typed;

pub use config::{open_store, StorageConfig, MEMORY_PATH};
pub use error::{StorageError, StorageResult, StoreError, StoreResult};
pub use facade::Storage;
pub use redb_store::RedbStore;
pub use store::{MemoryStore, RawStore};
pub use typed::TypedStorage;

pub use otter_storage_schema as schema;
pub use otter_storage_schema::{
    number_literals, storage_schema, string_literals, Domain, JsonDomain, KeyClass, KeyContract,
    LogicalDomain, Member, Null, Nullable, NumberOrBigInt, Optional, RawDomain, Schema,
    StorageKey, Structured, Undefined, Value,
};
