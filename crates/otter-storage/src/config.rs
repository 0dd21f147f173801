//! Store configuration
//!
//! ```toml
//! [storage]
//! path = "./data/storage.redb"   # or ":memory:"
//! quota_bytes = 5242880
//! ```

use serde::Deserialize;

use crate::error::{StorageError, StorageResult, StoreResult};
use crate::redb_store::RedbStore;
use crate::store::{MemoryStore, RawStore};

/// Path selecting the in-memory store
pub const MEMORY_PATH: &str = ":memory:";

const PATH_ENV: &str = "OTTER_STORAGE_PATH";
const QUOTA_ENV: &str = "OTTER_STORAGE_QUOTA";

/// Where the string store lives and how much it may hold
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    /// `:memory:` or a database file path
    #[serde(default = "default_path")]
    pub path: String,

    /// Byte limit for keys plus values; only enforced by the in-memory store
    #[serde(default)]
    pub quota_bytes: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    storage: Option<StorageConfig>,
}

fn default_path() -> String {
    MEMORY_PATH.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            quota_bytes: None,
        }
    }
}

impl StorageConfig {
    pub fn memory() -> Self {
        Self::default()
    }

    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            quota_bytes: None,
        }
    }

    pub fn with_quota(mut self, limit: usize) -> Self {
        self.quota_bytes = Some(limit);
        self
    }

    pub fn is_memory(&self) -> bool {
        self.path == MEMORY_PATH
    }

    /// Parse the `[storage]` table of a TOML document; a missing table yields defaults
    pub fn from_toml_str(text: &str) -> StorageResult<Self> {
        let file: ConfigFile =
            toml::from_str(text).map_err(|e| StorageError::Config(e.to_string()))?;
        Ok(file.storage.unwrap_or_default())
    }

    /// Read `OTTER_STORAGE_PATH` and `OTTER_STORAGE_QUOTA`, defaulting to `:memory:`
    pub fn from_env() -> StorageResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> StorageResult<Self> {
        let path = lookup(PATH_ENV).unwrap_or_else(default_path);
        let quota_bytes = match lookup(QUOTA_ENV) {
            Some(raw) => Some(raw.trim().parse::<usize>().map_err(|e| {
                StorageError::Config(format!("{} must be a byte count: {}", QUOTA_ENV, e))
            })?),
            None => None,
        };
        Ok(Self { path, quota_bytes })
    }
}

/// Open the store a configuration describes
pub fn open_store(config: &StorageConfig) -> StoreResult<Box<dyn RawStore + Send + Sync>> {
    if config.is_memory() {
        tracing::debug!("Opening in-memory storage (quota: {:?})", config.quota_bytes);
        let store = match config.quota_bytes {
            Some(limit) => MemoryStore::with_quota(limit),
            None => MemoryStore::new(),
        };
        return Ok(Box::new(store));
    }

    if config.quota_bytes.is_some() {
        tracing::warn!("quota_bytes is ignored for file storage at {}", config.path);
    }
    Ok(Box::new(RedbStore::open(&config.path)?))
}
