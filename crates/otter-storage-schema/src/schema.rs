//! Schema registration, validated at load time

use indexmap::IndexMap;

use crate::classify::{KeyClass, KeyContract};
use crate::domain::{Domain, Literal};
use crate::error::{SchemaError, SchemaResult};
use crate::typed::{LogicalDomain, StorageKey};

/// A set of declared keys with their classification computed once
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    keys: IndexMap<String, KeyContract>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Load a schema from a JSON object mapping key names to member lists:
    ///
    /// ```json
    /// { "count": [{ "type": "number" }], "objOpt": [{ "type": "structured" }, { "type": "undefined" }] }
    /// ```
    pub fn from_json_str(text: &str) -> SchemaResult<Self> {
        let declared: IndexMap<String, Domain> = serde_json::from_str(text)?;
        declared
            .into_iter()
            .fold(Schema::builder(), |builder, (name, domain)| {
                builder.key(name, domain)
            })
            .build()
    }

    pub fn get(&self, key: &str) -> Option<&KeyContract> {
        self.keys.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyContract> {
        self.keys.values()
    }

    /// Names of the keys belonging to a classification set, in declaration order
    pub fn keys_in(&self, class: KeyClass) -> impl Iterator<Item = &str> {
        self.keys
            .values()
            .filter(move |contract| contract.is_member(class))
            .map(KeyContract::name)
    }

    pub fn raw_keys(&self) -> impl Iterator<Item = &str> {
        self.keys_in(KeyClass::RawMode)
    }

    pub fn json_keys(&self) -> impl Iterator<Item = &str> {
        self.keys_in(KeyClass::JsonMode)
    }

    pub fn nullable_keys(&self) -> impl Iterator<Item = &str> {
        self.keys_in(KeyClass::Nullable)
    }
}

/// Collects key declarations; `build` validates and classifies them
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    entries: Vec<(String, Domain)>,
}

impl SchemaBuilder {
    pub fn key(mut self, name: impl Into<String>, domain: Domain) -> Self {
        self.entries.push((name.into(), domain));
        self
    }

    /// Declare a statically typed key
    pub fn typed<K: StorageKey>(self) -> Self {
        self.key(K::NAME, <K::Value as LogicalDomain>::domain())
    }

    pub fn build(self) -> SchemaResult<Schema> {
        let mut keys = IndexMap::with_capacity(self.entries.len());
        for (name, domain) in self.entries {
            if keys.contains_key(&name) {
                return Err(SchemaError::DuplicateKey(name));
            }
            if domain.is_empty() {
                return Err(SchemaError::EmptyDomain(name));
            }
            if domain
                .literal_values()
                .any(|literal| matches!(literal, Literal::Number(n) if n.is_nan()))
            {
                return Err(SchemaError::InvalidLiteral {
                    key: name,
                    reason: "NaN never equals itself".to_string(),
                });
            }
            let contract = KeyContract::classify(name.clone(), domain);
            keys.insert(name, contract);
        }
        tracing::debug!("Loaded storage schema with {} keys", keys.len());
        Ok(Schema { keys })
    }
}
