//! Flat key/value storage shared by every provider.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde_json::Value;

use crate::{KeyPath, SourceError};

/// Loaded key/value pairs, keyed by normalised [`KeyPath`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyValueStore {
    entries: BTreeMap<KeyPath, String>,
}

impl KeyValueStore {
    /// Create an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Insert or replace the value for `key`, returning the previous value.
    pub fn insert(&mut self, key: KeyPath, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key, value.into())
    }

    /// Value stored for `key`.
    #[must_use]
    pub fn get(&self, key: &KeyPath) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Iterate over keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &KeyPath> {
        self.entries.keys()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flatten a parsed document into key paths.
    ///
    /// Objects nest, arrays contribute their index as a segment, and scalars
    /// render as their literal text. `null` becomes the empty string. Object
    /// keys containing `:` are split into several segments.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Malformed`] when the top level is not an
    /// object, an object key is not a valid key path, or two entries flatten
    /// to the same key.
    ///
    /// # Examples
    ///
    /// ```
    /// use config_lineage::{KeyPath, KeyValueStore};
    /// use serde_json::json;
    ///
    /// let store = KeyValueStore::from_document(&json!({
    ///     "Db": { "ConnectionString": "Server=local", "Pool": 5 },
    ///     "Hosts": ["a", "b"]
    /// }))?;
    /// assert_eq!(store.get(&"Db:Pool".parse()?), Some("5"));
    /// assert_eq!(store.get(&"Hosts:1".parse()?), Some("b"));
    /// # Ok::<_, Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_document(document: &Value) -> Result<Self, SourceError> {
        let Value::Object(map) = document else {
            return Err(SourceError::malformed("top-level value must be an object"));
        };
        let mut store = Self::new();
        for (name, value) in map {
            let key = parse_segment(name)?;
            store.flatten(key, value)?;
        }
        Ok(store)
    }

    fn flatten(&mut self, key: KeyPath, value: &Value) -> Result<(), SourceError> {
        match value {
            Value::Object(map) => {
                for (name, nested) in map {
                    let child = key.join(&parse_segment(name)?);
                    self.flatten(child, nested)?;
                }
                Ok(())
            }
            Value::Array(items) => {
                for (index, nested) in items.iter().enumerate() {
                    let child = key.join(&parse_segment(&index.to_string())?);
                    self.flatten(child, nested)?;
                }
                Ok(())
            }
            Value::Null => self.insert_unique(key, String::new()),
            Value::String(text) => self.insert_unique(key, text.clone()),
            Value::Bool(flag) => self.insert_unique(key, flag.to_string()),
            Value::Number(number) => self.insert_unique(key, number.to_string()),
        }
    }

    fn insert_unique(&mut self, key: KeyPath, value: String) -> Result<(), SourceError> {
        match self.entries.entry(key) {
            Entry::Occupied(existing) => Err(SourceError::malformed(format!(
                "duplicate key '{}'",
                existing.key()
            ))),
            Entry::Vacant(slot) => {
                slot.insert(value);
                Ok(())
            }
        }
    }
}

fn parse_segment(name: &str) -> Result<KeyPath, SourceError> {
    KeyPath::parse(name).map_err(|err| SourceError::malformed(err.to_string()))
}

impl FromIterator<(KeyPath, String)> for KeyValueStore {
    fn from_iter<T: IntoIterator<Item = (KeyPath, String)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
