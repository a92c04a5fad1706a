//! Persistent key-value storage.
//!
//! Keys are dot-separated paths into a single JSON document
//! (`settings`, `instances.<id>`, `analytics.dailyStats.<date>`). Writing a
//! path never disturbs its siblings.

pub mod file;
pub mod key;
pub mod memory;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use file::{JsonFileStore, default_data_dir};
pub use memory::MemoryStore;

/// Errors from store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid key: {0:?}")]
    InvalidKey(String),

    #[error("cannot write {key:?}: {parent:?} is not an object")]
    NotAnObject { key: String, parent: String },
}

/// Durable document store addressed by dot paths.
///
/// A successful `set` or `delete` is on disk before it returns, so the next
/// `get` of the same key observes it.
pub trait KeyValueStore: Send + Sync {
    /// Returns the value at `key`, or `None` when any segment is missing.
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Writes `value` at `key`, creating intermediate objects.
    fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    /// Removes `key`. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Typed helpers over any [`KeyValueStore`].
pub trait StoreExt: KeyValueStore {
    /// Reads and deserializes `key`, if present.
    fn get_typed<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.get(key)? {
            Some(v) => Ok(Some(serde_json::from_value(v)?)),
            None => Ok(None),
        }
    }

    /// Reads `key`, falling back to `default` when absent.
    fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T, StoreError> {
        Ok(self.get_typed(key)?.unwrap_or(default))
    }

    /// Serializes and writes `value` at `key`.
    fn set_typed<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        self.set(key, serde_json::to_value(value)?)
    }
}

impl<S: KeyValueStore + ?Sized> StoreExt for S {}
