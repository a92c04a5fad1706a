use std::sync::{PoisonError, RwLock};

use serde_json::{Map, Value};

use crate::{KeyValueStore, StoreError, key};

/// Non-durable store kept entirely in memory.
#[derive(Debug)]
pub struct MemoryStore {
    doc: RwLock<Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_document(Map::new())
    }

    /// Starts from an existing document.
    pub fn with_document(doc: Map<String, Value>) -> Self {
        Self {
            doc: RwLock::new(Value::Object(doc)),
        }
    }

    /// Copy of the whole document.
    pub fn snapshot(&self) -> Value {
        self.doc
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let doc = self.doc.read().unwrap_or_else(PoisonError::into_inner);
        Ok(key::lookup(&doc, key)?.cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut doc = self.doc.write().unwrap_or_else(PoisonError::into_inner);
        key::insert(&mut doc, key, value)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut doc = self.doc.write().unwrap_or_else(PoisonError::into_inner);
        key::remove(&mut doc, key).map(|_| ())
    }
}
