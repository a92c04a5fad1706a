//! JSON-file backed store.

use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use serde_json::{Map, Value};
use tracing::debug;

use crate::{KeyValueStore, StoreError, key};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "STICKYNOTES_DATA_DIR";

/// Store backed by one JSON file.
///
/// The whole document is cached in memory. Every mutation is applied to a
/// copy, written to a temporary file and renamed over the original; the
/// cache is only updated once the rename succeeded, so a failed write leaves
/// both disk and memory on the previous state.
pub struct JsonFileStore {
    path: PathBuf,
    doc: RwLock<Value>,
}

impl JsonFileStore {
    /// Opens the store at `path`, loading existing content from disk.
    ///
    /// A missing file starts an empty document. A file that is not a JSON
    /// object is an error.
    pub fn open(path: PathBuf) -> Result<Self, StoreError> {
        let doc = load_document(&path)?;
        Ok(Self {
            path,
            doc: RwLock::new(doc),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn mutate(
        &self,
        f: impl FnOnce(&mut Value) -> Result<bool, StoreError>,
    ) -> Result<(), StoreError> {
        let mut guard = self.doc.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = guard.clone();
        if !f(&mut next)? {
            return Ok(());
        }
        self.persist(&next)?;
        *guard = next;
        Ok(())
    }

    /// Writes the document to disk atomically.
    fn persist(&self, doc: &Value) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(doc)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        debug!(path = ?self.path, "persisted store");
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let doc = self.doc.read().unwrap_or_else(PoisonError::into_inner);
        Ok(key::lookup(&doc, key)?.cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.mutate(|doc| key::insert(doc, key, value).map(|()| true))
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.mutate(|doc| key::remove(doc, key))
    }
}

/// Loads the document from disk.
fn load_document(path: &Path) -> Result<Value, StoreError> {
    if !path.exists() {
        return Ok(Value::Object(Map::new()));
    }
    let data = std::fs::read_to_string(path)?;
    if data.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    let doc: Map<String, Value> = serde_json::from_str(&data)?;
    debug!(path = ?path, keys = doc.len(), "loaded store");
    Ok(Value::Object(doc))
}

/// Returns the directory holding the store file and backups.
///
/// `STICKYNOTES_DATA_DIR` wins over the platform config directory.
pub fn default_data_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
        return Some(PathBuf::from(dir));
    }
    config_dir().map(|d| d.join("stickynotes"))
}

/// Returns the platform-specific config directory.
fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var("HOME")
                    .ok()
                    .map(|h| PathBuf::from(h).join(".config"))
            })
    }

    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA").ok().map(PathBuf::from)
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        std::env::var("HOME")
            .ok()
            .map(|h| PathBuf::from(h).join(".config"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreExt;
    use serde_json::json;

    fn test_store() -> (tempfile::TempDir, JsonFileStore) {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("store.json");
        let store = JsonFileStore::open(path).unwrap();
        (tmp, store)
    }

    #[test]
    fn new_store_empty() {
        let (_tmp, store) = test_store();
        assert!(store.get("settings").unwrap().is_none());
        assert!(!store.path().exists());
    }

    #[test]
    fn read_your_writes() {
        let (_tmp, store) = test_store();
        store.set("instances.n1", json!({"title": "A"})).unwrap();
        assert_eq!(store.get("instances.n1.title").unwrap(), Some(json!("A")));
    }

    #[test]
    fn persists_across_reopen() {
        let (tmp, store) = test_store();
        store.set("settings", json!({"theme": "light"})).unwrap();
        store.set("instances.n1", json!({"content": "hello"})).unwrap();
        drop(store);

        let reopened = JsonFileStore::open(tmp.path().join("store.json")).unwrap();
        assert_eq!(
            reopened.get("settings.theme").unwrap(),
            Some(json!("light"))
        );
        assert_eq!(
            reopened.get("instances.n1.content").unwrap(),
            Some(json!("hello"))
        );
    }

    #[test]
    fn delete_removes_only_target() {
        let (tmp, store) = test_store();
        store.set("instances.a", json!(1)).unwrap();
        store.set("instances.b", json!(2)).unwrap();
        store.delete("instances.a").unwrap();
        store.delete("instances.missing").unwrap();

        let reopened = JsonFileStore::open(tmp.path().join("store.json")).unwrap();
        assert!(reopened.get("instances.a").unwrap().is_none());
        assert_eq!(reopened.get("instances.b").unwrap(), Some(json!(2)));
    }

    #[test]
    fn no_temp_file_left_behind() {
        let (tmp, store) = test_store();
        store.set("a", json!(1)).unwrap();
        assert!(!tmp.path().join("store.json.tmp").exists());
    }

    #[test]
    fn failed_write_keeps_previous_state() {
        let (_tmp, store) = test_store();
        store.set("settings", json!(5)).unwrap();
        assert!(store.set("settings.theme", json!("x")).is_err());
        assert_eq!(store.get("settings").unwrap(), Some(json!(5)));
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("store.json");
        std::fs::write(&path, "[1, 2").unwrap();
        assert!(matches!(
            JsonFileStore::open(path),
            Err(StoreError::Json(_))
        ));
    }

    #[test]
    fn empty_file_is_empty_document() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("store.json");
        std::fs::write(&path, "").unwrap();
        let store = JsonFileStore::open(path).unwrap();
        assert!(store.get("settings").unwrap().is_none());
    }

    #[test]
    fn typed_helpers() {
        let (_tmp, store) = test_store();
        assert_eq!(store.get_or("settings.fontSize", 14u32).unwrap(), 14);
        store.set_typed("settings.fontSize", &18u32).unwrap();
        assert_eq!(store.get_or("settings.fontSize", 14u32).unwrap(), 18);
    }
}
