//! Dot-path addressing over a JSON document.

use serde_json::{Map, Value};

use crate::StoreError;

/// Splits `key` into its segments, rejecting empty ones.
pub fn segments(key: &str) -> Result<Vec<&str>, StoreError> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(parts)
}

/// Checks that `segment` can be embedded in a key as a single segment.
pub fn validate_segment(segment: &str) -> Result<(), StoreError> {
    if segment.is_empty() || segment.contains('.') {
        return Err(StoreError::InvalidKey(segment.to_string()));
    }
    Ok(())
}

/// Builds `<prefix>.<segment>` after validating `segment`.
pub fn child(prefix: &str, segment: &str) -> Result<String, StoreError> {
    validate_segment(segment)?;
    Ok(format!("{prefix}.{segment}"))
}

/// Reads the value at `key`.
pub fn lookup<'a>(doc: &'a Value, key: &str) -> Result<Option<&'a Value>, StoreError> {
    let mut cur = doc;
    for part in segments(key)? {
        match cur.get(part) {
            Some(next) => cur = next,
            None => return Ok(None),
        }
    }
    Ok(Some(cur))
}

/// Writes `value` at `key`, creating missing parents.
pub fn insert(doc: &mut Value, key: &str, value: Value) -> Result<(), StoreError> {
    let parts = segments(key)?;
    let (leaf, parents) = parts
        .split_last()
        .ok_or_else(|| StoreError::InvalidKey(key.to_string()))?;

    let mut cur = doc;
    for (i, part) in parents.iter().enumerate() {
        let map = as_object(cur, key, &parts[..i])?;
        cur = map
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    as_object(cur, key, parents)?.insert(leaf.to_string(), value);
    Ok(())
}

/// Removes the value at `key`. Returns whether anything was removed.
pub fn remove(doc: &mut Value, key: &str) -> Result<bool, StoreError> {
    let parts = segments(key)?;
    let (leaf, parents) = parts
        .split_last()
        .ok_or_else(|| StoreError::InvalidKey(key.to_string()))?;

    let mut cur = doc;
    for part in parents {
        match cur.get_mut(*part) {
            Some(next) => cur = next,
            None => return Ok(false),
        }
    }
    Ok(match cur {
        Value::Object(map) => map.remove(*leaf).is_some(),
        _ => false,
    })
}

fn as_object<'a>(
    value: &'a mut Value,
    key: &str,
    path: &[&str],
) -> Result<&'a mut Map<String, Value>, StoreError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(StoreError::NotAnObject {
            key: key.to_string(),
            parent: path.join("."),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_empty_segments() {
        assert!(segments("").is_err());
        assert!(segments("a..b").is_err());
        assert!(segments(".a").is_err());
        assert_eq!(segments("a.b").unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn child_rejects_dotted_ids() {
        assert_eq!(child("instances", "n1").unwrap(), "instances.n1");
        assert!(child("instances", "a.b").is_err());
        assert!(child("instances", "").is_err());
    }

    #[test]
    fn insert_creates_parents_and_keeps_siblings() {
        let mut doc = json!({"instances": {"a": {"title": "A"}}});
        insert(&mut doc, "instances.b", json!({"title": "B"})).unwrap();
        insert(&mut doc, "analytics.dailyStats.2024-03-01", json!({"notesCreated": 1})).unwrap();

        assert_eq!(doc["instances"]["a"]["title"], "A");
        assert_eq!(doc["instances"]["b"]["title"], "B");
        assert_eq!(doc["analytics"]["dailyStats"]["2024-03-01"]["notesCreated"], 1);
    }

    #[test]
    fn insert_through_scalar_fails() {
        let mut doc = json!({"settings": 5});
        let err = insert(&mut doc, "settings.theme", json!("dark")).unwrap_err();
        assert!(matches!(err, StoreError::NotAnObject { .. }));
    }

    #[test]
    fn lookup_missing_is_none() {
        let doc = json!({"instances": {}});
        assert!(lookup(&doc, "instances.zzz").unwrap().is_none());
        assert!(lookup(&doc, "nothing.here").unwrap().is_none());
    }

    #[test]
    fn remove_leaf_only() {
        let mut doc = json!({"instances": {"a": 1, "b": 2}});
        assert!(remove(&mut doc, "instances.a").unwrap());
        assert!(!remove(&mut doc, "instances.a").unwrap());
        assert_eq!(doc, json!({"instances": {"b": 2}}));
    }
}
