//! Note instances as persisted under `instances.<id>`.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Last known window geometry of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Note background color: one of the built-in palette entries or any custom value.
///
/// Serialized as the hex string the UI renders, so palette and custom values
/// share one representation on disk.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NoteColor {
    #[default]
    Default,
    Blue,
    Green,
    Orange,
    Red,
    Purple,
    Teal,
    Pink,
    Indigo,
    Brown,
    Grey,
    Black,
    Custom(String),
}

impl NoteColor {
    /// The palette, in picker order.
    pub const PALETTE: [NoteColor; 12] = [
        NoteColor::Default,
        NoteColor::Blue,
        NoteColor::Green,
        NoteColor::Orange,
        NoteColor::Red,
        NoteColor::Purple,
        NoteColor::Teal,
        NoteColor::Pink,
        NoteColor::Indigo,
        NoteColor::Brown,
        NoteColor::Grey,
        NoteColor::Black,
    ];

    pub fn hex(&self) -> &str {
        match self {
            Self::Default => "#2d2d2d",
            Self::Blue => "#1976d2",
            Self::Green => "#388e3c",
            Self::Orange => "#f57c00",
            Self::Red => "#d32f2f",
            Self::Purple => "#7b1fa2",
            Self::Teal => "#00796b",
            Self::Pink => "#c2185b",
            Self::Indigo => "#303f9f",
            Self::Brown => "#5d4037",
            Self::Grey => "#616161",
            Self::Black => "#212121",
            Self::Custom(value) => value,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

impl From<String> for NoteColor {
    fn from(value: String) -> Self {
        let normalized = value.trim().to_ascii_lowercase();
        Self::PALETTE
            .into_iter()
            .find(|c| c.hex() == normalized)
            .unwrap_or(Self::Custom(value))
    }
}

impl From<NoteColor> for String {
    fn from(color: NoteColor) -> Self {
        match color {
            NoteColor::Custom(value) => value,
            other => other.hex().to_string(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// One sticky note.
///
/// Fields the UI stores but this crate does not model (per-note font
/// overrides, editor state) survive round-trips through `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteInstance {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub is_markdown: bool,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default = "default_true")]
    pub auto_restore: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_quick_note: bool,
    #[serde(default)]
    pub color: NoteColor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NoteInstance {
    /// An empty note stamped with `now` as both creation and modification time.
    pub fn new(id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            content: String::new(),
            tags: BTreeSet::new(),
            is_markdown: false,
            is_pinned: false,
            is_archived: false,
            auto_restore: true,
            is_quick_note: false,
            color: NoteColor::Default,
            bounds: None,
            created: Some(now),
            last_modified: Some(now),
            extra: Map::new(),
        }
    }

    /// Applies a partial update from the UI.
    ///
    /// Top-level keys in `patch` replace the stored ones. `id` and an existing
    /// `created` never change; `lastModified` is set to `now`.
    pub fn merged(&self, patch: &Map<String, Value>, now: DateTime<Utc>) -> serde_json::Result<Self> {
        let base = serde_json::to_value(self)?;
        let mut next: NoteInstance = serde_json::from_value(merge_object(base, patch))?;
        next.id = self.id.clone();
        next.created = self.created.or(next.created).or(Some(now));
        next.last_modified = Some(now);
        Ok(next)
    }

    /// Whether this note should be reopened at startup.
    pub fn restorable(&self) -> bool {
        self.auto_restore && !self.is_quick_note
    }

    /// Number of whitespace-separated words in the content.
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}

/// Shallow-merges `patch` into `base`. A non-object `base` is replaced by the patch.
pub fn merge_object(base: Value, patch: &Map<String, Value>) -> Value {
    let mut map = match base {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    for (key, value) in patch {
        map.insert(key.clone(), value.clone());
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn palette_hex_parses_back_to_variant() {
        for color in NoteColor::PALETTE {
            let s: String = color.clone().into();
            assert_eq!(NoteColor::from(s), color);
        }
    }

    #[test]
    fn unknown_color_is_custom() {
        let c = NoteColor::from("#abcdef".to_string());
        assert_eq!(c, NoteColor::Custom("#abcdef".into()));
        assert!(c.is_custom());
        assert_eq!(c.hex(), "#abcdef");
    }

    #[test]
    fn palette_match_ignores_case() {
        assert_eq!(NoteColor::from("#1976D2".to_string()), NoteColor::Blue);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let note: NoteInstance = serde_json::from_str(r#"{"id":"n1"}"#).unwrap();
        assert_eq!(note.id, "n1");
        assert!(note.auto_restore);
        assert!(!note.is_quick_note);
        assert_eq!(note.color, NoteColor::Default);
        assert!(note.bounds.is_none());
        assert!(note.tags.is_empty());
    }

    #[test]
    fn camel_case_wire_names() {
        let note = NoteInstance::new("n1", ts(10));
        let json = serde_json::to_value(&note).unwrap();
        assert!(json.get("isMarkdown").is_some());
        assert!(json.get("autoRestore").is_some());
        assert!(json.get("lastModified").is_some());
        // Only written for quick notes.
        assert!(json.get("isQuickNote").is_none());
        assert!(json.get("bounds").is_none());
    }

    #[test]
    fn unknown_fields_survive_roundtrip() {
        let raw = r#"{"id":"n1","fontSize":18,"settings":{"spell":false}}"#;
        let note: NoteInstance = serde_json::from_str(raw).unwrap();
        assert_eq!(note.extra.get("fontSize"), Some(&serde_json::json!(18)));
        let back = serde_json::to_value(&note).unwrap();
        assert_eq!(back["settings"]["spell"], serde_json::json!(false));
    }

    #[test]
    fn tags_serialize_sorted() {
        let mut note = NoteInstance::new("n1", ts(0));
        note.tags.insert("zeta".into());
        note.tags.insert("alpha".into());
        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["tags"], serde_json::json!(["alpha", "zeta"]));
    }

    #[test]
    fn merged_keeps_id_and_created() {
        let note = NoteInstance::new("n1", ts(10));
        let patch = serde_json::json!({
            "id": "other",
            "created": "2000-01-01T00:00:00Z",
            "content": "hello world",
            "isPinned": true
        });
        let next = note.merged(patch.as_object().unwrap(), ts(20)).unwrap();
        assert_eq!(next.id, "n1");
        assert_eq!(next.created, Some(ts(10)));
        assert_eq!(next.last_modified, Some(ts(20)));
        assert_eq!(next.content, "hello world");
        assert!(next.is_pinned);
    }

    #[test]
    fn merged_stamps_created_when_absent() {
        let mut note = NoteInstance::new("n1", ts(10));
        note.created = None;
        let next = note.merged(&Map::new(), ts(30)).unwrap();
        assert_eq!(next.created, Some(ts(30)));
    }

    #[test]
    fn restorable_excludes_quick_notes_and_opt_out() {
        let mut note = NoteInstance::new("n1", ts(0));
        assert!(note.restorable());
        note.auto_restore = false;
        assert!(!note.restorable());
        note.auto_restore = true;
        note.is_quick_note = true;
        assert!(!note.restorable());
    }

    #[test]
    fn word_count_skips_blank_runs() {
        let mut note = NoteInstance::new("n1", ts(0));
        note.content = "  hello   world \n again ".into();
        assert_eq!(note.word_count(), 3);
    }

    #[test]
    fn merge_object_replaces_non_object_base() {
        let patch = serde_json::json!({"a": 1});
        let merged = merge_object(Value::Null, patch.as_object().unwrap());
        assert_eq!(merged, serde_json::json!({"a": 1}));
    }
}
