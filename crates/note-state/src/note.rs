//! The note being edited in this window.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use stickynotes_protocol::{NoteColor, NoteInstance};

/// Derived counts shown in the status bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextStats {
    pub words: usize,
    pub characters: usize,
    pub lines: usize,
}

impl TextStats {
    pub fn of(text: &str) -> Self {
        Self {
            words: text.split_whitespace().count(),
            characters: text.chars().count(),
            lines: if text.is_empty() { 0 } else { text.lines().count() },
        }
    }
}

/// Local copy of a note plus edit tracking.
///
/// Every reducer bumps `lastModified` and marks the note dirty; the dirty
/// flag is cleared once the controller acknowledged a save.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteWindowState {
    note: NoteInstance,
    stats: TextStats,
    dirty: bool,
    /// Bumped by every reducer.
    revision: u64,
    /// Words at the last acknowledged save, for analytics deltas.
    saved_words: usize,
    saved_characters: usize,
}

impl NoteWindowState {
    pub fn new(note: NoteInstance) -> Self {
        let stats = TextStats::of(&note.content);
        Self {
            note,
            stats,
            dirty: false,
            revision: 0,
            saved_words: stats.words,
            saved_characters: stats.characters,
        }
    }

    pub fn note(&self) -> &NoteInstance {
        &self.note
    }

    pub fn id(&self) -> &str {
        &self.note.id
    }

    pub fn stats(&self) -> TextStats {
        self.stats
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn update_content(&mut self, content: impl Into<String>, now: DateTime<Utc>) {
        self.note.content = content.into();
        self.stats = TextStats::of(&self.note.content);
        self.touch(now);
    }

    pub fn update_title(&mut self, title: impl Into<String>, now: DateTime<Utc>) {
        self.note.title = title.into();
        self.touch(now);
    }

    /// Adds a tag. Blank and duplicate tags are ignored.
    pub fn add_tag(&mut self, tag: &str, now: DateTime<Utc>) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || !self.note.tags.insert(tag.to_string()) {
            return false;
        }
        self.touch(now);
        true
    }

    pub fn remove_tag(&mut self, tag: &str, now: DateTime<Utc>) -> bool {
        if !self.note.tags.remove(tag) {
            return false;
        }
        self.touch(now);
        true
    }

    pub fn toggle_pin(&mut self, now: DateTime<Utc>) {
        self.note.is_pinned = !self.note.is_pinned;
        self.touch(now);
    }

    pub fn toggle_archive(&mut self, now: DateTime<Utc>) {
        self.note.is_archived = !self.note.is_archived;
        self.touch(now);
    }

    pub fn toggle_markdown(&mut self, now: DateTime<Utc>) {
        self.note.is_markdown = !self.note.is_markdown;
        self.touch(now);
    }

    pub fn set_color(&mut self, color: NoteColor, now: DateTime<Utc>) {
        self.note.color = color;
        self.touch(now);
    }

    /// Fields this window owns, as sent in `save-note`.
    ///
    /// Geometry is left out: bounds are persisted by the controller from
    /// window events.
    pub fn save_patch(&self) -> Map<String, Value> {
        let mut patch = Map::new();
        patch.insert("title".into(), Value::String(self.note.title.clone()));
        patch.insert("content".into(), Value::String(self.note.content.clone()));
        patch.insert(
            "tags".into(),
            Value::Array(self.note.tags.iter().cloned().map(Value::String).collect()),
        );
        patch.insert("isMarkdown".into(), Value::Bool(self.note.is_markdown));
        patch.insert("isPinned".into(), Value::Bool(self.note.is_pinned));
        patch.insert("isArchived".into(), Value::Bool(self.note.is_archived));
        patch.insert("color".into(), Value::String(self.note.color.hex().to_string()));
        patch
    }

    /// Words and characters added since the last acknowledged save.
    pub fn growth_since_save(&self) -> (u64, u64) {
        (
            self.stats.words.saturating_sub(self.saved_words) as u64,
            self.stats.characters.saturating_sub(self.saved_characters) as u64,
        )
    }

    /// Records a successful save of `revision`.
    ///
    /// Edits made while the save was in flight keep the note dirty.
    pub fn mark_saved(&mut self, revision: u64) {
        if revision != self.revision {
            return;
        }
        self.dirty = false;
        self.saved_words = self.stats.words;
        self.saved_characters = self.stats.characters;
    }

    /// Replaces the local copy with what the controller holds.
    pub fn replace(&mut self, note: NoteInstance) {
        *self = Self::new(note);
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.note.last_modified = Some(now);
        self.dirty = true;
        self.revision += 1;
    }
}
