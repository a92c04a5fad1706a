//! Live windows keyed by label.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use stickynotes_window::{WindowFacade, WindowKind, WindowState};

struct Entry {
    facade: WindowFacade,
    /// When the handle was created. Used as `created` for notes that have
    /// not been saved yet.
    opened_at: DateTime<Utc>,
}

/// In-memory map of open windows. Not persisted: rebuilt at startup from
/// the stored instances.
#[derive(Default)]
pub(crate) struct Registry {
    entries: BTreeMap<String, Entry>,
}

impl Registry {
    pub fn insert(&mut self, facade: WindowFacade, opened_at: DateTime<Utc>) {
        self.entries
            .insert(facade.label().to_string(), Entry { facade, opened_at });
    }

    pub fn remove(&mut self, label: &str) -> Option<WindowFacade> {
        self.entries.remove(label).map(|e| e.facade)
    }

    pub fn get(&self, label: &str) -> Option<&WindowFacade> {
        self.entries.get(label).map(|e| &e.facade)
    }

    pub fn get_mut(&mut self, label: &str) -> Option<&mut WindowFacade> {
        self.entries.get_mut(label).map(|e| &mut e.facade)
    }

    pub fn note_mut(&mut self, id: &str) -> Option<&mut WindowFacade> {
        self.get_mut(&WindowKind::Note(id.to_string()).label())
    }

    pub fn has_note(&self, id: &str) -> bool {
        self.get(&WindowKind::Note(id.to_string()).label()).is_some()
    }

    pub fn opened_at(&self, label: &str) -> Option<DateTime<Utc>> {
        self.entries.get(label).map(|e| e.opened_at)
    }

    /// Ids of registered note windows, in label order.
    pub fn note_ids(&self) -> Vec<String> {
        self.entries
            .values()
            .filter_map(|e| e.facade.kind().note_id().map(str::to_string))
            .collect()
    }

    pub fn note_count(&self) -> usize {
        self.entries
            .values()
            .filter(|e| e.facade.kind().is_note())
            .count()
    }

    pub fn labels(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn state(&self, label: &str) -> Option<WindowState> {
        self.get(label).map(WindowFacade::state)
    }

    pub fn facades_mut(&mut self) -> impl Iterator<Item = &mut WindowFacade> {
        self.entries.values_mut().map(|e| &mut e.facade)
    }

    /// Removes and returns every window.
    pub fn drain(&mut self) -> Vec<WindowFacade> {
        std::mem::take(&mut self.entries)
            .into_values()
            .map(|e| e.facade)
            .collect()
    }
}
