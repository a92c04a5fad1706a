//! Process-wide user preferences stored under `settings`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::{
    AUTO_SAVE_MIN_INTERVAL_MS, FONT_SIZE_MAX, FONT_SIZE_MIN, NOTE_MIN_HEIGHT, NOTE_MIN_WIDTH,
};
use crate::note::merge_object;

/// Errors from validating a settings update.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid settings document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("opacity must be between 0.1 and 1.0, got {0}")]
    Opacity(f64),

    #[error("font size must be between 8 and 72, got {0}")]
    FontSize(u32),

    #[error("auto-save interval must be at least 250 ms, got {0}")]
    AutoSaveInterval(u64),

    #[error("{0} must be at least 1")]
    Zero(&'static str),
}

/// Width and height in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

/// User preferences.
///
/// Missing keys fall back to [`Settings::default`]; keys this struct does
/// not know about are kept in `extra` so older and newer builds can share
/// a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub theme: String,
    pub auto_start: bool,
    pub global_hotkey: String,
    pub default_size: Size,
    pub always_on_top: bool,
    pub show_in_taskbar: bool,
    pub auto_save: bool,
    /// Debounce interval in milliseconds.
    pub auto_save_interval: u64,
    pub max_instances: usize,
    pub enable_markdown: bool,
    pub enable_search: bool,
    pub enable_tags: bool,
    pub enable_sync: bool,
    pub sync_provider: String,
    pub enable_analytics: bool,
    pub enable_spell_check: bool,
    pub enable_auto_complete: bool,
    pub enable_vim_mode: bool,
    pub font_size: u32,
    pub font_family: String,
    pub line_height: f64,
    pub tab_size: u32,
    pub word_wrap: bool,
    pub show_line_numbers: bool,
    pub enable_minimap: bool,
    pub enable_zen_mode: bool,
    pub opacity: f64,
    pub blur_background: bool,
    pub enable_sounds: bool,
    pub enable_notifications: bool,
    /// Periodic backup interval in milliseconds.
    pub backup_interval: u64,
    pub max_backups: usize,
    pub export_format: String,
    pub enable_encryption: bool,
    pub enable_collaboration: bool,
    pub enable_plugins: bool,
    #[serde(rename = "customCSS")]
    pub custom_css: String,
    /// Action name to key combination, e.g. `"newNote": "CommandOrControl+N"`.
    pub shortcuts: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Settings {
    fn default() -> Self {
        let shortcuts = [
            ("newNote", "CommandOrControl+N"),
            ("saveNote", "CommandOrControl+S"),
            ("findInNote", "CommandOrControl+F"),
            ("replaceInNote", "CommandOrControl+H"),
            ("toggleMarkdown", "CommandOrControl+M"),
            ("toggleZenMode", "F11"),
            ("increaseFontSize", "CommandOrControl+Plus"),
            ("decreaseFontSize", "CommandOrControl+-"),
            ("resetFontSize", "CommandOrControl+0"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            theme: "dark".into(),
            auto_start: false,
            global_hotkey: "CommandOrControl+Shift+N".into(),
            default_size: Size {
                width: 400,
                height: 500,
            },
            always_on_top: true,
            show_in_taskbar: false,
            auto_save: true,
            auto_save_interval: 3000,
            max_instances: 50,
            enable_markdown: true,
            enable_search: true,
            enable_tags: true,
            enable_sync: false,
            sync_provider: "local".into(),
            enable_analytics: true,
            enable_spell_check: true,
            enable_auto_complete: true,
            enable_vim_mode: false,
            font_size: 14,
            font_family: "system".into(),
            line_height: 1.5,
            tab_size: 2,
            word_wrap: true,
            show_line_numbers: false,
            enable_minimap: false,
            enable_zen_mode: false,
            opacity: 0.95,
            blur_background: true,
            enable_sounds: true,
            enable_notifications: true,
            backup_interval: 300_000,
            max_backups: 10,
            export_format: "markdown".into(),
            enable_encryption: false,
            enable_collaboration: false,
            enable_plugins: true,
            custom_css: String::new(),
            shortcuts,
            extra: Map::new(),
        }
    }
}

impl Settings {
    /// Returns a copy with the top-level keys of `patch` applied, validated.
    ///
    /// `defaultSize` is raised to the minimum note size rather than rejected.
    pub fn merged(&self, patch: &Map<String, Value>) -> Result<Self, SettingsError> {
        let base = serde_json::to_value(self)?;
        let mut next: Settings = serde_json::from_value(merge_object(base, patch))?;
        next.default_size.width = next.default_size.width.max(NOTE_MIN_WIDTH);
        next.default_size.height = next.default_size.height.max(NOTE_MIN_HEIGHT);
        next.validate()?;
        Ok(next)
    }

    /// Checks value ranges the windows depend on.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(0.1..=1.0).contains(&self.opacity) {
            return Err(SettingsError::Opacity(self.opacity));
        }
        if !(FONT_SIZE_MIN..=FONT_SIZE_MAX).contains(&self.font_size) {
            return Err(SettingsError::FontSize(self.font_size));
        }
        if self.auto_save_interval < AUTO_SAVE_MIN_INTERVAL_MS {
            return Err(SettingsError::AutoSaveInterval(self.auto_save_interval));
        }
        if self.max_backups == 0 {
            return Err(SettingsError::Zero("maxBackups"));
        }
        if self.max_instances == 0 {
            return Err(SettingsError::Zero("maxInstances"));
        }
        Ok(())
    }
}
