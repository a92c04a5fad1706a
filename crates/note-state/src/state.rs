use std::time::Duration;

use stickynotes_protocol::{Analytics, Broadcast, NoteInstance, Settings};

use crate::note::NoteWindowState;
use crate::notify::NotificationQueue;

/// Flags that exist only in this window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiFlags {
    pub search_visible: bool,
    pub replace_visible: bool,
    pub markdown_preview: bool,
    pub zen_mode: bool,
}

/// What the owner of a [`UiState`] has to do after a broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastEffect {
    None,
    /// Save immediately.
    Flush,
    /// Auto-save settings changed.
    AutoSave { enabled: bool, interval: Duration },
}

/// Everything one window renders from.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub instance_id: Option<String>,
    pub note: Option<NoteWindowState>,
    pub settings: Settings,
    pub analytics: Analytics,
    pub flags: UiFlags,
    pub notifications: NotificationQueue,
    pub initialized: bool,
}

impl UiState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a controller broadcast.
    pub fn apply(&mut self, message: &Broadcast) -> BroadcastEffect {
        match message {
            Broadcast::Initialize(init) => {
                self.instance_id = init.instance_id.clone();
                self.note = init.instance_id.as_ref().map(|id| {
                    let note = init
                        .data
                        .clone()
                        .unwrap_or_else(|| NoteInstance::new(id.clone(), chrono::Utc::now()));
                    NoteWindowState::new(note)
                });
                self.settings = init.settings.clone();
                self.analytics = init.analytics.clone();
                self.flags.markdown_preview = self
                    .note
                    .as_ref()
                    .is_some_and(|n| n.note().is_markdown && self.settings.enable_markdown);
                self.flags.zen_mode = self.settings.enable_zen_mode;
                self.initialized = true;
                self.auto_save_effect()
            }
            Broadcast::SettingsUpdated { settings } => {
                let changed = settings.auto_save != self.settings.auto_save
                    || settings.auto_save_interval != self.settings.auto_save_interval;
                self.settings = (**settings).clone();
                if !self.settings.enable_search {
                    self.flags.search_visible = false;
                    self.flags.replace_visible = false;
                }
                if changed {
                    self.auto_save_effect()
                } else {
                    BroadcastEffect::None
                }
            }
            Broadcast::SaveRequest => BroadcastEffect::Flush,
            Broadcast::TriggerFind => {
                if self.settings.enable_search {
                    self.flags.search_visible = true;
                    self.flags.replace_visible = false;
                }
                BroadcastEffect::None
            }
            Broadcast::TriggerReplace => {
                if self.settings.enable_search {
                    self.flags.search_visible = true;
                    self.flags.replace_visible = true;
                }
                BroadcastEffect::None
            }
            Broadcast::ToggleMarkdown => {
                if self.settings.enable_markdown {
                    self.flags.markdown_preview = !self.flags.markdown_preview;
                }
                BroadcastEffect::None
            }
            Broadcast::ToggleZenMode => {
                self.flags.zen_mode = !self.flags.zen_mode;
                BroadcastEffect::None
            }
        }
    }

    /// Current auto-save configuration.
    pub fn auto_save_effect(&self) -> BroadcastEffect {
        BroadcastEffect::AutoSave {
            enabled: self.settings.auto_save,
            interval: Duration::from_millis(self.settings.auto_save_interval),
        }
    }
}
