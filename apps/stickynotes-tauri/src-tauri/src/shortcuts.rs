//! Global shortcuts through `tauri-plugin-global-shortcut`.

use std::sync::{Mutex, PoisonError};

use stickynotes_controller::{ServiceError, ShortcutRegistrar};
use stickynotes_protocol::ShortcutAction;
use tauri::AppHandle;
use tauri_plugin_global_shortcut::{GlobalShortcutExt, Shortcut};

/// Registers accelerators with the OS and remembers which action each
/// one triggers, so the plugin handler can look it up.
pub struct TauriShortcuts {
    app: AppHandle,
    bound: Mutex<Vec<(Shortcut, ShortcutAction)>>,
}

impl TauriShortcuts {
    pub fn new(app: AppHandle) -> Self {
        Self {
            app,
            bound: Mutex::new(Vec::new()),
        }
    }

    /// Action bound to a pressed shortcut.
    pub fn action_for(&self, shortcut: &Shortcut) -> Option<ShortcutAction> {
        self.bound
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|(s, _)| s == shortcut)
            .map(|(_, action)| *action)
    }
}

impl ShortcutRegistrar for TauriShortcuts {
    fn unregister_all(&self) -> Result<(), ServiceError> {
        self.bound
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.app
            .global_shortcut()
            .unregister_all()
            .map_err(|e| ServiceError(e.to_string()))
    }

    fn register(&self, accelerator: &str, action: ShortcutAction) -> Result<(), ServiceError> {
        let shortcut: Shortcut = accelerator
            .parse()
            .map_err(|e| ServiceError(format!("invalid accelerator {accelerator}: {e}")))?;
        self.app
            .global_shortcut()
            .register(shortcut)
            .map_err(|e| ServiceError(e.to_string()))?;
        self.bound
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((shortcut, action));
        Ok(())
    }
}
