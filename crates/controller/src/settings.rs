//! Settings updates, global shortcut binding and shortcut dispatch.

use serde_json::{Map, Value};
use stickynotes_protocol::constants::{FONT_SIZE_DEFAULT, FONT_SIZE_MAX, FONT_SIZE_MIN};
use stickynotes_protocol::{Broadcast, Settings, ShortcutAction};
use stickynotes_store::StoreExt;
use tracing::{debug, info, warn};

use crate::ControllerError;
use crate::controller::{AppController, ControllerState, NoteOverrides, SETTINGS_KEY};

impl AppController {
    /// Merges `patch` into the settings, persists the result and pushes it
    /// to every window.
    ///
    /// Nothing changes when validation or the write fails.
    pub async fn apply_settings(&self, patch: Map<String, Value>) -> Result<Settings, ControllerError> {
        let mut st = self.state.lock().await;
        self.apply_settings_locked(&mut st, &patch)
    }

    pub(crate) fn apply_settings_locked(
        &self,
        st: &mut ControllerState,
        patch: &Map<String, Value>,
    ) -> Result<Settings, ControllerError> {
        let next = st.settings.merged(patch)?;
        self.store.set_typed(SETTINGS_KEY, &next)?;
        st.settings = next.clone();

        // Registrations can be lost while the app runs, so every update
        // rebinds from the stored map.
        self.rebind_shortcuts(&next);
        for facade in st.registry.facades_mut() {
            if facade.kind().is_note() {
                let applied = facade
                    .set_always_on_top(next.always_on_top)
                    .and_then(|()| facade.set_skip_taskbar(!next.show_in_taskbar))
                    .and_then(|()| facade.set_opacity(next.opacity));
                if let Err(e) = applied {
                    warn!(window = %facade.label(), error = %e, "failed to apply window settings");
                }
            }
            if let Err(e) = facade.send(Broadcast::settings_updated(next.clone())) {
                warn!(window = %facade.label(), error = %e, "failed to push settings");
            }
        }
        info!(keys = patch.len(), "settings updated");
        Ok(next)
    }

    /// Replaces all global shortcut bindings with the ones in `settings`.
    ///
    /// Unknown action names and bindings the OS refuses are logged and
    /// skipped. Returns the number of bindings made.
    pub(crate) fn rebind_shortcuts(&self, settings: &Settings) -> usize {
        if let Err(e) = self.shortcuts.unregister_all() {
            warn!(error = %e, "failed to clear shortcuts");
        }

        let global = (!settings.global_hotkey.is_empty())
            .then_some((settings.global_hotkey.as_str(), ShortcutAction::NewNote));
        let mut bound = 0;
        let bindings = settings
            .shortcuts
            .iter()
            .filter_map(|(name, accelerator)| match name.parse::<ShortcutAction>() {
                Ok(action) => Some((accelerator.as_str(), action)),
                Err(e) => {
                    warn!(error = %e, "ignoring shortcut");
                    None
                }
            })
            .chain(global);
        for (accelerator, action) in bindings {
            if accelerator.is_empty() {
                continue;
            }
            match self.shortcuts.register(accelerator, action) {
                Ok(()) => bound += 1,
                Err(e) => warn!(%accelerator, %action, error = %e, "failed to register shortcut"),
            }
        }
        debug!(bound, "shortcuts registered");
        bound
    }

    /// Runs a global shortcut.
    ///
    /// Note-scoped actions go to the focused note and do nothing when no
    /// note has focus. Font size actions change the setting for all windows.
    pub async fn handle_shortcut(&self, action: ShortcutAction) -> Result<(), ControllerError> {
        debug!(%action, "shortcut triggered");
        match action {
            ShortcutAction::NewNote => {
                self.create_note(None, NoteOverrides::default()).await?;
            }
            ShortcutAction::IncreaseFontSize => {
                self.adjust_font_size(|size| (size + 1).min(FONT_SIZE_MAX)).await?;
            }
            ShortcutAction::DecreaseFontSize => {
                self.adjust_font_size(|size| size.saturating_sub(1).max(FONT_SIZE_MIN)).await?;
            }
            ShortcutAction::ResetFontSize => {
                self.adjust_font_size(|_| FONT_SIZE_DEFAULT).await?;
            }
            ShortcutAction::SaveNote
            | ShortcutAction::FindInNote
            | ShortcutAction::ReplaceInNote
            | ShortcutAction::ToggleMarkdown
            | ShortcutAction::ToggleZenMode => {
                if let Some(message) = action.focused_broadcast() {
                    self.send_to_focused(message).await?;
                }
            }
        }
        Ok(())
    }

    async fn adjust_font_size(&self, f: impl FnOnce(u32) -> u32) -> Result<(), ControllerError> {
        let mut st = self.state.lock().await;
        let current = st.settings.font_size;
        let next = f(current);
        if next == current {
            return Ok(());
        }
        let mut patch = Map::new();
        patch.insert("fontSize".into(), next.into());
        self.apply_settings_locked(&mut st, &patch)?;
        Ok(())
    }

    async fn send_to_focused(&self, message: Broadcast) -> Result<(), ControllerError> {
        let mut st = self.state.lock().await;
        let Some(id) = st.focused_note.clone() else {
            debug!(message = message.name(), "no focused note");
            return Ok(());
        };
        match st.registry.note_mut(&id) {
            Some(facade) => facade.send(message)?,
            None => st.focused_note = None,
        }
        Ok(())
    }

    /// Flips always-on-top for the window with `label`.
    pub async fn toggle_always_on_top(&self, label: &str) -> Result<bool, ControllerError> {
        let mut st = self.state.lock().await;
        let facade = st
            .registry
            .get_mut(label)
            .ok_or_else(|| ControllerError::UnknownWindow(label.to_string()))?;
        let on_top = !facade.is_always_on_top();
        facade.set_always_on_top(on_top)?;
        debug!(window = %label, on_top, "always-on-top toggled");
        Ok(on_top)
    }

    /// Hides the window with `label`.
    pub async fn minimize_window(&self, label: &str) -> Result<(), ControllerError> {
        let mut st = self.state.lock().await;
        st.registry
            .get_mut(label)
            .ok_or_else(|| ControllerError::UnknownWindow(label.to_string()))?
            .hide()?;
        Ok(())
    }

    /// Runs the close path for the window with `label`.
    pub async fn close_window(&self, label: &str) -> Result<(), ControllerError> {
        let mut st = self.state.lock().await;
        self.close_window_locked(&mut st, label)?;
        Ok(())
    }
}
