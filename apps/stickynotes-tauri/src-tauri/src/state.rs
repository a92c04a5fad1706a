use std::sync::Arc;

use stickynotes_controller::AppController;

use crate::shortcuts::TauriShortcuts;

/// Shared application state managed by Tauri.
pub struct AppState {
    pub controller: Arc<AppController>,
    pub shortcuts: Arc<TauriShortcuts>,
}
