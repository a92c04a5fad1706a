//! File dialogs and OS hand-off.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use stickynotes_controller::{DesktopServices, ServiceError};
use tauri::AppHandle;
use tauri_plugin_dialog::DialogExt;

pub struct TauriDesktop {
    app: AppHandle,
}

impl TauriDesktop {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl DesktopServices for TauriDesktop {
    fn pick_import_files(&self) -> Pin<Box<dyn Future<Output = Option<Vec<PathBuf>>> + Send + '_>> {
        let app = self.app.clone();
        Box::pin(async move {
            let picked = tauri::async_runtime::spawn_blocking(move || {
                app.dialog()
                    .file()
                    .set_title("Import notes")
                    .add_filter("Notes", &["json", "txt", "md", "markdown"])
                    .blocking_pick_files()
            })
            .await
            .ok()
            .flatten()?;
            let paths: Vec<PathBuf> = picked
                .into_iter()
                .filter_map(|p| p.into_path().ok())
                .collect();
            (!paths.is_empty()).then_some(paths)
        })
    }

    fn pick_export_path(
        &self,
        default_name: &str,
    ) -> Pin<Box<dyn Future<Output = Option<PathBuf>> + Send + '_>> {
        let app = self.app.clone();
        let name = default_name.to_string();
        Box::pin(async move {
            let picked = tauri::async_runtime::spawn_blocking(move || {
                app.dialog()
                    .file()
                    .set_title("Export notes")
                    .set_file_name(name)
                    .add_filter("JSON", &["json"])
                    .blocking_save_file()
            })
            .await
            .ok()
            .flatten()?;
            picked.into_path().ok()
        })
    }

    fn open_external(&self, url: &str) -> Result<(), ServiceError> {
        open::that(url).map_err(|e| ServiceError(e.to_string()))
    }

    /// Opens the folder containing `path`.
    fn show_item_in_folder(&self, path: &Path) -> Result<(), ServiceError> {
        let folder = if path.is_dir() {
            path
        } else {
            path.parent()
                .ok_or_else(|| ServiceError(format!("{} has no parent folder", path.display())))?
        };
        open::that(folder).map_err(|e| ServiceError(e.to_string()))
    }
}
