//! Platform services the controller drives but does not implement.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use stickynotes_protocol::ShortcutAction;

/// Failure reported by a platform service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ServiceError(pub String);

/// Global keyboard shortcut registration.
pub trait ShortcutRegistrar: Send + Sync {
    /// Drops every binding this process holds.
    fn unregister_all(&self) -> Result<(), ServiceError>;

    /// Binds `accelerator` (e.g. `CommandOrControl+N`) to `action`.
    fn register(&self, accelerator: &str, action: ShortcutAction) -> Result<(), ServiceError>;
}

/// File dialogs and handing things to the OS.
pub trait DesktopServices: Send + Sync {
    /// Multi-select open dialog. `None` when cancelled.
    fn pick_import_files(&self) -> Pin<Box<dyn Future<Output = Option<Vec<PathBuf>>> + Send + '_>>;

    /// Save dialog proposing `default_name`. `None` when cancelled.
    fn pick_export_path(
        &self,
        default_name: &str,
    ) -> Pin<Box<dyn Future<Output = Option<PathBuf>> + Send + '_>>;

    fn open_external(&self, url: &str) -> Result<(), ServiceError>;

    fn show_item_in_folder(&self, path: &Path) -> Result<(), ServiceError>;
}
