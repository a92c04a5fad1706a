//! The single authority over windows, settings, analytics and backups.
//!
//! Every window talks to [`AppController`] through [`AppController::handle`];
//! the controller owns the instance registry and the settings and analytics
//! singletons, and persists through a [`KeyValueStore`](stickynotes_store::KeyValueStore).

mod analytics;
mod backup;
pub mod clock;
pub mod config;
mod controller;
mod dispatch;
mod lifecycle;
mod registry;
pub mod services;
mod settings;
mod system;
mod transfer;

#[cfg(any(test, feature = "fake"))]
pub mod fake;

pub use clock::{Clock, SystemClock};
pub use config::ControllerConfig;
pub use controller::{AppController, NoteOverrides, Services};
pub use services::{DesktopServices, ServiceError, ShortcutRegistrar};

use stickynotes_protocol::SettingsError;
use stickynotes_store::StoreError;
use stickynotes_window::WindowError;

/// Errors from controller operations.
///
/// None of these cross the message channel as-is: the dispatcher turns them
/// into `{success: false, error}` replies.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("window error: {0}")]
    Window(#[from] WindowError),

    #[error("invalid settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Service(#[from] ServiceError),

    #[error("unknown window: {0}")]
    UnknownWindow(String),

    #[error("note limit reached ({0} open)")]
    LimitReached(usize),

    #[error("unsupported URL: {0}")]
    InvalidUrl(String),

    #[error("application is quitting")]
    Quitting,

    #[error("cancelled")]
    Cancelled,
}
