//! State held by one window's UI process.
//!
//! Mirrors what the controller owns (note, settings, analytics) plus purely
//! local flags, and keeps the mirror in sync through the message channel:
//! edits go out as debounced `save-note` requests, settings come back in as
//! `settings-updated` broadcasts.

pub mod autosave;
pub mod link;
pub mod note;
pub mod notify;
pub mod session;
pub mod state;

pub use autosave::AutoSaver;
pub use link::ControllerLink;
pub use note::{NoteWindowState, TextStats};
pub use notify::{Notification, NotificationQueue};
pub use session::{NoteSession, SessionError};
pub use state::{BroadcastEffect, UiFlags, UiState};
