use std::sync::Arc;

use stickynotes_protocol::{Bounds, Broadcast};

use crate::WindowError;
use crate::kind::WindowOptions;

/// A platform window hosting one UI process.
///
/// Implementations wrap the toolkit handle; every call may fail if the
/// window was destroyed behind the caller's back.
pub trait NativeWindow: Send + Sync {
    fn label(&self) -> &str;
    fn show(&self) -> Result<(), WindowError>;
    fn hide(&self) -> Result<(), WindowError>;
    fn focus(&self) -> Result<(), WindowError>;
    fn destroy(&self) -> Result<(), WindowError>;
    fn bounds(&self) -> Result<Bounds, WindowError>;
    fn set_bounds(&self, bounds: Bounds) -> Result<(), WindowError>;
    fn set_always_on_top(&self, on_top: bool) -> Result<(), WindowError>;
    fn set_skip_taskbar(&self, skip: bool) -> Result<(), WindowError>;
    fn set_opacity(&self, opacity: f64) -> Result<(), WindowError>;
    /// Delivers a broadcast to the hosted UI.
    fn emit(&self, message: &Broadcast) -> Result<(), WindowError>;
}

/// Creates native windows.
pub trait WindowHost: Send + Sync {
    /// Creates a hidden window. It is shown once its UI signals ready.
    fn open(&self, options: &WindowOptions) -> Result<Arc<dyn NativeWindow>, WindowError>;

    /// Visible area of the primary display, if known.
    fn work_area(&self) -> Option<Bounds>;
}

/// Lifecycle notifications raised by a native window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    Moved,
    Resized,
    Focused,
    Blurred,
    /// The user asked to close. Nothing has been destroyed yet.
    CloseRequested,
    /// The native window is gone.
    Destroyed,
}
