//! One native window plus its message endpoint.
//!
//! The controller never talks to a native window directly: it goes through
//! a [`WindowFacade`], which enforces the lifecycle state machine, holds
//! broadcasts until the hosted UI signals ready, and asks the owner before
//! committing a close.

pub mod facade;
pub mod geometry;
pub mod kind;
pub mod native;
pub mod state;

#[cfg(any(test, feature = "fake"))]
pub mod fake;

pub use facade::{CloseDecision, CloseOutcome, ClosePolicy, WindowFacade};
pub use kind::{WindowKind, WindowOptions};
pub use native::{NativeWindow, WindowEvent, WindowHost};
pub use state::WindowState;

/// Errors from window operations.
#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    #[error("window {label}: cannot go from {from} to {to}")]
    InvalidTransition {
        label: String,
        from: WindowState,
        to: WindowState,
    },

    #[error("window {0} is closed")]
    Closed(String),

    #[error("native window error: {0}")]
    Native(String),
}
