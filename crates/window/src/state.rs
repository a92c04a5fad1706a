use std::fmt;

/// Lifecycle of one window handle.
///
/// `Closed` is terminal: reopening the same note goes through a new handle
/// starting at `Unopened`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    /// Handle exists, native window not requested yet.
    Unopened,
    /// Native window created, hosted UI has not signalled ready.
    Opening,
    /// Shown to the user.
    Visible,
    /// Still alive but hidden (minimized to tray).
    Hidden,
    /// Destroyed.
    Closed,
}

impl WindowState {
    /// Whether `self -> next` is a legal transition.
    pub fn can_transition_to(self, next: WindowState) -> bool {
        use WindowState::*;
        matches!(
            (self, next),
            (Unopened, Opening)
                | (Opening, Visible)
                | (Opening, Closed)
                | (Visible, Hidden)
                | (Hidden, Visible)
                | (Visible, Closed)
                | (Hidden, Closed)
        )
    }

    /// Whether the native window still exists.
    pub fn is_live(self) -> bool {
        matches!(self, Self::Opening | Self::Visible | Self::Hidden)
    }
}

impl fmt::Display for WindowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unopened => "unopened",
            Self::Opening => "opening",
            Self::Visible => "visible",
            Self::Hidden => "hidden",
            Self::Closed => "closed",
        };
        f.write_str(s)
    }
}
