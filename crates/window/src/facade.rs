use std::collections::VecDeque;
use std::sync::Arc;

use stickynotes_protocol::constants::MAX_PENDING_BROADCASTS;
use stickynotes_protocol::{Bounds, Broadcast};
use tracing::{debug, warn};

use crate::kind::{WindowKind, WindowOptions};
use crate::native::{NativeWindow, WindowHost};
use crate::state::WindowState;
use crate::WindowError;

/// Owner's answer to a close request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    /// Destroy the window.
    Allow,
    /// Keep the window alive, hidden.
    ConvertToHide,
}

/// What a close request ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    Hidden,
    Closed,
}

/// Callback consulted before a close is committed.
pub type ClosePolicy = Arc<dyn Fn(&WindowKind) -> CloseDecision + Send + Sync>;

/// One native window plus its message endpoint.
pub struct WindowFacade {
    kind: WindowKind,
    label: String,
    state: WindowState,
    native: Option<Arc<dyn NativeWindow>>,
    ready: bool,
    pending: VecDeque<Broadcast>,
    always_on_top: bool,
    on_close_requested: ClosePolicy,
}

impl WindowFacade {
    /// A handle in `Unopened` state.
    pub fn new(kind: WindowKind, on_close_requested: ClosePolicy) -> Self {
        Self {
            label: kind.label(),
            kind,
            state: WindowState::Unopened,
            native: None,
            ready: false,
            pending: VecDeque::new(),
            always_on_top: false,
            on_close_requested,
        }
    }

    /// Creates the native window. On failure the handle stays `Unopened`.
    pub fn open(&mut self, host: &dyn WindowHost, options: &WindowOptions) -> Result<(), WindowError> {
        self.check_transition(WindowState::Opening)?;
        let native = host.open(options)?;
        self.native = Some(native);
        self.always_on_top = options.always_on_top;
        self.state = WindowState::Opening;
        debug!(window = %self.label, "window opening");
        Ok(())
    }

    pub fn kind(&self) -> &WindowKind {
        &self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_always_on_top(&self) -> bool {
        self.always_on_top
    }

    /// Broadcasts waiting for the ready signal.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Handles the UI's ready signal: shows the window, delivers `initialize`
    /// and then everything queued before it, in send order.
    ///
    /// A second ready signal (page reload) re-sends `initialize` only.
    pub fn mark_ready(&mut self, initialize: Broadcast) -> Result<(), WindowError> {
        if self.state == WindowState::Opening {
            self.check_transition(WindowState::Visible)?;
            let native = self.native()?;
            native.show()?;
            native.focus()?;
            self.state = WindowState::Visible;
        } else if !self.state.is_live() {
            return Err(WindowError::Closed(self.label.clone()));
        }

        self.ready = true;
        let native = self.native()?.clone();
        native.emit(&initialize)?;
        while let Some(message) = self.pending.pop_front() {
            native.emit(&message)?;
        }
        debug!(window = %self.label, "window ready");
        Ok(())
    }

    /// Sends a broadcast, or queues it until the window is ready.
    ///
    /// The queue keeps the most recent messages; when full the oldest is
    /// dropped. Sending to a closed window is a no-op.
    pub fn send(&mut self, message: Broadcast) -> Result<(), WindowError> {
        if !self.state.is_live() {
            debug!(window = %self.label, message = message.name(), "dropping message for closed window");
            return Ok(());
        }
        if !self.ready {
            if self.pending.len() == MAX_PENDING_BROADCASTS {
                if let Some(dropped) = self.pending.pop_front() {
                    warn!(window = %self.label, dropped = dropped.name(), "pre-ready queue full");
                }
            }
            self.pending.push_back(message);
            return Ok(());
        }
        self.native()?.emit(&message)
    }

    /// Brings the window to the front, un-hiding it if needed.
    ///
    /// A window still opening is shown when it becomes ready.
    pub fn show(&mut self) -> Result<(), WindowError> {
        match self.state {
            WindowState::Opening => Ok(()),
            WindowState::Hidden => {
                self.check_transition(WindowState::Visible)?;
                let native = self.native()?;
                native.show()?;
                native.focus()?;
                self.state = WindowState::Visible;
                Ok(())
            }
            WindowState::Visible => self.native()?.focus(),
            WindowState::Unopened | WindowState::Closed => self.invalid(WindowState::Visible),
        }
    }

    /// Hides the window without destroying it.
    pub fn hide(&mut self) -> Result<(), WindowError> {
        match self.state {
            WindowState::Hidden => Ok(()),
            _ => {
                self.check_transition(WindowState::Hidden)?;
                self.native()?.hide()?;
                self.state = WindowState::Hidden;
                Ok(())
            }
        }
    }

    /// Asks the owner, then either hides or destroys the window.
    pub fn close(&mut self) -> Result<CloseOutcome, WindowError> {
        match (self.on_close_requested)(&self.kind) {
            CloseDecision::ConvertToHide if self.state != WindowState::Opening => {
                self.hide()?;
                Ok(CloseOutcome::Hidden)
            }
            _ => {
                self.destroy()?;
                Ok(CloseOutcome::Closed)
            }
        }
    }

    /// Destroys the window without consulting the owner.
    pub fn destroy(&mut self) -> Result<(), WindowError> {
        if self.state == WindowState::Closed {
            return Ok(());
        }
        self.check_transition(WindowState::Closed)?;
        let result = self.native()?.destroy();
        self.mark_destroyed();
        result
    }

    /// Records that the native window went away on its own.
    pub fn mark_destroyed(&mut self) {
        if self.state != WindowState::Closed {
            debug!(window = %self.label, from = %self.state, "window closed");
        }
        self.state = WindowState::Closed;
        self.ready = false;
        self.pending.clear();
    }

    pub fn bounds(&self) -> Result<Bounds, WindowError> {
        self.live_native()?.bounds()
    }

    pub fn set_bounds(&self, bounds: Bounds) -> Result<(), WindowError> {
        self.live_native()?.set_bounds(bounds)
    }

    pub fn set_always_on_top(&mut self, on_top: bool) -> Result<(), WindowError> {
        self.live_native()?.set_always_on_top(on_top)?;
        self.always_on_top = on_top;
        Ok(())
    }

    pub fn set_skip_taskbar(&self, skip: bool) -> Result<(), WindowError> {
        self.live_native()?.set_skip_taskbar(skip)
    }

    pub fn set_opacity(&self, opacity: f64) -> Result<(), WindowError> {
        self.live_native()?.set_opacity(opacity)
    }

    pub fn focus(&self) -> Result<(), WindowError> {
        self.live_native()?.focus()
    }

    fn native(&self) -> Result<&Arc<dyn NativeWindow>, WindowError> {
        self.native
            .as_ref()
            .ok_or_else(|| WindowError::Closed(self.label.clone()))
    }

    fn live_native(&self) -> Result<&Arc<dyn NativeWindow>, WindowError> {
        if !self.state.is_live() {
            return Err(WindowError::Closed(self.label.clone()));
        }
        self.native()
    }

    fn check_transition(&self, to: WindowState) -> Result<(), WindowError> {
        if self.state.can_transition_to(to) {
            Ok(())
        } else {
            self.invalid(to)
        }
    }

    fn invalid<T>(&self, to: WindowState) -> Result<T, WindowError> {
        Err(WindowError::InvalidTransition {
            label: self.label.clone(),
            from: self.state,
            to,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeHost;
    use stickynotes_protocol::settings::Settings;
    use stickynotes_protocol::{Analytics, InitializePayload};

    fn hide_notes() -> ClosePolicy {
        Arc::new(|kind: &WindowKind| {
            if kind.is_note() {
                CloseDecision::ConvertToHide
            } else {
                CloseDecision::Allow
            }
        })
    }

    fn initialize(id: &str) -> Broadcast {
        Broadcast::Initialize(Box::new(InitializePayload {
            instance_id: Some(id.into()),
            data: None,
            settings: Settings::default(),
            analytics: Analytics::default(),
        }))
    }

    fn opened(host: &FakeHost, id: &str) -> WindowFacade {
        let mut w = WindowFacade::new(WindowKind::Note(id.into()), hide_notes());
        let bounds = Bounds {
            x: 0,
            y: 0,
            width: 400,
            height: 500,
        };
        w.open(host, &WindowOptions::note(id, bounds, &Settings::default()))
            .unwrap();
        w
    }

    #[test]
    fn open_moves_to_opening_hidden() {
        let host = FakeHost::new();
        let w = opened(&host, "n1");
        assert_eq!(w.state(), WindowState::Opening);
        assert!(!host.window("note-n1").unwrap().is_visible());
    }

    #[test]
    fn failed_open_stays_unopened() {
        let host = FakeHost::new();
        host.fail_next_open();
        let mut w = WindowFacade::new(WindowKind::Manager, hide_notes());
        assert!(w.open(&host, &WindowOptions::manager()).is_err());
        assert_eq!(w.state(), WindowState::Unopened);
    }

    #[test]
    fn pre_ready_messages_follow_initialize() {
        let host = FakeHost::new();
        let mut w = opened(&host, "n1");
        w.send(Broadcast::TriggerFind).unwrap();
        w.send(Broadcast::SaveRequest).unwrap();
        assert!(host.window("note-n1").unwrap().received().is_empty());

        w.mark_ready(initialize("n1")).unwrap();
        let names: Vec<_> = host
            .window("note-n1")
            .unwrap()
            .received()
            .iter()
            .map(|b| b.name())
            .collect();
        assert_eq!(names, vec!["initialize", "trigger-find", "save-request"]);
        assert_eq!(w.state(), WindowState::Visible);
        assert!(host.window("note-n1").unwrap().is_visible());
    }

    #[test]
    fn pre_ready_queue_is_bounded() {
        let host = FakeHost::new();
        let mut w = opened(&host, "n1");
        for _ in 0..MAX_PENDING_BROADCASTS + 5 {
            w.send(Broadcast::TriggerFind).unwrap();
        }
        assert_eq!(w.pending_len(), MAX_PENDING_BROADCASTS);
    }

    #[test]
    fn close_converted_to_hide_for_notes() {
        let host = FakeHost::new();
        let mut w = opened(&host, "n1");
        w.mark_ready(initialize("n1")).unwrap();

        assert_eq!(w.close().unwrap(), CloseOutcome::Hidden);
        assert_eq!(w.state(), WindowState::Hidden);
        assert!(!host.window("note-n1").unwrap().is_destroyed());

        w.show().unwrap();
        assert_eq!(w.state(), WindowState::Visible);
    }

    #[test]
    fn allow_policy_destroys() {
        let host = FakeHost::new();
        let mut w = WindowFacade::new(WindowKind::Manager, hide_notes());
        w.open(&host, &WindowOptions::manager()).unwrap();
        w.mark_ready(initialize("manager")).unwrap();

        assert_eq!(w.close().unwrap(), CloseOutcome::Closed);
        assert_eq!(w.state(), WindowState::Closed);
        assert!(host.window("manager").unwrap().is_destroyed());
    }

    #[test]
    fn closed_is_terminal() {
        let host = FakeHost::new();
        let mut w = opened(&host, "n1");
        w.destroy().unwrap();
        assert!(matches!(
            w.show(),
            Err(WindowError::InvalidTransition { .. })
        ));
        assert!(w.mark_ready(initialize("n1")).is_err());
        assert!(w.bounds().is_err());
        // Sends to a closed window are dropped, not errors.
        w.send(Broadcast::SaveRequest).unwrap();
    }

    #[test]
    fn hide_while_opening_rejected() {
        let host = FakeHost::new();
        let mut w = opened(&host, "n1");
        assert!(w.hide().is_err());
        assert_eq!(w.state(), WindowState::Opening);
    }

    #[test]
    fn always_on_top_tracked() {
        let host = FakeHost::new();
        let mut w = opened(&host, "n1");
        assert!(w.is_always_on_top());
        w.set_always_on_top(false).unwrap();
        assert!(!w.is_always_on_top());
        assert!(!host.window("note-n1").unwrap().always_on_top());
    }

    #[test]
    fn reload_resends_initialize_only() {
        let host = FakeHost::new();
        let mut w = opened(&host, "n1");
        w.mark_ready(initialize("n1")).unwrap();
        w.mark_ready(initialize("n1")).unwrap();
        assert_eq!(host.window("note-n1").unwrap().received().len(), 2);
        assert_eq!(w.state(), WindowState::Visible);
    }
}
