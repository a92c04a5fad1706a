//! A note window's side of the message channel.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use stickynotes_protocol::messages::SettingsReply;
use stickynotes_protocol::{AnalyticsEvent, Broadcast, Reply, Request, Settings};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::autosave::AutoSaver;
use crate::link::ControllerLink;
use crate::note::NoteWindowState;
use crate::state::{BroadcastEffect, UiState};

/// Errors surfaced to the window's view.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("{0}")]
    Rejected(String),

    #[error("unexpected reply: {0}")]
    Malformed(#[from] serde_json::Error),
}

struct Inner<L> {
    link: L,
    state: Mutex<UiState>,
}

impl<L: ControllerLink> Inner<L> {
    /// Sends the note if it has unsaved edits. Returns whether a save went out.
    async fn save_if_dirty(&self) -> Result<bool, SessionError> {
        let (instance_id, data, revision, (words, characters)) = {
            let state = self.state.lock().await;
            let Some(note) = state.note.as_ref().filter(|n| n.is_dirty()) else {
                return Ok(false);
            };
            (
                note.id().to_string(),
                note.save_patch(),
                note.revision(),
                note.growth_since_save(),
            )
        };

        let reply = self
            .link
            .request(Request::SaveNote {
                instance_id: instance_id.clone(),
                data,
            })
            .await;
        if let Err(e) = reply.into_result() {
            self.state
                .lock()
                .await
                .notifications
                .error_with("Save failed", e.clone());
            return Err(SessionError::Rejected(e));
        }

        if let Some(note) = self.state.lock().await.note.as_mut() {
            note.mark_saved(revision);
        }
        debug!(note = %instance_id, revision, "note saved");

        for event in [
            (words > 0).then_some(AnalyticsEvent::WordsAdded { count: words }),
            (characters > 0).then_some(AnalyticsEvent::CharactersAdded { count: characters }),
        ]
        .into_iter()
        .flatten()
        {
            let reply = self.link.request(Request::UpdateAnalytics { event }).await;
            if let Err(e) = reply.into_result() {
                warn!(note = %instance_id, error = %e, "analytics update rejected");
            }
        }
        Ok(true)
    }
}

/// UI state of one window wired to the controller.
pub struct NoteSession<L: ControllerLink + 'static> {
    inner: Arc<Inner<L>>,
    saver: Option<AutoSaver>,
}

impl<L: ControllerLink + 'static> NoteSession<L> {
    pub fn new(link: L) -> Self {
        Self {
            inner: Arc::new(Inner {
                link,
                state: Mutex::new(UiState::new()),
            }),
            saver: None,
        }
    }

    /// Signals the controller that the view is mounted. `initialize`
    /// follows as a broadcast.
    pub async fn ready(&self) -> Result<(), SessionError> {
        self.request(Request::WindowReady).await.map(|_| ())
    }

    /// Applies a broadcast from the controller.
    pub async fn handle_broadcast(&mut self, message: Broadcast) {
        let effect = self.inner.state.lock().await.apply(&message);
        match effect {
            BroadcastEffect::None => {}
            BroadcastEffect::Flush => {
                if let Err(e) = self.save_now().await {
                    warn!(error = %e, "save on request failed");
                }
            }
            BroadcastEffect::AutoSave { enabled, interval } => {
                if let Some(saver) = &self.saver {
                    saver.configure(enabled, interval);
                    return;
                }
                let inner = self.inner.clone();
                self.saver = Some(AutoSaver::spawn(interval, enabled, move || {
                    let inner = inner.clone();
                    async move {
                        if let Err(e) = inner.save_if_dirty().await {
                            warn!(error = %e, "auto-save failed");
                        }
                    }
                }));
            }
        }
    }

    /// Applies a reducer to the note and schedules an auto-save.
    ///
    /// Returns `false` when no note is loaded yet.
    pub async fn edit<F>(&self, reducer: F) -> bool
    where
        F: FnOnce(&mut NoteWindowState, DateTime<Utc>),
    {
        {
            let mut state = self.inner.state.lock().await;
            let Some(note) = state.note.as_mut() else {
                return false;
            };
            reducer(note, Utc::now());
        }
        if let Some(saver) = &self.saver {
            saver.touch();
        }
        true
    }

    /// Saves immediately if there are unsaved edits.
    pub async fn save_now(&self) -> Result<bool, SessionError> {
        self.inner.save_if_dirty().await
    }

    /// Asks the controller to merge `patch` into the settings.
    ///
    /// The local cache is not touched here; it is replaced when the
    /// `settings-updated` broadcast arrives.
    pub async fn update_settings(&self, patch: Map<String, Value>) -> Result<Settings, SessionError> {
        let reply = self.request(Request::SaveSettings { settings: patch }).await?;
        Ok(reply.parse::<SettingsReply>()?.settings)
    }

    /// Removes a notification once the view has shown it.
    pub async fn dismiss_notification(&self, id: u64) -> bool {
        self.inner.state.lock().await.notifications.dismiss(id)
    }

    /// Copy of the current state.
    pub async fn snapshot(&self) -> UiState {
        self.inner.state.lock().await.clone()
    }

    /// Final save, then asks the controller to close this window.
    pub async fn close(mut self) -> Result<(), SessionError> {
        if let Some(saver) = self.saver.take() {
            saver.close().await;
        }
        self.save_now().await?;
        self.request(Request::CloseWindow).await.map(|_| ())
    }

    /// Stops auto-save without saving. Used on quit, after the last
    /// `save-request` was answered.
    pub fn cancel(&self) {
        if let Some(saver) = &self.saver {
            saver.cancel();
        }
    }

    async fn request(&self, request: Request) -> Result<Reply, SessionError> {
        let op = request.op();
        let reply = self.inner.link.request(request).await;
        reply.into_result().map_err(|e| {
            debug!(op, error = %e, "request rejected");
            SessionError::Rejected(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;
    use stickynotes_protocol::{Analytics, InitializePayload, NoteInstance};

    #[derive(Default)]
    struct MockLink {
        sent: StdMutex<Vec<Request>>,
        fail_saves: bool,
    }

    impl MockLink {
        fn saves(&self) -> usize {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .filter(|r| matches!(r, Request::SaveNote { .. }))
                .count()
        }
    }

    impl ControllerLink for Arc<MockLink> {
        fn request(&self, request: Request) -> Pin<Box<dyn Future<Output = Reply> + Send + '_>> {
            let link = self.clone();
            Box::pin(async move {
                let reply = match &request {
                    Request::SaveNote { .. } if link.fail_saves => Reply::failure("disk full"),
                    Request::SaveSettings { settings } => {
                        let merged = Settings::default().merged(settings).unwrap();
                        Reply::ok_with(&SettingsReply { settings: merged }).unwrap()
                    }
                    _ => Reply::ok(),
                };
                link.sent.lock().unwrap().push(request);
                reply
            })
        }
    }

    fn init(id: &str) -> Broadcast {
        Broadcast::Initialize(Box::new(InitializePayload {
            instance_id: Some(id.into()),
            data: Some(NoteInstance::new(id, Utc::now())),
            settings: Settings::default(),
            analytics: Analytics::default(),
        }))
    }

    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn edits_debounced_into_one_save() {
        let link = Arc::new(MockLink::default());
        let mut session = NoteSession::new(link.clone());
        session.handle_broadcast(init("n1")).await;

        for i in 0..10 {
            session
                .edit(|n, now| n.update_content(format!("draft {i}"), now))
                .await;
            settle().await;
            tokio::time::advance(Duration::from_millis(200)).await;
        }
        assert_eq!(link.saves(), 0);

        tokio::time::advance(Duration::from_millis(3000)).await;
        settle().await;
        assert_eq!(link.saves(), 1);

        let snap = session.snapshot().await;
        assert!(!snap.note.unwrap().is_dirty());
    }

    #[tokio::test(start_paused = true)]
    async fn save_request_flushes_immediately() {
        let link = Arc::new(MockLink::default());
        let mut session = NoteSession::new(link.clone());
        session.handle_broadcast(init("n1")).await;
        session.edit(|n, now| n.update_title("T", now)).await;

        session.handle_broadcast(Broadcast::SaveRequest).await;
        assert_eq!(link.saves(), 1);

        // Clean note: nothing to send.
        session.handle_broadcast(Broadcast::SaveRequest).await;
        assert_eq!(link.saves(), 1);
    }

    #[tokio::test]
    async fn failed_save_notifies_and_stays_dirty() {
        let link = Arc::new(MockLink {
            fail_saves: true,
            ..Default::default()
        });
        let mut session = NoteSession::new(link.clone());
        session.handle_broadcast(init("n1")).await;
        session.edit(|n, now| n.update_content("x", now)).await;

        let err = session.save_now().await.unwrap_err();
        assert_eq!(err.to_string(), "disk full");

        let snap = session.snapshot().await;
        assert!(snap.note.unwrap().is_dirty());
        let shown = snap.notifications.iter().next().unwrap().clone();
        assert_eq!(shown.title, "Save failed");
        assert_eq!(shown.message, "disk full");

        assert!(session.dismiss_notification(shown.id).await);
        assert!(session.snapshot().await.notifications.is_empty());
        assert!(!session.dismiss_notification(shown.id).await);
    }

    #[tokio::test]
    async fn save_reports_word_growth() {
        let link = Arc::new(MockLink::default());
        let mut session = NoteSession::new(link.clone());
        session.handle_broadcast(init("n1")).await;
        session
            .edit(|n, now| n.update_content("hello world", now))
            .await;
        session.save_now().await.unwrap();

        let sent = link.sent.lock().unwrap().clone();
        assert!(sent.contains(&Request::UpdateAnalytics {
            event: AnalyticsEvent::WordsAdded { count: 2 }
        }));
        assert!(sent.contains(&Request::UpdateAnalytics {
            event: AnalyticsEvent::CharactersAdded { count: 11 }
        }));
    }

    #[tokio::test]
    async fn edit_before_initialize_is_ignored() {
        let link = Arc::new(MockLink::default());
        let session = NoteSession::new(link);
        assert!(!session.edit(|n, now| n.toggle_pin(now)).await);
    }

    #[tokio::test]
    async fn settings_go_through_controller() {
        let link = Arc::new(MockLink::default());
        let mut session = NoteSession::new(link.clone());
        session.handle_broadcast(init("n1")).await;

        let patch = serde_json::json!({"theme": "light"});
        let merged = session
            .update_settings(patch.as_object().unwrap().clone())
            .await
            .unwrap();
        assert_eq!(merged.theme, "light");
        // Cache waits for the broadcast.
        assert_eq!(session.snapshot().await.settings.theme, "dark");

        session
            .handle_broadcast(Broadcast::settings_updated(merged))
            .await;
        assert_eq!(session.snapshot().await.settings.theme, "light");
    }

    #[tokio::test(start_paused = true)]
    async fn close_saves_then_requests_close() {
        let link = Arc::new(MockLink::default());
        let mut session = NoteSession::new(link.clone());
        session.handle_broadcast(init("n1")).await;
        session.edit(|n, now| n.update_content("bye", now)).await;
        session.close().await.unwrap();

        let sent = link.sent.lock().unwrap().clone();
        assert_eq!(link.saves(), 1);
        assert_eq!(sent.last(), Some(&Request::CloseWindow));
    }
}
