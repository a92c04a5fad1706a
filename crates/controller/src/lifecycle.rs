//! Window lifecycle: create, show, close, delete, restore and quit.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use serde_json::{Map, Value};

use stickynotes_protocol::constants::{QUICK_NOTE_HEIGHT, QUICK_NOTE_PREFIX, QUICK_NOTE_WIDTH};
use stickynotes_protocol::{AnalyticsEvent, Broadcast, InitializePayload, NoteInstance, Size};
use stickynotes_store::{StoreExt, key};
use stickynotes_window::geometry::{cascade, clamp_to};
use stickynotes_window::{CloseOutcome, WindowEvent, WindowFacade, WindowKind, WindowOptions};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::ControllerError;
use crate::controller::{AppController, ControllerState, NoteOverrides};

impl AppController {
    /// Opens a note window and returns its id.
    ///
    /// With an id that already has a window, that window is shown instead.
    /// Without an id a fresh one is generated. The window starts at the
    /// note's stored bounds, or cascaded from the open notes.
    pub async fn create_note(
        &self,
        id: Option<String>,
        overrides: NoteOverrides,
    ) -> Result<String, ControllerError> {
        let mut st = self.state.lock().await;
        self.create_note_locked(&mut st, id, overrides)
    }

    pub(crate) fn create_note_locked(
        &self,
        st: &mut ControllerState,
        id: Option<String>,
        overrides: NoteOverrides,
    ) -> Result<String, ControllerError> {
        if self.is_quitting() {
            return Err(ControllerError::Quitting);
        }
        if let Some(id) = &id
            && let Some(facade) = st.registry.note_mut(id)
        {
            facade.show()?;
            debug!(note = %id, "note already open");
            return Ok(id.clone());
        }

        let id = id.unwrap_or_else(|| Uuid::new_v4().to_string());
        key::validate_segment(&id)?;
        let open = st.registry.note_count();
        if open >= st.settings.max_instances {
            return Err(ControllerError::LimitReached(open));
        }

        let stored = self.load_note(&id)?;
        let quick = overrides.quick || stored.as_ref().is_some_and(|n| n.is_quick_note);
        let size = if quick {
            Size {
                width: QUICK_NOTE_WIDTH,
                height: QUICK_NOTE_HEIGHT,
            }
        } else {
            overrides.size.unwrap_or(st.settings.default_size)
        };
        let work_area = self.host.work_area();
        let bounds = match stored.as_ref().and_then(|n| n.bounds) {
            Some(saved) => clamp_to(saved, work_area),
            None => cascade(open, size, work_area),
        };
        let options = if quick {
            WindowOptions::quick_note(&id, bounds, &st.settings)
        } else {
            WindowOptions::note(&id, bounds, &st.settings)
        };

        let mut facade = WindowFacade::new(WindowKind::Note(id.clone()), self.close_policy());
        facade.open(&*self.host, &options)?;
        st.registry.insert(facade, self.clock.now());

        if stored.is_none()
            && let Err(e) = self.record_locked(st, AnalyticsEvent::NoteCreated)
        {
            warn!(note = %id, error = %e, "failed to record note creation");
        }
        info!(note = %id, quick, x = bounds.x, y = bounds.y, "note window opened");
        Ok(id)
    }

    /// Shows the note's window, opening one if it has none.
    pub async fn show_note(&self, id: &str) -> Result<String, ControllerError> {
        let mut st = self.state.lock().await;
        self.create_note_locked(&mut st, Some(id.to_string()), NoteOverrides::default())
    }

    /// Asks the note to save, then closes its window. Outside of quit the
    /// window is only hidden.
    pub async fn close_note(&self, id: &str) -> Result<CloseOutcome, ControllerError> {
        let mut st = self.state.lock().await;
        self.close_window_locked(&mut st, &WindowKind::Note(id.to_string()).label())
    }

    pub(crate) fn close_window_locked(
        &self,
        st: &mut ControllerState,
        label: &str,
    ) -> Result<CloseOutcome, ControllerError> {
        let facade = st
            .registry
            .get_mut(label)
            .ok_or_else(|| ControllerError::UnknownWindow(label.to_string()))?;
        if facade.kind().is_note()
            && let Err(e) = facade.send(Broadcast::SaveRequest)
        {
            warn!(window = %label, error = %e, "failed to request save before close");
        }
        let outcome = facade.close()?;
        if outcome == CloseOutcome::Closed {
            self.forget_locked(st, label);
        }
        debug!(window = %label, ?outcome, "close handled");
        Ok(outcome)
    }

    /// Removes the note from the store and destroys its window, if any.
    pub async fn delete_note(&self, id: &str) -> Result<(), ControllerError> {
        let mut st = self.state.lock().await;
        self.store.delete(&Self::note_key(id)?)?;
        let label = WindowKind::Note(id.to_string()).label();
        if let Some(mut facade) = self.forget_locked(&mut st, &label)
            && let Err(e) = facade.destroy()
        {
            warn!(note = %id, error = %e, "failed to destroy deleted note window");
        }
        info!(note = %id, "note deleted");
        Ok(())
    }

    /// Merges `patch` into the stored note and persists it.
    ///
    /// A note saved for the first time takes its window's open time as
    /// `created`. `lastModified` is always the save time.
    pub async fn save_note(
        &self,
        id: &str,
        patch: &Map<String, Value>,
    ) -> Result<NoteInstance, ControllerError> {
        let mut st = self.state.lock().await;
        let note_key = Self::note_key(id)?;
        let now = self.clock.now();
        let base = match self.load_note(id)? {
            Some(note) => note,
            None => {
                let opened_at = st
                    .registry
                    .opened_at(&WindowKind::Note(id.to_string()).label())
                    .unwrap_or(now);
                NoteInstance::new(id, opened_at)
            }
        };
        let next = base.merged(patch, now)?;
        self.store.set_typed(&note_key, &next)?;
        if let Err(e) = self.record_locked(&mut st, AnalyticsEvent::NoteModified) {
            warn!(note = %id, error = %e, "failed to record note change");
        }
        debug!(note = %id, keys = patch.len(), "note saved");
        Ok(next)
    }

    /// Shows the manager, opening it on first use.
    pub async fn open_manager(&self) -> Result<(), ControllerError> {
        let mut st = self.state.lock().await;
        self.open_singleton_locked(&mut st, WindowOptions::manager())
    }

    /// Shows the settings window, parented to the manager when it is open.
    pub async fn open_settings(&self) -> Result<(), ControllerError> {
        let mut st = self.state.lock().await;
        let parent = st
            .registry
            .get(&WindowKind::Manager.label())
            .filter(|f| f.state().is_live())
            .map(|f| f.label().to_string());
        self.open_singleton_locked(&mut st, WindowOptions::settings(parent))
    }

    fn open_singleton_locked(
        &self,
        st: &mut ControllerState,
        options: WindowOptions,
    ) -> Result<(), ControllerError> {
        if self.is_quitting() {
            return Err(ControllerError::Quitting);
        }
        if let Some(facade) = st.registry.get_mut(&options.label) {
            facade.show()?;
            return Ok(());
        }
        let mut facade = WindowFacade::new(options.kind.clone(), self.close_policy());
        facade.open(&*self.host, &options)?;
        st.registry.insert(facade, self.clock.now());
        info!(window = %options.label, "window opened");
        Ok(())
    }

    /// Handles the ready signal from a window's UI: sends `initialize`
    /// followed by anything queued while it loaded.
    pub async fn window_ready(&self, label: &str) -> Result<(), ControllerError> {
        let mut st = self.state.lock().await;
        let (kind, opened_at) = match (st.registry.get(label), st.registry.opened_at(label)) {
            (Some(facade), Some(opened_at)) => (facade.kind().clone(), opened_at),
            _ => return Err(ControllerError::UnknownWindow(label.to_string())),
        };

        let (instance_id, data) = match kind.note_id() {
            Some(id) => {
                // A note that was never saved still reports when it was opened.
                let note = self
                    .load_note(id)?
                    .unwrap_or_else(|| NoteInstance::new(id, opened_at));
                (Some(id.to_string()), Some(note))
            }
            None => (None, None),
        };
        let mut analytics = st.analytics.clone();
        analytics.refresh_today(self.clock.now().date_naive());
        let initialize = Broadcast::Initialize(Box::new(InitializePayload {
            instance_id,
            data,
            settings: st.settings.clone(),
            analytics,
        }));

        let facade = st
            .registry
            .get_mut(label)
            .ok_or_else(|| ControllerError::UnknownWindow(label.to_string()))?;
        facade.mark_ready(initialize)?;
        Ok(())
    }

    /// Reacts to a native window event.
    pub async fn on_window_event(
        &self,
        label: &str,
        event: WindowEvent,
    ) -> Result<(), ControllerError> {
        let mut st = self.state.lock().await;
        let Some(kind) = st.registry.get(label).map(|f| f.kind().clone()) else {
            debug!(window = %label, ?event, "event for unregistered window");
            return Ok(());
        };

        match event {
            WindowEvent::Moved | WindowEvent::Resized => {
                if let Some(id) = kind.note_id() {
                    self.persist_bounds_locked(&st, label, id)?;
                }
            }
            WindowEvent::Focused => {
                if let Some(id) = kind.note_id() {
                    st.focused_note = Some(id.to_string());
                }
            }
            WindowEvent::Blurred => {
                if kind.note_id().is_some() && st.focused_note.as_deref() == kind.note_id() {
                    st.focused_note = None;
                }
            }
            WindowEvent::CloseRequested => {
                self.close_window_locked(&mut st, label)?;
            }
            WindowEvent::Destroyed => {
                if let Some(mut facade) = self.forget_locked(&mut st, label) {
                    facade.mark_destroyed();
                    info!(window = %label, "window destroyed");
                }
            }
        }
        Ok(())
    }

    /// Writes the window's current bounds into the stored note. Content and
    /// `lastModified` are left alone.
    fn persist_bounds_locked(
        &self,
        st: &ControllerState,
        label: &str,
        id: &str,
    ) -> Result<(), ControllerError> {
        let Some(facade) = st.registry.get(label) else {
            return Ok(());
        };
        if !facade.state().is_live() {
            return Ok(());
        }
        let bounds = facade.bounds()?;
        let opened_at = st
            .registry
            .opened_at(label)
            .unwrap_or_else(|| self.clock.now());
        let mut note = self
            .load_note(id)?
            .unwrap_or_else(|| NoteInstance::new(id, opened_at));
        if note.bounds == Some(bounds) {
            return Ok(());
        }
        note.bounds = Some(bounds);
        self.store.set_typed(&Self::note_key(id)?, &note)?;
        debug!(note = %id, x = bounds.x, y = bounds.y, width = bounds.width, height = bounds.height, "bounds saved");
        Ok(())
    }

    /// Drops a window from the registry, clearing focus if it held it.
    fn forget_locked(&self, st: &mut ControllerState, label: &str) -> Option<WindowFacade> {
        let facade = st.registry.remove(label)?;
        if facade.kind().note_id().is_some() && st.focused_note.as_deref() == facade.kind().note_id() {
            st.focused_note = None;
        }
        Some(facade)
    }

    /// Reopens every stored note that asks to be restored, oldest first,
    /// pausing between windows. A note that fails to open is logged and
    /// skipped.
    pub async fn restore_instances(&self) -> Result<usize, ControllerError> {
        let mut notes: Vec<NoteInstance> = self
            .load_instances()?
            .into_values()
            .filter(NoteInstance::restorable)
            .collect();
        notes.sort_by(|a, b| (a.created, &a.id).cmp(&(b.created, &b.id)));

        let mut restored = 0;
        for (i, note) in notes.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.config.restore_stagger).await;
            }
            if self.is_quitting() {
                break;
            }
            match self
                .create_note(Some(note.id.clone()), NoteOverrides::default())
                .await
            {
                Ok(_) => restored += 1,
                Err(e) => warn!(note = %note.id, error = %e, "failed to restore note"),
            }
        }
        info!(restored, candidates = notes.len(), "notes restored");
        Ok(restored)
    }

    /// Opens a small throwaway note that saves and closes itself after a
    /// few minutes. Quick notes are never restored.
    pub async fn create_quick_note(self: &Arc<Self>) -> Result<String, ControllerError> {
        let id = {
            let mut st = self.state.lock().await;
            if self.is_quitting() {
                return Err(ControllerError::Quitting);
            }
            let now = self.clock.now();
            let mut stamp = now.timestamp_millis();
            while st.registry.has_note(&format!("{QUICK_NOTE_PREFIX}{stamp}")) {
                stamp += 1;
            }
            let id = format!("{QUICK_NOTE_PREFIX}{stamp}");

            let mut note = NoteInstance::new(id.as_str(), now);
            note.title = "Quick Note".into();
            note.is_quick_note = true;
            note.auto_restore = false;
            let note_key = Self::note_key(&id)?;
            self.store.set_typed(&note_key, &note)?;

            let overrides = NoteOverrides {
                quick: true,
                ..NoteOverrides::default()
            };
            if let Err(e) = self.create_note_locked(&mut st, Some(id.clone()), overrides) {
                if let Err(cleanup) = self.store.delete(&note_key) {
                    warn!(note = %id, error = %cleanup, "failed to remove unopened quick note");
                }
                return Err(e);
            }
            if let Err(e) = self.record_locked(&mut st, AnalyticsEvent::NoteCreated) {
                warn!(note = %id, error = %e, "failed to record note creation");
            }
            id
        };

        let this = Arc::clone(self);
        let token = self.shutdown.clone();
        let lifetime = self.config.quick_note_lifetime;
        let expiring = id.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(lifetime) => this.expire_quick_note(&expiring).await,
            }
        });
        Ok(id)
    }

    async fn expire_quick_note(&self, id: &str) {
        let label = WindowKind::Note(id.to_string()).label();
        {
            let mut st = self.state.lock().await;
            let Some(facade) = st.registry.get_mut(&label) else {
                return;
            };
            if let Err(e) = facade.send(Broadcast::SaveRequest) {
                warn!(note = %id, error = %e, "failed to request quick note save");
            }
        }
        tokio::time::sleep(self.config.quit_grace).await;

        let mut st = self.state.lock().await;
        if let Some(mut facade) = self.forget_locked(&mut st, &label)
            && let Err(e) = facade.destroy()
        {
            warn!(note = %id, error = %e, "failed to close quick note");
        }
        info!(note = %id, "quick note expired");
    }

    /// Shuts everything down. Runs once; later calls return immediately.
    ///
    /// Every note is asked to save and given a short grace period to do so.
    /// Then background tasks stop, the session is closed in analytics, a
    /// final backup is taken and all windows are destroyed.
    pub async fn quit(&self) {
        if self.quitting.swap(true, Ordering::SeqCst) {
            debug!("quit already in progress");
            return;
        }
        info!("quitting");

        {
            let mut st = self.state.lock().await;
            for facade in st.registry.facades_mut() {
                if facade.kind().is_note()
                    && let Err(e) = facade.send(Broadcast::SaveRequest)
                {
                    warn!(window = %facade.label(), error = %e, "failed to request save");
                }
            }
        }
        tokio::time::sleep(self.config.quit_grace).await;
        self.shutdown.cancel();

        {
            let mut st = self.state.lock().await;
            self.end_session_locked(&mut st);
        }
        if let Err(e) = self.create_backup().await {
            warn!(error = %e, "final backup failed");
        }

        {
            let mut st = self.state.lock().await;
            for mut facade in st.registry.drain() {
                if let Err(e) = facade.destroy() {
                    warn!(window = %facade.label(), error = %e, "failed to destroy window");
                }
            }
            st.focused_note = None;
        }
        if let Err(e) = self.shortcuts.unregister_all() {
            warn!(error = %e, "failed to release shortcuts");
        }
        info!("shutdown complete");
    }
}
