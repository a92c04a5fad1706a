use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde_json::Value;
use stickynotes_protocol::Size;
use stickynotes_protocol::{Analytics, NoteInstance, Settings};
use stickynotes_store::{KeyValueStore, StoreExt, key};
use stickynotes_window::{ClosePolicy, CloseDecision, WindowHost, WindowKind, WindowState};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::ControllerError;
use crate::clock::Clock;
use crate::config::ControllerConfig;
use crate::registry::Registry;
use crate::services::{DesktopServices, ShortcutRegistrar};

pub(crate) const SETTINGS_KEY: &str = "settings";
pub(crate) const ANALYTICS_KEY: &str = "analytics";
pub(crate) const INSTANCES_KEY: &str = "instances";

/// Collaborators injected into the controller.
pub struct Services {
    pub store: Arc<dyn KeyValueStore>,
    pub host: Arc<dyn WindowHost>,
    pub shortcuts: Arc<dyn ShortcutRegistrar>,
    pub desktop: Arc<dyn DesktopServices>,
    pub clock: Arc<dyn Clock>,
}

/// Per-call adjustments to a new note window.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoteOverrides {
    /// Size used instead of `settings.defaultSize` when no bounds are stored.
    pub size: Option<Size>,
    /// Open as a fixed-size quick note.
    pub quick: bool,
}

/// Everything guarded by the controller lock.
pub(crate) struct ControllerState {
    pub registry: Registry,
    pub settings: Settings,
    pub analytics: Analytics,
    /// Note that last received focus; target of note-scoped shortcuts.
    pub focused_note: Option<String>,
}

/// Owns the window registry and the settings and analytics singletons.
///
/// Operations lock the whole state for their duration, so registry changes
/// never interleave. Waiting (restore stagger, quit grace, dialogs, backup
/// file I/O) happens outside the lock.
pub struct AppController {
    pub(crate) config: ControllerConfig,
    pub(crate) store: Arc<dyn KeyValueStore>,
    pub(crate) host: Arc<dyn WindowHost>,
    pub(crate) shortcuts: Arc<dyn ShortcutRegistrar>,
    pub(crate) desktop: Arc<dyn DesktopServices>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) state: Mutex<ControllerState>,
    pub(crate) quitting: Arc<AtomicBool>,
    /// Serializes backup creation, pruning and restore.
    pub(crate) backup_lock: Mutex<()>,
    pub(crate) session_started: DateTime<Utc>,
    pub(crate) shutdown: CancellationToken,
}

impl AppController {
    /// Loads settings and analytics from the store.
    ///
    /// Fails only when the store itself cannot be read; malformed documents
    /// fall back to defaults.
    pub fn new(config: ControllerConfig, services: Services) -> Result<Arc<Self>, ControllerError> {
        let settings = load_settings(&*services.store)?;
        let analytics = load_analytics(&*services.store)?;
        let session_started = services.clock.now();

        info!(
            data_dir = %config.data_dir.display(),
            version = %config.version,
            "controller initialized"
        );

        Ok(Arc::new(Self {
            config,
            store: services.store,
            host: services.host,
            shortcuts: services.shortcuts,
            desktop: services.desktop,
            clock: services.clock,
            state: Mutex::new(ControllerState {
                registry: Registry::default(),
                settings,
                analytics,
                focused_note: None,
            }),
            quitting: Arc::new(AtomicBool::new(false)),
            backup_lock: Mutex::new(()),
            session_started,
            shutdown: CancellationToken::new(),
        }))
    }

    /// Startup sequence: session analytics, shortcuts, note restore, and the
    /// periodic backup task. Opens the manager when no note came back.
    ///
    /// Returns the number of restored notes.
    pub async fn start(self: &Arc<Self>) -> Result<usize, ControllerError> {
        self.begin_session().await;
        {
            let st = self.state.lock().await;
            self.rebind_shortcuts(&st.settings);
        }
        let restored = self.restore_instances().await?;
        if restored == 0 {
            self.open_manager().await?;
        }
        self.spawn_backup_schedule();
        Ok(restored)
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn is_quitting(&self) -> bool {
        self.quitting.load(Ordering::SeqCst)
    }

    /// Current settings singleton.
    pub async fn settings(&self) -> Settings {
        self.state.lock().await.settings.clone()
    }

    /// Ids of notes that currently have a window.
    pub async fn open_notes(&self) -> Vec<String> {
        self.state.lock().await.registry.note_ids()
    }

    /// Labels of every registered window.
    pub async fn window_labels(&self) -> Vec<String> {
        self.state.lock().await.registry.labels()
    }

    /// Lifecycle state of the window with `label`, if registered.
    pub async fn window_state(&self, label: &str) -> Option<WindowState> {
        self.state.lock().await.registry.state(label)
    }

    /// Note targeted by note-scoped shortcuts.
    pub async fn focused_note(&self) -> Option<String> {
        self.state.lock().await.focused_note.clone()
    }

    /// Close requests on note windows become hides unless quitting.
    pub(crate) fn close_policy(&self) -> ClosePolicy {
        let quitting = self.quitting.clone();
        Arc::new(move |kind: &WindowKind| {
            if kind.is_note() && !quitting.load(Ordering::SeqCst) {
                CloseDecision::ConvertToHide
            } else {
                CloseDecision::Allow
            }
        })
    }

    pub(crate) fn note_key(id: &str) -> Result<String, ControllerError> {
        Ok(key::child(INSTANCES_KEY, id)?)
    }

    /// Reads one stored note. A stored entry without an id gets `id`.
    pub fn load_note(&self, id: &str) -> Result<Option<NoteInstance>, ControllerError> {
        let note: Option<NoteInstance> = self.store.get_typed(&Self::note_key(id)?)?;
        Ok(note.map(|mut n| {
            if n.id.is_empty() {
                n.id = id.to_string();
            }
            n
        }))
    }

    /// Reads every stored note, skipping entries that do not parse.
    pub fn load_instances(&self) -> Result<BTreeMap<String, NoteInstance>, ControllerError> {
        let Some(Value::Object(raw)) = self.store.get(INSTANCES_KEY)? else {
            return Ok(BTreeMap::new());
        };
        let mut notes = BTreeMap::new();
        for (id, value) in raw {
            match serde_json::from_value::<NoteInstance>(value) {
                Ok(mut note) => {
                    if note.id.is_empty() {
                        note.id = id.clone();
                    }
                    notes.insert(id, note);
                }
                Err(e) => warn!(note = %id, error = %e, "skipping unreadable note"),
            }
        }
        Ok(notes)
    }
}

fn load_settings(store: &dyn KeyValueStore) -> Result<Settings, ControllerError> {
    let Some(raw) = store.get(SETTINGS_KEY)? else {
        return Ok(Settings::default());
    };
    let settings = match serde_json::from_value::<Settings>(raw) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "stored settings unreadable, using defaults");
            return Ok(Settings::default());
        }
    };
    if let Err(e) = settings.validate() {
        warn!(error = %e, "stored settings out of range, using defaults");
        return Ok(Settings::default());
    }
    Ok(settings)
}

fn load_analytics(store: &dyn KeyValueStore) -> Result<Analytics, ControllerError> {
    let Some(raw) = store.get(ANALYTICS_KEY)? else {
        return Ok(Analytics::default());
    };
    Ok(serde_json::from_value(raw).unwrap_or_else(|e| {
        warn!(error = %e, "stored analytics unreadable, starting fresh");
        Analytics::default()
    }))
}
