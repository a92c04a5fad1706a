//! Recording doubles for the platform services and a settable clock.

use std::collections::VecDeque;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use stickynotes_protocol::ShortcutAction;
use stickynotes_store::KeyValueStore;
use stickynotes_window::fake::FakeHost;

use crate::clock::Clock;
use crate::controller::Services;
use crate::services::{DesktopServices, ServiceError, ShortcutRegistrar};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Records shortcut bindings.
#[derive(Default)]
pub struct FakeShortcuts {
    bindings: Mutex<Vec<(String, ShortcutAction)>>,
    reject: Mutex<Vec<String>>,
}

impl FakeShortcuts {
    /// Current bindings in registration order.
    pub fn bindings(&self) -> Vec<(String, ShortcutAction)> {
        lock(&self.bindings).clone()
    }

    /// Makes registering `accelerator` fail.
    pub fn reject(&self, accelerator: &str) {
        lock(&self.reject).push(accelerator.to_string());
    }
}

impl ShortcutRegistrar for FakeShortcuts {
    fn unregister_all(&self) -> Result<(), ServiceError> {
        lock(&self.bindings).clear();
        Ok(())
    }

    fn register(&self, accelerator: &str, action: ShortcutAction) -> Result<(), ServiceError> {
        if lock(&self.reject).iter().any(|a| a == accelerator) {
            return Err(ServiceError(format!("cannot bind {accelerator}")));
        }
        lock(&self.bindings).push((accelerator.to_string(), action));
        Ok(())
    }
}

/// Dialogs answered from a queue; URLs and revealed paths are recorded.
#[derive(Default)]
pub struct FakeDesktop {
    import_answers: Mutex<VecDeque<Option<Vec<PathBuf>>>>,
    export_answers: Mutex<VecDeque<Option<PathBuf>>>,
    export_prompts: Mutex<Vec<String>>,
    opened_urls: Mutex<Vec<String>>,
    revealed: Mutex<Vec<PathBuf>>,
}

impl FakeDesktop {
    /// Queues the result of the next import dialog.
    pub fn answer_import(&self, answer: Option<Vec<PathBuf>>) {
        lock(&self.import_answers).push_back(answer);
    }

    /// Queues the result of the next export dialog.
    pub fn answer_export(&self, answer: Option<PathBuf>) {
        lock(&self.export_answers).push_back(answer);
    }

    /// Default file names proposed by export dialogs so far.
    pub fn export_prompts(&self) -> Vec<String> {
        lock(&self.export_prompts).clone()
    }

    pub fn opened_urls(&self) -> Vec<String> {
        lock(&self.opened_urls).clone()
    }

    pub fn revealed(&self) -> Vec<PathBuf> {
        lock(&self.revealed).clone()
    }
}

impl DesktopServices for FakeDesktop {
    fn pick_import_files(&self) -> Pin<Box<dyn Future<Output = Option<Vec<PathBuf>>> + Send + '_>> {
        let answer = lock(&self.import_answers).pop_front().flatten();
        Box::pin(async move { answer })
    }

    fn pick_export_path(
        &self,
        default_name: &str,
    ) -> Pin<Box<dyn Future<Output = Option<PathBuf>> + Send + '_>> {
        lock(&self.export_prompts).push(default_name.to_string());
        let answer = lock(&self.export_answers).pop_front().flatten();
        Box::pin(async move { answer })
    }

    fn open_external(&self, url: &str) -> Result<(), ServiceError> {
        lock(&self.opened_urls).push(url.to_string());
        Ok(())
    }

    fn show_item_in_folder(&self, path: &Path) -> Result<(), ServiceError> {
        lock(&self.revealed).push(path.to_path_buf());
        Ok(())
    }
}

/// A clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = lock(&self.now);
        *now += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *lock(&self.now) = to;
    }
}

impl Default for ManualClock {
    /// 2024-03-01 09:00:00 UTC.
    fn default() -> Self {
        Self::new(DateTime::from_timestamp(1_709_283_600, 0).unwrap_or_default())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *lock(&self.now)
    }
}

/// The full set of fakes, with handles kept for assertions.
#[derive(Clone)]
pub struct Fakes {
    pub host: Arc<FakeHost>,
    pub shortcuts: Arc<FakeShortcuts>,
    pub desktop: Arc<FakeDesktop>,
    pub clock: Arc<ManualClock>,
}

impl Fakes {
    pub fn new() -> Self {
        Self {
            host: Arc::new(FakeHost::new()),
            shortcuts: Arc::new(FakeShortcuts::default()),
            desktop: Arc::new(FakeDesktop::default()),
            clock: Arc::new(ManualClock::default()),
        }
    }

    /// Services backed by these fakes and `store`.
    pub fn services(&self, store: Arc<dyn KeyValueStore>) -> Services {
        Services {
            store,
            host: self.host.clone(),
            shortcuts: self.shortcuts.clone(),
            desktop: self.desktop.clone(),
            clock: self.clock.clone(),
        }
    }
}

impl Default for Fakes {
    fn default() -> Self {
        Self::new()
    }
}
