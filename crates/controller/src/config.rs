use std::path::PathBuf;
use std::time::Duration;

use stickynotes_protocol::constants::{QUICK_NOTE_LIFETIME, QUIT_GRACE_PERIOD, RESTORE_STAGGER};

/// Store file name inside the data directory.
pub const STORE_FILE: &str = "store.json";

/// Backup directory name inside the data directory.
pub const BACKUP_DIR: &str = "backups";

/// Controller tuning and locations.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Directory holding the store file.
    pub data_dir: PathBuf,
    pub backup_dir: PathBuf,
    /// Written into backups and exports.
    pub version: String,
    /// Delay between windows during startup restore.
    pub restore_stagger: Duration,
    /// How long quit waits for windows to flush before exiting.
    pub quit_grace: Duration,
    /// Lifetime of a quick note window.
    pub quick_note_lifetime: Duration,
}

impl ControllerConfig {
    /// Defaults rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            backup_dir: data_dir.join(BACKUP_DIR),
            data_dir,
            version: env!("CARGO_PKG_VERSION").into(),
            restore_stagger: RESTORE_STAGGER,
            quit_grace: QUIT_GRACE_PERIOD,
            quick_note_lifetime: QUICK_NOTE_LIFETIME,
        }
    }

    /// Path of the JSON store file.
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE)
    }
}
