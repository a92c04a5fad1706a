//! Timestamped snapshots of the whole store, with retention.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use serde_json::{Map, Value};
use stickynotes_protocol::constants::{BACKUP_EXTENSION, BACKUP_PREFIX};
use stickynotes_protocol::messages::BackupReply;
use stickynotes_protocol::{BackupDocument, BackupInfo, NoteInstance};
use stickynotes_store::StoreExt;
use tracing::{debug, info, warn};

use crate::ControllerError;
use crate::controller::{AppController, INSTANCES_KEY};

/// `backup-<unix ms>.json`
fn backup_file_name(stamp: i64) -> String {
    format!("{BACKUP_PREFIX}{stamp}.{BACKUP_EXTENSION}")
}

/// Timestamp embedded in a backup file name, if it is one.
fn parse_backup_name(name: &str) -> Option<i64> {
    let digits = name
        .strip_prefix(BACKUP_PREFIX)?
        .strip_suffix(BACKUP_EXTENSION)?
        .strip_suffix('.')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

impl AppController {
    /// Writes a snapshot of notes, settings and analytics, then prunes the
    /// oldest backups beyond `maxBackups`.
    ///
    /// File names are strictly increasing even when two backups land in the
    /// same millisecond. A failed prune is logged; the new backup stands.
    pub async fn create_backup(&self) -> Result<BackupReply, ControllerError> {
        let _guard = self.backup_lock.lock().await;

        let (mut document, keep) = {
            let st = self.state.lock().await;
            let document = BackupDocument {
                timestamp: self.clock.now(),
                version: self.config.version.clone(),
                instances: self.load_instances()?,
                settings: st.settings.clone(),
                analytics: st.analytics.clone(),
            };
            (document, st.settings.max_backups)
        };

        let dir = &self.config.backup_dir;
        tokio::fs::create_dir_all(dir).await?;
        let mut stamp = document.timestamp.timestamp_millis();
        if let Some(newest) = self.scan_backups().await?.first() {
            stamp = stamp.max(newest.timestamp + 1);
        }
        if let Some(ts) = DateTime::from_timestamp_millis(stamp) {
            document.timestamp = ts;
        }

        let path = dir.join(backup_file_name(stamp));
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(&document)?).await?;
        tokio::fs::rename(&tmp, &path).await?;

        let pruned = self.prune_backups(keep).await;
        info!(
            path = %path.display(),
            notes = document.instances.len(),
            pruned,
            "backup created"
        );
        Ok(BackupReply { path, pruned })
    }

    /// Backups in the backup directory, newest first.
    pub async fn list_backups(&self) -> Result<Vec<BackupInfo>, ControllerError> {
        let _guard = self.backup_lock.lock().await;
        self.scan_backups().await
    }

    async fn scan_backups(&self) -> Result<Vec<BackupInfo>, ControllerError> {
        let mut entries = match tokio::fs::read_dir(&self.config.backup_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut backups = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name().to_string_lossy().into_owned();
            let Some(timestamp) = parse_backup_name(&file_name) else {
                continue;
            };
            let size = entry.metadata().await.map(|m| m.len()).unwrap_or(0);
            backups.push(BackupInfo {
                file_name,
                timestamp,
                size,
            });
        }
        backups.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(backups)
    }

    /// Deletes all but the `keep` newest backups, oldest first. Returns how
    /// many were removed.
    async fn prune_backups(&self, keep: usize) -> usize {
        let backups = match self.scan_backups().await {
            Ok(backups) => backups,
            Err(e) => {
                warn!(error = %e, "failed to list backups for pruning");
                return 0;
            }
        };

        let mut pruned = 0;
        for old in backups.iter().skip(keep).rev() {
            let path = self.config.backup_dir.join(&old.file_name);
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {
                    pruned += 1;
                    debug!(path = %path.display(), "old backup removed");
                }
                Err(e) => warn!(path = %path.display(), error = %e, "failed to remove old backup"),
            }
        }
        pruned
    }

    /// Restores whatever the backup carries: its notes replace every stored
    /// note and its settings are applied on top of the current ones. A
    /// section missing from the file leaves that part of the store alone.
    /// Open windows are left as they are.
    ///
    /// Returns the number of notes restored.
    pub async fn restore_backup(&self, path: &Path) -> Result<usize, ControllerError> {
        let _guard = self.backup_lock.lock().await;
        let raw = tokio::fs::read(path).await?;
        let mut document: Map<String, Value> = serde_json::from_slice(&raw)?;
        let instances = document
            .remove("instances")
            .filter(|v| !v.is_null())
            .map(serde_json::from_value::<BTreeMap<String, NoteInstance>>)
            .transpose()?;
        let settings = document
            .remove("settings")
            .filter(|v| !v.is_null())
            .map(serde_json::from_value::<Map<String, Value>>)
            .transpose()?;

        let mut st = self.state.lock().await;
        if let Some(patch) = &settings {
            st.settings.merged(patch)?;
        }
        if let Some(instances) = &instances {
            self.store.set_typed(INSTANCES_KEY, instances)?;
        }
        if let Some(patch) = &settings {
            self.apply_settings_locked(&mut st, patch)?;
        }
        let restored = instances.as_ref().map_or(0, BTreeMap::len);
        info!(
            path = %path.display(),
            notes = restored,
            settings = settings.is_some(),
            "backup restored"
        );
        Ok(restored)
    }

    /// Runs [`create_backup`](Self::create_backup) every `backupInterval`
    /// until shutdown. The interval is re-read after each run.
    pub(crate) fn spawn_backup_schedule(self: &Arc<Self>) {
        let this = Arc::clone(self);
        let token = self.shutdown.clone();
        tokio::spawn(async move {
            loop {
                let interval = this.state.lock().await.settings.backup_interval;
                if interval == 0 {
                    debug!("periodic backups disabled");
                    return;
                }
                tokio::select! {
                    _ = token.cancelled() => return,
                    _ = tokio::time::sleep(Duration::from_millis(interval)) => {}
                }
                if let Err(e) = this.create_backup().await {
                    warn!(error = %e, "periodic backup failed");
                }
            }
        });
    }

    /// Directory backups are written to.
    pub fn backup_dir(&self) -> PathBuf {
        self.config.backup_dir.clone()
    }
}
