use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::Analytics;
use crate::note::NoteInstance;
use crate::settings::Settings;

/// Full snapshot written to `backups/backup-<unix ms>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    pub timestamp: DateTime<Utc>,
    pub version: String,
    #[serde(default)]
    pub instances: BTreeMap<String, NoteInstance>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub analytics: Analytics,
}

/// Snapshot written by export, with the number of exported notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub export_date: DateTime<Utc>,
    pub version: String,
    pub total_notes: usize,
    pub instances: BTreeMap<String, NoteInstance>,
    pub settings: Settings,
    pub analytics: Analytics,
}

/// A backup file found in the backup directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupInfo {
    pub file_name: String,
    /// Unix milliseconds embedded in the file name.
    pub timestamp: i64,
    pub size: u64,
}

/// Host details reported to the settings window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub platform: String,
    pub arch: String,
    pub version: String,
    pub hostname: String,
    pub data_dir: String,
}
