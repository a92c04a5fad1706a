//! Messages exchanged between the controller and note, manager and settings windows.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::analytics::{Analytics, AnalyticsEvent};
use crate::note::NoteInstance;
use crate::settings::Settings;
use crate::types::BackupInfo;

// ---------------------------------------------------------------------------
// Requests (window -> controller)
// ---------------------------------------------------------------------------

/// A request from a window. Window-scoped operations act on the sender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum Request {
    #[serde(rename_all = "camelCase")]
    SaveNote {
        instance_id: String,
        data: Map<String, Value>,
    },
    #[serde(rename_all = "camelCase")]
    LoadNote { instance_id: String },
    #[serde(rename_all = "camelCase")]
    DeleteNote { instance_id: String },
    GetAllInstances,
    CreateNewNote,
    CreateQuickNote,
    #[serde(rename_all = "camelCase")]
    ShowNote { instance_id: String },
    GetSettings,
    SaveSettings { settings: Map<String, Value> },
    GetAnalytics,
    UpdateAnalytics { event: AnalyticsEvent },
    ResetAnalytics,
    MinimizeWindow,
    CloseWindow,
    ToggleAlwaysOnTop,
    ImportNotes {
        #[serde(default)]
        paths: Option<Vec<PathBuf>>,
    },
    ExportNotes {
        #[serde(default)]
        path: Option<PathBuf>,
    },
    CreateBackup,
    ListBackups,
    RestoreBackup { path: PathBuf },
    GetSystemInfo,
    OpenExternal { url: String },
    ShowItemInFolder { path: PathBuf },
    OpenManager,
    OpenSettings,
    WindowReady,
}

impl Request {
    /// Operation name as it appears on the wire.
    pub fn op(&self) -> &'static str {
        match self {
            Self::SaveNote { .. } => "save-note",
            Self::LoadNote { .. } => "load-note",
            Self::DeleteNote { .. } => "delete-note",
            Self::GetAllInstances => "get-all-instances",
            Self::CreateNewNote => "create-new-note",
            Self::CreateQuickNote => "create-quick-note",
            Self::ShowNote { .. } => "show-note",
            Self::GetSettings => "get-settings",
            Self::SaveSettings { .. } => "save-settings",
            Self::GetAnalytics => "get-analytics",
            Self::UpdateAnalytics { .. } => "update-analytics",
            Self::ResetAnalytics => "reset-analytics",
            Self::MinimizeWindow => "minimize-window",
            Self::CloseWindow => "close-window",
            Self::ToggleAlwaysOnTop => "toggle-always-on-top",
            Self::ImportNotes { .. } => "import-notes",
            Self::ExportNotes { .. } => "export-notes",
            Self::CreateBackup => "create-backup",
            Self::ListBackups => "list-backups",
            Self::RestoreBackup { .. } => "restore-backup",
            Self::GetSystemInfo => "get-system-info",
            Self::OpenExternal { .. } => "open-external",
            Self::ShowItemInFolder { .. } => "show-item-in-folder",
            Self::OpenManager => "open-manager",
            Self::OpenSettings => "open-settings",
            Self::WindowReady => "window-ready",
        }
    }
}

// ---------------------------------------------------------------------------
// Reply payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadNoteReply {
    pub data: Option<NoteInstance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstancesReply {
    pub instances: BTreeMap<String, NoteInstance>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceIdReply {
    pub instance_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsReply {
    pub settings: Settings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReply {
    pub analytics: Analytics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlwaysOnTopReply {
    pub is_on_top: bool,
}

/// One file that could not be imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportFailure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImportReply {
    /// Notes written to the store.
    pub imported: usize,
    pub failed: Vec<ImportFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportReply {
    pub path: PathBuf,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupReply {
    pub path: PathBuf,
    /// Old backups deleted by retention.
    pub pruned: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupsReply {
    pub backups: Vec<BackupInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreReply {
    pub restored: usize,
}

// ---------------------------------------------------------------------------
// Broadcasts (controller -> window)
// ---------------------------------------------------------------------------

/// Everything a window needs to render its first frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializePayload {
    /// `None` for the manager and settings windows.
    pub instance_id: Option<String>,
    pub data: Option<NoteInstance>,
    pub settings: Settings,
    pub analytics: Analytics,
}

/// A fire-and-forget message pushed to a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum Broadcast {
    Initialize(Box<InitializePayload>),
    SaveRequest,
    SettingsUpdated { settings: Box<Settings> },
    TriggerFind,
    TriggerReplace,
    ToggleMarkdown,
    ToggleZenMode,
}

impl Broadcast {
    /// Event name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Initialize(_) => "initialize",
            Self::SaveRequest => "save-request",
            Self::SettingsUpdated { .. } => "settings-updated",
            Self::TriggerFind => "trigger-find",
            Self::TriggerReplace => "trigger-replace",
            Self::ToggleMarkdown => "toggle-markdown",
            Self::ToggleZenMode => "toggle-zen-mode",
        }
    }

    pub fn settings_updated(settings: Settings) -> Self {
        Self::SettingsUpdated {
            settings: Box::new(settings),
        }
    }
}

// ---------------------------------------------------------------------------
// Shortcut actions
// ---------------------------------------------------------------------------

/// Error for an action name that is not a [`ShortcutAction`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown shortcut action: {0}")]
pub struct UnknownAction(pub String);

/// Actions bindable in `settings.shortcuts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShortcutAction {
    NewNote,
    SaveNote,
    FindInNote,
    ReplaceInNote,
    ToggleMarkdown,
    ToggleZenMode,
    IncreaseFontSize,
    DecreaseFontSize,
    ResetFontSize,
}

impl ShortcutAction {
    pub const ALL: [ShortcutAction; 9] = [
        Self::NewNote,
        Self::SaveNote,
        Self::FindInNote,
        Self::ReplaceInNote,
        Self::ToggleMarkdown,
        Self::ToggleZenMode,
        Self::IncreaseFontSize,
        Self::DecreaseFontSize,
        Self::ResetFontSize,
    ];

    /// Key in `settings.shortcuts`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewNote => "newNote",
            Self::SaveNote => "saveNote",
            Self::FindInNote => "findInNote",
            Self::ReplaceInNote => "replaceInNote",
            Self::ToggleMarkdown => "toggleMarkdown",
            Self::ToggleZenMode => "toggleZenMode",
            Self::IncreaseFontSize => "increaseFontSize",
            Self::DecreaseFontSize => "decreaseFontSize",
            Self::ResetFontSize => "resetFontSize",
        }
    }

    /// The broadcast sent to the focused note, for note-scoped actions.
    pub fn focused_broadcast(&self) -> Option<Broadcast> {
        match self {
            Self::SaveNote => Some(Broadcast::SaveRequest),
            Self::FindInNote => Some(Broadcast::TriggerFind),
            Self::ReplaceInNote => Some(Broadcast::TriggerReplace),
            Self::ToggleMarkdown => Some(Broadcast::ToggleMarkdown),
            Self::ToggleZenMode => Some(Broadcast::ToggleZenMode),
            Self::NewNote
            | Self::IncreaseFontSize
            | Self::DecreaseFontSize
            | Self::ResetFontSize => None,
        }
    }
}

impl fmt::Display for ShortcutAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShortcutAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_tagged_by_op() {
        let req = Request::SaveNote {
            instance_id: "n1".into(),
            data: json!({"content": "hi"}).as_object().unwrap().clone(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            json!({"op": "save-note", "instanceId": "n1", "data": {"content": "hi"}})
        );
    }

    #[test]
    fn request_op_matches_wire_tag() {
        let samples = [
            Request::GetAllInstances,
            Request::ToggleAlwaysOnTop,
            Request::ImportNotes { paths: None },
            Request::UpdateAnalytics {
                event: AnalyticsEvent::NoteModified,
            },
            Request::ShowItemInFolder {
                path: PathBuf::from("/tmp/x"),
            },
            Request::WindowReady,
        ];
        for req in samples {
            let json = serde_json::to_value(&req).unwrap();
            assert_eq!(json["op"], json!(req.op()));
        }
    }

    #[test]
    fn optional_paths_may_be_omitted() {
        let req: Request = serde_json::from_str(r#"{"op":"export-notes"}"#).unwrap();
        assert_eq!(req, Request::ExportNotes { path: None });
    }

    #[test]
    fn unknown_op_rejected() {
        assert!(serde_json::from_str::<Request>(r#"{"op":"format-disk"}"#).is_err());
    }

    #[test]
    fn broadcast_wire_format() {
        let json = serde_json::to_value(Broadcast::TriggerFind).unwrap();
        assert_eq!(json, json!({"type": "trigger-find"}));

        let json = serde_json::to_value(Broadcast::settings_updated(Settings::default())).unwrap();
        assert_eq!(json["type"], "settings-updated");
        assert_eq!(json["payload"]["settings"]["theme"], "dark");
    }

    #[test]
    fn broadcast_name_matches_wire_tag() {
        let b = Broadcast::Initialize(Box::new(InitializePayload {
            instance_id: Some("n1".into()),
            data: None,
            settings: Settings::default(),
            analytics: Analytics::default(),
        }));
        let json = serde_json::to_value(&b).unwrap();
        assert_eq!(json["type"], json!(b.name()));
        assert_eq!(json["payload"]["instanceId"], "n1");
    }

    #[test]
    fn shortcut_actions_parse_from_settings_keys() {
        for key in Settings::default().shortcuts.keys() {
            let action: ShortcutAction = key.parse().unwrap();
            assert_eq!(action.as_str(), key);
        }
        assert_eq!(
            "launchRocket".parse::<ShortcutAction>(),
            Err(UnknownAction("launchRocket".into()))
        );
    }

    #[test]
    fn only_note_scoped_actions_broadcast() {
        assert_eq!(
            ShortcutAction::FindInNote.focused_broadcast(),
            Some(Broadcast::TriggerFind)
        );
        assert_eq!(
            ShortcutAction::SaveNote.focused_broadcast(),
            Some(Broadcast::SaveRequest)
        );
        assert!(ShortcutAction::NewNote.focused_broadcast().is_none());
        assert!(ShortcutAction::ResetFontSize.focused_broadcast().is_none());
    }
}
