//! Request routing for the message channel.

use std::sync::Arc;

use stickynotes_protocol::messages::{
    AlwaysOnTopReply, AnalyticsReply, BackupsReply, InstanceIdReply, InstancesReply,
    LoadNoteReply, RestoreReply, SettingsReply,
};
use stickynotes_protocol::{Reply, Request};
use tracing::{debug, warn};

use crate::ControllerError;
use crate::controller::{AppController, NoteOverrides};

impl AppController {
    /// Answers one request from the window labelled `origin`.
    ///
    /// Never fails: errors come back as `{success: false, error}`.
    /// Window operations (minimize, close, always-on-top, ready) act on
    /// `origin`.
    pub async fn handle(self: &Arc<Self>, origin: &str, request: Request) -> Reply {
        let op = request.op();
        debug!(window = %origin, op, "request");
        match self.dispatch(origin, request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(window = %origin, op, error = %e, "request failed");
                Reply::failure(e.to_string())
            }
        }
    }

    async fn dispatch(self: &Arc<Self>, origin: &str, request: Request) -> Result<Reply, ControllerError> {
        let reply = match request {
            Request::SaveNote { instance_id, data } => {
                self.save_note(&instance_id, &data).await?;
                Reply::ok()
            }
            Request::LoadNote { instance_id } => Reply::ok_with(&LoadNoteReply {
                data: self.load_note(&instance_id)?,
            })?,
            Request::DeleteNote { instance_id } => {
                self.delete_note(&instance_id).await?;
                Reply::ok()
            }
            Request::GetAllInstances => Reply::ok_with(&InstancesReply {
                instances: self.load_instances()?,
            })?,
            Request::CreateNewNote => Reply::ok_with(&InstanceIdReply {
                instance_id: self.create_note(None, NoteOverrides::default()).await?,
            })?,
            Request::CreateQuickNote => Reply::ok_with(&InstanceIdReply {
                instance_id: self.create_quick_note().await?,
            })?,
            Request::ShowNote { instance_id } => Reply::ok_with(&InstanceIdReply {
                instance_id: self.show_note(&instance_id).await?,
            })?,
            Request::GetSettings => Reply::ok_with(&SettingsReply {
                settings: self.settings().await,
            })?,
            Request::SaveSettings { settings } => Reply::ok_with(&SettingsReply {
                settings: self.apply_settings(settings).await?,
            })?,
            Request::GetAnalytics => Reply::ok_with(&AnalyticsReply {
                analytics: self.analytics().await,
            })?,
            Request::UpdateAnalytics { event } => Reply::ok_with(&AnalyticsReply {
                analytics: self.record_event(event).await?,
            })?,
            Request::ResetAnalytics => Reply::ok_with(&AnalyticsReply {
                analytics: self.reset_analytics().await?,
            })?,
            Request::MinimizeWindow => {
                self.minimize_window(origin).await?;
                Reply::ok()
            }
            Request::CloseWindow => {
                self.close_window(origin).await?;
                Reply::ok()
            }
            Request::ToggleAlwaysOnTop => Reply::ok_with(&AlwaysOnTopReply {
                is_on_top: self.toggle_always_on_top(origin).await?,
            })?,
            Request::ImportNotes { paths } => Reply::ok_with(&self.import_notes(paths).await?)?,
            Request::ExportNotes { path } => Reply::ok_with(&self.export_notes(path).await?)?,
            Request::CreateBackup => Reply::ok_with(&self.create_backup().await?)?,
            Request::ListBackups => Reply::ok_with(&BackupsReply {
                backups: self.list_backups().await?,
            })?,
            Request::RestoreBackup { path } => Reply::ok_with(&RestoreReply {
                restored: self.restore_backup(&path).await?,
            })?,
            Request::GetSystemInfo => Reply::ok_with(&self.system_info())?,
            Request::OpenExternal { url } => {
                self.open_external(&url)?;
                Reply::ok()
            }
            Request::ShowItemInFolder { path } => {
                self.show_item_in_folder(&path)?;
                Reply::ok()
            }
            Request::OpenManager => {
                self.open_manager().await?;
                Reply::ok()
            }
            Request::OpenSettings => {
                self.open_settings().await?;
                Reply::ok()
            }
            Request::WindowReady => {
                self.window_ready(origin).await?;
                Reply::ok()
            }
        };
        Ok(reply)
    }
}
