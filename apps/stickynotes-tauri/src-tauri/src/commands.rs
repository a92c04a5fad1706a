//! The single IPC command every window calls.

use stickynotes_protocol::{Reply, Request};
use tauri::{State, WebviewWindow};

use crate::state::AppState;

/// Routes a request to the controller on behalf of the calling window.
///
/// Failures travel inside the reply, so this only errors if Tauri itself
/// cannot deliver the request.
#[tauri::command]
pub async fn ipc(
    window: WebviewWindow,
    state: State<'_, AppState>,
    request: Request,
) -> Result<Reply, String> {
    Ok(state.controller.handle(window.label(), request).await)
}
