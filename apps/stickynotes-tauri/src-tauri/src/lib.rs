mod commands;
mod desktop;
mod shortcuts;
mod state;
mod tray;
mod window;

use std::sync::Arc;

use tauri::{AppHandle, Manager, RunEvent};
use tauri_plugin_global_shortcut::ShortcutState;
use tracing_subscriber::EnvFilter;

use stickynotes_controller::{AppController, ControllerConfig, Services, SystemClock};
use stickynotes_store::JsonFileStore;
use stickynotes_window::WindowEvent;

use desktop::TauriDesktop;
use shortcuts::TauriShortcuts;
use state::AppState;
use window::TauriHost;

pub fn run() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,stickynotes=debug")),
        )
        .init();

    let Some(data_dir) = stickynotes_store::default_data_dir() else {
        tracing::error!("no data directory available; set STICKYNOTES_DATA_DIR");
        std::process::exit(1);
    };
    let config = ControllerConfig::new(data_dir);
    let store = match JsonFileStore::open(config.store_path()) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!(path = %config.store_path().display(), error = %e, "failed to open store");
            std::process::exit(1);
        }
    };
    tracing::info!(data_dir = %config.data_dir.display(), "starting sticky notes");

    let app = tauri::Builder::default()
        // A second launch only brings up the manager of the running one.
        .plugin(tauri_plugin_single_instance::init(|app, _argv, _cwd| {
            with_controller(app, |c| async move { c.open_manager().await });
        }))
        .plugin(
            tauri_plugin_global_shortcut::Builder::new()
                .with_handler(|app, shortcut, event| {
                    if event.state() != ShortcutState::Pressed {
                        return;
                    }
                    let Some(state) = app.try_state::<AppState>() else {
                        return;
                    };
                    if let Some(action) = state.shortcuts.action_for(shortcut) {
                        with_controller(app, move |c| async move { c.handle_shortcut(action).await });
                    }
                })
                .build(),
        )
        .plugin(tauri_plugin_shell::init())
        .plugin(tauri_plugin_dialog::init())
        .setup(move |app| {
            let handle = app.handle().clone();
            let shortcuts = Arc::new(TauriShortcuts::new(handle.clone()));
            let services = Services {
                store,
                host: Arc::new(TauriHost::new(handle.clone())),
                shortcuts: shortcuts.clone(),
                desktop: Arc::new(TauriDesktop::new(handle.clone())),
                clock: Arc::new(SystemClock),
            };
            let controller = AppController::new(config, services).map_err(anyhow::Error::from)?;
            app.manage(AppState {
                controller: controller.clone(),
                shortcuts,
            });
            tray::build(app)?;

            tauri::async_runtime::spawn(async move {
                match controller.start().await {
                    Ok(restored) => tracing::info!(restored, "startup complete"),
                    Err(e) => tracing::error!(error = %e, "startup failed"),
                }
            });
            Ok(())
        })
        .on_window_event(|window, event| {
            let event = match event {
                tauri::WindowEvent::CloseRequested { api, .. } => {
                    // The controller decides between hiding and destroying.
                    api.prevent_close();
                    WindowEvent::CloseRequested
                }
                tauri::WindowEvent::Moved(_) => WindowEvent::Moved,
                tauri::WindowEvent::Resized(_) => WindowEvent::Resized,
                tauri::WindowEvent::Focused(true) => WindowEvent::Focused,
                tauri::WindowEvent::Focused(false) => WindowEvent::Blurred,
                tauri::WindowEvent::Destroyed => WindowEvent::Destroyed,
                _ => return,
            };
            let label = window.label().to_string();
            with_controller(window.app_handle(), move |c| async move {
                c.on_window_event(&label, event).await
            });
        })
        .invoke_handler(tauri::generate_handler![commands::ipc])
        .build(tauri::generate_context!())
        .expect("error building tauri application");

    app.run(|handle, event| {
        if let RunEvent::ExitRequested { code, api, .. } = event {
            let Some(state) = handle.try_state::<AppState>() else {
                return;
            };
            if state.controller.is_quitting() {
                return;
            }
            // Closing the last window leaves the app in the tray.
            api.prevent_exit();
            if code.is_some() {
                let controller = state.controller.clone();
                let handle = handle.clone();
                tauri::async_runtime::spawn(async move {
                    controller.quit().await;
                    handle.exit(0);
                });
            }
        }
    });
}

/// Runs a controller operation in the background, logging failure.
pub(crate) fn with_controller<F, Fut>(app: &AppHandle, f: F)
where
    F: FnOnce(Arc<AppController>) -> Fut,
    Fut: Future<Output = Result<(), stickynotes_controller::ControllerError>> + Send + 'static,
{
    let Some(state) = app.try_state::<AppState>() else {
        tracing::debug!("controller not ready; event dropped");
        return;
    };
    let fut = f(state.controller.clone());
    tauri::async_runtime::spawn(async move {
        if let Err(e) = fut.await {
            tracing::warn!(error = %e, "background operation failed");
        }
    });
}
