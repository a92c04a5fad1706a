//! System tray icon and menu.

use stickynotes_controller::NoteOverrides;
use tauri::menu::{MenuBuilder, MenuItemBuilder};
use tauri::tray::TrayIconBuilder;
use tauri::{App, AppHandle, Manager};

use crate::state::AppState;
use crate::with_controller;

pub fn build(app: &App) -> tauri::Result<()> {
    let new_note = MenuItemBuilder::with_id("new-note", "New Note").build(app)?;
    let quick_note = MenuItemBuilder::with_id("quick-note", "Quick Note").build(app)?;
    let manager = MenuItemBuilder::with_id("manager", "Show All Notes").build(app)?;
    let settings = MenuItemBuilder::with_id("settings", "Settings").build(app)?;
    let quit = MenuItemBuilder::with_id("quit", "Quit").build(app)?;
    let menu = MenuBuilder::new(app)
        .item(&new_note)
        .item(&quick_note)
        .separator()
        .item(&manager)
        .item(&settings)
        .separator()
        .item(&quit)
        .build()?;

    let mut tray = TrayIconBuilder::with_id("main")
        .tooltip("Sticky Notes")
        .menu(&menu)
        .on_menu_event(|app, event| on_menu(app, event.id().as_ref()));
    if let Some(icon) = app.default_window_icon().cloned() {
        tray = tray.icon(icon);
    }
    tray.build(app)?;
    Ok(())
}

fn on_menu(app: &AppHandle, id: &str) {
    match id {
        "new-note" => with_controller(app, |c| async move {
            c.create_note(None, NoteOverrides::default()).await.map(drop)
        }),
        "quick-note" => with_controller(app, |c| async move {
            c.create_quick_note().await.map(drop)
        }),
        "manager" => with_controller(app, |c| async move { c.open_manager().await }),
        "settings" => with_controller(app, |c| async move { c.open_settings().await }),
        "quit" => {
            tracing::info!("quit requested from tray");
            let Some(state) = app.try_state::<AppState>() else {
                app.exit(0);
                return;
            };
            let controller = state.controller.clone();
            let app = app.clone();
            tauri::async_runtime::spawn(async move {
                controller.quit().await;
                app.exit(0);
            });
        }
        other => tracing::debug!(id = %other, "unhandled tray item"),
    }
}
