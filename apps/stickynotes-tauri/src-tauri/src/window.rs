//! Tauri webview windows behind the controller's window traits.

use std::sync::Arc;

use stickynotes_protocol::constants::BROADCAST_EVENT;
use stickynotes_protocol::{Bounds, Broadcast};
use stickynotes_window::{NativeWindow, WindowError, WindowHost, WindowKind, WindowOptions};
use tauri::{
    AppHandle, Emitter, LogicalPosition, LogicalSize, Manager, WebviewUrl, WebviewWindow,
    WebviewWindowBuilder,
};

fn native(e: tauri::Error) -> WindowError {
    WindowError::Native(e.to_string())
}

/// Page loaded by each kind of window.
fn route(kind: &WindowKind) -> &'static str {
    match kind {
        WindowKind::Note(_) => "index.html#/note",
        WindowKind::Manager => "index.html#/manager",
        WindowKind::Settings => "index.html#/settings",
    }
}

pub struct TauriWindow {
    window: WebviewWindow,
}

impl NativeWindow for TauriWindow {
    fn label(&self) -> &str {
        self.window.label()
    }

    fn show(&self) -> Result<(), WindowError> {
        self.window.show().map_err(native)
    }

    fn hide(&self) -> Result<(), WindowError> {
        self.window.hide().map_err(native)
    }

    fn focus(&self) -> Result<(), WindowError> {
        self.window.set_focus().map_err(native)
    }

    fn destroy(&self) -> Result<(), WindowError> {
        self.window.destroy().map_err(native)
    }

    fn bounds(&self) -> Result<Bounds, WindowError> {
        let scale = self.window.scale_factor().map_err(native)?;
        let position = self
            .window
            .outer_position()
            .map_err(native)?
            .to_logical::<i32>(scale);
        let size = self
            .window
            .inner_size()
            .map_err(native)?
            .to_logical::<u32>(scale);
        Ok(Bounds {
            x: position.x,
            y: position.y,
            width: size.width,
            height: size.height,
        })
    }

    fn set_bounds(&self, bounds: Bounds) -> Result<(), WindowError> {
        self.window
            .set_position(LogicalPosition::new(bounds.x, bounds.y))
            .map_err(native)?;
        self.window
            .set_size(LogicalSize::new(bounds.width, bounds.height))
            .map_err(native)
    }

    fn set_always_on_top(&self, on_top: bool) -> Result<(), WindowError> {
        self.window.set_always_on_top(on_top).map_err(native)
    }

    fn set_skip_taskbar(&self, skip: bool) -> Result<(), WindowError> {
        self.window.set_skip_taskbar(skip).map_err(native)
    }

    /// Tauri has no native window opacity; the page fades itself instead.
    fn set_opacity(&self, opacity: f64) -> Result<(), WindowError> {
        self.window
            .eval(&format!(
                "document.documentElement.style.opacity = '{}'",
                opacity.clamp(0.0, 1.0)
            ))
            .map_err(native)
    }

    fn emit(&self, message: &Broadcast) -> Result<(), WindowError> {
        self.window
            .emit_to(self.window.label(), BROADCAST_EVENT, message)
            .map_err(native)
    }
}

/// Opens webview windows on the running app.
pub struct TauriHost {
    app: AppHandle,
}

impl TauriHost {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl WindowHost for TauriHost {
    fn open(&self, options: &WindowOptions) -> Result<Arc<dyn NativeWindow>, WindowError> {
        let mut builder = WebviewWindowBuilder::new(
            &self.app,
            &options.label,
            WebviewUrl::App(route(&options.kind).into()),
        )
        .title(&options.title)
        .inner_size(f64::from(options.size.width), f64::from(options.size.height))
        .min_inner_size(
            f64::from(options.min_size.width),
            f64::from(options.min_size.height),
        )
        .resizable(options.resizable)
        .decorations(options.decorations)
        .always_on_top(options.always_on_top)
        .skip_taskbar(options.skip_taskbar)
        .visible(false);

        match options.bounds {
            Some(b) => builder = builder.position(f64::from(b.x), f64::from(b.y)),
            None => builder = builder.center(),
        }
        if let Some(parent) = options
            .parent
            .as_deref()
            .and_then(|label| self.app.get_webview_window(label))
        {
            builder = builder.parent(&parent).map_err(native)?;
        }

        let window = builder.build().map_err(native)?;
        let window = TauriWindow { window };
        if options.opacity < 1.0 {
            window.set_opacity(options.opacity)?;
        }
        Ok(Arc::new(window))
    }

    fn work_area(&self) -> Option<Bounds> {
        // Work area excludes the taskbar and docks.
        let monitor = self.app.primary_monitor().ok().flatten()?;
        let scale = monitor.scale_factor();
        let area = monitor.work_area();
        let position = area.position.to_logical::<i32>(scale);
        let size = area.size.to_logical::<u32>(scale);
        Some(Bounds {
            x: position.x,
            y: position.y,
            width: size.width,
            height: size.height,
        })
    }
}
