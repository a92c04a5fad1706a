//! In-memory windows that record what the controller did to them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use stickynotes_protocol::{Bounds, Broadcast};

use crate::WindowError;
use crate::kind::WindowOptions;
use crate::native::{NativeWindow, WindowHost};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A window that only records calls.
pub struct FakeWindow {
    label: String,
    options: WindowOptions,
    visible: AtomicBool,
    destroyed: AtomicBool,
    always_on_top: AtomicBool,
    skip_taskbar: AtomicBool,
    opacity: Mutex<f64>,
    bounds: Mutex<Bounds>,
    received: Mutex<Vec<Broadcast>>,
    focus_count: Mutex<usize>,
}

impl FakeWindow {
    fn new(options: &WindowOptions) -> Self {
        let bounds = options.bounds.unwrap_or(Bounds {
            x: 0,
            y: 0,
            width: options.size.width,
            height: options.size.height,
        });
        Self {
            label: options.label.clone(),
            options: options.clone(),
            visible: AtomicBool::new(false),
            destroyed: AtomicBool::new(false),
            always_on_top: AtomicBool::new(options.always_on_top),
            skip_taskbar: AtomicBool::new(options.skip_taskbar),
            opacity: Mutex::new(options.opacity),
            bounds: Mutex::new(bounds),
            received: Mutex::new(Vec::new()),
            focus_count: Mutex::new(0),
        }
    }

    pub fn options(&self) -> &WindowOptions {
        &self.options
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    pub fn always_on_top(&self) -> bool {
        self.always_on_top.load(Ordering::SeqCst)
    }

    pub fn skip_taskbar(&self) -> bool {
        self.skip_taskbar.load(Ordering::SeqCst)
    }

    pub fn opacity(&self) -> f64 {
        *lock(&self.opacity)
    }

    pub fn focus_count(&self) -> usize {
        *lock(&self.focus_count)
    }

    /// Broadcasts delivered so far, in order.
    pub fn received(&self) -> Vec<Broadcast> {
        lock(&self.received).clone()
    }

    /// Simulates the user dragging or resizing the window.
    pub fn move_to(&self, bounds: Bounds) {
        *lock(&self.bounds) = bounds;
    }

    fn check_alive(&self) -> Result<(), WindowError> {
        if self.is_destroyed() {
            return Err(WindowError::Native(format!("{} destroyed", self.label)));
        }
        Ok(())
    }
}

impl NativeWindow for FakeWindow {
    fn label(&self) -> &str {
        &self.label
    }

    fn show(&self) -> Result<(), WindowError> {
        self.check_alive()?;
        self.visible.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn hide(&self) -> Result<(), WindowError> {
        self.check_alive()?;
        self.visible.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn focus(&self) -> Result<(), WindowError> {
        self.check_alive()?;
        *lock(&self.focus_count) += 1;
        Ok(())
    }

    fn destroy(&self) -> Result<(), WindowError> {
        self.destroyed.store(true, Ordering::SeqCst);
        self.visible.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn bounds(&self) -> Result<Bounds, WindowError> {
        self.check_alive()?;
        Ok(*lock(&self.bounds))
    }

    fn set_bounds(&self, bounds: Bounds) -> Result<(), WindowError> {
        self.check_alive()?;
        *lock(&self.bounds) = bounds;
        Ok(())
    }

    fn set_always_on_top(&self, on_top: bool) -> Result<(), WindowError> {
        self.check_alive()?;
        self.always_on_top.store(on_top, Ordering::SeqCst);
        Ok(())
    }

    fn set_skip_taskbar(&self, skip: bool) -> Result<(), WindowError> {
        self.check_alive()?;
        self.skip_taskbar.store(skip, Ordering::SeqCst);
        Ok(())
    }

    fn set_opacity(&self, opacity: f64) -> Result<(), WindowError> {
        self.check_alive()?;
        *lock(&self.opacity) = opacity;
        Ok(())
    }

    fn emit(&self, message: &Broadcast) -> Result<(), WindowError> {
        self.check_alive()?;
        lock(&self.received).push(message.clone());
        Ok(())
    }
}

/// Host handing out [`FakeWindow`]s.
pub struct FakeHost {
    windows: Mutex<Vec<Arc<FakeWindow>>>,
    fail_next: AtomicBool,
    work_area: Mutex<Option<Bounds>>,
}

impl FakeHost {
    /// A host with a 1920x1080 primary display.
    pub fn new() -> Self {
        Self {
            windows: Mutex::new(Vec::new()),
            fail_next: AtomicBool::new(false),
            work_area: Mutex::new(Some(Bounds {
                x: 0,
                y: 0,
                width: 1920,
                height: 1080,
            })),
        }
    }

    /// Makes the next `open` call fail.
    pub fn fail_next_open(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn set_work_area(&self, area: Option<Bounds>) {
        *lock(&self.work_area) = area;
    }

    /// Most recent window created with `label`.
    pub fn window(&self, label: &str) -> Option<Arc<FakeWindow>> {
        lock(&self.windows)
            .iter()
            .rev()
            .find(|w| w.label == label)
            .cloned()
    }

    /// Every window ever opened, in creation order.
    pub fn opened(&self) -> Vec<Arc<FakeWindow>> {
        lock(&self.windows).clone()
    }

    /// Windows not yet destroyed.
    pub fn live(&self) -> Vec<Arc<FakeWindow>> {
        lock(&self.windows)
            .iter()
            .filter(|w| !w.is_destroyed())
            .cloned()
            .collect()
    }
}

impl Default for FakeHost {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowHost for FakeHost {
    fn open(&self, options: &WindowOptions) -> Result<Arc<dyn NativeWindow>, WindowError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(WindowError::Native(format!(
                "failed to create {}",
                options.label
            )));
        }
        let window = Arc::new(FakeWindow::new(options));
        lock(&self.windows).push(window.clone());
        Ok(window)
    }

    fn work_area(&self) -> Option<Bounds> {
        *lock(&self.work_area)
    }
}
