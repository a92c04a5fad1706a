use std::time::Duration;

/// Minimum width of a note window.
pub const NOTE_MIN_WIDTH: u32 = 300;

/// Minimum height of a note window.
pub const NOTE_MIN_HEIGHT: u32 = 400;

/// Fixed size of a quick note window.
pub const QUICK_NOTE_WIDTH: u32 = 300;
pub const QUICK_NOTE_HEIGHT: u32 = 200;

/// Quick notes are saved and closed after this long.
pub const QUICK_NOTE_LIFETIME: Duration = Duration::from_secs(5 * 60);

/// Id prefix for quick notes.
pub const QUICK_NOTE_PREFIX: &str = "quick-note-";

/// Manager window geometry.
pub const MANAGER_WIDTH: u32 = 1200;
pub const MANAGER_HEIGHT: u32 = 800;
pub const MANAGER_MIN_WIDTH: u32 = 900;
pub const MANAGER_MIN_HEIGHT: u32 = 600;

/// Settings window geometry.
pub const SETTINGS_WIDTH: u32 = 800;
pub const SETTINGS_HEIGHT: u32 = 700;
pub const SETTINGS_MIN_WIDTH: u32 = 700;
pub const SETTINGS_MIN_HEIGHT: u32 = 600;

/// Offset applied per existing note window when cascading new ones.
pub const CASCADE_STEP: i32 = 30;

/// Top-left origin of the cascade, and the margin kept from the work area edge.
pub const CASCADE_MARGIN: i32 = 100;

/// Delay between consecutive windows during startup restore.
pub const RESTORE_STAGGER: Duration = Duration::from_millis(100);

/// Time granted to windows to flush their state once quit starts.
///
/// Saves that have not reached the controller by then are lost.
pub const QUIT_GRACE_PERIOD: Duration = Duration::from_millis(1500);

/// Broadcasts held for a window that has not signalled ready yet.
pub const MAX_PENDING_BROADCASTS: usize = 50;

/// Font size bounds used by the font-size shortcuts and settings validation.
pub const FONT_SIZE_MIN: u32 = 8;
pub const FONT_SIZE_MAX: u32 = 72;
pub const FONT_SIZE_DEFAULT: u32 = 14;

/// Lower bound for the auto-save debounce interval, in milliseconds.
pub const AUTO_SAVE_MIN_INTERVAL_MS: u64 = 250;

/// Event name used to deliver broadcasts to a window.
pub const BROADCAST_EVENT: &str = "stickynotes://broadcast";

/// Prefix and extension of backup file names (`backup-<unix ms>.json`).
pub const BACKUP_PREFIX: &str = "backup-";
pub const BACKUP_EXTENSION: &str = "json";
