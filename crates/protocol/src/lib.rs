pub mod analytics;
pub mod constants;
pub mod envelope;
pub mod messages;
pub mod note;
pub mod settings;
pub mod types;

// Re-export primary types for convenience.
pub use analytics::{Analytics, AnalyticsEvent, DailyStats};
pub use envelope::Reply;
pub use messages::{Broadcast, InitializePayload, Request, ShortcutAction};
pub use note::{Bounds, NoteColor, NoteInstance};
pub use settings::{Settings, SettingsError, Size};
pub use types::{BackupDocument, BackupInfo, ExportDocument, SystemInfo};
