use stickynotes_protocol::Bounds;
use stickynotes_protocol::constants::{
    MANAGER_HEIGHT, MANAGER_MIN_HEIGHT, MANAGER_MIN_WIDTH, MANAGER_WIDTH, NOTE_MIN_HEIGHT,
    NOTE_MIN_WIDTH, QUICK_NOTE_HEIGHT, QUICK_NOTE_WIDTH, SETTINGS_HEIGHT, SETTINGS_MIN_HEIGHT,
    SETTINGS_MIN_WIDTH, SETTINGS_WIDTH,
};
use stickynotes_protocol::settings::{Settings, Size};

const NOTE_LABEL_PREFIX: &str = "note-";
const MANAGER_LABEL: &str = "manager";
const SETTINGS_LABEL: &str = "settings";

/// What a window shows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WindowKind {
    Note(String),
    Manager,
    Settings,
}

impl WindowKind {
    /// Native window label, unique per live window.
    pub fn label(&self) -> String {
        match self {
            Self::Note(id) => format!("{NOTE_LABEL_PREFIX}{id}"),
            Self::Manager => MANAGER_LABEL.into(),
            Self::Settings => SETTINGS_LABEL.into(),
        }
    }

    /// Inverse of [`WindowKind::label`].
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            MANAGER_LABEL => Some(Self::Manager),
            SETTINGS_LABEL => Some(Self::Settings),
            _ => label
                .strip_prefix(NOTE_LABEL_PREFIX)
                .filter(|id| !id.is_empty())
                .map(|id| Self::Note(id.to_string())),
        }
    }

    /// Note id, for note windows.
    pub fn note_id(&self) -> Option<&str> {
        match self {
            Self::Note(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_note(&self) -> bool {
        matches!(self, Self::Note(_))
    }
}

/// Everything the host needs to create a native window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowOptions {
    pub kind: WindowKind,
    pub label: String,
    pub title: String,
    /// Initial geometry. `None` lets the host center the window.
    pub bounds: Option<Bounds>,
    pub size: Size,
    pub min_size: Size,
    pub resizable: bool,
    pub decorations: bool,
    pub always_on_top: bool,
    pub skip_taskbar: bool,
    pub opacity: f64,
    /// Label of the parent window.
    pub parent: Option<String>,
}

impl WindowOptions {
    /// Frameless floating note window placed at `bounds`.
    pub fn note(id: &str, bounds: Bounds, settings: &Settings) -> Self {
        let kind = WindowKind::Note(id.to_string());
        Self {
            label: kind.label(),
            kind,
            title: "Sticky Note".into(),
            bounds: Some(bounds),
            size: Size {
                width: bounds.width,
                height: bounds.height,
            },
            min_size: Size {
                width: NOTE_MIN_WIDTH,
                height: NOTE_MIN_HEIGHT,
            },
            resizable: true,
            decorations: false,
            always_on_top: settings.always_on_top,
            skip_taskbar: !settings.show_in_taskbar,
            opacity: settings.opacity,
            parent: None,
        }
    }

    /// Small fixed-size quick note.
    pub fn quick_note(id: &str, bounds: Bounds, settings: &Settings) -> Self {
        let size = Size {
            width: QUICK_NOTE_WIDTH,
            height: QUICK_NOTE_HEIGHT,
        };
        Self {
            title: "Quick Note".into(),
            size,
            min_size: size,
            resizable: false,
            always_on_top: true,
            ..Self::note(id, bounds, settings)
        }
    }

    pub fn manager() -> Self {
        Self {
            kind: WindowKind::Manager,
            label: WindowKind::Manager.label(),
            title: "Sticky Notes".into(),
            bounds: None,
            size: Size {
                width: MANAGER_WIDTH,
                height: MANAGER_HEIGHT,
            },
            min_size: Size {
                width: MANAGER_MIN_WIDTH,
                height: MANAGER_MIN_HEIGHT,
            },
            resizable: true,
            decorations: true,
            always_on_top: false,
            skip_taskbar: false,
            opacity: 1.0,
            parent: None,
        }
    }

    pub fn settings(parent: Option<String>) -> Self {
        Self {
            kind: WindowKind::Settings,
            label: WindowKind::Settings.label(),
            title: "Settings".into(),
            size: Size {
                width: SETTINGS_WIDTH,
                height: SETTINGS_HEIGHT,
            },
            min_size: Size {
                width: SETTINGS_MIN_WIDTH,
                height: SETTINGS_MIN_HEIGHT,
            },
            parent,
            ..Self::manager()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_roundtrip() {
        for kind in [
            WindowKind::Note("abc-123".into()),
            WindowKind::Manager,
            WindowKind::Settings,
        ] {
            assert_eq!(WindowKind::from_label(&kind.label()), Some(kind));
        }
    }

    #[test]
    fn unknown_labels() {
        assert_eq!(WindowKind::from_label("main"), None);
        assert_eq!(WindowKind::from_label("note-"), None);
    }

    #[test]
    fn note_options_follow_settings() {
        let mut settings = Settings::default();
        settings.show_in_taskbar = true;
        settings.opacity = 0.8;
        let bounds = Bounds {
            x: 10,
            y: 20,
            width: 400,
            height: 500,
        };
        let opts = WindowOptions::note("n1", bounds, &settings);
        assert_eq!(opts.label, "note-n1");
        assert!(!opts.skip_taskbar);
        assert!(!opts.decorations);
        assert_eq!(opts.opacity, 0.8);
        assert_eq!(opts.min_size.width, 300);
    }

    #[test]
    fn quick_note_is_fixed_size() {
        let bounds = Bounds {
            x: 0,
            y: 0,
            width: 300,
            height: 200,
        };
        let opts = WindowOptions::quick_note("quick-note-1", bounds, &Settings::default());
        assert!(!opts.resizable);
        assert_eq!(opts.size, opts.min_size);
    }

    #[test]
    fn settings_window_has_parent() {
        let opts = WindowOptions::settings(Some("manager".into()));
        assert_eq!(opts.parent.as_deref(), Some("manager"));
        assert_eq!(opts.size.width, 800);
        assert!(opts.decorations);
    }
}
