use std::path::Path;

use stickynotes_protocol::SystemInfo;
use tracing::debug;

use crate::ControllerError;
use crate::controller::AppController;

const ALLOWED_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

/// Accepts `http://host...`, `https://host...` and `mailto:address`.
fn check_url(url: &str) -> Result<(), ControllerError> {
    let invalid = || ControllerError::InvalidUrl(url.to_string());
    let (scheme, rest) = url.split_once(':').ok_or_else(invalid)?;
    let scheme = scheme.to_ascii_lowercase();
    if !ALLOWED_SCHEMES.contains(&scheme.as_str()) {
        return Err(invalid());
    }
    let target = if scheme == "mailto" {
        rest
    } else {
        rest.strip_prefix("//").ok_or_else(invalid)?
    };
    if target.is_empty() || target.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    Ok(())
}

impl AppController {
    pub fn system_info(&self) -> SystemInfo {
        let hostname = hostname::get()
            .map(|h| h.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "unknown".into());
        SystemInfo {
            platform: std::env::consts::OS.into(),
            arch: std::env::consts::ARCH.into(),
            version: self.config.version.clone(),
            hostname,
            data_dir: self.config.data_dir.display().to_string(),
        }
    }

    /// Opens a web or mail link in the user's default handler.
    pub fn open_external(&self, url: &str) -> Result<(), ControllerError> {
        check_url(url)?;
        self.desktop.open_external(url)?;
        debug!(%url, "opened external link");
        Ok(())
    }

    /// Reveals `path` in the platform file manager.
    pub fn show_item_in_folder(&self, path: &Path) -> Result<(), ControllerError> {
        self.desktop.show_item_in_folder(path)?;
        Ok(())
    }
}
