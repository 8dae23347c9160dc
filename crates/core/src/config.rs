//! Driver configuration, loaded from a JSON file with every field optional.

use crate::debug::DebugLevel;
use crate::secret::EncryptedCredentials;
use crate::wait::Waiter;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const PORTAL_URL: &str = "https://www.portaleargo.it/argoweb/alunni/";
pub const WEBDRIVER_URL: &str = "http://127.0.0.1:4444";

#[derive(Debug)]
pub enum ConfigError {
    Io(String),
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Cannot read configuration: {}", e),
            ConfigError::Parse(e) => write!(f, "Invalid configuration: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Application version each workflow family is scripted against.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VersionPins {
    pub first_term: String,
    pub final_import: String,
    pub final_lock: String,
    pub suspended: String,
    pub absences: String,
    /// The older grading application used for admission comments.
    pub legacy: String,
}

impl Default for VersionPins {
    fn default() -> Self {
        Self {
            first_term: "Versione 3.30.0".to_string(),
            final_import: "Versione 3.35.0".to_string(),
            final_lock: "Versione 3.35.1".to_string(),
            suspended: "Versione 3.37.0".to_string(),
            absences: "Versione 3.37.0".to_string(),
            legacy: "Versione 2.2.0".to_string(),
        }
    }
}

/// Configuration for a driver session.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Browser window width in pixels.
    pub width: u32,
    /// Browser window height in pixels.
    pub height: u32,
    /// Page-load and default wait timeout in seconds.
    pub timeout_secs: u64,
    /// Wait timeout for transient feedback, in seconds.
    pub short_timeout_secs: u64,
    /// How long to wait for a native dialog that may not come, in seconds.
    pub alert_window_secs: u64,
    pub poll_interval_ms: u64,
    /// Pause after saves the page confirms only visually.
    pub settle_ms: u64,
    /// Delay between workflow retries, in seconds.
    pub retry_delay_secs: u64,
    pub debug: DebugLevel,
    pub log_dir: PathBuf,
    /// Base name of the log file and of the screenshots.
    pub log_file: String,
    /// Run a visible browser on the local display instead of a headless one.
    pub local: bool,
    pub webdriver_url: String,
    pub portal_url: String,
    /// Where the browser saves PDF printouts; defaults to `log_dir`.
    pub download_dir: Option<PathBuf>,
    /// School name shown as the root of the class tree.
    pub school_name: String,
    pub versions: VersionPins,
    pub credentials: EncryptedCredentials,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 1024,
            timeout_secs: 60,
            short_timeout_secs: 3,
            alert_window_secs: 5,
            poll_interval_ms: 250,
            settle_ms: 2000,
            retry_delay_secs: 30,
            debug: DebugLevel::Normal,
            log_dir: PathBuf::from("."),
            log_file: "argo".to_string(),
            local: false,
            webdriver_url: WEBDRIVER_URL.to_string(),
            portal_url: PORTAL_URL.to_string(),
            download_dir: None,
            school_name: String::new(),
            versions: VersionPins::default(),
            credentials: EncryptedCredentials::default(),
        }
    }
}

impl DriverConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn download_dir(&self) -> PathBuf {
        self.download_dir.clone().unwrap_or_else(|| self.log_dir.clone())
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn waiter(&self) -> Waiter {
        Waiter {
            timeout: Duration::from_secs(self.timeout_secs),
            short_timeout: Duration::from_secs(self.short_timeout_secs),
            alert_window: Duration::from_secs(self.alert_window_secs),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            settle: Duration::from_millis(self.settle_ms),
        }
    }

    /// One-line summary written at session start; never includes secrets.
    pub fn summary(&self) -> String {
        format!(
            "window {}x{}, timeout {}s, retry delay {}s, debug {}, log {}, mode {}",
            self.width,
            self.height,
            self.timeout_secs,
            self.retry_delay_secs,
            self.debug,
            self.log_dir.join(&self.log_file).display(),
            if self.local { "local" } else { "server" }
        )
    }
}
