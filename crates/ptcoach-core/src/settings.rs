//! Settings domain types, loading and validation.
//!
//! Every field is optional so partial JSON files and environment overrides
//! compose cleanly; `effective_*` accessors supply defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Delay after ending a remote connection before the hardware is released.
pub const DEFAULT_TEARDOWN_SETTLE_MS: u64 = 500;

/// Delay before retrying a start that had to supersede an active session.
pub const DEFAULT_SUPERSEDE_SETTLE_MS: u64 = 300;

pub const DEFAULT_MAX_SUPERSEDE_RETRIES: u32 = 3;

pub const DEFAULT_RECONNECT_BASE: f64 = 2.0;

pub const DEFAULT_RECONNECT_UNIT_MS: u64 = 1000;

pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 3;

pub const DEFAULT_HARDWARE_POLL_MS: u64 = 25;

pub const DEFAULT_HARDWARE_MAX_WAIT_MS: u64 = 2000;

pub const DEFAULT_CAMERA_READY_TIMEOUT_MS: u64 = 5000;

/// Environment variable overriding [`Settings::report_endpoint`].
pub const ENV_REPORT_ENDPOINT: &str = "PTCOACH_REPORT_ENDPOINT";

/// Environment variable overriding [`Settings::exercise_backend_url`].
pub const ENV_EXERCISE_BACKEND_URL: &str = "PTCOACH_EXERCISE_BACKEND_URL";

/// Environment variable overriding [`Settings::patient_id`].
pub const ENV_PATIENT_ID: &str = "PTCOACH_PATIENT_ID";

/// Application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub teardown_settle_ms: Option<u64>,
    pub supersede_settle_ms: Option<u64>,
    /// Upper bound on teardown-then-retry loops when superseding a session.
    pub max_supersede_retries: Option<u32>,
    /// Exponential base of the reconnection backoff.
    pub reconnect_base: Option<f64>,
    /// Length of one backoff time unit.
    pub reconnect_unit_ms: Option<u64>,
    pub max_reconnect_attempts: Option<u32>,
    /// First poll interval while waiting for a concurrent hardware configuration.
    pub hardware_poll_ms: Option<u64>,
    pub hardware_max_wait_ms: Option<u64>,
    pub camera_ready_timeout_ms: Option<u64>,
    /// Report backend URL.
    pub report_endpoint: Option<String>,
    /// Base URL the exercise functions (`onboard_patient`, `generate_exercises`, ...) live under.
    pub exercise_backend_url: Option<String>,
    /// Fallback patient id used when onboarding has not captured one.
    pub patient_id: Option<String>,
}

impl Settings {
    /// Create settings with every default filled in.
    #[must_use]
    pub const fn with_defaults() -> Self {
        Self {
            teardown_settle_ms: Some(DEFAULT_TEARDOWN_SETTLE_MS),
            supersede_settle_ms: Some(DEFAULT_SUPERSEDE_SETTLE_MS),
            max_supersede_retries: Some(DEFAULT_MAX_SUPERSEDE_RETRIES),
            reconnect_base: Some(DEFAULT_RECONNECT_BASE),
            reconnect_unit_ms: Some(DEFAULT_RECONNECT_UNIT_MS),
            max_reconnect_attempts: Some(DEFAULT_MAX_RECONNECT_ATTEMPTS),
            hardware_poll_ms: Some(DEFAULT_HARDWARE_POLL_MS),
            hardware_max_wait_ms: Some(DEFAULT_HARDWARE_MAX_WAIT_MS),
            camera_ready_timeout_ms: Some(DEFAULT_CAMERA_READY_TIMEOUT_MS),
            report_endpoint: None,
            exercise_backend_url: None,
            patient_id: None,
        }
    }

    /// Default settings file: `<config dir>/ptcoach/settings.json`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ptcoach").join("settings.json"))
    }

    /// Load settings from a JSON file. A missing file yields empty settings.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No settings file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(SettingsError::Io {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        };
        let settings: Self = serde_json::from_str(&raw).map_err(|e| SettingsError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        validate_settings(&settings)?;
        Ok(settings)
    }

    /// Apply environment overrides using `lookup` (usually `std::env::var(..).ok()`).
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(endpoint) = lookup(ENV_REPORT_ENDPOINT).filter(|v| !v.trim().is_empty()) {
            self.report_endpoint = Some(endpoint);
        }
        if let Some(url) = lookup(ENV_EXERCISE_BACKEND_URL).filter(|v| !v.trim().is_empty()) {
            self.exercise_backend_url = Some(url);
        }
        if let Some(patient) = lookup(ENV_PATIENT_ID).filter(|v| !v.trim().is_empty()) {
            self.patient_id = Some(patient);
        }
    }

    #[must_use]
    pub fn teardown_settle(&self) -> Duration {
        Duration::from_millis(self.teardown_settle_ms.unwrap_or(DEFAULT_TEARDOWN_SETTLE_MS))
    }

    #[must_use]
    pub fn supersede_settle(&self) -> Duration {
        Duration::from_millis(
            self.supersede_settle_ms
                .unwrap_or(DEFAULT_SUPERSEDE_SETTLE_MS),
        )
    }

    #[must_use]
    pub fn effective_max_supersede_retries(&self) -> u32 {
        self.max_supersede_retries
            .unwrap_or(DEFAULT_MAX_SUPERSEDE_RETRIES)
    }

    #[must_use]
    pub fn effective_reconnect_base(&self) -> f64 {
        self.reconnect_base.unwrap_or(DEFAULT_RECONNECT_BASE)
    }

    #[must_use]
    pub fn reconnect_unit(&self) -> Duration {
        Duration::from_millis(self.reconnect_unit_ms.unwrap_or(DEFAULT_RECONNECT_UNIT_MS))
    }

    #[must_use]
    pub fn effective_max_reconnect_attempts(&self) -> u32 {
        self.max_reconnect_attempts
            .unwrap_or(DEFAULT_MAX_RECONNECT_ATTEMPTS)
    }

    #[must_use]
    pub fn hardware_poll(&self) -> Duration {
        Duration::from_millis(self.hardware_poll_ms.unwrap_or(DEFAULT_HARDWARE_POLL_MS))
    }

    #[must_use]
    pub fn hardware_max_wait(&self) -> Duration {
        Duration::from_millis(
            self.hardware_max_wait_ms
                .unwrap_or(DEFAULT_HARDWARE_MAX_WAIT_MS),
        )
    }

    #[must_use]
    pub fn camera_ready_timeout(&self) -> Duration {
        Duration::from_millis(
            self.camera_ready_timeout_ms
                .unwrap_or(DEFAULT_CAMERA_READY_TIMEOUT_MS),
        )
    }
}

/// Settings loading / validation error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SettingsError {
    #[error("Reconnect base must be >= 1.0, got {0}")]
    InvalidReconnectBase(f64),

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("Report endpoint must be an http(s) URL, got {0:?}")]
    InvalidEndpoint(String),

    #[error("Failed to read settings from {path}: {reason}")]
    Io { path: PathBuf, reason: String },

    #[error("Failed to parse settings in {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

/// Validate settings values.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    if let Some(base) = settings.reconnect_base {
        if base.is_nan() || base < 1.0 {
            return Err(SettingsError::InvalidReconnectBase(base));
        }
    }

    let durations = [
        ("reconnect_unit_ms", settings.reconnect_unit_ms),
        ("hardware_poll_ms", settings.hardware_poll_ms),
        ("hardware_max_wait_ms", settings.hardware_max_wait_ms),
        ("camera_ready_timeout_ms", settings.camera_ready_timeout_ms),
    ];
    if let Some((name, _)) = durations.iter().find(|(_, v)| *v == Some(0)) {
        return Err(SettingsError::ZeroDuration(name));
    }

    if let Some(ref endpoint) = settings.report_endpoint {
        validate_endpoint(endpoint)?;
    }
    if let Some(ref url) = settings.exercise_backend_url {
        validate_endpoint(url)?;
    }

    Ok(())
}

/// Check that a backend endpoint is an http(s) URL.
pub fn validate_endpoint(endpoint: &str) -> Result<(), SettingsError> {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Ok(())
    } else {
        Err(SettingsError::InvalidEndpoint(endpoint.to_owned()))
    }
}
