//! Settings resolution for the CLI.
//!
//! Precedence: environment overrides, then the settings file, then defaults.

use std::path::Path;

use ptcoach_core::{Settings, validate_settings};
use tracing::debug;

use crate::error::CliError;

/// Load settings from `path` (or the default location) and apply overrides.
///
/// `lookup` resolves environment variables; `main` passes `std::env::var`.
pub fn load_settings(
    path: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Settings, CliError> {
    let path = path.map(Path::to_path_buf).or_else(Settings::default_path);
    let mut settings = match path {
        Some(ref path) => {
            debug!(path = %path.display(), "Loading settings");
            Settings::load(path)?
        }
        None => Settings::default(),
    };
    settings.apply_env_with(lookup);
    validate_settings(&settings)?;
    Ok(settings)
}

/// Fill every unset field with its default.
pub fn effective_settings(settings: &Settings) -> Settings {
    let defaults = Settings::with_defaults();
    Settings {
        teardown_settle_ms: settings.teardown_settle_ms.or(defaults.teardown_settle_ms),
        supersede_settle_ms: settings.supersede_settle_ms.or(defaults.supersede_settle_ms),
        max_supersede_retries: settings
            .max_supersede_retries
            .or(defaults.max_supersede_retries),
        reconnect_base: settings.reconnect_base.or(defaults.reconnect_base),
        reconnect_unit_ms: settings.reconnect_unit_ms.or(defaults.reconnect_unit_ms),
        max_reconnect_attempts: settings
            .max_reconnect_attempts
            .or(defaults.max_reconnect_attempts),
        hardware_poll_ms: settings.hardware_poll_ms.or(defaults.hardware_poll_ms),
        hardware_max_wait_ms: settings.hardware_max_wait_ms.or(defaults.hardware_max_wait_ms),
        camera_ready_timeout_ms: settings
            .camera_ready_timeout_ms
            .or(defaults.camera_ready_timeout_ms),
        report_endpoint: settings.report_endpoint.clone(),
        exercise_backend_url: settings.exercise_backend_url.clone(),
        patient_id: settings.patient_id.clone(),
    }
}
