//! Typed timing configuration for the session core.

use std::time::Duration;

use ptcoach_core::Settings;

use crate::reconnect::ReconnectPolicy;

/// Timing knobs shared by the session manager, the audio hardware wrapper
/// and the coordinator. Built once from [`Settings`].
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceSessionConfig {
    /// Wait after ending a remote connection before deactivating hardware.
    pub teardown_settle: Duration,
    /// Wait after superseding a session before retrying the start.
    pub supersede_settle: Duration,
    pub max_supersede_retries: u32,
    pub reconnect: ReconnectPolicy,
    pub hardware_poll: Duration,
    pub hardware_max_wait: Duration,
    pub camera_ready_timeout: Duration,
}

impl VoiceSessionConfig {
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            teardown_settle: settings.teardown_settle(),
            supersede_settle: settings.supersede_settle(),
            max_supersede_retries: settings.effective_max_supersede_retries(),
            reconnect: ReconnectPolicy::new(
                settings.effective_reconnect_base(),
                settings.reconnect_unit(),
                settings.effective_max_reconnect_attempts(),
            ),
            hardware_poll: settings.hardware_poll(),
            hardware_max_wait: settings.hardware_max_wait(),
            camera_ready_timeout: settings.camera_ready_timeout(),
        }
    }
}

impl Default for VoiceSessionConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}
