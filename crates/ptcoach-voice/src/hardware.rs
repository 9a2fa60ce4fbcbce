//! Serialized access to the shared microphone/speaker session.
//!
//! Every activation and deactivation goes through [`SharedAudioHardware`].
//! A `configuring` flag marks a reconfiguration in flight; a second caller
//! polls with doubling backoff until the first finishes instead of racing
//! it. Requests that would not change the active category are no-ops, which
//! is what lets the coordinator and the session manager both "configure"
//! while the platform sees exactly one activation.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use ptcoach_core::{AudioCategory, AudioHardwarePort};

use crate::error::VoiceError;

#[derive(Debug, Default)]
struct HardwareState {
    configuring: bool,
    active: Option<AudioCategory>,
}

/// Cheaply clonable handle to the one audio hardware session.
#[derive(Clone)]
pub struct SharedAudioHardware {
    port: Arc<dyn AudioHardwarePort>,
    state: Arc<Mutex<HardwareState>>,
    poll: Duration,
    max_wait: Duration,
}

impl SharedAudioHardware {
    pub fn new(port: Arc<dyn AudioHardwarePort>, poll: Duration, max_wait: Duration) -> Self {
        Self {
            port,
            state: Arc::new(Mutex::new(HardwareState::default())),
            poll,
            max_wait,
        }
    }

    /// Category currently active, if any.
    #[must_use]
    pub fn active_category(&self) -> Option<AudioCategory> {
        self.lock().active
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.lock().active.is_some()
    }

    /// Activate the session with `category`. No-op if already active with it.
    pub async fn configure(&self, category: AudioCategory) -> Result<(), VoiceError> {
        if !self.begin(Some(category)).await? {
            tracing::debug!(?category, "Audio hardware already configured");
            return Ok(());
        }

        let result = self.port.activate(category).await;
        let mut state = self.lock();
        state.configuring = false;
        match result {
            Ok(()) => {
                state.active = Some(category);
                drop(state);
                tracing::info!(?category, "Audio hardware activated");
                Ok(())
            }
            Err(e) => {
                drop(state);
                tracing::error!(?category, error = %e, "Audio hardware activation failed");
                Err(e.into())
            }
        }
    }

    /// Deactivate the session. No-op if nothing is active.
    pub async fn deactivate(&self) -> Result<(), VoiceError> {
        if !self.begin(None).await? {
            return Ok(());
        }

        let result = self.port.deactivate().await;
        let mut state = self.lock();
        state.configuring = false;
        // Once we asked the platform to let go, treat the session as released
        // even if it complained; the next configure re-activates explicitly.
        state.active = None;
        drop(state);

        match result {
            Ok(()) => {
                tracing::info!("Audio hardware deactivated");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Audio hardware deactivation reported an error");
                Err(e.into())
            }
        }
    }

    /// Claim the configuring flag for a transition to `target`.
    ///
    /// Returns `Ok(false)` when the hardware is already in `target`.
    async fn begin(&self, target: Option<AudioCategory>) -> Result<bool, VoiceError> {
        let deadline = Instant::now() + self.max_wait;
        let max_delay = self.poll.saturating_mul(8);
        let mut delay = self.poll;

        loop {
            {
                let mut state = self.lock();
                if !state.configuring {
                    if state.active == target {
                        return Ok(false);
                    }
                    state.configuring = true;
                    return Ok(true);
                }
            }

            if Instant::now() >= deadline {
                tracing::warn!(?target, "Timed out waiting for audio hardware configuration");
                return Err(VoiceError::HardwareBusy);
            }
            tokio::time::sleep(delay).await;
            delay = delay.saturating_mul(2).min(max_delay);
        }
    }

    fn lock(&self) -> MutexGuard<'_, HardwareState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
