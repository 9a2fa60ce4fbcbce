//! The single shared microphone/speaker session.
//!
//! Only the voice crate's `SharedAudioHardware` wrapper may call this port;
//! it serializes configuration so two callers never race a reconfiguration.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::AudioCategory;

/// Errors reported by the platform audio session.
#[derive(Debug, Clone, Error)]
pub enum AudioHardwareError {
    /// Setting the category profile failed.
    #[error("Failed to set audio category {category:?}: {reason}")]
    Category {
        category: AudioCategory,
        reason: String,
    },

    /// Activating or deactivating the session failed.
    #[error("Audio session activation failed: {0}")]
    Activation(String),
}

#[async_trait]
pub trait AudioHardwarePort: Send + Sync {
    /// Apply a category profile and activate the session.
    async fn activate(&self, category: AudioCategory) -> Result<(), AudioHardwareError>;

    /// Deactivate the session, releasing microphone and speaker.
    async fn deactivate(&self) -> Result<(), AudioHardwareError>;
}
