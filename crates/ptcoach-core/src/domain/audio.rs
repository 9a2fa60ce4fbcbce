//! Shared audio hardware vocabulary.

use serde::{Deserialize, Serialize};

/// Hardware category profile requested when activating the audio session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioCategory {
    /// Simultaneous playback and recording (voice chat with the agent).
    PlayAndRecord,
    /// Playback only (local fallback speech).
    Playback,
}

/// The two kinds of operation serialized by the audio queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioOperationKind {
    Speak,
    Listen,
}
