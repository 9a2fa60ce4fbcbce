//! Voice session state machine types.
//!
//! ```text
//!   Idle → Requesting → Connecting → Connected → Disconnecting → Idle
//!     ▲         │            │            │
//!     └─────────┴────────────┴────────────┘   (error / cancellation)
//! ```
//!
//! [`SessionPhase`] is the full lifecycle tracked by the session manager;
//! [`SessionState`] is the coarse connection view exposed to the UI.

use serde::{Deserialize, Serialize};

/// Lifecycle phase of the voice session manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No session and no start in flight.
    #[default]
    Idle,
    /// A start request was accepted; audio hardware is being prepared.
    Requesting,
    /// The remote connection is being opened.
    Connecting,
    /// A live agent session exists.
    Connected,
    /// Cleanup is tearing the session down.
    Disconnecting,
}

impl SessionPhase {
    /// Collapse the phase into the coarse connection state.
    #[must_use]
    pub const fn state(self) -> SessionState {
        match self {
            Self::Idle | Self::Disconnecting => SessionState::Disconnected,
            Self::Requesting | Self::Connecting => SessionState::Connecting,
            Self::Connected => SessionState::Connected,
        }
    }
}

/// Coarse connection state of the voice session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Which direction audio is currently flowing in a live agent session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// The agent is listening to the patient.
    #[default]
    Listening,
    /// The agent is talking.
    Speaking,
}
