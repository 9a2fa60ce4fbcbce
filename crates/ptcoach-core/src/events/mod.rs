//! Canonical event union for everything the session core reports to the UI.
//!
//! # Wire Format
//!
//! Events are serialized with a `type` tag:
//!
//! ```json
//! { "type": "reconnect_scheduled", "agent": "exercise_coach", "attempt": 1, "delayMs": 2000 }
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::{AgentType, AudioOperationKind, MessageRole, Mode, SessionPhase};
use crate::ports::PermissionReport;

/// Events emitted by the voice session manager and the session coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    // ========== Voice session ==========
    /// The session manager moved to a new lifecycle phase.
    PhaseChanged {
        /// Agent the phase applies to, `None` once the manager is idle.
        agent: Option<AgentType>,
        phase: SessionPhase,
    },

    /// The live agent switched between speaking and listening.
    ModeChanged { mode: Mode },

    /// Agent output volume (0.0–1.0), for UI visualisation.
    VolumeUpdate { level: f32 },

    /// A transcript line arrived.
    Message { role: MessageRole, content: String },

    /// The agent reported an error.
    AgentError {
        agent: AgentType,
        code: String,
        details: String,
    },

    /// A reconnection attempt has been scheduled.
    ReconnectScheduled {
        agent: AgentType,
        attempt: u32,
        #[serde(rename = "delayMs")]
        delay_ms: u64,
    },

    /// The reconnection ceiling was reached; no further retries.
    ReconnectExhausted { agent: AgentType },

    /// The agent invoked a client tool.
    ToolInvoked { agent: AgentType, tool: String },

    /// Onboarding finished; the onboarding agent will not be started again.
    OnboardingCompleted {
        #[serde(rename = "patientId")]
        patient_id: Option<String>,
    },

    /// The onboarded patient's exercise plan arrived from the backend.
    ExercisePlanReady {
        #[serde(rename = "patientId")]
        patient_id: String,
        #[serde(rename = "exerciseCount")]
        exercise_count: usize,
    },

    // ========== Exercise session ==========
    ExerciseSessionStarted,

    ExerciseSessionStopped,

    /// One or more authorizations are missing.
    PermissionsDenied { report: PermissionReport },

    /// A queued speak/listen operation completed.
    AudioOperationFinished { kind: AudioOperationKind },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_type_tagged() {
        let event = SessionEvent::ReconnectScheduled {
            agent: AgentType::ExerciseCoach,
            attempt: 1,
            delay_ms: 2000,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "reconnect_scheduled");
        assert_eq!(json["agent"], "exercise_coach");
        assert_eq!(json["delayMs"], 2000);
    }

    #[test]
    fn unit_events_round_trip() {
        let json = serde_json::to_string(&SessionEvent::ExerciseSessionStopped).unwrap();
        assert_eq!(json, r#"{"type":"exercise_session_stopped"}"#);
        let back: SessionEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SessionEvent::ExerciseSessionStopped);
    }
}
