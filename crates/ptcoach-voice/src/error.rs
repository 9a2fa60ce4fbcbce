//! Voice session error types.

use std::time::Duration;

use ptcoach_core::{
    AgentPortError, AudioHardwareError, CollaboratorError, ExercisePortError, PermissionReport,
    ReportPortError, SpeechError,
};

/// Errors surfaced by the voice session core.
///
/// Duplicate or out-of-order requests and superseded sessions are resolved
/// silently and never appear here.
#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    /// One or more of camera / microphone / speech recognition is not authorized.
    #[error("Permission denied (camera: {}, microphone: {}, speech: {})",
        .0.camera, .0.microphone, .0.speech_recognition)]
    PermissionDenied(PermissionReport),

    /// The shared audio session could not be configured.
    #[error("Audio configuration failed: {0}")]
    AudioConfiguration(String),

    /// Another configuration held the audio hardware for too long.
    #[error("Audio hardware is busy with another configuration")]
    HardwareBusy,

    /// The remote agent connection dropped or could not be opened.
    #[error("Agent transport failure: {0}")]
    Transport(String),

    /// The remote agent refused the session; retrying will not help.
    #[error("Agent error: {0}")]
    Agent(String),

    /// The start request was cancelled before the connection was finalized.
    #[error("Voice session start cancelled")]
    Cancelled,

    /// Another session kept reappearing while this start tried to supersede it.
    #[error("Voice session is held by another agent")]
    SessionBusy,

    /// The camera did not become ready in time.
    #[error("Camera not ready after {0:?}")]
    CameraTimeout(Duration),

    /// A camera / pose / recognizer collaborator failed.
    #[error("Collaborator failed: {0}")]
    Collaborator(String),

    /// Local fallback speech failed.
    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),

    /// Speech recognition could not start.
    #[error("Speech recognition failed: {0}")]
    Recognition(String),

    /// Exporting the session transcript to the report backend failed.
    #[error("Report export failed: {0}")]
    Report(String),

    /// Fetching the exercise plan failed.
    #[error("Exercise plan request failed: {0}")]
    ExercisePlan(String),
}

impl VoiceError {
    /// Whether the error came from a dropped agent transport.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<AgentPortError> for VoiceError {
    fn from(e: AgentPortError) -> Self {
        match e {
            AgentPortError::Transport(reason) => Self::Transport(reason),
            other => Self::Agent(other.to_string()),
        }
    }
}

impl From<AudioHardwareError> for VoiceError {
    fn from(e: AudioHardwareError) -> Self {
        Self::AudioConfiguration(e.to_string())
    }
}

impl From<CollaboratorError> for VoiceError {
    fn from(e: CollaboratorError) -> Self {
        Self::Collaborator(e.to_string())
    }
}

impl From<SpeechError> for VoiceError {
    fn from(e: SpeechError) -> Self {
        Self::Synthesis(e.to_string())
    }
}

impl From<ReportPortError> for VoiceError {
    fn from(e: ReportPortError) -> Self {
        Self::Report(e.to_string())
    }
}

impl From<ExercisePortError> for VoiceError {
    fn from(e: ExercisePortError) -> Self {
        Self::ExercisePlan(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_port_errors_stay_transport() {
        let err: VoiceError = AgentPortError::Transport("socket closed".into()).into();
        assert!(err.is_transport());

        let err: VoiceError = AgentPortError::Rejected("unknown agent".into()).into();
        assert!(matches!(err, VoiceError::Agent(_)));
    }

    #[test]
    fn permission_denied_lists_each_domain() {
        let err = VoiceError::PermissionDenied(PermissionReport {
            camera: true,
            microphone: false,
            speech_recognition: true,
        });
        assert_eq!(
            err.to_string(),
            "Permission denied (camera: true, microphone: false, speech: true)"
        );
    }
}
