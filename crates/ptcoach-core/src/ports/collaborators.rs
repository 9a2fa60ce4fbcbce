//! Lifecycle contracts for camera, pose estimation, speech recognition and
//! local speech synthesis.
//!
//! Frame, pose and text delivery are not part of these contracts; the core
//! only starts, stops and cleans up the collaborators.

use async_trait::async_trait;
use thiserror::Error;

/// Failure reported by an external collaborator.
#[derive(Debug, Clone, Error)]
pub enum CollaboratorError {
    #[error("{name} failed to start: {reason}")]
    StartFailed { name: String, reason: String },

    #[error("{0} is unavailable")]
    Unavailable(String),
}

/// Camera capture or pose-estimation pipeline.
#[async_trait]
pub trait CaptureCollaborator: Send + Sync {
    /// Short name used in logs (`"camera"`, `"pose"`).
    fn name(&self) -> &str;

    async fn start_session(&self) -> Result<(), CollaboratorError>;

    async fn stop_session(&self);

    /// Release buffers and device handles after `stop_session`.
    async fn clean_up(&self);

    /// Resolve once the pipeline is producing output.
    ///
    /// Callers bound this wait with their own timeout. The default resolves
    /// immediately for collaborators without a warm-up phase.
    async fn wait_ready(&self) {}
}

/// Speech-to-text recognizer fed from the microphone.
#[async_trait]
pub trait SpeechRecognizerPort: Send + Sync {
    async fn start_listening(&self) -> Result<(), CollaboratorError>;

    async fn stop_listening(&self);

    fn is_listening(&self) -> bool;
}

/// Local speech synthesis failure.
#[derive(Debug, Clone, Error)]
pub enum SpeechError {
    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("Speech was interrupted")]
    Interrupted,
}

/// On-device text-to-speech used as a fallback voice outside the agent.
#[async_trait]
pub trait SpeechSynthesizerPort: Send + Sync {
    /// Speak `text`, resolving when playback finishes or is stopped.
    async fn speak(&self, text: &str) -> Result<(), SpeechError>;

    /// Stop any in-progress utterance.
    fn stop(&self);

    fn is_speaking(&self) -> bool;
}
