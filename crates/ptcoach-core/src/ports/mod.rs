//! Port definitions (trait abstractions) for external collaborators.
//!
//! Ports define the interfaces that the session core expects from the
//! platform. They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No platform SDK types in any signature
//! - Lifecycle-only contracts for camera / pose / recognition
//! - Every async port is `Send + Sync` so it can live behind `Arc<dyn _>`

pub mod agent;
pub mod audio_hardware;
pub mod collaborators;
pub mod event_emitter;
pub mod exercise;
pub mod permissions;
pub mod report;

pub use agent::{
    AgentConnection, AgentErrorKind, AgentEvent, AgentEventSink, AgentPortError,
    AgentSessionConfig, ClientTool, ConversationalAgentPort, ToolError, ToolParams, ToolRegistry,
};
pub use audio_hardware::{AudioHardwareError, AudioHardwarePort};
pub use collaborators::{
    CaptureCollaborator, CollaboratorError, SpeechError, SpeechRecognizerPort,
    SpeechSynthesizerPort,
};
pub use event_emitter::{ChannelEmitter, NoopEmitter, SessionEventEmitter};
pub use exercise::{
    AddCustomExerciseRequest, AssignedExercise, CustomVideo, Exercise, ExerciseBackendPort,
    ExerciseModifications, ExercisePlan, ExercisePortError, GenerateExercisesRequest, LlmProvider,
    ModifyExerciseRequest, OnboardedPatient, PatientExercise, PatientProfile, VALID_FREQUENCIES,
};
pub use permissions::{AuthorizationStatus, PermissionProbe, PermissionReport};
pub use report::{
    ExerciseReport, ReportBackendPort, ReportPortError, ReportRequest, ReportResponse,
};
