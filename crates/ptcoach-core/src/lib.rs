//! Core domain types, events and port definitions for ptcoach.
//!
//! This crate has no adapter dependencies: the voice session core, the report
//! client and the CLI all build on the types and traits defined here.

#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod events;
pub mod ports;
pub mod settings;

// Re-export commonly used types for convenience
pub use domain::{
    AgentOutputs, AgentType, AudioCategory, AudioOperationKind, ConversationMessage,
    ExerciseFeedback, ExerciseMetrics, MessageRole, Mode, SessionPhase, SessionState,
};
pub use events::SessionEvent;
pub use ports::{
    AddCustomExerciseRequest, AgentConnection, AgentErrorKind, AgentEvent, AgentEventSink,
    AgentPortError, AgentSessionConfig, AssignedExercise, AudioHardwareError, AudioHardwarePort,
    AuthorizationStatus, CaptureCollaborator, ChannelEmitter, CollaboratorError,
    ConversationalAgentPort, CustomVideo, Exercise, ExerciseBackendPort, ExerciseModifications,
    ExercisePlan, ExercisePortError, ExerciseReport, GenerateExercisesRequest, LlmProvider,
    ModifyExerciseRequest, NoopEmitter, OnboardedPatient, PatientExercise, PatientProfile,
    PermissionProbe, PermissionReport, ReportBackendPort, ReportPortError, ReportRequest,
    ReportResponse, SessionEventEmitter, SpeechError, SpeechRecognizerPort,
    SpeechSynthesizerPort, ToolError, ToolParams, ToolRegistry,
};
pub use settings::{Settings, SettingsError, validate_endpoint, validate_settings};
