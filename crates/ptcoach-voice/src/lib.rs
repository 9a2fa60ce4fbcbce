//! Voice session core for the PT coach.
//!
//! - [`VoiceSessionManager`] owns the one remote agent session: start
//!   de-duplication, supersede, teardown and reconnection.
//! - [`AudioOperationQueue`] runs speak and listen operations one at a time.
//! - [`SessionCoordinator`] checks permissions and starts or stops a full
//!   exercise session (camera, pose estimation, recognition, voice).
//!
//! Platform services are injected as the port traits from `ptcoach-core`.

#![deny(unused_crate_dependencies)]

// Dev-dependencies used only by the integration tests.
#[cfg(test)]
use mockall as _;
#[cfg(test)]
use tokio_test as _;

pub mod config;
pub mod coordinator;
pub mod error;
pub mod hardware;
pub mod manager;
pub mod permissions;
pub mod queue;
pub mod reconnect;
pub mod session;
pub mod tools;

pub use config::VoiceSessionConfig;
pub use coordinator::{CaptureCollaborators, SessionCoordinator};
pub use error::VoiceError;
pub use hardware::SharedAudioHardware;
pub use manager::VoiceSessionManager;
pub use permissions::PermissionSet;
pub use queue::{AudioOperation, AudioOperationQueue, OperationCompletion, OperationOutcome};
pub use reconnect::ReconnectPolicy;
pub use session::AgentSession;
pub use tools::{SharedOutputs, build_tools};
