//! Domain types shared by every ptcoach crate.

mod agent;
mod audio;
mod conversation;
mod exercise;
mod session;

pub use agent::{AgentType, EXERCISE_COACH_AGENT_ID, ONBOARDING_AGENT_ID};
pub use audio::{AudioCategory, AudioOperationKind};
pub use conversation::{ConversationMessage, ExerciseMetrics, MessageRole};
pub use exercise::{AgentOutputs, ExerciseFeedback};
pub use session::{Mode, SessionPhase, SessionState};
