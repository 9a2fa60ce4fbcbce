//! Structured data pushed back into the app by agent tools.

use serde::{Deserialize, Serialize};

/// Feedback fields recorded by the exercise coach during a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseFeedback {
    pub exercise_id: Option<String>,
    pub sets_completed: Option<u32>,
    pub reps_completed: Option<u32>,
    /// Reported pain on a 0–10 scale.
    pub pain_level: Option<u8>,
    pub notes: Option<String>,
}

/// Everything agent tools have told the app so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentOutputs {
    /// Patient identifier captured during onboarding.
    pub patient_id: Option<String>,
    pub onboarding_complete: bool,
    pub feedback: Vec<ExerciseFeedback>,
    /// Exercises the coach declared finished, in order.
    pub completed_exercises: Vec<String>,
}
