//! Client tools registered with each agent type.
//!
//! Tools are how the agent pushes structured data back into the app. Each
//! handler receives the agent's parameter map and either stores what it got
//! in [`SharedOutputs`] or fails with `ToolError::InvalidParameters`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use ptcoach_core::{
    AgentOutputs, AgentType, ExerciseFeedback, SessionEvent, SessionEventEmitter, ToolError,
    ToolParams, ToolRegistry,
};

pub const SET_PATIENT_ID: &str = "set_patient_id";
pub const COMPLETE_ONBOARDING: &str = "complete_onboarding";
pub const RECORD_EXERCISE_FEEDBACK: &str = "record_exercise_feedback";
pub const EXERCISE_COMPLETE: &str = "exercise_complete";

/// Tool results shared between the registered handlers and the manager.
#[derive(Debug, Clone, Default)]
pub struct SharedOutputs(Arc<Mutex<AgentOutputs>>);

impl SharedOutputs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn snapshot(&self) -> AgentOutputs {
        self.lock().clone()
    }

    #[must_use]
    pub fn patient_id(&self) -> Option<String> {
        self.lock().patient_id.clone()
    }

    #[must_use]
    pub fn onboarding_complete(&self) -> bool {
        self.lock().onboarding_complete
    }

    pub fn mark_onboarding_complete(&self) {
        self.lock().onboarding_complete = true;
    }

    /// Drop per-exercise data, keeping the patient profile.
    pub fn clear_exercise_data(&self) {
        let mut outputs = self.lock();
        outputs.feedback.clear();
        outputs.completed_exercises.clear();
    }

    fn lock(&self) -> MutexGuard<'_, AgentOutputs> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Build the tool table for `agent`.
pub fn build_tools(
    agent: AgentType,
    outputs: &SharedOutputs,
    emitter: &Arc<dyn SessionEventEmitter>,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    match agent {
        AgentType::Onboarding => {
            let out = outputs.clone();
            register(&mut registry, agent, emitter, SET_PATIENT_ID, move |params| {
                let patient_id = required_str(params, "patient_id")?;
                out.lock().patient_id = Some(patient_id);
                Ok("Patient ID saved".to_owned())
            });

            let out = outputs.clone();
            let events = Arc::clone(emitter);
            register(&mut registry, agent, emitter, COMPLETE_ONBOARDING, move |params| {
                let patient_id = optional_str(params, "patient_id")?;
                let mut guard = out.lock();
                if patient_id.is_some() {
                    guard.patient_id.clone_from(&patient_id);
                }
                guard.onboarding_complete = true;
                let patient_id = guard.patient_id.clone();
                drop(guard);
                events.emit(SessionEvent::OnboardingCompleted { patient_id });
                Ok("Onboarding complete".to_owned())
            });
        }
        AgentType::ExerciseCoach => {
            let out = outputs.clone();
            register(&mut registry, agent, emitter, RECORD_EXERCISE_FEEDBACK, move |params| {
                let pain_level = optional_u32(params, "pain_level")?
                    .map(|p| {
                        u8::try_from(p)
                            .ok()
                            .filter(|p| *p <= 10)
                            .ok_or_else(|| invalid("pain_level must be between 0 and 10"))
                    })
                    .transpose()?;
                let feedback = ExerciseFeedback {
                    exercise_id: optional_str(params, "exercise_id")?,
                    sets_completed: optional_u32(params, "sets_completed")?,
                    reps_completed: optional_u32(params, "reps_completed")?,
                    pain_level,
                    notes: optional_str(params, "notes")?,
                };
                out.lock().feedback.push(feedback);
                Ok("Feedback recorded".to_owned())
            });

            let out = outputs.clone();
            register(&mut registry, agent, emitter, EXERCISE_COMPLETE, move |params| {
                let exercise_id = required_str(params, "exercise_id")?;
                out.lock().completed_exercises.push(exercise_id);
                Ok("Exercise marked complete".to_owned())
            });
        }
    }
    registry
}

/// Register `handler`, emitting `ToolInvoked` after each successful call.
fn register<F>(
    registry: &mut ToolRegistry,
    agent: AgentType,
    emitter: &Arc<dyn SessionEventEmitter>,
    name: &'static str,
    handler: F,
) where
    F: Fn(&ToolParams) -> Result<String, ToolError> + Send + Sync + 'static,
{
    let emitter = Arc::clone(emitter);
    registry.register(name, move |params: &ToolParams| {
        let result = handler(params);
        match &result {
            Ok(_) => {
                tracing::info!(%agent, tool = name, "Agent tool invoked");
                emitter.emit(SessionEvent::ToolInvoked {
                    agent,
                    tool: name.to_owned(),
                });
            }
            Err(e) => tracing::warn!(%agent, tool = name, error = %e, "Agent tool rejected call"),
        }
        result
    });
}

// ── Parameter helpers ──────────────────────────────────────────────

fn invalid(reason: impl Into<String>) -> ToolError {
    ToolError::InvalidParameters(reason.into())
}

fn required_str(params: &ToolParams, key: &str) -> Result<String, ToolError> {
    optional_str(params, key)?.ok_or_else(|| invalid(format!("missing `{key}`")))
}

fn optional_str(params: &ToolParams, key: &str) -> Result<Option<String>, ToolError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_owned())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(_) => Err(invalid(format!("`{key}` must be a string"))),
    }
}

/// Accepts JSON numbers and numeric strings ("3").
fn optional_u32(params: &ToolParams, key: &str) -> Result<Option<u32>, ToolError> {
    let parsed = match params.get(key) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Some(Value::String(s)) => s.trim().parse::<u32>().ok(),
        Some(_) => None,
    };
    parsed
        .map(Some)
        .ok_or_else(|| invalid(format!("`{key}` must be a non-negative integer")))
}
