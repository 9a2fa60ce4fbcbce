//! Exercise backend port: patient onboarding and exercise plans.
//!
//! Four calls share one JSON envelope: a `status` of `"success"` plus the
//! payload fields, or an `{"error": "..."}` body. Adapters check the envelope;
//! the DTOs below carry only the payload.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Exercise frequencies the backend accepts, compared case-insensitively.
pub const VALID_FREQUENCIES: [&str; 8] = [
    "daily",
    "2 times a week",
    "3 times a week",
    "4 times a week",
    "5 times a week",
    "6 times a week",
    "everyday",
    "every other day",
];

/// Profile collected during onboarding, sent to `onboard_patient`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientProfile {
    pub name: String,
    pub age: u8,
    /// Description of the injury or pain.
    pub injury: String,
    /// Pain severity, 1 to 10.
    pub pain_level: u8,
    /// One of [`VALID_FREQUENCIES`].
    pub frequency: String,
    /// Preferred exercise time.
    pub time_of_day: String,
    /// Reminder time, `HH:MM` on a 24 hour clock.
    pub notification_time: String,
    /// Recovery goal in the patient's words.
    pub goal: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fcm_token: Option<String>,
}

impl PatientProfile {
    /// Check the profile against the backend's acceptance rules.
    pub fn validate(&self) -> Result<(), String> {
        let required = [
            ("name", &self.name),
            ("injury", &self.injury),
            ("frequency", &self.frequency),
            ("time_of_day", &self.time_of_day),
            ("notification_time", &self.notification_time),
            ("goal", &self.goal),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| *field)
            .collect();
        if !missing.is_empty() {
            return Err(format!("Missing required fields: {}", missing.join(", ")));
        }

        if !(5..=100).contains(&self.age) {
            return Err(format!("Age must be between 5 and 100, got {}", self.age));
        }
        if !(1..=10).contains(&self.pain_level) {
            return Err(format!(
                "Pain level must be between 1 and 10, got {}",
                self.pain_level
            ));
        }
        let frequency = self.frequency.to_lowercase();
        if !VALID_FREQUENCIES.contains(&frequency.as_str()) {
            return Err(format!(
                "Invalid frequency value. Must be one of: {}",
                VALID_FREQUENCIES.join(", ")
            ));
        }
        if !is_clock_time(&self.notification_time) {
            return Err(format!(
                "Invalid notification time format. Must be HH:MM in 24-hour format, got {}",
                self.notification_time
            ));
        }
        Ok(())
    }
}

/// `HH:MM`, hours 00-23, minutes 00-59.
fn is_clock_time(value: &str) -> bool {
    let Some((hours, minutes)) = value.split_once(':') else {
        return false;
    };
    let two_digits = |s: &str| s.len() == 2 && s.bytes().all(|b| b.is_ascii_digit());
    two_digits(hours)
        && two_digits(minutes)
        && hours.parse::<u8>().is_ok_and(|h| h < 24)
        && minutes.parse::<u8>().is_ok_and(|m| m < 60)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnboardedPatient {
    pub patient_id: String,
    pub message: Option<String>,
}

/// Language model the backend uses when it has to write exercises.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Claude,
    #[serde(rename = "openai")]
    OpenAi,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateExercisesRequest {
    pub patient_id: String,
    #[serde(default)]
    pub llm_provider: LlmProvider,
}

impl GenerateExercisesRequest {
    #[must_use]
    pub fn for_patient(patient_id: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            llm_provider: LlmProvider::default(),
        }
    }
}

/// One exercise from the catalogue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub description: String,
    pub target_joints: Vec<String>,
    pub instructions: Vec<String>,
    pub video_url: Option<String>,
    pub is_template: bool,
    /// `llm-generated` or `pt-created`.
    pub source: Option<String>,
}

/// Exercises assigned to a patient.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExercisePlan {
    pub exercises: Vec<Exercise>,
    /// `database` when existing assignments were reused, `llm-generated` otherwise.
    pub source: Option<String>,
}

/// Link between a patient and an exercise, with the therapist's dosage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientExercise {
    pub id: String,
    pub patient_id: String,
    pub exercise_id: String,
    pub frequency: String,
    pub sets: u32,
    pub repetitions: u32,
    pub pt_modified: bool,
    pub pt_id: Option<String>,
    pub notes: Option<String>,
}

/// Fields a therapist may change on an assignment. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseModifications {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sets: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repetitions: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A therapist-recorded video, base64 encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomVideo {
    pub base64_data: String,
    pub content_type: String,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyExerciseRequest {
    pub pt_id: String,
    pub patient_id: String,
    pub patient_exercise_id: String,
    pub modifications: ExerciseModifications,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_video: Option<CustomVideo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddCustomExerciseRequest {
    pub pt_id: String,
    pub patient_id: String,
    pub exercise_name: String,
    #[serde(default)]
    pub llm_provider: LlmProvider,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_video: Option<CustomVideo>,
    /// Spoken description the backend uses when it has to write the exercise.
    #[serde(default)]
    pub voice_instructions: String,
}

/// An assignment together with the exercise it points at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignedExercise {
    pub patient_exercise: PatientExercise,
    pub exercise: Exercise,
}

/// Errors returned by exercise backend operations.
#[derive(Debug, Error)]
pub enum ExercisePortError {
    /// The request was rejected before or by the backend (bad profile, 4xx).
    #[error("Invalid exercise request: {0}")]
    InvalidRequest(String),

    /// The backend answered with an error payload or status.
    #[error("Exercise backend error: {0}")]
    Backend(String),

    /// Network failure after all retries.
    #[error("Exercise backend unreachable: {0}")]
    Unreachable(String),
}

#[async_trait]
pub trait ExerciseBackendPort: Send + Sync {
    /// Register a patient. Returns the id the backend assigned.
    async fn onboard_patient(
        &self,
        profile: &PatientProfile,
    ) -> Result<OnboardedPatient, ExercisePortError>;

    /// Fetch the patient's exercises, generating them on first use.
    async fn generate_exercises(
        &self,
        request: &GenerateExercisesRequest,
    ) -> Result<ExercisePlan, ExercisePortError>;

    async fn modify_exercise(
        &self,
        request: &ModifyExerciseRequest,
    ) -> Result<AssignedExercise, ExercisePortError>;

    async fn add_custom_exercise(
        &self,
        request: &AddCustomExerciseRequest,
    ) -> Result<AssignedExercise, ExercisePortError>;
}
