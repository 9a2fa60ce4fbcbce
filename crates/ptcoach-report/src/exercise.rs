//! Exercise client: onboarding and exercise-plan calls.
//!
//! Each call is a separate function under one base URL
//! (`<base>/onboard_patient`, `<base>/generate_exercises`, ...).

use ptcoach_core::{
    AddCustomExerciseRequest, AssignedExercise, ExercisePlan, GenerateExercisesRequest,
    ModifyExerciseRequest, OnboardedPatient, PatientProfile,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};
use url::Url;

use crate::config::ReportClientConfig;
use crate::error::{ReportError, ReportResult};
use crate::http::{HttpBackend, ReqwestBackend};

const ONBOARD_PATIENT: &str = "onboard_patient";
const GENERATE_EXERCISES: &str = "generate_exercises";
const MODIFY_EXERCISE: &str = "modify_exercise";
const ADD_CUSTOM_EXERCISE: &str = "add_custom_exercise";

/// Default exercise client using the reqwest HTTP backend.
pub type DefaultExerciseClient = ExerciseClient<ReqwestBackend>;

/// Client for the onboarding and exercise functions.
pub struct ExerciseClient<B: HttpBackend> {
    pub(crate) backend: B,
    pub(crate) base: Url,
}

impl DefaultExerciseClient {
    /// Create a client whose configured endpoint is the functions' base URL.
    pub fn new(config: &ReportClientConfig) -> ReportResult<Self> {
        let base = base_url(&config.endpoint)?;
        let backend = ReqwestBackend::new(config)?;
        Ok(Self { backend, base })
    }
}

impl<B: HttpBackend> ExerciseClient<B> {
    /// Create a client over a custom backend.
    pub fn with_backend(base: &str, backend: B) -> ReportResult<Self> {
        Ok(Self {
            backend,
            base: base_url(base)?,
        })
    }

    pub const fn base(&self) -> &Url {
        &self.base
    }

    /// Register a patient. The profile is checked locally first.
    pub async fn onboard(&self, profile: &PatientProfile) -> ReportResult<OnboardedPatient> {
        profile
            .validate()
            .map_err(|message| ReportError::InvalidRequest { message })?;

        let patient: OnboardedPatient = self.call(ONBOARD_PATIENT, profile).await?;
        if patient.patient_id.is_empty() {
            return Err(ReportError::InvalidResponse {
                message: "onboarding reply has no patient_id".to_string(),
            });
        }
        info!(patient_id = %patient.patient_id, "Patient onboarded");
        Ok(patient)
    }

    pub async fn generate_exercises(
        &self,
        request: &GenerateExercisesRequest,
    ) -> ReportResult<ExercisePlan> {
        require(&request.patient_id, "patient_id")?;

        let plan: ExercisePlan = self.call(GENERATE_EXERCISES, request).await?;
        info!(
            patient_id = %request.patient_id,
            exercises = plan.exercises.len(),
            source = plan.source.as_deref().unwrap_or("-"),
            "Exercise plan received"
        );
        Ok(plan)
    }

    pub async fn modify_exercise(
        &self,
        request: &ModifyExerciseRequest,
    ) -> ReportResult<AssignedExercise> {
        require(&request.patient_exercise_id, "patient_exercise_id")?;
        self.call(MODIFY_EXERCISE, request).await
    }

    pub async fn add_custom_exercise(
        &self,
        request: &AddCustomExerciseRequest,
    ) -> ReportResult<AssignedExercise> {
        require(&request.exercise_name, "exercise_name")?;
        self.call(ADD_CUSTOM_EXERCISE, request).await
    }

    async fn call<T: DeserializeOwned>(
        &self,
        function: &'static str,
        request: &impl Serialize,
    ) -> ReportResult<T> {
        let url = self.base.join(function)?;
        let body = serde_json::to_value(request)?;
        let reply = self.backend.post_json(&url, &body).await?;

        let error = reply.get("error").and_then(Value::as_str);
        let status = reply.get("status").and_then(Value::as_str);
        if error.is_some() || status != Some("success") {
            let message = error.map_or_else(
                || format!("unexpected status {}", status.unwrap_or("<missing>")),
                str::to_owned,
            );
            warn!(function, %message, "Exercise backend rejected request");
            return Err(ReportError::Rejected { message });
        }
        Ok(serde_json::from_value(reply)?)
    }
}

/// Parse `base` so relative joins land under it rather than replacing its last segment.
fn base_url(base: &str) -> ReportResult<Url> {
    if base.ends_with('/') {
        Ok(Url::parse(base)?)
    } else {
        Ok(Url::parse(&format!("{base}/"))?)
    }
}

fn require(value: &str, field: &str) -> ReportResult<()> {
    if value.trim().is_empty() {
        return Err(ReportError::InvalidRequest {
            message: format!("Invalid request - missing {field}"),
        });
    }
    Ok(())
}
