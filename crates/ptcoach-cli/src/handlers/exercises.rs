//! Exercise backend command handlers.
//!
//! `onboard` registers a patient from a JSON profile; `exercises` fetches the
//! patient's plan, which the backend generates on first request.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use ptcoach_core::{
    ExerciseBackendPort, GenerateExercisesRequest, LlmProvider, PatientProfile, Settings,
    validate_endpoint,
};
use ptcoach_report::{DefaultExerciseClient, ReportClientConfig};

use crate::error::CliError;

#[derive(Debug, Clone)]
pub struct OnboardArgs {
    pub profile: PathBuf,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ExercisesArgs {
    pub patient_id: Option<String>,
    pub provider: LlmProvider,
    pub base_url: Option<String>,
}

/// Pick the exercise backend URL from the argument or the settings.
pub fn resolve_base_url(settings: &Settings, base_url: Option<&str>) -> Result<String, CliError> {
    let base_url = base_url
        .map(str::to_owned)
        .or_else(|| settings.exercise_backend_url.clone())
        .ok_or_else(|| {
            CliError::Arguments(
                "no exercise backend: pass --base-url or set PTCOACH_EXERCISE_BACKEND_URL"
                    .to_string(),
            )
        })?;
    validate_endpoint(&base_url)?;
    Ok(base_url)
}

/// Read and check a patient profile file.
pub fn load_profile(path: &Path) -> Result<PatientProfile, CliError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?;
    let profile: PatientProfile = serde_json::from_str(&raw)
        .map_err(|e| CliError::Arguments(format!("{}: not a patient profile ({e})", path.display())))?;
    profile.validate().map_err(CliError::Arguments)?;
    Ok(profile)
}

fn client(base_url: &str) -> Result<DefaultExerciseClient, CliError> {
    DefaultExerciseClient::new(&ReportClientConfig::new(base_url))
        .map_err(|e| CliError::Config(e.to_string()))
}

pub async fn onboard(settings: &Settings, args: OnboardArgs) -> Result<()> {
    let profile = load_profile(&args.profile)?;
    let base_url = resolve_base_url(settings, args.base_url.as_deref())?;
    let client = client(&base_url)?;

    info!(%base_url, name = %profile.name, "Onboarding patient");
    let patient = client
        .onboard_patient(&profile)
        .await
        .map_err(CliError::from)?;

    println!("{}", serde_json::to_string_pretty(&patient)?);
    Ok(())
}

pub async fn exercises(settings: &Settings, args: ExercisesArgs) -> Result<()> {
    let patient_id = args
        .patient_id
        .or_else(|| settings.patient_id.clone())
        .ok_or_else(|| {
            CliError::Arguments(
                "no patient id: pass --patient-id or set PTCOACH_PATIENT_ID".to_string(),
            )
        })?;
    let base_url = resolve_base_url(settings, args.base_url.as_deref())?;
    let client = client(&base_url)?;

    let request = GenerateExercisesRequest {
        patient_id,
        llm_provider: args.provider,
    };
    info!(%base_url, patient_id = %request.patient_id, "Requesting exercise plan");
    let plan = ExerciseBackendPort::generate_exercises(&client, &request)
        .await
        .map_err(CliError::from)?;

    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}
