//! Report command handler.
//!
//! Loads a saved transcript, prints the metrics extracted from it and submits
//! it to the report backend.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;
use tracing::info;

use ptcoach_core::{
    ConversationMessage, ExerciseMetrics, ReportBackendPort, ReportRequest, Settings,
    validate_endpoint,
};
use ptcoach_report::{DefaultReportClient, ReportClientConfig};

use crate::error::CliError;

/// Arguments of the `report` command.
#[derive(Debug, Clone)]
pub struct ReportArgs {
    pub exercise_id: String,
    pub transcript: PathBuf,
    pub patient_id: Option<String>,
    pub endpoint: Option<String>,
}

/// Accepted transcript layouts.
#[derive(Deserialize)]
#[serde(untagged)]
enum TranscriptFile {
    Messages(Vec<ConversationMessage>),
    Wrapped {
        conversation_history: Vec<ConversationMessage>,
    },
}

/// Read a transcript file.
pub fn load_transcript(path: &Path) -> Result<Vec<ConversationMessage>, CliError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?;
    let file: TranscriptFile = serde_json::from_str(&raw).map_err(|e| {
        CliError::Transcript(format!(
            "{}: expected an array of {{role, content}} messages ({e})",
            path.display()
        ))
    })?;
    Ok(match file {
        TranscriptFile::Messages(messages)
        | TranscriptFile::Wrapped {
            conversation_history: messages,
        } => messages,
    })
}

/// Combine arguments with configured fallbacks.
///
/// Returns the request and the endpoint to send it to.
pub fn build_request(
    settings: &Settings,
    args: &ReportArgs,
    conversation_history: Vec<ConversationMessage>,
) -> Result<(ReportRequest, String), CliError> {
    let patient_id = args
        .patient_id
        .clone()
        .or_else(|| settings.patient_id.clone())
        .ok_or_else(|| {
            CliError::Arguments(
                "no patient id: pass --patient-id or set PTCOACH_PATIENT_ID".to_string(),
            )
        })?;
    let endpoint = args
        .endpoint
        .clone()
        .or_else(|| settings.report_endpoint.clone())
        .ok_or_else(|| {
            CliError::Arguments(
                "no report endpoint: pass --endpoint or set PTCOACH_REPORT_ENDPOINT".to_string(),
            )
        })?;
    validate_endpoint(&endpoint)?;

    let request = ReportRequest {
        patient_id,
        exercise_id: args.exercise_id.clone(),
        conversation_history,
    };
    Ok((request, endpoint))
}

pub async fn execute(settings: &Settings, args: ReportArgs) -> Result<()> {
    let messages = load_transcript(&args.transcript)?;
    let metrics = ExerciseMetrics::extract(&messages);
    println!(
        "Transcript: {} messages, {} sets, {} reps, {} minutes",
        messages.len(),
        metrics.sets_completed,
        metrics.reps_completed,
        metrics.duration_minutes
    );

    let (request, endpoint) = build_request(settings, &args, messages)?;
    let client = DefaultReportClient::new(&ReportClientConfig::new(endpoint.as_str()))
        .map_err(|e| CliError::Config(e.to_string()))?;

    info!(%endpoint, exercise_id = %request.exercise_id, "Submitting transcript");
    let response = client
        .generate_report(&request)
        .await
        .map_err(CliError::from)?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
