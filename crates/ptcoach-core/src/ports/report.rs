//! Report backend port: turns a session transcript into a therapy report.
//!
//! DTOs here mirror the backend's JSON wire shape (`snake_case` keys).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ConversationMessage;

/// Body of a report-generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub patient_id: String,
    pub exercise_id: String,
    pub conversation_history: Vec<ConversationMessage>,
}

/// Report generated for one exercise session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExerciseReport {
    pub general_feeling: String,
    pub performance_quality: String,
    pub pain_report: String,
    pub completed: bool,
    pub sets_completed: u32,
    pub reps_completed: u32,
    pub day_streak: u32,
    pub motivational_message: String,
}

/// Response envelope: a status plus either a report or an error string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportResponse {
    pub status: Option<String>,
    pub report_id: Option<String>,
    pub report: Option<ExerciseReport>,
    pub error: Option<String>,
}

impl ReportResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success") && self.error.is_none()
    }
}

/// Errors returned by report backend operations.
#[derive(Debug, Error)]
pub enum ReportPortError {
    /// The request was rejected before or by the backend (missing ids, 4xx).
    #[error("Invalid report request: {0}")]
    InvalidRequest(String),

    /// The backend answered with an error payload or status.
    #[error("Report backend error: {0}")]
    Backend(String),

    /// Network failure after all retries.
    #[error("Report backend unreachable: {0}")]
    Unreachable(String),
}

#[async_trait]
pub trait ReportBackendPort: Send + Sync {
    async fn generate_report(
        &self,
        request: &ReportRequest,
    ) -> Result<ReportResponse, ReportPortError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_parses_success_payload() {
        let json = r#"{
            "status": "success",
            "report_id": "r1",
            "report": {"completed": true, "sets_completed": 3, "motivational_message": "Great"}
        }"#;
        let response: ReportResponse = serde_json::from_str(json).unwrap();
        assert!(response.is_success());
        let report = response.report.unwrap();
        assert_eq!(report.sets_completed, 3);
        assert!(report.completed);
        assert_eq!(report.motivational_message, "Great");
    }

    #[test]
    fn response_parses_error_payload() {
        let response: ReportResponse =
            serde_json::from_str(r#"{"error": "Exercise not found"}"#).unwrap();
        assert!(!response.is_success());
        assert_eq!(response.error.as_deref(), Some("Exercise not found"));
    }

    #[test]
    fn request_uses_snake_case_wire_keys() {
        let request = ReportRequest {
            patient_id: "p".into(),
            exercise_id: "e".into(),
            conversation_history: vec![ConversationMessage::user("done")],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["conversation_history"][0]["role"], "user");
        assert_eq!(json["patient_id"], "p");
    }
}
