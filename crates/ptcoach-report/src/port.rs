//! Port trait implementations for `ReportClient` and `ExerciseClient`.

use async_trait::async_trait;
use ptcoach_core::{
    AddCustomExerciseRequest, AssignedExercise, ExerciseBackendPort, ExercisePlan,
    ExercisePortError, GenerateExercisesRequest, ModifyExerciseRequest, OnboardedPatient,
    PatientProfile, ReportBackendPort, ReportPortError, ReportRequest, ReportResponse,
};

use crate::client::ReportClient;
use crate::error::ReportError;
use crate::exercise::ExerciseClient;
use crate::http::HttpBackend;

/// Convert internal `ReportError` to core `ReportPortError`.
fn map_error(err: ReportError) -> ReportPortError {
    match err {
        ReportError::ApiRequestFailed {
            status, message, ..
        } => {
            if (400..500).contains(&status) {
                ReportPortError::InvalidRequest(message)
            } else {
                ReportPortError::Backend(format!("status {status}: {message}"))
            }
        }
        ReportError::InvalidRequest { message } => ReportPortError::InvalidRequest(message),
        ReportError::Rejected { message } | ReportError::InvalidResponse { message } => {
            ReportPortError::Backend(message)
        }
        ReportError::Network(e) => ReportPortError::Unreachable(e.to_string()),
        ReportError::InvalidUrl(e) => ReportPortError::Unreachable(format!("bad endpoint: {e}")),
        ReportError::JsonParse(e) => ReportPortError::Backend(e.to_string()),
    }
}

/// Same classification as [`map_error`], in the exercise port's terms.
fn map_exercise_error(err: ReportError) -> ExercisePortError {
    match map_error(err) {
        ReportPortError::InvalidRequest(message) => ExercisePortError::InvalidRequest(message),
        ReportPortError::Backend(message) => ExercisePortError::Backend(message),
        ReportPortError::Unreachable(message) => ExercisePortError::Unreachable(message),
    }
}

#[async_trait]
impl<B: HttpBackend> ReportBackendPort for ReportClient<B> {
    async fn generate_report(
        &self,
        request: &ReportRequest,
    ) -> Result<ReportResponse, ReportPortError> {
        self.generate(request).await.map_err(map_error)
    }
}

#[async_trait]
impl<B: HttpBackend> ExerciseBackendPort for ExerciseClient<B> {
    async fn onboard_patient(
        &self,
        profile: &PatientProfile,
    ) -> Result<OnboardedPatient, ExercisePortError> {
        self.onboard(profile).await.map_err(map_exercise_error)
    }

    async fn generate_exercises(
        &self,
        request: &GenerateExercisesRequest,
    ) -> Result<ExercisePlan, ExercisePortError> {
        ExerciseClient::generate_exercises(self, request)
            .await
            .map_err(map_exercise_error)
    }

    async fn modify_exercise(
        &self,
        request: &ModifyExerciseRequest,
    ) -> Result<AssignedExercise, ExercisePortError> {
        ExerciseClient::modify_exercise(self, request)
            .await
            .map_err(map_exercise_error)
    }

    async fn add_custom_exercise(
        &self,
        request: &AddCustomExerciseRequest,
    ) -> Result<AssignedExercise, ExercisePortError> {
        ExerciseClient::add_custom_exercise(self, request)
            .await
            .map_err(map_exercise_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::FakeBackend;
    use ptcoach_core::ConversationMessage;
    use std::sync::Arc;
    use url::Url;

    fn api_error(status: u16) -> ReportError {
        ReportError::ApiRequestFailed {
            status,
            url: "http://localhost/report".into(),
            message: "Exercise not found".into(),
        }
    }

    #[test]
    fn test_map_error_by_status() {
        assert!(matches!(
            map_error(api_error(404)),
            ReportPortError::InvalidRequest(m) if m == "Exercise not found"
        ));
        assert!(matches!(
            map_error(api_error(502)),
            ReportPortError::Backend(m) if m == "status 502: Exercise not found"
        ));
        assert!(matches!(
            map_error(ReportError::Rejected {
                message: "nope".into()
            }),
            ReportPortError::Backend(_)
        ));
    }

    #[tokio::test]
    async fn test_usable_as_port_object() {
        let backend = FakeBackend::new().with_reply(Err(api_error(400)));
        let client = ReportClient::with_backend(
            Url::parse("http://localhost/report").unwrap(),
            backend,
        );
        let port: Arc<dyn ReportBackendPort> = Arc::new(client);

        let request = ReportRequest {
            patient_id: "p".into(),
            exercise_id: "e".into(),
            conversation_history: vec![ConversationMessage::user("hi")],
        };
        let err = port.generate_report(&request).await.unwrap_err();
        assert!(matches!(err, ReportPortError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_exercise_client_usable_as_port_object() {
        let backend = FakeBackend::new()
            .with_reply(Err(api_error(404)))
            .with_reply(Err(ReportError::ApiRequestFailed {
                status: 503,
                url: "http://localhost/generate_exercises".into(),
                message: "Service Unavailable".into(),
            }));
        let client = ExerciseClient::with_backend("http://localhost/", backend).unwrap();
        let port: Arc<dyn ExerciseBackendPort> = Arc::new(client);
        let request = GenerateExercisesRequest::for_patient("p-1");

        let err = port.generate_exercises(&request).await.unwrap_err();
        assert!(matches!(err, ExercisePortError::InvalidRequest(m) if m == "Exercise not found"));

        let err = port.generate_exercises(&request).await.unwrap_err();
        assert!(matches!(err, ExercisePortError::Backend(m) if m.starts_with("status 503")));
    }
}
