//! Report client: validates a request, sends it, interprets the reply.

use ptcoach_core::{ExerciseMetrics, ReportRequest, ReportResponse};
use tracing::{info, warn};
use url::Url;

use crate::config::ReportClientConfig;
use crate::error::{ReportError, ReportResult};
use crate::http::{HttpBackend, ReqwestBackend};

/// Default report client using the reqwest HTTP backend.
pub type DefaultReportClient = ReportClient<ReqwestBackend>;

/// Client for the report generation endpoint.
///
/// Generic over the HTTP backend so tests can substitute a fake.
pub struct ReportClient<B: HttpBackend> {
    pub(crate) backend: B,
    pub(crate) endpoint: Url,
}

impl DefaultReportClient {
    /// Create a client for the configured endpoint.
    pub fn new(config: &ReportClientConfig) -> ReportResult<Self> {
        let endpoint = Url::parse(&config.endpoint)?;
        let backend = ReqwestBackend::new(config)?;
        Ok(Self { backend, endpoint })
    }
}

impl<B: HttpBackend> ReportClient<B> {
    /// Create a client over a custom backend.
    pub const fn with_backend(endpoint: Url, backend: B) -> Self {
        Self { backend, endpoint }
    }

    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Generate a report for one exercise session.
    ///
    /// Fails without a network call when an identifier or the transcript is
    /// missing. A 2xx reply that does not report success becomes
    /// [`ReportError::Rejected`].
    pub async fn generate(&self, request: &ReportRequest) -> ReportResult<ReportResponse> {
        validate(request)?;

        let metrics = ExerciseMetrics::extract(&request.conversation_history);
        info!(
            exercise_id = %request.exercise_id,
            messages = request.conversation_history.len(),
            sets = metrics.sets_completed,
            reps = metrics.reps_completed,
            "Requesting exercise report"
        );

        let body = serde_json::to_value(request)?;
        let reply = self.backend.post_json(&self.endpoint, &body).await?;
        let response: ReportResponse = serde_json::from_value(reply)?;

        if !response.is_success() {
            let message = response.error.clone().unwrap_or_else(|| {
                format!(
                    "unexpected status {}",
                    response.status.as_deref().unwrap_or("<missing>")
                )
            });
            warn!(exercise_id = %request.exercise_id, %message, "Report generation rejected");
            return Err(ReportError::Rejected { message });
        }

        info!(
            exercise_id = %request.exercise_id,
            report_id = response.report_id.as_deref().unwrap_or("-"),
            "Exercise report generated"
        );
        Ok(response)
    }
}

fn validate(request: &ReportRequest) -> ReportResult<()> {
    if request.patient_id.trim().is_empty()
        || request.exercise_id.trim().is_empty()
        || request.conversation_history.is_empty()
    {
        return Err(ReportError::InvalidRequest {
            message: "Missing required parameters".to_string(),
        });
    }
    Ok(())
}
