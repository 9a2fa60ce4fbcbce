//! Error types for the report client.

use thiserror::Error;

/// Errors that can occur when talking to the report backend.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The backend answered with a non-success HTTP status.
    #[error("Report request failed with status {status} ({url}): {message}")]
    ApiRequestFailed {
        status: u16,
        url: String,
        message: String,
    },

    /// The request is missing required fields and was not sent.
    #[error("Invalid report request: {message}")]
    InvalidRequest { message: String },

    /// The backend answered 2xx but did not report success.
    #[error("Report generation failed: {message}")]
    Rejected { message: String },

    /// Response could not be interpreted.
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    /// Network or transport error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

/// Result type alias for report client operations.
pub type ReportResult<T> = Result<T, ReportError>;

impl ReportError {
    /// True for failures worth retrying: server errors and transport errors.
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::ApiRequestFailed { status, .. } => *status >= 500,
            Self::Network(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_request_failed_message() {
        let err = ReportError::ApiRequestFailed {
            status: 404,
            url: "http://localhost/report".to_string(),
            message: "Exercise not found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Report request failed with status 404 (http://localhost/report): Exercise not found"
        );
    }

    #[test]
    fn test_invalid_request_message() {
        let err = ReportError::InvalidRequest {
            message: "Missing required parameters".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid report request: Missing required parameters"
        );
    }

    #[test]
    fn test_transient_classification() {
        let server = ReportError::ApiRequestFailed {
            status: 503,
            url: String::new(),
            message: String::new(),
        };
        let client = ReportError::ApiRequestFailed {
            status: 400,
            url: String::new(),
            message: String::new(),
        };
        assert!(server.is_transient());
        assert!(!client.is_transient());
        assert!(
            !ReportError::Rejected {
                message: "no".into()
            }
            .is_transient()
        );
    }
}
