//! HTTP backend abstraction for the report endpoint.
//!
//! The production implementation uses reqwest with automatic retry for
//! transient errors; tests substitute a fake or a mockall double.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::ReportClientConfig;
use crate::error::{ReportError, ReportResult};

// ============================================================================
// HTTP Backend Trait
// ============================================================================

/// Trait for HTTP backends that can POST a JSON body and return a JSON reply.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpBackend: Send + Sync {
    async fn post_json(&self, url: &Url, body: &Value) -> ReportResult<Value>;
}

// ============================================================================
// Reqwest Backend
// ============================================================================

/// Production HTTP backend using reqwest with retry logic.
pub struct ReqwestBackend {
    client: reqwest::Client,
    max_retries: u8,
    retry_base_delay: Duration,
}

impl ReqwestBackend {
    pub fn new(config: &ReportClientConfig) -> ReportResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
            retry_base_delay: config.retry_base_delay,
        })
    }

    async fn post_once(&self, url: &Url, body: &Value) -> ReportResult<Value> {
        let response = self.client.post(url.as_str()).json(body).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let text = response.text().await.unwrap_or_default();
        Err(ReportError::ApiRequestFailed {
            status: status.as_u16(),
            url: url.to_string(),
            message: error_message(&text, status.canonical_reason()),
        })
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn post_json(&self, url: &Url, body: &Value) -> ReportResult<Value> {
        retry_with_backoff(self.max_retries, self.retry_base_delay, |_| {
            self.post_once(url, body)
        })
        .await
    }
}

/// Run `attempt` up to `max_retries + 1` times.
///
/// Transient failures (5xx, network) are retried after `base * 2^(n-1)`;
/// anything else is returned immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u8,
    base_delay: Duration,
    mut attempt: F,
) -> ReportResult<T>
where
    F: FnMut(u8) -> Fut,
    Fut: Future<Output = ReportResult<T>>,
{
    let mut last_error: Option<ReportError> = None;

    for n in 0..=max_retries {
        if n > 0 {
            let delay = base_delay.saturating_mul(2u32.saturating_pow(u32::from(n) - 1));
            debug!(
                attempt = n,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "Retrying report request"
            );
            tokio::time::sleep(delay).await;
        }

        match attempt(n).await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && n < max_retries => {
                warn!(attempt = n, error = %e, "Transient report backend failure");
                last_error = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_error.unwrap_or_else(|| ReportError::InvalidResponse {
        message: "Unknown error during report request".to_string(),
    }))
}

/// Pull a readable message out of an error body.
///
/// The backend answers failures with `{"error": "..."}`; anything else is
/// passed through, falling back to the HTTP reason phrase.
fn error_message(body: &str, reason: Option<&str>) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        if let Some(Value::String(error)) = map.get("error") {
            return error.clone();
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        reason.unwrap_or("unknown error").to_string()
    } else {
        trimmed.to_string()
    }
}

// ============================================================================
// Fake Backend for Testing
// ============================================================================


#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::time::Instant;

    fn server_error() -> ReportError {
        ReportError::ApiRequestFailed {
            status: 500,
            url: "http://localhost/report".to_string(),
            message: "boom".to_string(),
        }
    }

    fn client_error() -> ReportError {
        ReportError::ApiRequestFailed {
            status: 400,
            url: "http://localhost/report".to_string(),
            message: "Missing required parameters".to_string(),
        }
    }

    /// Replays `script` and records when each attempt ran.
    async fn run_script(
        max_retries: u8,
        script: Vec<ReportResult<u32>>,
    ) -> (ReportResult<u32>, Vec<Duration>) {
        let script = Mutex::new(VecDeque::from(script));
        let times = Mutex::new(Vec::new());
        let start = Instant::now();
        let result = retry_with_backoff(max_retries, Duration::from_millis(500), |_| {
            times.lock().unwrap().push(start.elapsed());
            let next = script.lock().unwrap().pop_front().unwrap();
            async move { next }
        })
        .await;
        (result, times.into_inner().unwrap())
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_errors_retry_with_exponential_backoff() {
        let (result, times) =
            run_script(3, vec![Err(server_error()), Err(server_error()), Ok(7)]).await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(
            times,
            vec![
                Duration::ZERO,
                Duration::from_millis(500),
                Duration::from_millis(1500),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_client_error_fails_immediately() {
        let (result, times) = run_script(3, vec![Err(client_error()), Ok(1)]).await;

        assert!(matches!(
            result,
            Err(ReportError::ApiRequestFailed { status: 400, .. })
        ));
        assert_eq!(times.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_retries() {
        let script = (0..3).map(|_| Err(server_error())).collect();
        let (result, times) = run_script(2, script).await;

        assert!(matches!(
            result,
            Err(ReportError::ApiRequestFailed { status: 500, .. })
        ));
        assert_eq!(times.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_makes_one_attempt() {
        let (result, times) = run_script(0, vec![Err(server_error())]).await;
        assert!(result.is_err());
        assert_eq!(times, vec![Duration::ZERO]);
    }

    #[test]
    fn test_error_message_prefers_error_field() {
        assert_eq!(
            error_message(r#"{"error": "Exercise not found"}"#, Some("Not Found")),
            "Exercise not found"
        );
        assert_eq!(error_message("  upstream down\n", None), "upstream down");
        assert_eq!(error_message("", Some("Bad Gateway")), "Bad Gateway");
        assert_eq!(error_message(r#"{"detail": 1}"#, None), r#"{"detail": 1}"#);
    }

    #[test]
    fn test_reqwest_backend_creation() {
        let config = ReportClientConfig::new("http://localhost/report").with_max_retries(1);
        let backend = ReqwestBackend::new(&config).unwrap();
        assert_eq!(backend.max_retries, 1);
        assert_eq!(backend.retry_base_delay, Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_fake_backend_replays_script() {
        use serde_json::json;
        use testing::FakeBackend;

        let backend = FakeBackend::new().with_reply(Ok(json!({"status": "success"})));
        let url = Url::parse("http://localhost/report").unwrap();

        let first = backend.post_json(&url, &json!({"a": 1})).await.unwrap();
        assert_eq!(first["status"], "success");
        assert!(matches!(
            backend.post_json(&url, &json!({})).await,
            Err(ReportError::ApiRequestFailed { status: 404, .. })
        ));
        assert_eq!(backend.bodies.lock().unwrap().len(), 2);
    }
}
