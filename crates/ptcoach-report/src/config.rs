//! Configuration for the report client.

use std::time::Duration;

/// Configuration for the report client.
///
/// # Example
///
/// ```
/// use ptcoach_report::ReportClientConfig;
/// use std::time::Duration;
///
/// let config = ReportClientConfig::new("https://reports.example.com/generate_pt_report")
///     .with_timeout(Duration::from_secs(60))
///     .with_user_agent("ptcoach-ios/2.0");
/// assert_eq!(config.endpoint(), "https://reports.example.com/generate_pt_report");
/// ```
#[derive(Debug, Clone)]
pub struct ReportClientConfig {
    /// Report generation endpoint (full URL)
    pub(crate) endpoint: String,
    /// User agent string for HTTP requests
    pub(crate) user_agent: String,
    /// Request timeout
    pub(crate) timeout: Duration,
    /// Maximum number of retry attempts for transient errors
    pub(crate) max_retries: u8,
    /// Base delay for exponential backoff
    pub(crate) retry_base_delay: Duration,
}

impl ReportClientConfig {
    /// Create a configuration for `endpoint` with default settings.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            user_agent: concat!("ptcoach-report/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_base_delay: Duration::from_millis(500),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Set the user agent string for HTTP requests.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout.
    ///
    /// Defaults to 30 seconds. Report generation runs a language model on the
    /// backend, so callers on slow links may want more.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum number of retry attempts.
    ///
    /// Defaults to 3.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u8) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the base delay for exponential backoff.
    ///
    /// Defaults to 500ms.
    #[must_use]
    pub const fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ReportClientConfig::new("http://localhost:8080/report");
        assert_eq!(config.endpoint, "http://localhost:8080/report");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_base_delay, Duration::from_millis(500));
        assert!(config.user_agent.starts_with("ptcoach-report/"));
    }

    #[test]
    fn test_builder_pattern() {
        let config = ReportClientConfig::new("http://localhost/report")
            .with_user_agent("custom/1.0")
            .with_timeout(Duration::from_secs(90))
            .with_max_retries(0)
            .with_retry_base_delay(Duration::from_secs(1));

        assert_eq!(config.user_agent, "custom/1.0");
        assert_eq!(config.timeout, Duration::from_secs(90));
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.retry_base_delay, Duration::from_secs(1));
    }
}
