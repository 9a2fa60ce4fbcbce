//! Exponential reconnection backoff.
//!
//! Attempt `k` (0-indexed) fires `base^k` time units after the failure that
//! scheduled it. Once `max_attempts` attempts have been scheduled the policy
//! yields `None` and the caller gives up.

use std::time::Duration;

/// Backoff schedule for transport-failure reconnects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconnectPolicy {
    /// Exponential base (>= 1.0).
    pub base: f64,
    /// Length of one time unit.
    pub unit: Duration,
    /// Attempt ceiling.
    pub max_attempts: u32,
}

impl ReconnectPolicy {
    #[must_use]
    pub const fn new(base: f64, unit: Duration, max_attempts: u32) -> Self {
        Self {
            base,
            unit,
            max_attempts,
        }
    }

    /// Delay before attempt `attempt`, or `None` once the ceiling is reached.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }
        let factor = self.base.max(1.0).powf(f64::from(attempt));
        Some(
            Duration::try_from_secs_f64(self.unit.as_secs_f64() * factor)
                .unwrap_or(Duration::MAX),
        )
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(2.0, Duration::from_secs(1), 3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_grow_as_powers_of_base() {
        let policy = ReconnectPolicy::new(2.0, Duration::from_millis(100), 4);
        let delays: Vec<_> = (0..4).filter_map(|k| policy.delay_for(k)).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(400),
                Duration::from_millis(800),
            ]
        );
    }

    #[test]
    fn ceiling_stops_retries() {
        let policy = ReconnectPolicy::new(2.0, Duration::from_secs(1), 3);
        assert!(policy.delay_for(2).is_some());
        assert_eq!(policy.delay_for(3), None);
        assert_eq!(policy.delay_for(10), None);
    }

    #[test]
    fn zero_attempts_never_retries() {
        let policy = ReconnectPolicy::new(2.0, Duration::from_secs(1), 0);
        assert_eq!(policy.delay_for(0), None);
    }

    #[test]
    fn huge_exponent_saturates() {
        let policy = ReconnectPolicy::new(10.0, Duration::from_secs(1), 1000);
        assert_eq!(policy.delay_for(999), Some(Duration::MAX));
    }
}
