//! Retry policy with exponential backoff for transient install failures

use std::time::Duration;

/// Configuration for retrying a package install.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub base_delay: Duration,
    /// Multiplier applied for every further attempt
    pub backoff_factor: f64,
    /// Upper bound for a single delay
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            backoff_factor: 2.0,
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    /// Create a retry config with custom settings.
    pub fn new(max_attempts: u32, base_delay: Duration, backoff_factor: f64) -> Self {
        Self {
            max_attempts,
            base_delay,
            backoff_factor,
            ..Default::default()
        }
    }

    /// Delay to wait after the given failed attempt (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self.base_delay.as_secs_f64() * self.backoff_factor.powi(attempt as i32);
        let capped = delay.min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(capped)
    }

    /// A config that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Retries immediately; meant for tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            backoff_factor: 1.0,
            max_delay: Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allows_three_attempts() {
        assert_eq!(RetryConfig::default().max_attempts, 3);
        assert_eq!(RetryConfig::no_retry().max_attempts, 1);
    }

    #[test]
    fn test_delay_increases() {
        let config = RetryConfig::new(3, Duration::from_secs(2), 2.0);
        assert_eq!(config.delay_for_attempt(0), Duration::from_secs(2));
        assert_eq!(config.delay_for_attempt(1), Duration::from_secs(4));
        assert_eq!(config.delay_for_attempt(2), Duration::from_secs(8));
    }

    #[test]
    fn test_delay_is_capped() {
        let config = RetryConfig::new(10, Duration::from_secs(10), 3.0);
        assert_eq!(config.delay_for_attempt(5), Duration::from_secs(30));
    }

    #[test]
    fn test_immediate_has_no_delay() {
        let config = RetryConfig::immediate(3);
        assert_eq!(config.delay_for_attempt(2), Duration::ZERO);
    }
}
