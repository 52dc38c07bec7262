//! Retry logic with exponential backoff for transient transport errors.
//!
//! Only the HTTP client retries. The reconciliation core never does.

use crate::error::{Error, Result};
use std::thread;
use std::time::Duration;

/// Configuration for retry behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,
    /// Base delay between retries
    pub base_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_factor: f64,
    /// Maximum delay between retries
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            backoff_factor: 2.0,
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryConfig {
    /// Create a config with `max_attempts` and default delays.
    pub fn attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Calculate the delay for a given attempt number (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self.base_delay.as_secs_f64() * self.backoff_factor.powi(attempt as i32);
        let capped = delay.min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(capped)
    }

    /// Create a config that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }
}

/// Execute an operation, retrying retryable errors with exponential backoff.
///
/// Non-retryable errors are returned immediately; after the last attempt
/// the last error is returned.
pub fn with_retry<T, F>(config: &RetryConfig, what: &str, mut operation: F) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    let mut last_error: Option<Error> = None;

    for attempt in 0..config.max_attempts {
        match operation() {
            Ok(result) => return Ok(result),
            Err(e) => {
                if !e.is_retryable() || attempt + 1 >= config.max_attempts {
                    return Err(e);
                }

                let delay = config.delay_for_attempt(attempt);
                log::warn!(
                    "{} failed (attempt {}/{}): {}. Retrying in {:?}",
                    what,
                    attempt + 1,
                    config.max_attempts,
                    e,
                    delay
                );
                thread::sleep(delay);

                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| Error::http("retry exhausted", None)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn fast(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            base_delay: Duration::from_millis(1),
            backoff_factor: 1.0,
            max_delay: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_delay_for_attempt() {
        let config = RetryConfig {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            backoff_factor: 2.0,
            max_delay: Duration::from_secs(5),
        };
        assert_eq!(config.delay_for_attempt(0), Duration::from_secs(1));
        assert_eq!(config.delay_for_attempt(1), Duration::from_secs(2));
        assert_eq!(config.delay_for_attempt(2), Duration::from_secs(4));
        assert_eq!(config.delay_for_attempt(3), Duration::from_secs(5));
    }

    #[test]
    fn test_with_retry_success_first_try() {
        let result = with_retry(&RetryConfig::no_retry(), "op", || Ok::<_, Error>(42));
        assert_eq!(result.unwrap(), 42);
    }

    #[test]
    fn test_with_retry_client_error_not_retried() {
        let attempts = Cell::new(0);
        let result: Result<()> = with_retry(&fast(3), "op", || {
            attempts.set(attempts.get() + 1);
            Err(Error::http("bad request", Some(400)))
        });
        assert!(result.is_err());
        assert_eq!(attempts.get(), 1);
    }

    #[test]
    fn test_with_retry_eventual_success() {
        let attempts = Cell::new(0);
        let result = with_retry(&fast(3), "op", || {
            let current = attempts.get();
            attempts.set(current + 1);
            if current < 2 {
                Err(Error::http("unavailable", Some(503)))
            } else {
                Ok("done")
            }
        });
        assert_eq!(result.unwrap(), "done");
        assert_eq!(attempts.get(), 3);
    }

    #[test]
    fn test_with_retry_all_attempts_fail() {
        let attempts = Cell::new(0);
        let result: Result<()> = with_retry(&fast(3), "op", || {
            attempts.set(attempts.get() + 1);
            Err(Error::http("timeout", None))
        });
        assert_eq!(result.unwrap_err().status(), None);
        assert_eq!(attempts.get(), 3);
    }

    #[test]
    fn test_attempts_never_zero() {
        assert_eq!(RetryConfig::attempts(0).max_attempts, 1);
    }
}
