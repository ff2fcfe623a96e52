//! Bounded retry with exponential backoff
//!
//! The policy is a plain value passed to the catalog, so callers and tests can
//! swap the production schedule (3 attempts, 1s then 2s) for an immediate one.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Retry schedule for remote calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first try
    pub max_attempts: u32,
    /// Delay before the first retry
    #[serde(with = "millis")]
    pub base_delay: Duration,
    /// Factor applied to the delay after every retry
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            multiplier: 2.0,
        }
    }
}

/// Result of a retried operation
#[derive(Debug)]
pub enum RetryOutcome<T, E> {
    /// The operation succeeded
    Success {
        result: T,
        /// Total attempts made (1 = first try succeeded)
        attempts: u32,
    },
    /// Retries exhausted or a non-retryable error occurred
    Exhausted { last_error: E, attempts: u32 },
}

impl<T, E> RetryOutcome<T, E> {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryOutcome::Success { attempts, .. } | RetryOutcome::Exhausted { attempts, .. } => {
                *attempts
            }
        }
    }

    pub fn into_result(self) -> Result<T, E> {
        match self {
            RetryOutcome::Success { result, .. } => Ok(result),
            RetryOutcome::Exhausted { last_error, .. } => Err(last_error),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, multiplier: f64) -> Self {
        Self {
            max_attempts,
            base_delay,
            multiplier,
        }
    }

    /// Same attempt budget, no sleeping between attempts
    pub fn immediate() -> Self {
        Self {
            base_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Delay after the given failed attempt (0-indexed)
    ///
    /// Formula: `base_delay * multiplier^attempt`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.max(1.0).powi(attempt.min(i32::MAX as u32) as i32);
        let secs = self.base_delay.as_secs_f64() * factor;
        if secs.is_finite() {
            Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
        } else {
            Duration::MAX
        }
    }

    /// Run `operation` until it succeeds, the budget runs out, or
    /// `should_retry` rejects an error. Blocks the calling thread while
    /// backing off.
    pub fn run<F, T, E, P>(&self, mut operation: F, should_retry: P) -> RetryOutcome<T, E>
    where
        F: FnMut() -> Result<T, E>,
        P: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let max = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            match operation() {
                Ok(result) => {
                    return RetryOutcome::Success {
                        result,
                        attempts: attempt + 1,
                    };
                }
                Err(err) => {
                    let is_last = attempt + 1 >= max;
                    if is_last || !should_retry(&err) {
                        return RetryOutcome::Exhausted {
                            last_error: err,
                            attempts: attempt + 1,
                        };
                    }

                    let delay = self.delay_for(attempt);
                    debug!(
                        attempt = attempt + 1,
                        max_attempts = max,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Retrying after failure"
                    );
                    if !delay.is_zero() {
                        std::thread::sleep(delay);
                    }
                    attempt += 1;
                }
            }
        }
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
