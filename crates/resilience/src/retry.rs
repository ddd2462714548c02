// crates/resilience/src/retry.rs
//! Retry policies with exponential backoff

use crate::error::ResilienceError;
use std::future::Future;
use std::time::Duration;

/// Retry policy configuration
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first attempt)
    max_attempts: usize,
    /// Initial delay between retries
    initial_delay: Duration,
    /// Maximum delay between retries
    max_delay: Duration,
    /// Backoff multiplier
    multiplier: f64,
    /// Whether to use jitter
    use_jitter: bool,
}

impl RetryPolicy {
    /// Creates a new retry policy
    pub fn new(max_attempts: usize) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
            use_jitter: true,
        }
    }

    /// A policy that tries exactly once
    pub fn no_retry() -> Self {
        Self::new(1)
    }

    /// Sets the initial delay
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the maximum delay
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the backoff multiplier
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Sets whether to use jitter
    pub fn with_jitter(mut self, use_jitter: bool) -> Self {
        self.use_jitter = use_jitter;
        self
    }

    /// Calculates the delay before retrying after the given (1-based) attempt
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        if attempt == 0 {
            return Duration::from_secs(0);
        }

        let base_delay = self.initial_delay.as_millis() as f64
            * self.multiplier.powi((attempt - 1) as i32);

        let capped_delay = base_delay.min(self.max_delay.as_millis() as f64);

        let final_delay = if self.use_jitter {
            // Up to 25% jitter, deterministic per attempt
            let jitter_factor = 0.75 + (attempt as f64 * 0.1 % 0.25);
            capped_delay * jitter_factor
        } else {
            capped_delay
        };

        Duration::from_millis(final_delay as u64)
    }

    /// Returns the maximum number of attempts
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

/// A retry loop that gave up
#[derive(Debug)]
pub struct RetryError<E> {
    /// The error from the final attempt
    pub last_error: E,
    /// Attempts made, including the first
    pub attempts: usize,
    /// True when every allowed attempt failed; false when a non-retryable error stopped the loop
    pub exhausted: bool,
}

impl<E> RetryError<E> {
    /// Discards the attempt bookkeeping
    pub fn into_inner(self) -> E {
        self.last_error
    }
}

impl<E: std::fmt::Display> From<RetryError<E>> for ResilienceError {
    fn from(err: RetryError<E>) -> Self {
        if err.exhausted {
            ResilienceError::RetriesExhausted {
                attempts: err.attempts,
                last_error: err.last_error.to_string(),
            }
        } else {
            ResilienceError::Aborted {
                attempts: err.attempts,
                error: err.last_error.to_string(),
            }
        }
    }
}

/// Runs an async operation, retrying failures that `is_retryable` accepts
///
/// Sleeps between attempts according to the policy's backoff.
pub async fn retry_async<F, Fut, T, E, P>(
    policy: &RetryPolicy,
    is_retryable: P,
    mut operation: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if !is_retryable(&e) {
                    return Err(RetryError {
                        last_error: e,
                        attempts: attempt,
                        exhausted: false,
                    });
                }

                if attempt >= policy.max_attempts() {
                    return Err(RetryError {
                        last_error: e,
                        attempts: attempt,
                        exhausted: true,
                    });
                }

                let delay = policy.delay_for_attempt(attempt);
                log::debug!(
                    "Attempt {}/{} failed: {}; retrying in {:?}",
                    attempt,
                    policy.max_attempts(),
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
