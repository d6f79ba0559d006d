//! Bounded retry of whole saga attempts under transient write conflicts.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::Error;

/// Attempts made when no override is configured, including the first.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Backoff step multiplied by the attempt number between attempts.
pub const DEFAULT_BACKOFF_STEP: Duration = Duration::from_millis(50);

/// Attempt bound plus linear backoff between attempts.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use fitness_saga::domain::orchestration::RetryPolicy;
///
/// let policy = RetryPolicy::default();
/// assert_eq!(policy.max_attempts(), 3);
/// assert_eq!(policy.delay_for(2), Duration::from_millis(100));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BACKOFF_STEP)
    }
}

impl RetryPolicy {
    /// Attempt bounds below one are raised to one.
    pub fn new(max_attempts: u32, backoff_step: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_step,
        }
    }

    /// Policy for operations that are never retried.
    pub fn single_attempt() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn retries(&self) -> bool {
        self.max_attempts > 1
    }

    /// Delay slept after failed attempt `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff_step.saturating_mul(attempt)
    }

    /// Classify one attempt's result.
    pub(crate) fn classify<T>(&self, attempt: u32, result: Result<T, Error>) -> AttemptOutcome<T> {
        match result {
            Ok(value) => AttemptOutcome::Success(value),
            Err(error) if error.is_transient_conflict() && attempt < self.max_attempts => {
                AttemptOutcome::RetryableConflict(error)
            }
            Err(error) if error.is_transient_conflict() && self.retries() => {
                AttemptOutcome::Exhausted { attempts: attempt }
            }
            Err(error) => AttemptOutcome::Fatal(error),
        }
    }
}

/// Result of classifying one attempt.
#[derive(Debug, PartialEq)]
pub(crate) enum AttemptOutcome<T> {
    Success(T),
    RetryableConflict(Error),
    Exhausted { attempts: u32 },
    Fatal(Error),
}

/// Error surfaced once the attempt bound is spent on transient conflicts.
pub(crate) fn exhausted_error(operation: &str, attempts: u32) -> Error {
    Error::internal(format!(
        "{operation} failed after {attempts} attempts due to transient write conflicts"
    ))
}

/// Async sleeping abstraction for retry backoff.
#[async_trait]
pub trait SagaSleeper: Send + Sync {
    /// Suspend execution for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Tokio-based sleeper implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl SagaSleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
