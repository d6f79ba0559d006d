//! Shared saga runner: one catch boundary per operation.
//!
//! Each attempt opens a fresh [`UnitOfWork`], runs the body against its
//! [`TransactionScope`], and commits or aborts. The body races the caller's
//! cancellation signal; panics inside the body are caught and reported as
//! `Internal`. Callers only see a generic message for unexpected failures. Transient conflicts rerun the whole attempt under the supplied
//! [`RetryPolicy`].

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use tracing::{debug, error, warn};

use crate::domain::ports::{DocumentStore, RelationalStore};
use crate::domain::{AchievementProgress, Error, ErrorCode, OperationOutcome};

use super::retry::{AttemptOutcome, exhausted_error};
use super::{OperationContext, RetryPolicy, SagaSleeper, TransactionScope, UnitOfWork};

/// Successful body result: the most significant achievement outcome, if the
/// operation is achievement-bearing.
pub type SagaResult = Result<Option<AchievementProgress>, Error>;

/// Runs saga bodies inside a two-store unit of work.
pub struct SagaRunner {
    relational_store: Arc<dyn RelationalStore>,
    document_store: Arc<dyn DocumentStore>,
    sleeper: Arc<dyn SagaSleeper>,
}

impl SagaRunner {
    pub fn new(
        relational_store: Arc<dyn RelationalStore>,
        document_store: Arc<dyn DocumentStore>,
        sleeper: Arc<dyn SagaSleeper>,
    ) -> Self {
        Self {
            relational_store,
            document_store,
            sleeper,
        }
    }

    /// Run `body` as operation `operation` and project the result.
    ///
    /// `body` is invoked once per attempt with freshly opened handles.
    pub async fn run_operation<F, Fut>(
        &self,
        operation: &'static str,
        context: &OperationContext,
        policy: RetryPolicy,
        body: F,
    ) -> OperationOutcome
    where
        F: Fn(TransactionScope) -> Fut,
        Fut: Future<Output = SagaResult>,
    {
        let result = self.run_with_retry(operation, context, policy, &body).await;
        let user_id = context.user_id();
        match &result {
            Ok(achievement) => debug!(
                operation,
                user_id = %user_id,
                crossed_threshold = achievement.as_ref().is_some_and(|a| a.crossed_threshold),
                "operation committed"
            ),
            Err(failure) if failure.error().code() == ErrorCode::Internal => error!(
                operation,
                user_id = %user_id,
                message = failure.error().message(),
                "operation failed unexpectedly"
            ),
            Err(failure) => warn!(
                operation,
                user_id = %user_id,
                code = ?failure.error().code(),
                message = failure.error().message(),
                "operation rejected"
            ),
        }
        let result = result.map_err(|failure| failure.into_caller_error(operation));
        OperationOutcome::from_result(result)
    }

    async fn run_with_retry<F, Fut>(
        &self,
        operation: &'static str,
        context: &OperationContext,
        policy: RetryPolicy,
        body: &F,
    ) -> Result<Option<AchievementProgress>, SagaFailure>
    where
        F: Fn(TransactionScope) -> Fut,
        Fut: Future<Output = SagaResult>,
    {
        let mut attempt = 1;
        loop {
            let result = match self.run_attempt(operation, context, body).await {
                Ok(achievement) => Ok(achievement),
                Err(SagaFailure::Collaborator(failure)) => Err(failure),
                Err(boundary) => return Err(boundary),
            };
            match policy.classify(attempt, result) {
                AttemptOutcome::Success(achievement) => return Ok(achievement),
                AttemptOutcome::Fatal(failure) => {
                    return Err(SagaFailure::Collaborator(failure));
                }
                AttemptOutcome::Exhausted { attempts } => {
                    return Err(SagaFailure::Boundary(exhausted_error(operation, attempts)));
                }
                AttemptOutcome::RetryableConflict(conflict) => {
                    let delay = policy.delay_for(attempt);
                    warn!(
                        operation,
                        user_id = %context.user_id(),
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        message = conflict.message(),
                        "transient write conflict; retrying"
                    );
                    tokio::select! {
                        biased;
                        () = context.cancellation().cancelled() => {
                            return Err(SagaFailure::cancelled(operation));
                        }
                        () = self.sleeper.sleep(delay) => {}
                    }
                    attempt += 1;
                }
            }
        }
    }

    async fn run_attempt<F, Fut>(
        &self,
        operation: &'static str,
        context: &OperationContext,
        body: &F,
    ) -> Result<Option<AchievementProgress>, SagaFailure>
    where
        F: Fn(TransactionScope) -> Fut,
        Fut: Future<Output = SagaResult>,
    {
        if context.cancellation().is_cancelled() {
            return Err(SagaFailure::cancelled(operation));
        }

        let unit = UnitOfWork::open(
            Arc::clone(&self.relational_store),
            Arc::clone(&self.document_store),
        )
        .await
        .map_err(SagaFailure::Collaborator)?;
        let guarded = AssertUnwindSafe(body(unit.scope())).catch_unwind();

        let result = tokio::select! {
            biased;
            () = context.cancellation().cancelled() => Err(SagaFailure::cancelled(operation)),
            outcome = guarded => match outcome {
                Ok(result) => result.map_err(SagaFailure::Collaborator),
                Err(payload) => Err(SagaFailure::Collaborator(Error::internal(format!(
                    "{operation} panicked: {}",
                    panic_message(payload.as_ref())
                )))),
            },
        };

        match result {
            Ok(achievement) => {
                unit.commit().await.map_err(SagaFailure::Collaborator)?;
                Ok(achievement)
            }
            Err(failure) => {
                unit.abort().await;
                Err(failure)
            }
        }
    }
}

/// Failure leaving the retry loop, split by who raised it.
#[derive(Debug)]
enum SagaFailure {
    /// Raised by the runner itself (cancellation, exhausted retries).
    Boundary(Error),
    /// Returned by a store, collaborator or panicking body.
    Collaborator(Error),
}

impl SagaFailure {
    fn cancelled(operation: &str) -> Self {
        Self::Boundary(Error::internal(format!("{operation} was cancelled")))
    }

    fn error(&self) -> &Error {
        match self {
            Self::Boundary(error) | Self::Collaborator(error) => error,
        }
    }

    /// Error reported to the caller.
    ///
    /// Unexpected collaborator failures are replaced by a generic message;
    /// the detail stays in the operation log.
    fn into_caller_error(self, operation: &str) -> Error {
        match self {
            Self::Collaborator(error) if error.code() == ErrorCode::Internal => {
                Error::internal(format!("{operation} failed unexpectedly"))
            }
            Self::Boundary(error) | Self::Collaborator(error) => error,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        return message;
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.as_str();
    }
    "unknown panic"
}

#[cfg(test)]
#[path = "saga_tests.rs"]
mod tests;
