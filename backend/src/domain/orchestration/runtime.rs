//! Port and runtime dependency bundles for the orchestrator.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use crate::domain::ports::{
    AchievementEngine, CardioService, DietService, DocumentStore, QuestionnaireService,
    RelationalStore, TrainingService, UserAccountService, UserStatisticsService,
};

use super::{CardioPrecedence, RetryPolicy, SagaSleeper, TokioSleeper};

/// Port bundle required by the orchestrator.
#[derive(Clone)]
pub struct OrchestrationPorts {
    /// Relational store transactions (identity, achievements).
    pub relational_store: Arc<dyn RelationalStore>,
    /// Document store sessions (per-user time series).
    pub document_store: Arc<dyn DocumentStore>,
    pub accounts: Arc<dyn UserAccountService>,
    pub questionnaires: Arc<dyn QuestionnaireService>,
    pub cardio: Arc<dyn CardioService>,
    pub diet: Arc<dyn DietService>,
    pub training: Arc<dyn TrainingService>,
    pub statistics: Arc<dyn UserStatisticsService>,
    /// Achievement engine; every call enlists in the relational transaction.
    pub achievements: Arc<dyn AchievementEngine>,
}

/// Runtime helpers used by the saga runner and coordinators.
pub struct OrchestrationRuntime {
    /// Async sleep implementation for retry backoff.
    pub sleeper: Arc<dyn SagaSleeper>,
    /// Time source for timestamps written by coordinators.
    pub clock: Arc<dyn Clock>,
}

impl Default for OrchestrationRuntime {
    fn default() -> Self {
        Self {
            sleeper: Arc::new(TokioSleeper),
            clock: Arc::new(DefaultClock),
        }
    }
}

/// Behavioural knobs for the orchestrator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Retry policy for the add-daily-steps operation.
    pub steps_retry: RetryPolicy,
    /// Order of cardio-type and calorie families.
    pub cardio_precedence: CardioPrecedence,
}
