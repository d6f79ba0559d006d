//! Cross-store orchestration core.
//!
//! Every business operation runs as a saga over a relational transaction and
//! a document session opened together. Writes go through the domain service
//! ports with the document session, achievement evaluation runs in the
//! relational transaction, and both handles are committed (relational first)
//! or aborted together before the operation returns an [`OperationOutcome`].
//!
//! [`OperationOutcome`]: crate::domain::OperationOutcome

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    CardioService, DietService, QuestionnaireService, TrainingService, UserAccountService,
    UserStatisticsService,
};

mod achievements;
mod cardio;
mod context;
mod diet;
mod mapping;
mod registration;
mod retry;
mod runtime;
mod saga;
mod steps;
mod training;
mod unit_of_work;

pub use achievements::{
    AchievementEvaluator, CardioPrecedence, FamilyIncrement, select_most_significant,
};
pub use context::{CancellationHandle, CancellationSignal, OperationContext, cancellation_pair};
pub use retry::{
    DEFAULT_BACKOFF_STEP, DEFAULT_MAX_ATTEMPTS, RetryPolicy, SagaSleeper, TokioSleeper,
};
pub use runtime::{OrchestrationPorts, OrchestrationRuntime, OrchestratorConfig};
pub use saga::{SagaResult, SagaRunner};
pub use unit_of_work::{TransactionScope, UnitOfWork};

/// Coordinators for every orchestrated operation.
///
/// ```rust,ignore
/// let orchestrator = FitnessOrchestrator::new(ports, OrchestratorConfig::default());
/// let outcome = orchestrator
///     .log_cardio_exercise(&OperationContext::uncancellable(user_id), command)
///     .await;
/// assert!(outcome.is_success());
/// ```
pub struct FitnessOrchestrator {
    runner: SagaRunner,
    evaluator: AchievementEvaluator,
    accounts: Arc<dyn UserAccountService>,
    questionnaires: Arc<dyn QuestionnaireService>,
    cardio: Arc<dyn CardioService>,
    diet: Arc<dyn DietService>,
    training: Arc<dyn TrainingService>,
    statistics: Arc<dyn UserStatisticsService>,
    clock: Arc<dyn Clock>,
    config: OrchestratorConfig,
}

impl FitnessOrchestrator {
    /// Build an orchestrator using default runtime dependencies.
    pub fn new(ports: OrchestrationPorts, config: OrchestratorConfig) -> Self {
        Self::with_runtime(ports, OrchestrationRuntime::default(), config)
    }

    /// Build an orchestrator with injected runtime abstractions.
    pub fn with_runtime(
        ports: OrchestrationPorts,
        runtime: OrchestrationRuntime,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            runner: SagaRunner::new(ports.relational_store, ports.document_store, runtime.sleeper),
            evaluator: AchievementEvaluator::new(ports.achievements),
            accounts: ports.accounts,
            questionnaires: ports.questionnaires,
            cardio: ports.cardio,
            diet: ports.diet,
            training: ports.training,
            statistics: ports.statistics,
            clock: runtime.clock,
            config,
        }
    }
}
