//! Add-daily-steps coordinator.
//!
//! Concurrent submissions for the same day race on one statistics document,
//! so this is the one operation run under the transient-conflict retry
//! policy.

use crate::domain::{
    AchievementFamily, ActivityKind, ActivityShape, AddDailySteps, OperationOutcome,
    StatisticDelta, StatisticType, UserId,
};

use super::mapping::map_delta_error;
use super::{FamilyIncrement, FitnessOrchestrator, OperationContext, SagaResult, TransactionScope};

impl FitnessOrchestrator {
    /// Record the day's absolute step count and credit the STEPS family
    /// with the increase over the previously recorded value.
    pub async fn add_daily_steps(
        &self,
        context: &OperationContext,
        command: AddDailySteps,
    ) -> OperationOutcome {
        let user_id = context.user_id();
        self.runner
            .run_operation(
                "add_daily_steps",
                context,
                self.config.steps_retry,
                move |scope| self.add_daily_steps_body(scope, user_id, command),
            )
            .await
    }

    async fn add_daily_steps_body(
        &self,
        scope: TransactionScope,
        user_id: &UserId,
        command: AddDailySteps,
    ) -> SagaResult {
        let previous = self
            .statistics
            .daily_value(
                user_id,
                StatisticType::StepsTaken,
                command.date,
                Some(scope.document()),
            )
            .await?;

        let steps = f64::from(command.steps);
        let absolute = StatisticDelta::scalar(StatisticType::StepsTaken, command.date, steps)
            .map_err(map_delta_error)?;
        self.statistics
            .replace_daily_value(user_id, &absolute, Some(scope.document()))
            .await?;

        let increase = steps - previous.value;
        let activity = ActivityShape {
            kind: ActivityKind::Steps,
            date: command.date,
            quantity: increase,
        };
        let outcome = self
            .evaluator
            .evaluate(
                user_id,
                &[FamilyIncrement::new(AchievementFamily::Steps, increase)],
                (increase > 0.0).then_some(&activity),
                scope.relational(),
            )
            .await?;
        Ok(Some(outcome))
    }
}
