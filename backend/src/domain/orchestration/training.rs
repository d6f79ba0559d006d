//! Training series coordinators.
//!
//! Adding series contributes its tonnage as a `WeightLifted` delta. Updates
//! and removals may touch several exercises at once, so instead of inverting
//! per-series deltas they recompute the whole day's tonnage and write it as
//! an absolute replacement.

use chrono::NaiveDate;

use crate::domain::training::{TRAINING_STATISTIC, validate_new_series};
use crate::domain::{
    AchievementFamily, ActivityKind, ActivityShape, AddTrainingSeries, Error, OperationOutcome,
    RecomputedDay, RemoveTrainingSeries, StatisticDelta, TrainingSeries, UpdateTrainingSeries,
    UserId,
};

use super::mapping::{map_delta_error, map_series_error};
use super::{
    FamilyIncrement, FitnessOrchestrator, OperationContext, RetryPolicy, SagaResult,
    TransactionScope,
};

impl FitnessOrchestrator {
    /// Append series to one exercise and credit the STRENGTH family.
    pub async fn add_training_series(
        &self,
        context: &OperationContext,
        command: AddTrainingSeries,
    ) -> OperationOutcome {
        let user_id = context.user_id();
        let command = &command;
        self.runner
            .run_operation(
                "add_training_series",
                context,
                RetryPolicy::single_attempt(),
                move |scope| self.add_series_body(scope, user_id, command),
            )
            .await
    }

    /// Edit series across the day's exercises and recompute the day total.
    pub async fn update_training_series(
        &self,
        context: &OperationContext,
        command: UpdateTrainingSeries,
    ) -> OperationOutcome {
        let user_id = context.user_id();
        let command = &command;
        self.runner
            .run_operation(
                "update_training_series",
                context,
                RetryPolicy::single_attempt(),
                move |scope| self.update_series_body(scope, user_id, command),
            )
            .await
    }

    /// Remove series across the day's exercises and recompute the day total.
    pub async fn remove_training_series(
        &self,
        context: &OperationContext,
        command: RemoveTrainingSeries,
    ) -> OperationOutcome {
        let user_id = context.user_id();
        let command = &command;
        self.runner
            .run_operation(
                "remove_training_series",
                context,
                RetryPolicy::single_attempt(),
                move |scope| self.remove_series_body(scope, user_id, command),
            )
            .await
    }

    async fn add_series_body(
        &self,
        scope: TransactionScope,
        user_id: &UserId,
        command: &AddTrainingSeries,
    ) -> SagaResult {
        validate_new_series(&command.series).map_err(map_series_error)?;
        self.training
            .append_series(user_id, command, Some(scope.document()))
            .await?;

        let tonnage: f64 = command.series.iter().map(TrainingSeries::tonnage).sum();
        let delta = StatisticDelta::scalar(TRAINING_STATISTIC, command.date, tonnage)
            .map_err(map_delta_error)?;
        self.statistics
            .apply_deltas(user_id, &[delta], Some(scope.document()))
            .await?;

        let activity = ActivityShape {
            kind: ActivityKind::Training,
            date: command.date,
            quantity: tonnage,
        };
        let outcome = self
            .evaluator
            .evaluate(
                user_id,
                &[FamilyIncrement::new(AchievementFamily::Strength, tonnage)],
                Some(&activity),
                scope.relational(),
            )
            .await?;
        Ok(Some(outcome))
    }

    async fn update_series_body(
        &self,
        scope: TransactionScope,
        user_id: &UserId,
        command: &UpdateTrainingSeries,
    ) -> SagaResult {
        let day = self
            .training
            .training_day(user_id, command.date, Some(scope.document()))
            .await?;
        let recomputed = day
            .apply_updates(&command.updates)
            .map_err(map_series_error)?;
        self.write_recomputed_day(scope, user_id, command.date, &recomputed)
            .await?;
        Ok(None)
    }

    async fn remove_series_body(
        &self,
        scope: TransactionScope,
        user_id: &UserId,
        command: &RemoveTrainingSeries,
    ) -> SagaResult {
        let day = self
            .training
            .training_day(user_id, command.date, Some(scope.document()))
            .await?;
        let recomputed = day
            .apply_removals(&command.removals)
            .map_err(map_series_error)?;
        self.write_recomputed_day(scope, user_id, command.date, &recomputed)
            .await?;
        Ok(None)
    }

    async fn write_recomputed_day(
        &self,
        scope: TransactionScope,
        user_id: &UserId,
        date: NaiveDate,
        recomputed: &RecomputedDay,
    ) -> Result<(), Error> {
        self.training
            .replace_exercises(user_id, date, &recomputed.changed, Some(scope.document()))
            .await?;
        let total = StatisticDelta::scalar(TRAINING_STATISTIC, date, recomputed.total_tonnage)
            .map_err(map_delta_error)?;
        self.statistics
            .replace_daily_value(user_id, &total, Some(scope.document()))
            .await?;
        Ok(())
    }
}
