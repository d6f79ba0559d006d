//! Cardio session coordinators: log and delete.

use crate::domain::{
    ActivityKind, ActivityShape, DeleteCardioExercises, Error, LogCardioExercise,
    OperationOutcome, StatisticDelta, UserId,
};

use super::mapping::map_delta_error;
use super::{FitnessOrchestrator, OperationContext, RetryPolicy, SagaResult, TransactionScope};

impl FitnessOrchestrator {
    /// Append a session, apply its statistic deltas and evaluate the
    /// cardio-type and calorie families alongside the challenge track.
    pub async fn log_cardio_exercise(
        &self,
        context: &OperationContext,
        command: LogCardioExercise,
    ) -> OperationOutcome {
        let user_id = context.user_id();
        let command = &command;
        self.runner
            .run_operation(
                "log_cardio_exercise",
                context,
                RetryPolicy::single_attempt(),
                move |scope| self.log_cardio_body(scope, user_id, command),
            )
            .await
    }

    /// Remove sessions from one day after applying the inverse of their
    /// contributions.
    pub async fn delete_cardio_exercises(
        &self,
        context: &OperationContext,
        command: DeleteCardioExercises,
    ) -> OperationOutcome {
        let user_id = context.user_id();
        let command = &command;
        self.runner
            .run_operation(
                "delete_cardio_exercises",
                context,
                RetryPolicy::single_attempt(),
                move |scope| self.delete_cardio_body(scope, user_id, command),
            )
            .await
    }

    async fn log_cardio_body(
        &self,
        scope: TransactionScope,
        user_id: &UserId,
        command: &LogCardioExercise,
    ) -> SagaResult {
        let exercise = &command.exercise;
        self.cardio
            .append_exercise(user_id, exercise, Some(scope.document()))
            .await?;

        let deltas = exercise.contribution().map_err(map_delta_error)?;
        self.statistics
            .apply_deltas(user_id, &deltas, Some(scope.document()))
            .await?;

        let increments = self.config.cardio_precedence.cardio_increments(
            exercise.kind(),
            exercise.distance_km(),
            exercise.calories_burnt(),
        );
        let activity = ActivityShape {
            kind: ActivityKind::Cardio(exercise.kind()),
            date: exercise.date(),
            quantity: exercise.distance_km(),
        };
        let outcome = self
            .evaluator
            .evaluate(user_id, &increments, Some(&activity), scope.relational())
            .await?;
        Ok(Some(outcome))
    }

    async fn delete_cardio_body(
        &self,
        scope: TransactionScope,
        user_id: &UserId,
        command: &DeleteCardioExercises,
    ) -> SagaResult {
        if command.exercise_ids.is_empty() {
            return Err(Error::model_state_not_valid(
                "at least one cardio exercise id is required",
            ));
        }

        let existing = self
            .cardio
            .find_exercises(
                user_id,
                command.date,
                &command.exercise_ids,
                Some(scope.document()),
            )
            .await?;
        if existing.is_empty() {
            return Err(Error::not_found(format!(
                "no cardio exercises matched on {}",
                command.date
            )));
        }

        let mut inverse = Vec::with_capacity(existing.len() * 4);
        for exercise in &existing {
            let contribution = exercise.contribution().map_err(map_delta_error)?;
            inverse.extend(contribution.iter().map(StatisticDelta::inverted));
        }
        self.statistics
            .apply_deltas(user_id, &inverse, Some(scope.document()))
            .await?;

        let removed = self
            .cardio
            .remove_exercises(
                user_id,
                command.date,
                &command.exercise_ids,
                Some(scope.document()),
            )
            .await?;
        if removed != existing.len() {
            return Err(Error::failed(format!(
                "expected to remove {} cardio exercises but removed {removed}",
                existing.len()
            )));
        }
        Ok(None)
    }
}
