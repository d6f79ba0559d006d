//! Publish-meal coordinator.

use crate::domain::{
    AchievementFamily, ActivityKind, ActivityShape, OperationOutcome, PublishMeal, PublishedMeal,
    UserId,
};

use super::{
    FamilyIncrement, FitnessOrchestrator, OperationContext, RetryPolicy, SagaResult,
    TransactionScope,
};

impl FitnessOrchestrator {
    /// Insert the meal document and count it toward the COOK family.
    pub async fn publish_meal(
        &self,
        context: &OperationContext,
        command: PublishMeal,
    ) -> OperationOutcome {
        let user_id = context.user_id();
        let command = &command;
        self.runner
            .run_operation(
                "publish_meal",
                context,
                RetryPolicy::single_attempt(),
                move |scope| self.publish_meal_body(scope, user_id, command),
            )
            .await
    }

    async fn publish_meal_body(
        &self,
        scope: TransactionScope,
        user_id: &UserId,
        command: &PublishMeal,
    ) -> SagaResult {
        let meal = PublishedMeal {
            id: command.meal_id,
            author: user_id.clone(),
            name: command.name.clone(),
            calories: command.calories,
            ingredients: command.ingredients.clone(),
            published_at: self.clock.utc(),
        };
        self.diet.publish_meal(&meal, Some(scope.document())).await?;

        let activity = ActivityShape {
            kind: ActivityKind::Meal,
            date: meal.published_at.date_naive(),
            quantity: 1.0,
        };
        let outcome = self
            .evaluator
            .evaluate(
                user_id,
                &[FamilyIncrement::new(AchievementFamily::Cook, 1.0)],
                Some(&activity),
                scope.relational(),
            )
            .await?;
        Ok(Some(outcome))
    }
}
