//! Register-with-questionnaire coordinator.

use crate::domain::{
    OperationOutcome, RegisterWithQuestionnaire, StatisticDelta, StatisticType, UserAccount,
    UserId,
};

use super::mapping::map_delta_error;
use super::{FitnessOrchestrator, OperationContext, RetryPolicy, SagaResult, TransactionScope};

impl FitnessOrchestrator {
    /// Create the identity, store the questionnaire and record the initial
    /// body weight as that day's absolute value.
    pub async fn register_with_questionnaire(
        &self,
        context: &OperationContext,
        command: RegisterWithQuestionnaire,
    ) -> OperationOutcome {
        let user_id = context.user_id();
        let command = &command;
        self.runner
            .run_operation(
                "register_with_questionnaire",
                context,
                RetryPolicy::single_attempt(),
                move |scope| self.register_body(scope, user_id, command),
            )
            .await
    }

    async fn register_body(
        &self,
        scope: TransactionScope,
        user_id: &UserId,
        command: &RegisterWithQuestionnaire,
    ) -> SagaResult {
        let account = UserAccount {
            id: user_id.clone(),
            display_name: command.display_name.clone(),
            registered_at: self.clock.utc(),
        };
        self.accounts
            .create_account(&account, Some(scope.relational()))
            .await?;

        let questionnaire = &command.questionnaire;
        self.questionnaires
            .save_questionnaire(user_id, questionnaire, Some(scope.document()))
            .await?;

        let weight = StatisticDelta::scalar(
            StatisticType::Weight,
            questionnaire.measured_on,
            questionnaire.weight_kg,
        )
        .map_err(map_delta_error)?;
        self.statistics
            .replace_daily_value(user_id, &weight, Some(scope.document()))
            .await?;

        Ok(None)
    }
}
