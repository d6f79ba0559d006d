//! Port for onboarding questionnaire documents.

use async_trait::async_trait;

use crate::domain::{Error, Questionnaire, UserId};

use super::DocumentSession;

/// Questionnaire document service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionnaireService: Send + Sync {
    /// Store the user's answers; fails with `AlreadyExists` when answered.
    async fn save_questionnaire(
        &self,
        user_id: &UserId,
        questionnaire: &Questionnaire,
        session: Option<DocumentSession>,
    ) -> Result<(), Error>;
}
