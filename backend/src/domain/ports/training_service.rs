//! Port for training day documents.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{AddTrainingSeries, Error, TrainingDay, TrainingExercise, UserId};

use super::DocumentSession;

/// Training day document service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrainingService: Send + Sync {
    /// Append series to an exercise, creating the exercise when absent.
    async fn append_series(
        &self,
        user_id: &UserId,
        command: &AddTrainingSeries,
        session: Option<DocumentSession>,
    ) -> Result<(), Error>;

    /// Read the training day for `date`; an unknown day reads as empty.
    async fn training_day(
        &self,
        user_id: &UserId,
        date: NaiveDate,
        session: Option<DocumentSession>,
    ) -> Result<TrainingDay, Error>;

    /// Overwrite the listed exercises on the day. Exercises left without
    /// series are dropped from the document.
    async fn replace_exercises(
        &self,
        user_id: &UserId,
        date: NaiveDate,
        exercises: &[TrainingExercise],
        session: Option<DocumentSession>,
    ) -> Result<(), Error>;
}
