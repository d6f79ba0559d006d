//! Port for cardio day documents.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{CardioExercise, Error, UserId};

use super::DocumentSession;

/// Cardio day document service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CardioService: Send + Sync {
    /// Append a session to the cardio document for the exercise's date.
    async fn append_exercise(
        &self,
        user_id: &UserId,
        exercise: &CardioExercise,
        session: Option<DocumentSession>,
    ) -> Result<(), Error>;

    /// Read the sessions among `exercise_ids` recorded on `date`.
    async fn find_exercises(
        &self,
        user_id: &UserId,
        date: NaiveDate,
        exercise_ids: &[Uuid],
        session: Option<DocumentSession>,
    ) -> Result<Vec<CardioExercise>, Error>;

    /// Remove sessions from the day; returns how many were removed.
    async fn remove_exercises(
        &self,
        user_id: &UserId,
        date: NaiveDate,
        exercise_ids: &[Uuid],
        session: Option<DocumentSession>,
    ) -> Result<usize, Error>;
}
