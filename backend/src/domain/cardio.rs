//! Cardio sessions and their statistic contribution.

use std::fmt;

use chrono::{NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{StatisticDelta, StatisticDeltaError, StatisticType};

/// Cardio activity categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardioKind {
    Running,
    Cycling,
    Swimming,
    Walking,
    Rowing,
}

/// Validation errors raised by [`CardioExercise::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardioValidationError {
    NegativeCalories,
    NegativeDistance,
    NonPositiveDuration,
    NonFiniteQuantity,
}

impl fmt::Display for CardioValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeCalories => write!(f, "calories burnt must not be negative"),
            Self::NegativeDistance => write!(f, "distance must not be negative"),
            Self::NonPositiveDuration => write!(f, "duration must be positive"),
            Self::NonFiniteQuantity => write!(f, "cardio quantities must be finite"),
        }
    }
}

impl std::error::Error for CardioValidationError {}

/// Input used to build a [`CardioExercise`].
#[derive(Debug, Clone, PartialEq)]
pub struct CardioExerciseDraft {
    pub id: Uuid,
    pub kind: CardioKind,
    pub date: NaiveDate,
    pub calories_burnt: f64,
    pub distance_km: f64,
    pub duration: TimeDelta,
}

/// One cardio session recorded on a cardio day document.
#[derive(Debug, Clone, PartialEq)]
pub struct CardioExercise {
    id: Uuid,
    kind: CardioKind,
    date: NaiveDate,
    calories_burnt: f64,
    distance_km: f64,
    duration: TimeDelta,
}

impl CardioExercise {
    /// Validate a draft into a recorded session.
    pub fn new(draft: CardioExerciseDraft) -> Result<Self, CardioValidationError> {
        if !draft.calories_burnt.is_finite() || !draft.distance_km.is_finite() {
            return Err(CardioValidationError::NonFiniteQuantity);
        }
        if draft.calories_burnt < 0.0 {
            return Err(CardioValidationError::NegativeCalories);
        }
        if draft.distance_km < 0.0 {
            return Err(CardioValidationError::NegativeDistance);
        }
        if draft.duration <= TimeDelta::zero() {
            return Err(CardioValidationError::NonPositiveDuration);
        }

        Ok(Self {
            id: draft.id,
            kind: draft.kind,
            date: draft.date,
            calories_burnt: draft.calories_burnt,
            distance_km: draft.distance_km,
            duration: draft.duration,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> CardioKind {
        self.kind
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn calories_burnt(&self) -> f64 {
        self.calories_burnt
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn duration(&self) -> TimeDelta {
        self.duration
    }

    /// Deltas this session contributes to the running aggregates.
    ///
    /// # Examples
    /// ```
    /// use chrono::{NaiveDate, TimeDelta};
    /// use fitness_saga::domain::{CardioExercise, CardioExerciseDraft, CardioKind};
    /// use uuid::Uuid;
    ///
    /// let exercise = CardioExercise::new(CardioExerciseDraft {
    ///     id: Uuid::new_v4(),
    ///     kind: CardioKind::Running,
    ///     date: NaiveDate::from_ymd_opt(2026, 3, 1).expect("valid date"),
    ///     calories_burnt: 500.0,
    ///     distance_km: 5.0,
    ///     duration: TimeDelta::minutes(30),
    /// })
    /// .expect("valid exercise");
    /// assert_eq!(exercise.contribution().expect("finite").len(), 4);
    /// ```
    pub fn contribution(&self) -> Result<Vec<StatisticDelta>, StatisticDeltaError> {
        Ok(vec![
            StatisticDelta::scalar(StatisticType::CaloriesBurnt, self.date, self.calories_burnt)?,
            StatisticDelta::scalar(StatisticType::TotalDistance, self.date, self.distance_km)?,
            StatisticDelta::time_spent(self.date, self.duration),
            StatisticDelta::scalar(StatisticType::ActiveSessionsCount, self.date, 1.0)?,
        ])
    }
}

/// Command for the log-cardio-exercise operation.
#[derive(Debug, Clone, PartialEq)]
pub struct LogCardioExercise {
    pub exercise: CardioExercise,
}

/// Command for the delete-cardio-exercises operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteCardioExercises {
    pub date: NaiveDate,
    pub exercise_ids: Vec<Uuid>,
}
