//! Training days, exercises, and series-level edits.
//!
//! An exercise's contribution to [`StatisticType::WeightLifted`] is the sum of
//! `repetitions × weight_kg` over its series. Batch edits are evaluated
//! against a fresh copy of the day, see [`TrainingDay::apply_updates`] and
//! [`TrainingDay::apply_removals`].

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use uuid::Uuid;

use super::StatisticType;

/// Malformed series edits. These are business failures, not validation of
/// field shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeriesEditError {
    Empty,
    UnknownExercise(Uuid),
    UnknownSeries { exercise_id: Uuid, series_id: Uuid },
    InvalidSeries(Uuid),
}

impl fmt::Display for SeriesEditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "no series were supplied"),
            Self::UnknownExercise(id) => write!(f, "exercise {id} is not on this training day"),
            Self::UnknownSeries {
                exercise_id,
                series_id,
            } => write!(f, "series {series_id} is not part of exercise {exercise_id}"),
            Self::InvalidSeries(id) => write!(
                f,
                "series {id} must have positive repetitions and a finite, non-negative weight"
            ),
        }
    }
}

impl std::error::Error for SeriesEditError {}

/// One set of repetitions at a given weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingSeries {
    pub id: Uuid,
    pub repetitions: u32,
    pub weight_kg: f64,
}

impl TrainingSeries {
    /// Weight moved by this series.
    pub fn tonnage(&self) -> f64 {
        f64::from(self.repetitions) * self.weight_kg
    }

    fn validate(&self) -> Result<(), SeriesEditError> {
        if self.repetitions == 0 || !self.weight_kg.is_finite() || self.weight_kg < 0.0 {
            return Err(SeriesEditError::InvalidSeries(self.id));
        }
        Ok(())
    }
}

/// An exercise performed on a training day.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingExercise {
    pub id: Uuid,
    pub name: String,
    pub series: Vec<TrainingSeries>,
}

impl TrainingExercise {
    /// Weight moved across every series.
    pub fn tonnage(&self) -> f64 {
        self.series.iter().map(TrainingSeries::tonnage).sum()
    }
}

/// Statistic fed by training days.
pub const TRAINING_STATISTIC: StatisticType = StatisticType::WeightLifted;

/// Snapshot of one user's training day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingDay {
    pub exercises: Vec<TrainingExercise>,
}

/// Edit to one existing series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesUpdate {
    pub exercise_id: Uuid,
    pub series_id: Uuid,
    pub repetitions: u32,
    pub weight_kg: f64,
}

/// Reference to one existing series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesRef {
    pub exercise_id: Uuid,
    pub series_id: Uuid,
}

/// Result of evaluating a batch edit against a day snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct RecomputedDay {
    /// Changed exercises in their post-edit form.
    pub changed: Vec<TrainingExercise>,
    /// Post-edit day total: unaffected exercises plus the changed ones.
    pub total_tonnage: f64,
}

impl TrainingDay {
    /// Evaluate series updates without mutating the snapshot.
    pub fn apply_updates(&self, updates: &[SeriesUpdate]) -> Result<RecomputedDay, SeriesEditError> {
        if updates.is_empty() {
            return Err(SeriesEditError::Empty);
        }
        let touched: BTreeSet<Uuid> = updates.iter().map(|update| update.exercise_id).collect();
        let mut changed = self.touched_exercises(&touched)?;

        for update in updates {
            let series = find_series_mut(&mut changed, update.exercise_id, update.series_id)?;
            series.repetitions = update.repetitions;
            series.weight_kg = update.weight_kg;
            series.validate()?;
        }

        Ok(self.recompute(&touched, changed))
    }

    /// Evaluate series removals without mutating the snapshot.
    pub fn apply_removals(&self, removals: &[SeriesRef]) -> Result<RecomputedDay, SeriesEditError> {
        if removals.is_empty() {
            return Err(SeriesEditError::Empty);
        }
        let touched: BTreeSet<Uuid> = removals.iter().map(|removal| removal.exercise_id).collect();
        let mut changed = self.touched_exercises(&touched)?;

        for removal in removals {
            find_series_mut(&mut changed, removal.exercise_id, removal.series_id)?;
            if let Some(exercise) = changed.iter_mut().find(|e| e.id == removal.exercise_id) {
                exercise.series.retain(|series| series.id != removal.series_id);
            }
        }

        Ok(self.recompute(&touched, changed))
    }

    fn touched_exercises(
        &self,
        touched: &BTreeSet<Uuid>,
    ) -> Result<Vec<TrainingExercise>, SeriesEditError> {
        touched
            .iter()
            .map(|id| {
                self.exercises
                    .iter()
                    .find(|exercise| exercise.id == *id)
                    .cloned()
                    .ok_or(SeriesEditError::UnknownExercise(*id))
            })
            .collect()
    }

    fn recompute(&self, touched: &BTreeSet<Uuid>, changed: Vec<TrainingExercise>) -> RecomputedDay {
        let unaffected: f64 = self
            .exercises
            .iter()
            .filter(|exercise| !touched.contains(&exercise.id))
            .map(TrainingExercise::tonnage)
            .sum();
        let edited: f64 = changed.iter().map(TrainingExercise::tonnage).sum();

        RecomputedDay {
            changed,
            total_tonnage: unaffected + edited,
        }
    }
}

fn find_series_mut(
    exercises: &mut [TrainingExercise],
    exercise_id: Uuid,
    series_id: Uuid,
) -> Result<&mut TrainingSeries, SeriesEditError> {
    exercises
        .iter_mut()
        .find(|exercise| exercise.id == exercise_id)
        .ok_or(SeriesEditError::UnknownExercise(exercise_id))?
        .series
        .iter_mut()
        .find(|series| series.id == series_id)
        .ok_or(SeriesEditError::UnknownSeries {
            exercise_id,
            series_id,
        })
}

/// Validate series appended by the add-series operation.
pub fn validate_new_series(series: &[TrainingSeries]) -> Result<(), SeriesEditError> {
    if series.is_empty() {
        return Err(SeriesEditError::Empty);
    }
    series.iter().try_for_each(TrainingSeries::validate)
}

/// Command for the add-training-series operation.
#[derive(Debug, Clone, PartialEq)]
pub struct AddTrainingSeries {
    pub date: NaiveDate,
    pub exercise_id: Uuid,
    pub exercise_name: String,
    pub series: Vec<TrainingSeries>,
}

/// Command for the update-training-series operation.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateTrainingSeries {
    pub date: NaiveDate,
    pub updates: Vec<SeriesUpdate>,
}

/// Command for the remove-training-series operation.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoveTrainingSeries {
    pub date: NaiveDate,
    pub removals: Vec<SeriesRef>,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::{fixture, rstest};

    use super::*;

    struct Ids {
        bench: Uuid,
        squat: Uuid,
        bench_set: Uuid,
        squat_sets: [Uuid; 2],
    }

    #[fixture]
    fn ids() -> Ids {
        Ids {
            bench: Uuid::new_v4(),
            squat: Uuid::new_v4(),
            bench_set: Uuid::new_v4(),
            squat_sets: [Uuid::new_v4(), Uuid::new_v4()],
        }
    }

    fn day(ids: &Ids) -> TrainingDay {
        TrainingDay {
            exercises: vec![
                TrainingExercise {
                    id: ids.bench,
                    name: "bench".to_owned(),
                    series: vec![TrainingSeries {
                        id: ids.bench_set,
                        repetitions: 10,
                        weight_kg: 50.0,
                    }],
                },
                TrainingExercise {
                    id: ids.squat,
                    name: "squat".to_owned(),
                    series: vec![
                        TrainingSeries {
                            id: ids.squat_sets[0],
                            repetitions: 5,
                            weight_kg: 100.0,
                        },
                        TrainingSeries {
                            id: ids.squat_sets[1],
                            repetitions: 5,
                            weight_kg: 100.0,
                        },
                    ],
                },
            ],
        }
    }

    #[rstest]
    fn updates_recompute_day_total_from_unaffected_and_changed(ids: Ids) {
        let snapshot = day(&ids);
        let result = snapshot
            .apply_updates(&[SeriesUpdate {
                exercise_id: ids.squat,
                series_id: ids.squat_sets[0],
                repetitions: 8,
                weight_kg: 100.0,
            }])
            .expect("valid update");

        assert_eq!(result.changed.len(), 1);
        assert_eq!(result.total_tonnage, 500.0 + 800.0 + 500.0);
    }

    #[rstest]
    fn removals_across_exercises_recompute_total(ids: Ids) {
        let snapshot = day(&ids);
        let result = snapshot
            .apply_removals(&[
                SeriesRef {
                    exercise_id: ids.bench,
                    series_id: ids.bench_set,
                },
                SeriesRef {
                    exercise_id: ids.squat,
                    series_id: ids.squat_sets[1],
                },
            ])
            .expect("valid removals");

        assert_eq!(result.changed.len(), 2);
        assert_eq!(result.total_tonnage, 500.0);
    }

    #[rstest]
    fn unknown_series_is_rejected(ids: Ids) {
        let missing = Uuid::new_v4();
        let result = day(&ids).apply_removals(&[SeriesRef {
            exercise_id: ids.bench,
            series_id: missing,
        }]);

        assert_eq!(
            result,
            Err(SeriesEditError::UnknownSeries {
                exercise_id: ids.bench,
                series_id: missing,
            })
        );
    }

    #[rstest]
    fn zero_repetition_updates_are_malformed(ids: Ids) {
        let result = day(&ids).apply_updates(&[SeriesUpdate {
            exercise_id: ids.bench,
            series_id: ids.bench_set,
            repetitions: 0,
            weight_kg: 50.0,
        }]);

        assert_eq!(result, Err(SeriesEditError::InvalidSeries(ids.bench_set)));
    }

    #[rstest]
    fn new_series_must_not_be_empty() {
        assert_eq!(validate_new_series(&[]), Err(SeriesEditError::Empty));
    }
}
