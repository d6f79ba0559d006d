//! Running per-user statistics and the signed deltas that feed them.
//!
//! Every derived write in a saga is expressed as a [`StatisticDelta`]. Removals
//! are expressed as the [`StatisticDelta::inverted`] form of the contribution
//! being removed, so aggregates stay consistent without replaying history.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};

/// Aggregate metric kinds tracked per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatisticType {
    CaloriesBurnt,
    WeightLifted,
    StepsTaken,
    ActiveSessionsCount,
    TimeSpent,
    TotalDistance,
    Weight,
}

impl StatisticType {
    /// Whether the quantity for this type lives in the duration field.
    pub fn is_duration(self) -> bool {
        matches!(self, Self::TimeSpent)
    }
}

impl fmt::Display for StatisticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::CaloriesBurnt => "calories_burnt",
            Self::WeightLifted => "weight_lifted",
            Self::StepsTaken => "steps_taken",
            Self::ActiveSessionsCount => "active_sessions_count",
            Self::TimeSpent => "time_spent",
            Self::TotalDistance => "total_distance",
            Self::Weight => "weight",
        };
        f.write_str(label)
    }
}

/// Validation errors raised when building a delta.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatisticDeltaError {
    /// A scalar constructor was used with a duration-valued type.
    DurationType(StatisticType),
    /// The scalar quantity was NaN or infinite.
    NonFiniteValue,
}

impl fmt::Display for StatisticDeltaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DurationType(kind) => {
                write!(f, "statistic {kind} carries a duration, not a scalar value")
            }
            Self::NonFiniteValue => write!(f, "statistic value must be finite"),
        }
    }
}

impl std::error::Error for StatisticDeltaError {}

/// Signed contribution to a running per-user aggregate.
///
/// ## Invariants
/// - Duration types carry their quantity in `time_value` and keep `value` at
///   zero; every other type carries it in `value` with no `time_value`.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use fitness_saga::domain::{StatisticDelta, StatisticType};
///
/// let date = NaiveDate::from_ymd_opt(2026, 3, 1).expect("valid date");
/// let delta = StatisticDelta::scalar(StatisticType::CaloriesBurnt, date, 500.0)
///     .expect("scalar delta");
/// assert_eq!(delta.inverted().value(), -500.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatisticDelta {
    kind: StatisticType,
    date: NaiveDate,
    value: f64,
    time_value: Option<TimeDelta>,
}

impl StatisticDelta {
    /// Build a delta for a scalar statistic.
    pub fn scalar(
        kind: StatisticType,
        date: NaiveDate,
        value: f64,
    ) -> Result<Self, StatisticDeltaError> {
        if kind.is_duration() {
            return Err(StatisticDeltaError::DurationType(kind));
        }
        if !value.is_finite() {
            return Err(StatisticDeltaError::NonFiniteValue);
        }
        Ok(Self {
            kind,
            date,
            value,
            time_value: None,
        })
    }

    /// Build a [`StatisticType::TimeSpent`] delta.
    pub fn time_spent(date: NaiveDate, duration: TimeDelta) -> Self {
        Self {
            kind: StatisticType::TimeSpent,
            date,
            value: 0.0,
            time_value: Some(duration),
        }
    }

    pub fn kind(&self) -> StatisticType {
        self.kind
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn time_value(&self) -> Option<TimeDelta> {
        self.time_value
    }

    /// Arithmetic inverse: negates the duration for duration types and the
    /// scalar value otherwise.
    pub fn inverted(&self) -> Self {
        if self.kind.is_duration() {
            Self {
                time_value: self.time_value.map(|duration| -duration),
                ..*self
            }
        } else {
            Self {
                value: -self.value,
                ..*self
            }
        }
    }

    /// Whether applying this delta would leave every aggregate unchanged.
    pub fn is_zero(&self) -> bool {
        if self.kind.is_duration() {
            self.time_value.is_none_or(|duration| duration.is_zero())
        } else {
            self.value == 0.0
        }
    }

    fn as_value(&self) -> StatisticValue {
        StatisticValue {
            value: self.value,
            time: self.time_value.unwrap_or_else(TimeDelta::zero),
        }
    }
}

/// Quantity stored for one aggregate cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatisticValue {
    pub value: f64,
    pub time: TimeDelta,
}

impl Default for StatisticValue {
    fn default() -> Self {
        Self {
            value: 0.0,
            time: TimeDelta::zero(),
        }
    }
}

impl StatisticValue {
    fn add(&mut self, other: Self) {
        self.value += other.value;
        self.time += other.time;
    }

    fn minus(self, other: Self) -> Self {
        Self {
            value: self.value - other.value,
            time: self.time - other.time,
        }
    }
}

/// Running aggregates for one user: lifetime totals plus per-day values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserStatistics {
    totals: BTreeMap<StatisticType, StatisticValue>,
    daily: BTreeMap<(StatisticType, NaiveDate), StatisticValue>,
}

impl UserStatistics {
    /// Add a signed delta to both the lifetime total and the day's value.
    pub fn apply(&mut self, delta: &StatisticDelta) {
        let contribution = delta.as_value();
        self.totals.entry(delta.kind).or_default().add(contribution);
        self.daily
            .entry((delta.kind, delta.date))
            .or_default()
            .add(contribution);
    }

    /// Overwrite the day's value with the delta's quantity and adjust the
    /// lifetime total by the difference.
    ///
    /// Returns the relative delta that was effectively applied.
    pub fn replace_daily(&mut self, absolute: &StatisticDelta) -> StatisticDelta {
        let previous = self.daily(absolute.kind, absolute.date);
        let difference = absolute.as_value().minus(previous);
        let applied = StatisticDelta {
            kind: absolute.kind,
            date: absolute.date,
            value: if absolute.kind.is_duration() {
                0.0
            } else {
                difference.value
            },
            time_value: absolute.kind.is_duration().then_some(difference.time),
        };
        self.apply(&applied);
        applied
    }

    /// Lifetime total for a statistic.
    pub fn total(&self, kind: StatisticType) -> StatisticValue {
        self.totals.get(&kind).copied().unwrap_or_default()
    }

    /// Value recorded for a statistic on one day.
    pub fn daily(&self, kind: StatisticType, date: NaiveDate) -> StatisticValue {
        self.daily.get(&(kind, date)).copied().unwrap_or_default()
    }
}

/// Command for the add-daily-steps operation. `steps` is the absolute count
/// for `date`, not an increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddDailySteps {
    pub date: NaiveDate,
    pub steps: u32,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::{fixture, rstest};

    use super::*;

    const TOLERANCE: f64 = 1e-9;

    #[fixture]
    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).expect("valid date")
    }

    #[rstest]
    fn scalar_rejects_duration_types(date: NaiveDate) {
        let result = StatisticDelta::scalar(StatisticType::TimeSpent, date, 1.0);
        assert_eq!(
            result,
            Err(StatisticDeltaError::DurationType(StatisticType::TimeSpent))
        );
    }

    #[rstest]
    fn scalar_rejects_non_finite_values(date: NaiveDate) {
        let result = StatisticDelta::scalar(StatisticType::CaloriesBurnt, date, f64::NAN);
        assert_eq!(result, Err(StatisticDeltaError::NonFiniteValue));
    }

    #[rstest]
    fn inverting_a_duration_negates_time_only(date: NaiveDate) {
        let delta = StatisticDelta::time_spent(date, TimeDelta::minutes(30));
        let inverted = delta.inverted();

        assert_eq!(inverted.time_value(), Some(TimeDelta::minutes(-30)));
        assert_eq!(inverted.value(), 0.0);
    }

    #[rstest]
    #[case(StatisticType::CaloriesBurnt, 500.0)]
    #[case(StatisticType::WeightLifted, 1_234.5)]
    #[case(StatisticType::StepsTaken, 12_000.0)]
    #[case(StatisticType::ActiveSessionsCount, 1.0)]
    #[case(StatisticType::TotalDistance, 5.0)]
    #[case(StatisticType::Weight, 72.3)]
    fn applying_then_inverting_scalar_is_a_no_op(
        date: NaiveDate,
        #[case] kind: StatisticType,
        #[case] value: f64,
    ) {
        let mut stats = UserStatistics::default();
        stats.apply(&StatisticDelta::scalar(kind, date, 10.0).expect("seed delta"));
        let before = stats.clone();

        let delta = StatisticDelta::scalar(kind, date, value).expect("delta");
        stats.apply(&delta);
        stats.apply(&delta.inverted());

        assert!((stats.total(kind).value - before.total(kind).value).abs() < TOLERANCE);
        assert!((stats.daily(kind, date).value - before.daily(kind, date).value).abs() < TOLERANCE);
    }

    #[rstest]
    fn applying_then_inverting_duration_is_a_no_op(date: NaiveDate) {
        let mut stats = UserStatistics::default();
        let delta = StatisticDelta::time_spent(date, TimeDelta::minutes(45));

        stats.apply(&delta);
        stats.apply(&delta.inverted());

        assert_eq!(stats, {
            let mut expected = UserStatistics::default();
            expected.apply(&StatisticDelta::time_spent(date, TimeDelta::zero()));
            expected
        });
        assert!(stats.total(StatisticType::TimeSpent).time.is_zero());
    }

    #[rstest]
    fn replace_daily_adjusts_total_by_difference(date: NaiveDate) {
        let mut stats = UserStatistics::default();
        let kind = StatisticType::StepsTaken;
        stats.replace_daily(&StatisticDelta::scalar(kind, date, 4_000.0).expect("delta"));

        let applied =
            stats.replace_daily(&StatisticDelta::scalar(kind, date, 12_000.0).expect("delta"));

        assert_eq!(applied.value(), 8_000.0);
        assert_eq!(stats.daily(kind, date).value, 12_000.0);
        assert_eq!(stats.total(kind).value, 12_000.0);
    }

    #[rstest]
    fn zero_deltas_are_detected(date: NaiveDate) {
        assert!(
            StatisticDelta::scalar(StatisticType::CaloriesBurnt, date, 0.0)
                .expect("delta")
                .is_zero()
        );
        assert!(StatisticDelta::time_spent(date, TimeDelta::zero()).is_zero());
        assert!(!StatisticDelta::time_spent(date, TimeDelta::seconds(1)).is_zero());
    }
}
