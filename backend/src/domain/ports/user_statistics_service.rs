//! Port for the per-user statistics document.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{Error, StatisticDelta, StatisticType, StatisticValue, UserId};

use super::DocumentSession;

/// Running statistics service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStatisticsService: Send + Sync {
    /// Add signed deltas to the running aggregates.
    async fn apply_deltas(
        &self,
        user_id: &UserId,
        deltas: &[StatisticDelta],
        session: Option<DocumentSession>,
    ) -> Result<(), Error>;

    /// Replace the day's value with an absolute quantity. Returns the relative
    /// delta that was effectively applied.
    async fn replace_daily_value(
        &self,
        user_id: &UserId,
        absolute: &StatisticDelta,
        session: Option<DocumentSession>,
    ) -> Result<StatisticDelta, Error>;

    /// Read the value recorded for one statistic on one day.
    async fn daily_value(
        &self,
        user_id: &UserId,
        kind: StatisticType,
        date: NaiveDate,
        session: Option<DocumentSession>,
    ) -> Result<StatisticValue, Error>;
}
