//! Conversions from local validation failures to domain errors.

use crate::domain::{Error, SeriesEditError, StatisticDeltaError};

pub(super) fn map_delta_error(error: StatisticDeltaError) -> Error {
    Error::model_state_not_valid(error.to_string())
}

/// Malformed or stale series edits are business-rule failures.
pub(super) fn map_series_error(error: SeriesEditError) -> Error {
    Error::failed(error.to_string())
}
