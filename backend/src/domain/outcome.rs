//! Flat result contract handed to the transport layer.

use serde::{Deserialize, Serialize};

use super::{AchievementProgress, Error, ErrorCode};

/// Normalized success/failure shape. Callers never learn which store or
/// step failed, only the code and message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResult {
    pub success: bool,
    pub error_code: ErrorCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl OperationResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            error_code: ErrorCode::None,
            message: None,
        }
    }

    pub fn from_error(error: &Error) -> Self {
        Self {
            success: false,
            error_code: error.code(),
            message: Some(error.message().to_owned()),
        }
    }
}

/// Value returned by every orchestrated operation.
///
/// # Examples
/// ```
/// use fitness_saga::domain::{AchievementProgress, Error, ErrorCode, OperationOutcome};
///
/// let ok = OperationOutcome::from_result(Ok(Some(AchievementProgress::none())));
/// assert!(ok.result.success);
///
/// let failed = OperationOutcome::from_result(Err(Error::not_found("missing")));
/// assert_eq!(failed.result.error_code, ErrorCode::NotFound);
/// assert!(failed.achievement.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationOutcome {
    pub result: OperationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub achievement: Option<AchievementProgress>,
}

impl OperationOutcome {
    /// Project a saga result into the flat contract.
    pub fn from_result(result: Result<Option<AchievementProgress>, Error>) -> Self {
        match result {
            Ok(achievement) => Self {
                result: OperationResult::ok(),
                achievement,
            },
            Err(error) => Self {
                result: OperationResult::from_error(&error),
                achievement: None,
            },
        }
    }

    /// Whether the operation committed.
    pub fn is_success(&self) -> bool {
        self.result.success
    }

    /// Badge earned by the operation, if any.
    pub fn earned_badge(&self) -> Option<&super::EarnedBadge> {
        self.achievement
            .as_ref()
            .and_then(|progress| progress.earned_badge.as_ref())
    }
}
