//! Domain-level error types.
//!
//! These errors are transport agnostic. Every collaborator call returns them in
//! place of store-specific failures, and coordinators project them into an
//! [`OperationResult`](crate::domain::OperationResult) at the operation
//! boundary.

use serde::{Deserialize, Serialize};

/// Stable machine-readable code describing the outcome category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// The operation succeeded.
    None,
    /// An unexpected failure occurred, or retries were exhausted.
    Internal,
    /// A precondition on the command was not met.
    ModelStateNotValid,
    /// The resource being created already exists.
    AlreadyExists,
    /// The resource being read or removed does not exist.
    NotFound,
    /// A business rule was violated mid-operation.
    Failed,
    /// The caller may not perform the operation.
    Forbidden,
}

/// Domain error payload.
///
/// ## Invariants
/// - `code` is never [`ErrorCode::None`].
/// - `message` must be non-empty once trimmed of whitespace.
///
/// # Examples
/// ```
/// use fitness_saga::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("nothing to delete");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert!(!err.is_transient_conflict());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(try_from = "ErrorDto", into = "ErrorDto")]
pub struct Error {
    code: ErrorCode,
    message: String,
    transient_conflict: bool,
}

/// Validation errors emitted by the constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorValidationError {
    EmptyMessage,
    SuccessCode,
}

impl std::fmt::Display for ErrorValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMessage => write!(f, "error message must not be empty"),
            Self::SuccessCode => write!(f, "error code must not be `None`"),
        }
    }
}

impl std::error::Error for ErrorValidationError {}

impl Error {
    /// Create a new error, panicking if validation fails.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        match Self::try_new(code, message) {
            Ok(value) => value,
            Err(err) => panic!("error values must satisfy validation: {err}"),
        }
    }

    /// Fallible constructor that validates the code and message content.
    pub fn try_new(
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Result<Self, ErrorValidationError> {
        if code == ErrorCode::None {
            return Err(ErrorValidationError::SuccessCode);
        }
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        Ok(Self {
            code,
            message,
            transient_conflict: false,
        })
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message returned to callers.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Whether a store reported this failure as a lost write race.
    ///
    /// Only store adapters raise this signal, through
    /// [`Error::transient_conflict`]. No other error is ever retried.
    pub fn is_transient_conflict(&self) -> bool {
        self.transient_conflict
    }

    /// Convenience constructor for [`ErrorCode::Internal`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    /// Convenience constructor for [`ErrorCode::ModelStateNotValid`].
    pub fn model_state_not_valid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ModelStateNotValid, message)
    }

    /// Convenience constructor for [`ErrorCode::AlreadyExists`].
    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AlreadyExists, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::Failed`].
    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Failed, message)
    }

    /// Convenience constructor for [`ErrorCode::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Internal error flagged as a retryable store write conflict.
    ///
    /// # Examples
    /// ```
    /// use fitness_saga::domain::{Error, ErrorCode};
    ///
    /// let err = Error::transient_conflict("write conflict on steps document");
    /// assert_eq!(err.code(), ErrorCode::Internal);
    /// assert!(err.is_transient_conflict());
    /// ```
    pub fn transient_conflict(message: impl Into<String>) -> Self {
        let mut error = Self::new(ErrorCode::Internal, message);
        error.transient_conflict = true;
        error
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDto {
    code: ErrorCode,
    message: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    transient_conflict: bool,
}

impl From<Error> for ErrorDto {
    fn from(value: Error) -> Self {
        Self {
            code: value.code,
            message: value.message,
            transient_conflict: value.transient_conflict,
        }
    }
}

impl TryFrom<ErrorDto> for Error {
    type Error = ErrorValidationError;

    fn try_from(value: ErrorDto) -> Result<Self, Self::Error> {
        let ErrorDto {
            code,
            message,
            transient_conflict,
        } = value;

        let mut error = Error::try_new(code, message)?;
        error.transient_conflict = transient_conflict;
        Ok(error)
    }
}
