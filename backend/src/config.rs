//! Orchestration configuration loaded via OrthoConfig.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use tracing::warn;

use crate::domain::orchestration::{
    CardioPrecedence, DEFAULT_BACKOFF_STEP, DEFAULT_MAX_ATTEMPTS, OrchestratorConfig, RetryPolicy,
};

/// Configuration values controlling saga retries and family precedence.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "FITNESS_SAGA")]
pub struct OrchestrationSettings {
    /// Attempts for retried operations, including the first.
    pub retry_max_attempts: Option<u32>,
    /// Backoff step in milliseconds, multiplied by the attempt number.
    pub retry_backoff_step_ms: Option<u64>,
    /// `cardio_first` or `calorie_first`.
    pub cardio_precedence: Option<String>,
}

impl OrchestrationSettings {
    /// Return the configured attempt bound, falling back to the default.
    pub fn retry_max_attempts(&self) -> u32 {
        self.retry_max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS)
    }

    /// Return the configured backoff step, falling back to the default.
    pub fn retry_backoff_step(&self) -> Duration {
        self.retry_backoff_step_ms
            .map_or(DEFAULT_BACKOFF_STEP, Duration::from_millis)
    }

    /// Return the configured family precedence. Unknown values fall back to
    /// [`CardioPrecedence::CardioFirst`].
    pub fn cardio_precedence(&self) -> CardioPrecedence {
        let Some(raw) = self.cardio_precedence.as_deref() else {
            return CardioPrecedence::default();
        };
        CardioPrecedence::parse(raw).unwrap_or_else(|| {
            warn!(value = raw, "unknown cardio precedence, using cardio_first");
            CardioPrecedence::default()
        })
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            steps_retry: RetryPolicy::from(self),
            cardio_precedence: self.cardio_precedence(),
        }
    }
}

impl From<&OrchestrationSettings> for RetryPolicy {
    fn from(settings: &OrchestrationSettings) -> Self {
        Self::new(settings.retry_max_attempts(), settings.retry_backoff_step())
    }
}
