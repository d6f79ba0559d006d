//! Port for meal documents.

use async_trait::async_trait;

use crate::domain::{Error, PublishedMeal};

use super::DocumentSession;

/// Meal publication service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DietService: Send + Sync {
    /// Insert a published meal; fails with `AlreadyExists` for a known id.
    async fn publish_meal(
        &self,
        meal: &PublishedMeal,
        session: Option<DocumentSession>,
    ) -> Result<(), Error>;
}
