//! Port for relational store transactions (identity, achievements).

use std::fmt;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Error;

use super::define_port_error;

define_port_error! {
    /// Errors raised by relational store adapters.
    pub enum RelationalStoreError {
        /// Store connection could not be established.
        Connection { message: String } =>
            "relational store connection failed: {message}",
        /// The transaction handle is not open on this store.
        UnknownTransaction { transaction: String } =>
            "relational transaction {transaction} is not open",
        /// The write lost a race with a concurrent transaction.
        TransientConflict { message: String } =>
            "relational store write conflict: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "relational store query failed: {message}",
    }
}

/// Normalize a relational store failure into the domain error shape.
pub fn map_relational_store_error(error: RelationalStoreError) -> Error {
    if error.is_transient_conflict() {
        Error::transient_conflict(error.to_string())
    } else {
        Error::internal(error.to_string())
    }
}

/// Opaque handle to a pending relational transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RelationalTransaction(Uuid);

impl RelationalTransaction {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn id(self) -> Uuid {
        self.0
    }
}

impl fmt::Display for RelationalTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rel-{}", self.0)
    }
}

/// Port for opening and finishing relational transactions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RelationalStore: Send + Sync {
    /// Open a new transaction.
    async fn begin(&self) -> Result<RelationalTransaction, RelationalStoreError>;

    /// Make the transaction's writes durable.
    async fn commit(&self, transaction: RelationalTransaction)
    -> Result<(), RelationalStoreError>;

    /// Discard the transaction's writes.
    async fn abort(&self, transaction: RelationalTransaction) -> Result<(), RelationalStoreError>;
}

/// Fixture implementation for tests that do not exercise persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRelationalStore;

#[async_trait]
impl RelationalStore for FixtureRelationalStore {
    async fn begin(&self) -> Result<RelationalTransaction, RelationalStoreError> {
        Ok(RelationalTransaction::new(Uuid::new_v4()))
    }

    async fn commit(
        &self,
        _transaction: RelationalTransaction,
    ) -> Result<(), RelationalStoreError> {
        Ok(())
    }

    async fn abort(&self, _transaction: RelationalTransaction) -> Result<(), RelationalStoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;

    #[rstest]
    fn transient_conflicts_map_to_flagged_internal_errors() {
        let error = map_relational_store_error(RelationalStoreError::transient_conflict("row"));
        assert_eq!(error.code(), ErrorCode::Internal);
        assert!(error.is_transient_conflict());
    }

    #[rstest]
    fn other_failures_map_to_plain_internal_errors() {
        let error = map_relational_store_error(RelationalStoreError::query("broken sql"));
        assert_eq!(error.code(), ErrorCode::Internal);
        assert!(!error.is_transient_conflict());
        assert!(error.message().contains("broken sql"));
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_hands_out_distinct_handles() {
        let store = FixtureRelationalStore;
        let first = store.begin().await.expect("fixture begin succeeds");
        let second = store.begin().await.expect("fixture begin succeeds");
        assert_ne!(first, second);
    }
}
