//! Port for identity writes in the relational store.

use async_trait::async_trait;

use crate::domain::{Error, UserAccount};

use super::RelationalTransaction;

/// Identity service. Writes enlist in `transaction` when one is supplied and
/// open their own otherwise.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAccountService: Send + Sync {
    /// Insert a new account; fails with `AlreadyExists` for a known id.
    async fn create_account(
        &self,
        account: &UserAccount,
        transaction: Option<RelationalTransaction>,
    ) -> Result<(), Error>;
}
