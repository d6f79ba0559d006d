//! In-memory relational store: identity rows, achievement progress and
//! challenge progress.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::ports::{
    RelationalStore, RelationalStoreError, RelationalTransaction, UserAccountService,
    map_relational_store_error,
};
use crate::domain::{Error, UserAccount, UserId};

use super::achievements::{ChallengeRow, ProgressRow};
use super::mvcc::{CommittedSnapshot, MvccError, VersionedStore};

/// Row identity in the relational store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RelationalKey {
    Account(UserId),
    /// Progress toward one achievement definition.
    Progress(UserId, String),
    /// Progress toward one challenge badge.
    Challenge(UserId, String),
}

/// Stored relational row.
#[derive(Debug, Clone, PartialEq)]
pub enum RelationalRow {
    Account(UserAccount),
    Progress(ProgressRow),
    Challenge(ChallengeRow),
}

pub type RelationalSnapshot = CommittedSnapshot<RelationalKey, RelationalRow>;
pub(super) type RelationalRows = VersionedStore<RelationalKey, RelationalRow>;

/// Relational store adapter backed by [`VersionedStore`].
#[derive(Debug, Default)]
pub struct MemoryRelationalStore {
    rows: Mutex<RelationalRows>,
}

pub(super) fn map_mvcc_error(error: MvccError) -> RelationalStoreError {
    match error {
        MvccError::UnknownTransaction(id) => {
            RelationalStoreError::unknown_transaction(format!("rel-{id}"))
        }
        MvccError::Conflict(message) => RelationalStoreError::transient_conflict(message),
    }
}

pub(super) fn relational_error(error: MvccError) -> Error {
    map_relational_store_error(map_mvcc_error(error))
}

impl MemoryRelationalStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, RelationalRows>, RelationalStoreError> {
        self.rows
            .lock()
            .map_err(|_| RelationalStoreError::connection("relational store mutex poisoned"))
    }

    /// Run `work` inside `transaction`, or inside a private transaction
    /// committed on success when none is supplied.
    pub(super) fn with_transaction<T>(
        &self,
        transaction: Option<RelationalTransaction>,
        work: impl FnOnce(&mut RelationalRows, Uuid) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let mut rows = self.lock().map_err(map_relational_store_error)?;
        if let Some(transaction) = transaction {
            return work(&mut *rows, transaction.id());
        }

        let id = Uuid::new_v4();
        rows.begin(id);
        match work(&mut *rows, id) {
            Ok(value) => {
                rows.commit(id).map_err(relational_error)?;
                Ok(value)
            }
            Err(error) => {
                if let Err(abort_error) = rows.abort(id) {
                    let source = map_mvcc_error(abort_error);
                    warn!(transaction = %id, error = %source, "private transaction abort failed");
                }
                Err(error)
            }
        }
    }

    pub fn committed_account(&self, user_id: &UserId) -> Option<UserAccount> {
        let rows = self.lock().ok()?;
        match rows.committed_value(&RelationalKey::Account(user_id.clone())) {
            Some(RelationalRow::Account(account)) => Some(account),
            _ => None,
        }
    }

    pub fn committed_progress(&self, user_id: &UserId, achievement: &str) -> Option<ProgressRow> {
        let rows = self.lock().ok()?;
        let key = RelationalKey::Progress(user_id.clone(), achievement.to_owned());
        match rows.committed_value(&key) {
            Some(RelationalRow::Progress(row)) => Some(row),
            _ => None,
        }
    }

    pub fn committed_challenge(&self, user_id: &UserId, challenge: &str) -> Option<ChallengeRow> {
        let rows = self.lock().ok()?;
        let key = RelationalKey::Challenge(user_id.clone(), challenge.to_owned());
        match rows.committed_value(&key) {
            Some(RelationalRow::Challenge(row)) => Some(row),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> Option<RelationalSnapshot> {
        self.lock().ok().map(|rows| rows.snapshot())
    }

    pub fn open_transactions(&self) -> usize {
        self.lock().map_or(0, |rows| rows.open_transactions())
    }
}

#[async_trait]
impl RelationalStore for MemoryRelationalStore {
    async fn begin(&self) -> Result<RelationalTransaction, RelationalStoreError> {
        let id = Uuid::new_v4();
        self.lock()?.begin(id);
        let transaction = RelationalTransaction::new(id);
        debug!(transaction = %transaction, "relational transaction opened");
        Ok(transaction)
    }

    async fn commit(
        &self,
        transaction: RelationalTransaction,
    ) -> Result<(), RelationalStoreError> {
        self.lock()?
            .commit(transaction.id())
            .map_err(map_mvcc_error)
    }

    async fn abort(&self, transaction: RelationalTransaction) -> Result<(), RelationalStoreError> {
        self.lock()?
            .abort(transaction.id())
            .map_err(map_mvcc_error)
    }
}

#[async_trait]
impl UserAccountService for MemoryRelationalStore {
    async fn create_account(
        &self,
        account: &UserAccount,
        transaction: Option<RelationalTransaction>,
    ) -> Result<(), Error> {
        self.with_transaction(transaction, |rows, id| {
            let key = RelationalKey::Account(account.id.clone());
            let existing = rows
                .read(id, &key)
                .map_err(relational_error)?;
            if existing.is_some() {
                return Err(Error::already_exists(format!(
                    "user {} is already registered",
                    account.id
                )));
            }
            rows.write(id, key, Some(RelationalRow::Account(account.clone())))
                .map_err(relational_error)
        })
    }
}
