//! Handle pair spanning both stores for one saga attempt.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::domain::Error;
use crate::domain::ports::{
    DocumentSession, DocumentStore, RelationalStore, RelationalTransaction,
    map_document_store_error, map_relational_store_error,
};

/// Opaque handles passed by value into every collaborator call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionScope {
    relational: RelationalTransaction,
    document: DocumentSession,
}

impl TransactionScope {
    pub fn new(relational: RelationalTransaction, document: DocumentSession) -> Self {
        Self {
            relational,
            document,
        }
    }

    pub fn relational(self) -> RelationalTransaction {
        self.relational
    }

    pub fn document(self) -> DocumentSession {
        self.document
    }
}

/// Pending transactions on both stores.
///
/// Every unit of work must end in [`UnitOfWork::commit`] or
/// [`UnitOfWork::abort`]. Dropping an open unit schedules aborts on the
/// current Tokio runtime.
pub struct UnitOfWork {
    relational_store: Arc<dyn RelationalStore>,
    document_store: Arc<dyn DocumentStore>,
    scope: TransactionScope,
    finished: bool,
}

impl UnitOfWork {
    /// Start a document session, then a relational transaction.
    pub async fn open(
        relational_store: Arc<dyn RelationalStore>,
        document_store: Arc<dyn DocumentStore>,
    ) -> Result<Self, Error> {
        let document = document_store
            .start_session()
            .await
            .map_err(map_document_store_error)?;
        let relational = match relational_store.begin().await {
            Ok(transaction) => transaction,
            Err(source) => {
                if let Err(abort_error) = document_store.abort(document).await {
                    warn!(session = %document, error = %abort_error, "document abort failed");
                }
                return Err(map_relational_store_error(source));
            }
        };

        Ok(Self {
            relational_store,
            document_store,
            scope: TransactionScope::new(relational, document),
            finished: false,
        })
    }

    pub fn scope(&self) -> TransactionScope {
        self.scope
    }

    /// Commit relational first, then document.
    ///
    /// A relational commit failure aborts the document session and returns
    /// the store's error. A document commit failure after a successful
    /// relational commit cannot be rolled back and is reported as a
    /// non-retryable `Internal` error.
    pub async fn commit(mut self) -> Result<(), Error> {
        self.finished = true;
        let TransactionScope {
            relational,
            document,
        } = self.scope;

        if let Err(source) = self.relational_store.commit(relational).await {
            self.abort_document(document).await;
            return Err(map_relational_store_error(source));
        }

        if let Err(source) = self.document_store.commit(document).await {
            error!(
                transaction = %relational,
                session = %document,
                error = %source,
                "document commit failed after relational commit"
            );
            return Err(Error::internal(format!(
                "document commit failed after relational commit: {source}"
            )));
        }

        debug!(transaction = %relational, session = %document, "unit of work committed");
        Ok(())
    }

    /// Abort both handles. Abort failures are logged and swallowed so the
    /// caller's error is the one reported.
    pub async fn abort(mut self) {
        self.finished = true;
        let TransactionScope {
            relational,
            document,
        } = self.scope;
        if let Err(source) = self.relational_store.abort(relational).await {
            warn!(transaction = %relational, error = %source, "relational abort failed");
        }
        self.abort_document(document).await;
    }

    async fn abort_document(&self, document: DocumentSession) {
        if let Err(source) = self.document_store.abort(document).await {
            warn!(session = %document, error = %source, "document abort failed");
        }
    }
}

impl Drop for UnitOfWork {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let TransactionScope {
            relational,
            document,
        } = self.scope;
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            error!(
                transaction = %relational,
                session = %document,
                "unit of work dropped outside a runtime; handles left open"
            );
            return;
        };

        warn!(transaction = %relational, session = %document, "unit of work dropped while open");
        let relational_store = Arc::clone(&self.relational_store);
        let document_store = Arc::clone(&self.document_store);
        runtime.spawn(async move {
            if let Err(source) = relational_store.abort(relational).await {
                warn!(transaction = %relational, error = %source, "relational abort failed");
            }
            if let Err(source) = document_store.abort(document).await {
                warn!(session = %document, error = %source, "document abort failed");
            }
        });
    }
}

#[cfg(test)]
#[path = "unit_of_work_tests.rs"]
mod tests;
