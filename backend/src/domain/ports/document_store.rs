//! Port for document store sessions (per-user time-series documents).

use std::fmt;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Error;

use super::define_port_error;

define_port_error! {
    /// Errors raised by document store adapters.
    pub enum DocumentStoreError {
        /// Store connection could not be established.
        Connection { message: String } =>
            "document store connection failed: {message}",
        /// The session handle is not open on this store.
        UnknownSession { session: String } =>
            "document session {session} is not open",
        /// The write lost a race with a concurrent session.
        TransientConflict { message: String } =>
            "document store write conflict: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "document store query failed: {message}",
    }
}

/// Normalize a document store failure into the domain error shape.
pub fn map_document_store_error(error: DocumentStoreError) -> Error {
    if error.is_transient_conflict() {
        Error::transient_conflict(error.to_string())
    } else {
        Error::internal(error.to_string())
    }
}

/// Opaque handle to a document session with an open transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentSession(Uuid);

impl DocumentSession {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn id(self) -> Uuid {
        self.0
    }
}

impl fmt::Display for DocumentSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc-{}", self.0)
    }
}

/// Port for starting and finishing document sessions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Start a session and begin its transaction.
    async fn start_session(&self) -> Result<DocumentSession, DocumentStoreError>;

    /// Commit the session's transaction.
    async fn commit(&self, session: DocumentSession) -> Result<(), DocumentStoreError>;

    /// Abort the session's transaction.
    async fn abort(&self, session: DocumentSession) -> Result<(), DocumentStoreError>;
}

/// Fixture implementation for tests that do not exercise persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureDocumentStore;

#[async_trait]
impl DocumentStore for FixtureDocumentStore {
    async fn start_session(&self) -> Result<DocumentSession, DocumentStoreError> {
        Ok(DocumentSession::new(Uuid::new_v4()))
    }

    async fn commit(&self, _session: DocumentSession) -> Result<(), DocumentStoreError> {
        Ok(())
    }

    async fn abort(&self, _session: DocumentSession) -> Result<(), DocumentStoreError> {
        Ok(())
    }
}
