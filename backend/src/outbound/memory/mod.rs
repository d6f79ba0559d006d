//! In-memory store adapters with optimistic multi-key transactions.
//!
//! The relational and document stores share one engine
//! ([`mvcc::VersionedStore`]): every transaction buffers its writes, a
//! contended key fails fast with a transient conflict, and commit publishes
//! all buffered writes at once. The achievement engine keeps its progress
//! rows in the relational store and only ever enlists in a caller's
//! transaction.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use fitness_saga::domain::orchestration::{FitnessOrchestrator, OrchestratorConfig};
//! use fitness_saga::outbound::memory::{AchievementCatalog, MemoryStores};
//!
//! let stores = MemoryStores::new(AchievementCatalog::default(), Arc::new(mockable::DefaultClock));
//! let orchestrator = FitnessOrchestrator::new(stores.ports(), OrchestratorConfig::default());
//! # let _ = orchestrator;
//! ```

mod achievements;
mod document;
mod mvcc;
mod relational;

use std::sync::Arc;

use mockable::Clock;

use crate::domain::orchestration::OrchestrationPorts;

pub use achievements::{
    AchievementCatalog, AchievementDefinition, ChallengeDefinition, ChallengeRow,
    MemoryAchievementEngine, ProgressRow,
};
pub use document::{Document, DocumentKey, DocumentSnapshot, MemoryDocumentStore};
pub use mvcc::CommittedSnapshot;
pub use relational::{MemoryRelationalStore, RelationalKey, RelationalRow, RelationalSnapshot};

/// Both memory stores plus the engine that writes into the relational one.
#[derive(Clone)]
pub struct MemoryStores {
    pub relational: Arc<MemoryRelationalStore>,
    pub document: Arc<MemoryDocumentStore>,
    pub achievements: Arc<MemoryAchievementEngine>,
}

impl MemoryStores {
    pub fn new(catalog: AchievementCatalog, clock: Arc<dyn Clock>) -> Self {
        let relational = Arc::new(MemoryRelationalStore::new());
        let achievements = Arc::new(MemoryAchievementEngine::new(
            relational.clone(),
            catalog,
            clock,
        ));
        Self {
            relational,
            document: Arc::new(MemoryDocumentStore::new()),
            achievements,
        }
    }

    /// Port bundle wiring every orchestrator port to these stores.
    pub fn ports(&self) -> OrchestrationPorts {
        OrchestrationPorts {
            relational_store: self.relational.clone(),
            document_store: self.document.clone(),
            accounts: self.relational.clone(),
            questionnaires: self.document.clone(),
            cardio: self.document.clone(),
            diet: self.document.clone(),
            training: self.document.clone(),
            statistics: self.document.clone(),
            achievements: self.achievements.clone(),
        }
    }

    /// Open transactions across both stores.
    pub fn open_handles(&self) -> usize {
        self.relational.open_transactions() + self.document.open_sessions()
    }
}
