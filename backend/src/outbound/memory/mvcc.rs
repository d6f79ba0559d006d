//! Optimistic multi-key transactions over an in-memory map.
//!
//! Writes are buffered per transaction and become visible on commit. A key
//! holds at most one pending writer: a second transaction writing the same
//! key fails immediately with [`MvccError::Conflict`], as does a write to a
//! key whose committed version moved on since this transaction first read
//! it. Commit therefore never fails on conflicts.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MvccError {
    UnknownTransaction(Uuid),
    Conflict(String),
}

#[derive(Debug)]
struct Versioned<V> {
    version: u64,
    value: Option<V>,
}

#[derive(Debug)]
struct Pending<K, V> {
    observed: HashMap<K, u64>,
    writes: HashMap<K, Option<V>>,
}

impl<K, V> Default for Pending<K, V> {
    fn default() -> Self {
        Self {
            observed: HashMap::new(),
            writes: HashMap::new(),
        }
    }
}

/// Committed state snapshot used to assert that aborted work left no trace.
#[derive(Debug, PartialEq)]
pub struct CommittedSnapshot<K: Eq + Hash, V>(HashMap<K, V>);

#[derive(Debug)]
pub struct VersionedStore<K, V> {
    committed: HashMap<K, Versioned<V>>,
    pending: HashMap<Uuid, Pending<K, V>>,
}

impl<K, V> Default for VersionedStore<K, V> {
    fn default() -> Self {
        Self {
            committed: HashMap::new(),
            pending: HashMap::new(),
        }
    }
}

impl<K, V> VersionedStore<K, V>
where
    K: Clone + Debug + Eq + Hash,
    V: Clone,
{
    pub fn begin(&mut self, id: Uuid) {
        self.pending.insert(id, Pending::default());
    }

    /// Read through the transaction's own writes, then committed state.
    pub fn read(&mut self, id: Uuid, key: &K) -> Result<Option<V>, MvccError> {
        let committed_version = self.committed_version(key);
        let committed_value = self
            .committed
            .get(key)
            .and_then(|entry| entry.value.clone());
        let pending = self
            .pending
            .get_mut(&id)
            .ok_or(MvccError::UnknownTransaction(id))?;

        if let Some(written) = pending.writes.get(key) {
            return Ok(written.clone());
        }
        pending
            .observed
            .entry(key.clone())
            .or_insert(committed_version);
        Ok(committed_value)
    }

    /// Buffer a write; `None` deletes the key on commit.
    pub fn write(&mut self, id: Uuid, key: K, value: Option<V>) -> Result<(), MvccError> {
        if !self.pending.contains_key(&id) {
            return Err(MvccError::UnknownTransaction(id));
        }
        let contended = self
            .pending
            .iter()
            .any(|(other, pending)| *other != id && pending.writes.contains_key(&key));
        if contended {
            return Err(MvccError::Conflict(format!(
                "{key:?} has a pending write from another transaction"
            )));
        }

        let committed_version = self.committed_version(&key);
        let pending = self
            .pending
            .get_mut(&id)
            .ok_or(MvccError::UnknownTransaction(id))?;
        if pending
            .observed
            .get(&key)
            .is_some_and(|observed| *observed != committed_version)
        {
            return Err(MvccError::Conflict(format!(
                "{key:?} changed since it was read"
            )));
        }
        pending.writes.insert(key, value);
        Ok(())
    }

    pub fn commit(&mut self, id: Uuid) -> Result<(), MvccError> {
        let pending = self
            .pending
            .remove(&id)
            .ok_or(MvccError::UnknownTransaction(id))?;
        for (key, value) in pending.writes {
            let version = self.committed_version(&key) + 1;
            self.committed.insert(key, Versioned { version, value });
        }
        Ok(())
    }

    pub fn abort(&mut self, id: Uuid) -> Result<(), MvccError> {
        self.pending
            .remove(&id)
            .map(|_| ())
            .ok_or(MvccError::UnknownTransaction(id))
    }

    pub fn committed_value(&self, key: &K) -> Option<V> {
        self.committed
            .get(key)
            .and_then(|entry| entry.value.clone())
    }

    pub fn snapshot(&self) -> CommittedSnapshot<K, V> {
        CommittedSnapshot(
            self.committed
                .iter()
                .filter_map(|(key, entry)| {
                    entry.value.clone().map(|value| (key.clone(), value))
                })
                .collect(),
        )
    }

    pub fn open_transactions(&self) -> usize {
        self.pending.len()
    }

    fn committed_version(&self, key: &K) -> u64 {
        self.committed.get(key).map_or(0, |entry| entry.version)
    }
}
