//! Transactional key-value capability
//!
//! The statistics manager needs exactly four primitives from its fast
//! store: plain reads, watched reads, dropping watches and an atomic
//! compare-and-commit that fails when any watched key changed since it was
//! watched. [`TxnKvStore`] captures that contract; Redis WATCH/MULTI/EXEC
//! is the production implementation and an in-memory store backs the test
//! suites.

use async_trait::async_trait;

use crate::error::Result;

/// One write applied by a commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KvWrite {
    /// Sets `key` to `value`
    Set {
        /// Target key
        key: String,
        /// New value
        value: String,
    },
    /// Removes `key`
    Delete {
        /// Target key
        key: String,
    },
}

impl KvWrite {
    /// Set write
    pub fn set(key: impl Into<String>, value: impl Into<String>) -> Self {
        KvWrite::Set {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Delete write
    pub fn delete(key: impl Into<String>) -> Self {
        KvWrite::Delete { key: key.into() }
    }
}

/// One optimistic transaction against the fast store.
///
/// A transaction is single-shot: after [`commit`](KvTransaction::commit)
/// or [`unwatch`](KvTransaction::unwatch) it must be dropped. Dropping a
/// transaction without either call releases its watches.
#[async_trait]
pub trait KvTransaction: Send {
    /// Marks `key` so that a later commit fails if the key changes.
    ///
    /// Watch before read: a key must be watched before the read whose
    /// result feeds the commit, otherwise the conflict window is open.
    async fn watch(&mut self, key: &str) -> Result<()>;

    /// Reads a value inside the transaction
    async fn get(&mut self, key: &str) -> Result<Option<String>>;

    /// Drops every watch without committing
    async fn unwatch(&mut self) -> Result<()>;

    /// Atomically applies `writes` if no watched key changed.
    ///
    /// Returns `Ok(false)` when a watched key was touched by someone else;
    /// the caller re-runs its read-compute-commit cycle. `Ok(true)` means
    /// every write landed atomically.
    async fn commit(&mut self, writes: Vec<KvWrite>) -> Result<bool>;
}

/// Handle to a fast store capable of optimistic transactions
#[async_trait]
pub trait TxnKvStore: Send + Sync {
    /// Opens a fresh transaction.
    ///
    /// Watches are scoped to the returned transaction, so concurrent
    /// transactions from one store never share conflict state.
    async fn begin(&self) -> Result<Box<dyn KvTransaction>>;

    /// Plain unwatched read outside any transaction
    async fn fetch(&self, key: &str) -> Result<Option<String>>;
}
