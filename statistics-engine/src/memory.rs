//! In-memory transactional store
//!
//! Backs the test suites and single-process deployments. Every key carries
//! a version stamp; a transaction remembers the version of each watched key
//! at watch time and the commit applies only if none of those versions
//! moved. This reproduces the conflict semantics of Redis WATCH/MULTI/EXEC
//! closely enough that the manager's retry behavior can be exercised
//! without a running Redis.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;
use crate::store::{KvTransaction, KvWrite, TxnKvStore};

#[derive(Default)]
struct Shared {
    /// Value and the version of its last write. Deletions bump the version
    /// too, tracked under the tombstone version map.
    values: HashMap<String, (u64, String)>,
    /// Version of the last write (including deletes) per key
    versions: HashMap<String, u64>,
    next_version: u64,
}

impl Shared {
    fn version_of(&self, key: &str) -> u64 {
        self.versions.get(key).copied().unwrap_or(0)
    }

    fn bump(&mut self, key: &str) -> u64 {
        self.next_version += 1;
        self.versions.insert(key.to_string(), self.next_version);
        self.next_version
    }
}

/// Versioned in-memory store with optimistic transactions
#[derive(Clone, Default)]
pub struct MemoryKvStore {
    shared: Arc<Mutex<Shared>>,
}

impl MemoryKvStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TxnKvStore for MemoryKvStore {
    async fn begin(&self) -> Result<Box<dyn KvTransaction>> {
        Ok(Box::new(MemoryTransaction {
            shared: Arc::clone(&self.shared),
            watched: HashMap::new(),
        }))
    }

    async fn fetch(&self, key: &str) -> Result<Option<String>> {
        let shared = self.shared.lock();
        Ok(shared.values.get(key).map(|(_, v)| v.clone()))
    }
}

struct MemoryTransaction {
    shared: Arc<Mutex<Shared>>,
    /// Version of each watched key at the moment it was watched
    watched: HashMap<String, u64>,
}

#[async_trait]
impl KvTransaction for MemoryTransaction {
    async fn watch(&mut self, key: &str) -> Result<()> {
        let shared = self.shared.lock();
        self.watched
            .entry(key.to_string())
            .or_insert_with(|| shared.version_of(key));
        Ok(())
    }

    async fn get(&mut self, key: &str) -> Result<Option<String>> {
        let shared = self.shared.lock();
        Ok(shared.values.get(key).map(|(_, v)| v.clone()))
    }

    async fn unwatch(&mut self) -> Result<()> {
        self.watched.clear();
        Ok(())
    }

    async fn commit(&mut self, writes: Vec<KvWrite>) -> Result<bool> {
        let mut shared = self.shared.lock();
        let clean = self
            .watched
            .iter()
            .all(|(key, seen)| shared.version_of(key) == *seen);
        self.watched.clear();
        if !clean {
            return Ok(false);
        }
        for write in writes {
            match write {
                KvWrite::Set { key, value } => {
                    let version = shared.bump(&key);
                    shared.values.insert(key, (version, value));
                }
                KvWrite::Delete { key } => {
                    shared.bump(&key);
                    shared.values.remove(&key);
                }
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn commit_applies_sets_and_deletes() {
        let store = MemoryKvStore::new();
        let mut txn = store.begin().await.unwrap();
        assert!(txn
            .commit(vec![KvWrite::set("a", "1"), KvWrite::set("b", "2")])
            .await
            .unwrap());

        let mut txn = store.begin().await.unwrap();
        assert!(txn.commit(vec![KvWrite::delete("a")]).await.unwrap());

        assert_eq!(store.fetch("a").await.unwrap(), None);
        assert_eq!(store.fetch("b").await.unwrap(), Some("2".to_string()));
    }

    #[tokio::test]
    async fn concurrent_commits_on_a_watched_key_let_exactly_one_win() {
        let store = MemoryKvStore::new();

        let mut first = store.begin().await.unwrap();
        let mut second = store.begin().await.unwrap();
        first.watch("key").await.unwrap();
        second.watch("key").await.unwrap();

        assert!(first.commit(vec![KvWrite::set("key", "first")]).await.unwrap());
        assert!(!second
            .commit(vec![KvWrite::set("key", "second")])
            .await
            .unwrap());

        assert_eq!(store.fetch("key").await.unwrap(), Some("first".to_string()));
    }

    #[tokio::test]
    async fn delete_conflicts_watchers_like_a_set() {
        let store = MemoryKvStore::new();
        let mut seed = store.begin().await.unwrap();
        assert!(seed.commit(vec![KvWrite::set("key", "v")]).await.unwrap());

        let mut reader = store.begin().await.unwrap();
        reader.watch("key").await.unwrap();
        assert_eq!(reader.get("key").await.unwrap(), Some("v".to_string()));

        let mut deleter = store.begin().await.unwrap();
        assert!(deleter.commit(vec![KvWrite::delete("key")]).await.unwrap());

        assert!(!reader.commit(vec![KvWrite::set("key", "w")]).await.unwrap());
        assert_eq!(store.fetch("key").await.unwrap(), None);
    }

    #[tokio::test]
    async fn unwatch_forgets_conflicts() {
        let store = MemoryKvStore::new();
        let mut txn = store.begin().await.unwrap();
        txn.watch("key").await.unwrap();
        txn.unwatch().await.unwrap();

        let mut other = store.begin().await.unwrap();
        assert!(other.commit(vec![KvWrite::set("key", "x")]).await.unwrap());

        // No watches left, so the commit is unconditional.
        assert!(txn.commit(vec![KvWrite::set("key", "y")]).await.unwrap());
        assert_eq!(store.fetch("key").await.unwrap(), Some("y".to_string()));
    }

    #[tokio::test]
    async fn unrelated_keys_do_not_conflict() {
        let store = MemoryKvStore::new();
        let mut txn = store.begin().await.unwrap();
        txn.watch("a").await.unwrap();

        let mut other = store.begin().await.unwrap();
        assert!(other.commit(vec![KvWrite::set("b", "x")]).await.unwrap());

        assert!(txn.commit(vec![KvWrite::set("a", "y")]).await.unwrap());
    }
}
