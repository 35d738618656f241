//! Bounded optimistic retry loop
//!
//! Both statistics mutations run the same cycle: open a transaction, watch
//! the keys that feed the decision, compute the next state, try to commit.
//! The loop lives here once so the attempt budget and the conflict handling
//! are shared and tested in one place.

use async_trait::async_trait;
use tracing::debug;

use crate::error::{Error, Result};
use crate::store::{KvTransaction, KvWrite, TxnKvStore};

/// Attempts per optimistic operation before giving up
pub const MAX_ATTEMPTS: u32 = 5;

/// Outcome of one attempt of an optimistic operation
pub enum Attempt<T> {
    /// Nothing to write; the value stands without a commit
    Done(T),
    /// Commit `writes` atomically; `value` is the result if they land
    Commit {
        /// Writes to apply if no watched key changed
        writes: Vec<KvWrite>,
        /// Result to return on a clean commit
        value: T,
    },
}

/// One watched read-compute-commit cycle.
///
/// Implementations watch every key whose content influences the computed
/// writes before reading it; the loop re-runs the whole attempt when the
/// commit reports a conflict.
#[async_trait]
pub trait OptimisticOp: Send {
    /// Value produced by a completed run
    type Output: Send;

    /// Runs one cycle inside `txn`
    async fn attempt(&mut self, txn: &mut dyn KvTransaction) -> Result<Attempt<Self::Output>>;
}

/// Runs `op` until it commits cleanly or the attempt budget is spent.
///
/// Conflicts retry immediately; the store already serialized the competing
/// writer, waiting would only stretch the window. Infrastructure errors
/// from the store or the attempt itself are never retried.
pub async fn run_optimistic<O: OptimisticOp>(
    store: &dyn TxnKvStore,
    label: &'static str,
    op: &mut O,
) -> Result<O::Output> {
    for attempt in 1..=MAX_ATTEMPTS {
        let mut txn = store.begin().await?;
        match op.attempt(txn.as_mut()).await? {
            Attempt::Done(value) => {
                txn.unwatch().await?;
                return Ok(value);
            }
            Attempt::Commit { writes, value } => {
                if txn.commit(writes).await? {
                    return Ok(value);
                }
                debug!(operation = label, attempt, "optimistic commit conflicted");
            }
        }
    }
    Err(Error::RetriesExhausted {
        operation: label,
        attempts: MAX_ATTEMPTS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryKvStore;

    /// Increments a counter key; optionally sabotages itself by writing the
    /// watched key through a second connection before committing.
    struct Increment {
        key: String,
        saboteur: Option<MemoryKvStore>,
    }

    #[async_trait]
    impl OptimisticOp for Increment {
        type Output = i64;

        async fn attempt(&mut self, txn: &mut dyn KvTransaction) -> Result<Attempt<i64>> {
            txn.watch(&self.key).await?;
            let current: i64 = txn
                .get(&self.key)
                .await?
                .map(|v| v.parse().unwrap_or(0))
                .unwrap_or(0);

            if let Some(store) = &self.saboteur {
                let mut other = store.begin().await?;
                assert!(other.commit(vec![KvWrite::set(&self.key, "999")]).await?);
            }

            let next = current + 1;
            Ok(Attempt::Commit {
                writes: vec![KvWrite::set(&self.key, next.to_string())],
                value: next,
            })
        }
    }

    #[tokio::test]
    async fn commits_on_first_clean_attempt() {
        let store = MemoryKvStore::new();
        let mut op = Increment {
            key: "counter".to_string(),
            saboteur: None,
        };
        let value = run_optimistic(&store, "increment", &mut op).await.unwrap();
        assert_eq!(value, 1);
        assert_eq!(store.fetch("counter").await.unwrap().unwrap(), "1");
    }

    #[tokio::test]
    async fn exhausts_attempts_under_permanent_conflict() {
        let store = MemoryKvStore::new();
        let mut op = Increment {
            key: "counter".to_string(),
            saboteur: Some(store.clone()),
        };
        let err = run_optimistic(&store, "increment", &mut op)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::RetriesExhausted {
                operation: "increment",
                attempts: MAX_ATTEMPTS,
            }
        ));
        // The sabotage writes went through, the increment never did.
        assert_eq!(store.fetch("counter").await.unwrap().unwrap(), "999");
    }

    #[tokio::test]
    async fn done_attempt_skips_the_commit() {
        struct ReadOnly;

        #[async_trait]
        impl OptimisticOp for ReadOnly {
            type Output = Option<String>;

            async fn attempt(
                &mut self,
                txn: &mut dyn KvTransaction,
            ) -> Result<Attempt<Option<String>>> {
                txn.watch("key").await?;
                Ok(Attempt::Done(txn.get("key").await?))
            }
        }

        let store = MemoryKvStore::new();
        let value = run_optimistic(&store, "read", &mut ReadOnly).await.unwrap();
        assert_eq!(value, None);
    }
}
