//! Rolling statistics manager
//!
//! Owns the per-(account, asset) counters in the fast store and keeps them
//! correct under concurrent validation. Every mutation runs the optimistic
//! watch-compute-commit cycle from [`crate::retry`] and is paired with a
//! processed-op marker so that replaying a transaction never double-counts
//! and cancelling is symmetric with the original application.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use gateway_core::{
    AccountAddress, AccountStatistics, AccountType, AssetCode, ContentHash, HistoryQuery,
    StatsByCounterparty,
};

use crate::error::{Error, Result};
use crate::retry::{run_optimistic, Attempt, OptimisticOp};
use crate::store::{KvTransaction, KvWrite, TxnKvStore};

/// Identifies one operation of one transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpReference {
    /// Content hash of the carrying transaction
    pub tx_hash: ContentHash,
    /// 1-based index of the operation inside the transaction
    pub op_index: u32,
}

/// Marker recording that an operation's delta is reflected in the counters.
///
/// The marker exists iff its delta is applied; cancellation removes both in
/// one atomic commit. The recorded event time replays the original period
/// placement when the cancellation happens in a later period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ProcessedOp {
    amount: i64,
    event_time: DateTime<Utc>,
}

fn stats_key(account: &AccountAddress, asset_code: &AssetCode) -> String {
    format!("stats:{}:{}", account, asset_code)
}

fn processed_key(op: &OpReference, is_income: bool) -> String {
    let direction = if is_income { "in" } else { "out" };
    format!("processed:{}:{}:{}", op.tx_hash, op.op_index, direction)
}

fn parse<T: serde::de::DeserializeOwned>(key: &str, raw: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|e| Error::MalformedValue {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

/// Manager of the rolling usage counters
pub struct StatisticsManager {
    store: Arc<dyn TxnKvStore>,
    history: Arc<dyn HistoryQuery>,
}

impl StatisticsManager {
    /// Manager over `store` with `history` as the durable reload source
    pub fn new(store: Arc<dyn TxnKvStore>, history: Arc<dyn HistoryQuery>) -> Self {
        Self { store, history }
    }

    /// Applies one operation delta and returns the updated counters.
    ///
    /// Idempotent per (transaction hash, operation index, direction): a
    /// replayed call finds the processed-op marker and returns the current
    /// counters without touching them.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_get(
        &self,
        account: &AccountAddress,
        asset_code: &AssetCode,
        counterparty: AccountType,
        is_income: bool,
        now: DateTime<Utc>,
        op: OpReference,
        amount: i64,
    ) -> Result<StatsByCounterparty> {
        let mut cycle = UpdateGet {
            manager: self,
            account,
            asset_code,
            counterparty,
            is_income,
            now,
            op,
            amount,
        };
        run_optimistic(self.store.as_ref(), "update_get", &mut cycle).await
    }

    /// Subtracts a previously applied delta and drops its marker.
    ///
    /// A missing marker means the delta was never applied or is already
    /// cancelled; the call is then a no-op. The subtraction replays the
    /// recorded original event time so buckets whose period has ended since
    /// the application are correctly left alone.
    pub async fn cancel_op(
        &self,
        account: &AccountAddress,
        asset_code: &AssetCode,
        counterparty: AccountType,
        is_income: bool,
        now: DateTime<Utc>,
        op: OpReference,
    ) -> Result<()> {
        let mut cycle = CancelOp {
            manager: self,
            account,
            asset_code,
            counterparty,
            is_income,
            now,
            op,
        };
        run_optimistic(self.store.as_ref(), "cancel_op", &mut cycle).await
    }

    /// Current counters of one (account, asset code) pair.
    ///
    /// Reads the fast store and falls back to the durable history when the
    /// entry is absent. The returned buckets are raw; callers clear obsolete
    /// periods against their own evaluation instant.
    pub async fn get_statistics(
        &self,
        account: &AccountAddress,
        asset_code: &AssetCode,
    ) -> Result<StatsByCounterparty> {
        let key = stats_key(account, asset_code);
        match self.store.fetch(&key).await? {
            Some(raw) => parse(&key, &raw),
            None => Ok(self.history.account_statistics(account, asset_code).await?),
        }
    }

    /// Loads the counters inside `txn`, reloading durably on a miss
    async fn load_stats(
        &self,
        txn: &mut dyn KvTransaction,
        account: &AccountAddress,
        asset_code: &AssetCode,
    ) -> Result<StatsByCounterparty> {
        let key = stats_key(account, asset_code);
        match txn.get(&key).await? {
            Some(raw) => parse(&key, &raw),
            None => {
                debug!(account = %account, asset = %asset_code, "statistics fast-store miss, durable reload");
                Ok(self.history.account_statistics(account, asset_code).await?)
            }
        }
    }
}

struct UpdateGet<'a> {
    manager: &'a StatisticsManager,
    account: &'a AccountAddress,
    asset_code: &'a AssetCode,
    counterparty: AccountType,
    is_income: bool,
    now: DateTime<Utc>,
    op: OpReference,
    amount: i64,
}

#[async_trait]
impl OptimisticOp for UpdateGet<'_> {
    type Output = StatsByCounterparty;

    async fn attempt(
        &mut self,
        txn: &mut dyn KvTransaction,
    ) -> Result<Attempt<StatsByCounterparty>> {
        let marker_key = processed_key(&self.op, self.is_income);
        txn.watch(&marker_key).await?;
        if txn.get(&marker_key).await?.is_some() {
            // Replay: the delta is already in the counters.
            debug!(tx = %self.op.tx_hash, index = self.op.op_index, "statistics delta already applied");
            let stats = self
                .manager
                .load_stats(txn, self.account, self.asset_code)
                .await?;
            return Ok(Attempt::Done(stats));
        }

        let key = stats_key(self.account, self.asset_code);
        txn.watch(&key).await?;
        let mut stats = self
            .manager
            .load_stats(txn, self.account, self.asset_code)
            .await?;

        for bucket in stats.values_mut() {
            bucket.clear_obsolete(self.now);
        }
        stats
            .entry(self.counterparty)
            .or_insert_with(|| AccountStatistics::new(self.now))
            .update(self.amount, self.now, self.now, self.is_income);

        let marker = ProcessedOp {
            amount: self.amount,
            event_time: self.now,
        };
        let writes = vec![
            KvWrite::set(&key, serde_json::to_string(&stats)?),
            KvWrite::set(&marker_key, serde_json::to_string(&marker)?),
        ];
        Ok(Attempt::Commit {
            writes,
            value: stats,
        })
    }
}

struct CancelOp<'a> {
    manager: &'a StatisticsManager,
    account: &'a AccountAddress,
    asset_code: &'a AssetCode,
    counterparty: AccountType,
    is_income: bool,
    now: DateTime<Utc>,
    op: OpReference,
}

#[async_trait]
impl OptimisticOp for CancelOp<'_> {
    type Output = ();

    async fn attempt(&mut self, txn: &mut dyn KvTransaction) -> Result<Attempt<()>> {
        let marker_key = processed_key(&self.op, self.is_income);
        txn.watch(&marker_key).await?;
        let marker: ProcessedOp = match txn.get(&marker_key).await? {
            Some(raw) => parse(&marker_key, &raw)?,
            // Never applied or already cancelled.
            None => return Ok(Attempt::Done(())),
        };

        let key = stats_key(self.account, self.asset_code);
        txn.watch(&key).await?;
        let mut stats = self
            .manager
            .load_stats(txn, self.account, self.asset_code)
            .await?;

        for bucket in stats.values_mut() {
            bucket.clear_obsolete(self.now);
        }
        stats
            .entry(self.counterparty)
            .or_insert_with(|| AccountStatistics::new(self.now))
            .update(-marker.amount, marker.event_time, self.now, self.is_income);

        debug!(tx = %self.op.tx_hash, index = self.op.op_index, amount = marker.amount, "statistics delta cancelled");
        let writes = vec![
            KvWrite::set(&key, serde_json::to_string(&stats)?),
            KvWrite::delete(&marker_key),
        ];
        Ok(Attempt::Commit { writes, value: () })
    }
}

/// Returns the counters as a plain map for assertions in tests
#[cfg(test)]
fn counters(stats: &StatsByCounterparty) -> std::collections::HashMap<AccountType, (i64, i64)> {
    stats
        .iter()
        .map(|(k, v)| (*k, (v.daily_income, v.daily_outcome)))
        .collect()
}
