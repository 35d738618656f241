//! Request-scoped statistics view
//!
//! The daily, monthly and anonymity checks of one validation all read the
//! same account's counters. The window loads them once from the statistics
//! manager, clears obsolete periods against the injected evaluation
//! instant and memoizes the result for the lifetime of the request.

use chrono::{DateTime, Utc};

use gateway_core::statistics::normalized;
use gateway_core::{AccountAddress, AccountType, AssetCode, StatsByCounterparty};
use statistics_engine::StatisticsManager;

use crate::error::Result;

/// Rolling period selected by a ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// Current calendar day
    Daily,
    /// Current calendar month
    Monthly,
    /// Current calendar year
    Annual,
}

/// Memoized counters of one (account, asset code) pair for one request
pub struct StatsWindow<'a> {
    manager: &'a StatisticsManager,
    account: AccountAddress,
    asset_code: AssetCode,
    now: DateTime<Utc>,
    loaded: Option<StatsByCounterparty>,
}

impl<'a> StatsWindow<'a> {
    /// Window over `account`'s counters for `asset_code`, evaluated at `now`
    pub fn new(
        manager: &'a StatisticsManager,
        account: AccountAddress,
        asset_code: AssetCode,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            manager,
            account,
            asset_code,
            now,
            loaded: None,
        }
    }

    /// Counters with obsolete periods cleared, loaded at most once
    pub async fn stats(&mut self) -> Result<&StatsByCounterparty> {
        if self.loaded.is_none() {
            let raw = self
                .manager
                .get_statistics(&self.account, &self.asset_code)
                .await?;
            self.loaded = Some(normalized(&raw, self.now));
        }
        Ok(self.loaded.get_or_insert_with(StatsByCounterparty::new))
    }

    /// Sum of one period's flow over the given counterparty buckets
    pub async fn sum(
        &mut self,
        period: Period,
        is_income: bool,
        buckets: &[AccountType],
    ) -> Result<i64> {
        let stats = self.stats().await?;
        let mut total = 0i64;
        for bucket in buckets {
            if let Some(entry) = stats.get(bucket) {
                let value = match (period, is_income) {
                    (Period::Daily, true) => entry.daily_income,
                    (Period::Daily, false) => entry.daily_outcome,
                    (Period::Monthly, true) => entry.monthly_income,
                    (Period::Monthly, false) => entry.monthly_outcome,
                    (Period::Annual, true) => entry.annual_income,
                    (Period::Annual, false) => entry.annual_outcome,
                };
                total = total.saturating_add(value);
            }
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use gateway_core::mock::MockHistory;
    use gateway_core::{AccountStatistics, HistoryQuery};
    use statistics_engine::MemoryKvStore;
    use std::sync::Arc;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn sums_selected_buckets_after_clearing() {
        let history = Arc::new(MockHistory::new());
        let stamp = at(2025, 6, 10, 12);

        let mut stats = StatsByCounterparty::new();
        for (counterparty, outcome) in [
            (AccountType::AnonymousUser, 100),
            (AccountType::RegisteredUser, 200),
            (AccountType::Merchant, 1_000),
            (AccountType::SettlementAgent, 400),
        ] {
            let mut bucket = AccountStatistics::new(stamp);
            bucket.update(outcome, stamp, stamp, false);
            stats.insert(counterparty, bucket);
        }
        history.put_statistics("ACC001", "EUR", stats);

        let manager = StatisticsManager::new(
            Arc::new(MemoryKvStore::new()),
            Arc::clone(&history) as Arc<dyn HistoryQuery>,
        );

        // Same day: the daily buckets survive.
        let mut window = StatsWindow::new(&manager, "ACC001".into(), "EUR".into(), stamp);
        let retail_and_settlement = [
            AccountType::AnonymousUser,
            AccountType::RegisteredUser,
            AccountType::SettlementAgent,
        ];
        let sum = window
            .sum(Period::Daily, false, &retail_and_settlement)
            .await
            .unwrap();
        assert_eq!(sum, 700);

        // Next day: daily cleared, monthly survives.
        let mut window =
            StatsWindow::new(&manager, "ACC001".into(), "EUR".into(), at(2025, 6, 11, 1));
        let daily = window
            .sum(Period::Daily, false, &retail_and_settlement)
            .await
            .unwrap();
        let monthly = window
            .sum(Period::Monthly, false, &retail_and_settlement)
            .await
            .unwrap();
        assert_eq!(daily, 0);
        assert_eq!(monthly, 700);
    }
}
