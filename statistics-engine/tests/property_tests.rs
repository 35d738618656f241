//! Property-based tests for the statistics invariants
//!
//! These tests use proptest to verify:
//! - Clearing idempotency: clear_obsolete(now) twice == once
//! - Period cascade: a rollover never clears a coarser period than it should
//! - Round-trip law: update_get then cancel_op restores the counters,
//!   including across period boundaries

use chrono::{DateTime, Datelike, TimeZone, Utc};
use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

use gateway_core::mock::MockHistory;
use gateway_core::{
    AccountAddress, AccountStatistics, AccountType, AssetCode, ContentHash, HistoryQuery,
    StatsByCounterparty,
};
use statistics_engine::{MemoryKvStore, OpReference, StatisticsManager};

/// Strategy for timestamps within a few years around a fixed epoch
fn time_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0i64..(4 * 365 * 24 * 3600)).prop_map(move |secs| base + chrono::Duration::seconds(secs))
}

/// Strategy for an ordered (event, later evaluation) pair
fn ordered_times() -> impl Strategy<Value = (DateTime<Utc>, DateTime<Utc>)> {
    (time_strategy(), 0i64..(400 * 24 * 3600))
        .prop_map(|(event, gap)| (event, event + chrono::Duration::seconds(gap)))
}

fn amount_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000_000
}

fn counterparty_strategy() -> impl Strategy<Value = AccountType> {
    prop_oneof![
        Just(AccountType::AnonymousUser),
        Just(AccountType::RegisteredUser),
        Just(AccountType::Merchant),
        Just(AccountType::SettlementAgent),
        Just(AccountType::Bank),
    ]
}

fn counters(stats: &StatsByCounterparty) -> HashMap<AccountType, [i64; 8]> {
    stats
        .iter()
        .map(|(k, v)| {
            (
                *k,
                [
                    v.daily_income,
                    v.daily_outcome,
                    v.weekly_income,
                    v.weekly_outcome,
                    v.monthly_income,
                    v.monthly_outcome,
                    v.annual_income,
                    v.annual_outcome,
                ],
            )
        })
        .collect()
}

proptest! {
    #[test]
    fn clearing_is_idempotent(
        (event, now) in ordered_times(),
        amount in amount_strategy(),
    ) {
        let mut stats = AccountStatistics::new(event);
        stats.update(amount, event, event, true);
        stats.update(amount / 2, event, event, false);

        stats.clear_obsolete(now);
        let once = stats.clone();
        stats.clear_obsolete(now);
        prop_assert_eq!(stats, once);
    }

    #[test]
    fn cascade_clears_fine_periods_with_coarse_ones(
        (event, now) in ordered_times(),
        amount in amount_strategy(),
    ) {
        let mut stats = AccountStatistics::new(event);
        stats.update(amount, event, event, false);
        stats.clear_obsolete(now);

        // Never a cleared coarse bucket above a surviving fine one.
        if stats.daily_outcome != 0 {
            prop_assert_eq!(stats.weekly_outcome, amount);
        }
        if stats.weekly_outcome != 0 {
            prop_assert_eq!(stats.monthly_outcome, amount);
        }
        if stats.monthly_outcome != 0 {
            prop_assert_eq!(stats.annual_outcome, amount);
        }
        // The annual bucket survives exactly when the year is unchanged.
        if event.year() == now.year() {
            prop_assert_eq!(stats.annual_outcome, amount);
        } else {
            prop_assert_eq!(stats.annual_outcome, 0);
        }
    }

    #[test]
    fn update_then_cancel_restores_counters(
        (applied_at, cancelled_at) in ordered_times(),
        amount in amount_strategy(),
        counterparty in counterparty_strategy(),
        is_income in any::<bool>(),
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime");
        rt.block_on(async {
            let store = MemoryKvStore::new();
            let history = Arc::new(MockHistory::new());
            let manager = StatisticsManager::new(
                Arc::new(store),
                Arc::clone(&history) as Arc<dyn HistoryQuery>,
            );

            let account = AccountAddress::new("ACC001");
            let code = AssetCode::new("EUR");
            let op = OpReference {
                tx_hash: ContentHash::of(b"roundtrip"),
                op_index: 1,
            };

            manager
                .update_get(&account, &code, counterparty, is_income, applied_at, op, amount)
                .await
                .unwrap();
            manager
                .cancel_op(&account, &code, counterparty, is_income, cancelled_at, op)
                .await
                .unwrap();

            let mut after = manager.get_statistics(&account, &code).await.unwrap();
            for bucket in after.values_mut() {
                bucket.clear_obsolete(cancelled_at);
            }

            // Every counter the cancellation could still see is back to
            // zero; nothing went negative.
            for bucket in counters(&after).values() {
                for value in bucket {
                    prop_assert_eq!(*value, 0);
                }
            }
            Ok(())
        })?;
    }
}
