//! Outgoing and incoming limit validators
//!
//! Both validators compare the amount under validation against the
//! administered per-account ceilings and, for anonymous accounts moving
//! anonymous assets, against the process-wide anonymity ceilings. The
//! administered ceilings use the `-1` sentinel per field and disappear
//! entirely when no limits row is administered; the anonymity ceilings
//! apply regardless of administered rows.
//!
//! Every rejection carries the exact amounts involved so that a given
//! input always produces the same diagnostic text.

use gateway_core::limits::NO_LIMIT;
use gateway_core::{
    AccountAddress, AccountType, AnonymousUserRestrictions, Asset, HistoryQuery, LedgerAccount,
};
use tracing::debug;

use crate::error::{Result, RuleViolation};
use crate::stats_window::{Period, StatsWindow};

/// Counterparty buckets counted by the daily and monthly flow ceilings.
///
/// Merchant traffic is excluded: retail purchases do not consume the flow
/// ceilings, which track money moving between wallets and toward
/// settlement.
const FLOW_BUCKETS: [AccountType; 3] = [
    AccountType::AnonymousUser,
    AccountType::RegisteredUser,
    AccountType::SettlementAgent,
];

/// Counterparty buckets counted by the annual anonymity ceilings.
///
/// Settlement-agent traffic is excluded here: transfers toward settlement
/// are off-ledger collection, not retail spend, while merchant purchases do
/// count toward the annual cap.
const ANNUAL_BUCKETS: [AccountType; 3] = [
    AccountType::AnonymousUser,
    AccountType::RegisteredUser,
    AccountType::Merchant,
];

fn exceeded(text: String) -> Option<RuleViolation> {
    Some(RuleViolation::ExceededLimit(text))
}

/// Validates what an account is about to spend
pub struct OutgoingLimitsValidator<'a> {
    history: &'a dyn HistoryQuery,
    anonymous: &'a AnonymousUserRestrictions,
}

impl<'a> OutgoingLimitsValidator<'a> {
    /// Validator over the administered limits in `history` and the
    /// process-wide anonymity ceilings
    pub fn new(history: &'a dyn HistoryQuery, anonymous: &'a AnonymousUserRestrictions) -> Self {
        Self { history, anonymous }
    }

    /// Checks `amount` leaving `source` toward a `counterparty`-class account
    pub async fn check(
        &self,
        source: &LedgerAccount,
        asset: &Asset,
        asset_is_anonymous: bool,
        counterparty: AccountType,
        amount: i64,
        stats: &mut StatsWindow<'_>,
    ) -> Result<Option<RuleViolation>> {
        let code = asset.ledger_code();
        if let Some(limits) = self.history.account_limits(&source.address, &code).await? {
            if limits.max_operation_out != NO_LIMIT && amount > limits.max_operation_out {
                return Ok(exceeded(format!(
                    "operation amount {} exceeds the single-operation outgoing limit {} for asset {}",
                    amount, limits.max_operation_out, code
                )));
            }
            if limits.daily_max_out != NO_LIMIT {
                let spent = stats.sum(Period::Daily, false, &FLOW_BUCKETS).await?;
                if spent.saturating_add(amount) > limits.daily_max_out {
                    return Ok(exceeded(format!(
                        "daily outgoing limit exceeded: {} spent, {} pending, limit {} for asset {}",
                        spent, amount, limits.daily_max_out, code
                    )));
                }
            }
            if limits.monthly_max_out != NO_LIMIT {
                let spent = stats.sum(Period::Monthly, false, &FLOW_BUCKETS).await?;
                if spent.saturating_add(amount) > limits.monthly_max_out {
                    return Ok(exceeded(format!(
                        "monthly outgoing limit exceeded: {} spent, {} pending, limit {} for asset {}",
                        spent, amount, limits.monthly_max_out, code
                    )));
                }
            }
        }

        if asset_is_anonymous && source.account_type == AccountType::AnonymousUser {
            if let Some(violation) = self
                .check_anonymous(&source.address, asset, counterparty, amount, stats)
                .await?
            {
                return Ok(Some(violation));
            }
        }
        Ok(None)
    }

    /// Anonymity ceilings on spending.
    ///
    /// The daily and monthly caps are waived when the counterparty is a
    /// merchant, the annual cap when the counterparty is a settlement
    /// agent.
    async fn check_anonymous(
        &self,
        source: &AccountAddress,
        asset: &Asset,
        counterparty: AccountType,
        amount: i64,
        stats: &mut StatsWindow<'_>,
    ) -> Result<Option<RuleViolation>> {
        let code = asset.ledger_code();
        let purchases = counterparty == AccountType::Merchant;
        let settlement = counterparty == AccountType::SettlementAgent;

        if !purchases && self.anonymous.max_daily_outcome != NO_LIMIT {
            let spent = stats.sum(Period::Daily, false, &FLOW_BUCKETS).await?;
            if spent.saturating_add(amount) > self.anonymous.max_daily_outcome {
                return Ok(exceeded(format!(
                    "anonymous daily outcome limit exceeded: {} spent, {} pending, limit {} for asset {}",
                    spent, amount, self.anonymous.max_daily_outcome, code
                )));
            }
        }
        if !purchases && self.anonymous.max_monthly_outcome != NO_LIMIT {
            let spent = stats.sum(Period::Monthly, false, &FLOW_BUCKETS).await?;
            if spent.saturating_add(amount) > self.anonymous.max_monthly_outcome {
                return Ok(exceeded(format!(
                    "anonymous monthly outcome limit exceeded: {} spent, {} pending, limit {} for asset {}",
                    spent, amount, self.anonymous.max_monthly_outcome, code
                )));
            }
        }
        if !settlement && self.anonymous.max_annual_outcome != NO_LIMIT {
            let spent = stats.sum(Period::Annual, false, &ANNUAL_BUCKETS).await?;
            if spent.saturating_add(amount) > self.anonymous.max_annual_outcome {
                return Ok(exceeded(format!(
                    "anonymous annual outcome limit exceeded: {} spent, {} pending, limit {} for asset {}",
                    spent, amount, self.anonymous.max_annual_outcome, code
                )));
            }
        }
        debug!(account = %source, asset = %code, "anonymous outgoing ceilings passed");
        Ok(None)
    }
}

/// Validates what an account is about to receive
pub struct IncomingLimitsValidator<'a> {
    history: &'a dyn HistoryQuery,
    anonymous: &'a AnonymousUserRestrictions,
}

impl<'a> IncomingLimitsValidator<'a> {
    /// Validator over the administered limits in `history` and the
    /// process-wide anonymity ceilings
    pub fn new(history: &'a dyn HistoryQuery, anonymous: &'a AnonymousUserRestrictions) -> Self {
        Self { history, anonymous }
    }

    /// Checks `amount` arriving at `destination` from a `counterparty`-class
    /// account.
    ///
    /// `trustline_balance` is the destination's current holding of the
    /// asset, zero when the destination or the trustline does not exist
    /// yet (anonymous assets may be sent to accounts still to be created).
    #[allow(clippy::too_many_arguments)]
    pub async fn check(
        &self,
        destination: &AccountAddress,
        destination_type: AccountType,
        trustline_balance: i64,
        asset: &Asset,
        asset_is_anonymous: bool,
        counterparty: AccountType,
        amount: i64,
        stats: &mut StatsWindow<'_>,
    ) -> Result<Option<RuleViolation>> {
        let code = asset.ledger_code();
        if let Some(limits) = self.history.account_limits(destination, &code).await? {
            if limits.max_operation_in != NO_LIMIT && amount > limits.max_operation_in {
                return Ok(exceeded(format!(
                    "operation amount {} exceeds the single-operation incoming limit {} for asset {}",
                    amount, limits.max_operation_in, code
                )));
            }
            if limits.daily_max_in != NO_LIMIT {
                let received = stats.sum(Period::Daily, true, &FLOW_BUCKETS).await?;
                if received.saturating_add(amount) > limits.daily_max_in {
                    return Ok(exceeded(format!(
                        "daily incoming limit exceeded: {} received, {} pending, limit {} for asset {}",
                        received, amount, limits.daily_max_in, code
                    )));
                }
            }
            if limits.monthly_max_in != NO_LIMIT {
                let received = stats.sum(Period::Monthly, true, &FLOW_BUCKETS).await?;
                if received.saturating_add(amount) > limits.monthly_max_in {
                    return Ok(exceeded(format!(
                        "monthly incoming limit exceeded: {} received, {} pending, limit {} for asset {}",
                        received, amount, limits.monthly_max_in, code
                    )));
                }
            }
        }

        if asset_is_anonymous && destination_type == AccountType::AnonymousUser {
            if self.anonymous.max_balance != NO_LIMIT
                && trustline_balance.saturating_add(amount) > self.anonymous.max_balance
            {
                return Ok(exceeded(format!(
                    "anonymous balance limit exceeded: balance {}, {} pending, limit {} for asset {}",
                    trustline_balance, amount, self.anonymous.max_balance, code
                )));
            }
            let settlement = counterparty == AccountType::SettlementAgent;
            if !settlement && self.anonymous.max_annual_income != NO_LIMIT {
                let received = stats.sum(Period::Annual, true, &ANNUAL_BUCKETS).await?;
                if received.saturating_add(amount) > self.anonymous.max_annual_income {
                    return Ok(exceeded(format!(
                        "anonymous annual income limit exceeded: {} received, {} pending, limit {} for asset {}",
                        received, amount, self.anonymous.max_annual_income, code
                    )));
                }
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits_row(account: &str, code: &str) -> AccountLimits {
        AccountLimits::unrestricted(account.into(), code.into())
    }
    use chrono::{TimeZone, Utc};
    use gateway_core::mock::MockHistory;
    use gateway_core::{AccountLimits, AccountStatistics, StatsByCounterparty};
    use statistics_engine::{MemoryKvStore, StatisticsManager};
    use std::sync::Arc;

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap()
    }

    fn account(address: &str, account_type: AccountType) -> LedgerAccount {
        LedgerAccount {
            address: address.into(),
            account_type,
            sequence: 1,
            balance: 0,
        }
    }

    fn eur() -> Asset {
        Asset::credit("EUR", "ISSUER0001")
    }

    struct Fixture {
        history: Arc<MockHistory>,
        manager: StatisticsManager,
        anonymous: AnonymousUserRestrictions,
    }

    impl Fixture {
        fn new() -> Self {
            let history = Arc::new(MockHistory::new());
            let manager = StatisticsManager::new(
                Arc::new(MemoryKvStore::new()),
                Arc::clone(&history) as Arc<dyn HistoryQuery>,
            );
            Self {
                history,
                manager,
                anonymous: AnonymousUserRestrictions::default(),
            }
        }

        fn window(&self, address: &str) -> StatsWindow<'_> {
            StatsWindow::new(&self.manager, address.into(), "EUR".into(), now())
        }

        fn seed_outcome(&self, address: &str, counterparty: AccountType, spent: i64) {
            let mut stats = StatsByCounterparty::new();
            let mut bucket = AccountStatistics::new(now());
            bucket.update(spent, now(), now(), false);
            stats.insert(counterparty, bucket);
            self.history.put_statistics(address, "EUR", stats);
        }
    }

    #[tokio::test]
    async fn no_limits_row_passes_any_amount() {
        let fix = Fixture::new();
        let validator = OutgoingLimitsValidator::new(fix.history.as_ref(), &fix.anonymous);
        let source = account("BANK01", AccountType::Bank);
        let mut window = fix.window("BANK01");

        let verdict = validator
            .check(
                &source,
                &eur(),
                false,
                AccountType::SettlementAgent,
                i64::MAX / 2,
                &mut window,
            )
            .await
            .unwrap();
        assert!(verdict.is_none());
    }

    #[tokio::test]
    async fn sentinel_disables_only_its_own_ceiling() {
        let fix = Fixture::new();
        let mut row = limits_row("ACC001", "EUR");
        row.max_operation_out = NO_LIMIT;
        row.daily_max_out = 1_000;
        fix.history.put_limits(row);

        let validator = OutgoingLimitsValidator::new(fix.history.as_ref(), &fix.anonymous);
        let source = account("ACC001", AccountType::RegisteredUser);

        // Huge single operation passes the per-operation check but trips
        // the daily ceiling.
        let mut window = fix.window("ACC001");
        let verdict = validator
            .check(
                &source,
                &eur(),
                false,
                AccountType::RegisteredUser,
                5_000,
                &mut window,
            )
            .await
            .unwrap();
        let violation = verdict.unwrap();
        assert_eq!(
            violation.description(),
            "daily outgoing limit exceeded: 0 spent, 5000 pending, limit 1000 for asset EUR"
        );
    }

    #[tokio::test]
    async fn per_operation_incoming_limit_message_embeds_amounts_and_asset() {
        let fix = Fixture::new();
        let mut row = limits_row("DEST01", "EUR");
        row.max_operation_in = 700;
        fix.history.put_limits(row);

        let validator = IncomingLimitsValidator::new(fix.history.as_ref(), &fix.anonymous);
        let mut window = fix.window("DEST01");

        let verdict = validator
            .check(
                &"DEST01".into(),
                AccountType::AnonymousUser,
                0,
                &eur(),
                false,
                AccountType::Bank,
                900,
                &mut window,
            )
            .await
            .unwrap();
        assert_eq!(
            verdict.unwrap().description(),
            "operation amount 900 exceeds the single-operation incoming limit 700 for asset EUR"
        );
    }

    #[tokio::test]
    async fn daily_ceiling_counts_flow_buckets_but_not_merchants() {
        let fix = Fixture::new();
        let mut row = limits_row("ACC001", "EUR");
        row.daily_max_out = 1_000;
        fix.history.put_limits(row);
        // 900 already spent toward merchants: not counted by the flow sum.
        fix.seed_outcome("ACC001", AccountType::Merchant, 900);

        let validator = OutgoingLimitsValidator::new(fix.history.as_ref(), &fix.anonymous);
        let source = account("ACC001", AccountType::RegisteredUser);
        let mut window = fix.window("ACC001");

        let verdict = validator
            .check(
                &source,
                &eur(),
                false,
                AccountType::RegisteredUser,
                800,
                &mut window,
            )
            .await
            .unwrap();
        assert!(verdict.is_none());
    }

    #[tokio::test]
    async fn anonymous_daily_ceiling_is_waived_for_merchant_counterparties() {
        let mut fix = Fixture::new();
        fix.anonymous.max_daily_outcome = 1_000;
        fix.anonymous.max_monthly_outcome = NO_LIMIT;
        fix.anonymous.max_annual_outcome = NO_LIMIT;

        let validator = OutgoingLimitsValidator::new(fix.history.as_ref(), &fix.anonymous);
        let source = account("ANON01", AccountType::AnonymousUser);

        // Over the daily cap toward a registered user: rejected.
        let mut window = fix.window("ANON01");
        let verdict = validator
            .check(
                &source,
                &eur(),
                true,
                AccountType::RegisteredUser,
                1_500,
                &mut window,
            )
            .await
            .unwrap();
        assert!(verdict.unwrap().description().starts_with("anonymous daily"));

        // Same amount toward a merchant: the daily cap does not apply.
        let mut window = fix.window("ANON01");
        let verdict = validator
            .check(
                &source,
                &eur(),
                true,
                AccountType::Merchant,
                1_500,
                &mut window,
            )
            .await
            .unwrap();
        assert!(verdict.is_none());
    }

    #[tokio::test]
    async fn anonymous_annual_ceiling_counts_merchants_but_waives_settlement() {
        let mut fix = Fixture::new();
        fix.anonymous.max_daily_outcome = NO_LIMIT;
        fix.anonymous.max_monthly_outcome = NO_LIMIT;
        fix.anonymous.max_annual_outcome = 10_000;
        // 9_500 of retail spend already on the books, toward merchants.
        fix.seed_outcome("ANON01", AccountType::Merchant, 9_500);

        let validator = OutgoingLimitsValidator::new(fix.history.as_ref(), &fix.anonymous);
        let source = account("ANON01", AccountType::AnonymousUser);

        // Toward a registered user the annual sum includes the merchant
        // spend and trips the cap.
        let mut window = fix.window("ANON01");
        let verdict = validator
            .check(
                &source,
                &eur(),
                true,
                AccountType::RegisteredUser,
                1_000,
                &mut window,
            )
            .await
            .unwrap();
        assert!(verdict
            .unwrap()
            .description()
            .starts_with("anonymous annual outcome"));

        // Toward a settlement agent the annual cap is waived entirely.
        let mut window = fix.window("ANON01");
        let verdict = validator
            .check(
                &source,
                &eur(),
                true,
                AccountType::SettlementAgent,
                1_000,
                &mut window,
            )
            .await
            .unwrap();
        assert!(verdict.is_none());
    }

    #[tokio::test]
    async fn anonymous_balance_ceiling_counts_pending_amount() {
        let mut fix = Fixture::new();
        fix.anonymous.max_balance = 2_000;
        fix.anonymous.max_annual_income = NO_LIMIT;

        let validator = IncomingLimitsValidator::new(fix.history.as_ref(), &fix.anonymous);
        let mut window = fix.window("ANON01");

        let verdict = validator
            .check(
                &"ANON01".into(),
                AccountType::AnonymousUser,
                1_500,
                &eur(),
                true,
                AccountType::RegisteredUser,
                600,
                &mut window,
            )
            .await
            .unwrap();
        assert_eq!(
            verdict.unwrap().description(),
            "anonymous balance limit exceeded: balance 1500, 600 pending, limit 2000 for asset EUR"
        );
    }

    #[tokio::test]
    async fn non_anonymous_account_skips_anonymity_ceilings() {
        let mut fix = Fixture::new();
        fix.anonymous.max_daily_outcome = 10;

        let validator = OutgoingLimitsValidator::new(fix.history.as_ref(), &fix.anonymous);
        let source = account("REG001", AccountType::RegisteredUser);
        let mut window = fix.window("REG001");

        let verdict = validator
            .check(
                &source,
                &eur(),
                true,
                AccountType::RegisteredUser,
                1_000_000,
                &mut window,
            )
            .await
            .unwrap();
        assert!(verdict.is_none());
    }
}
