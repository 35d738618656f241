//! Commission calculator
//!
//! Only payment-like transfers carry a fee. The schedule is a set of rows
//! with optional selectors (source account, source class, asset); the row
//! with the most matching selectors wins, ties break toward the cheaper
//! fee. The percent part is computed with exact rational arithmetic and
//! truncated toward zero when the mathematically exact result is not a
//! whole number of base units.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;

use gateway_core::{Asset, CommissionRecord, HistoryQuery, LedgerAccount, OperationKind};

use crate::error::{Error, Result};

/// Fee decided for one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationFee {
    /// The operation kind carries no fee
    NotCharged,
    /// Fee parts in base units
    Charged {
        /// Fixed part
        flat: i64,
        /// Proportional part, truncated toward zero
        percent: i64,
    },
}

impl OperationFee {
    /// Total fee in base units
    pub fn total(&self) -> i64 {
        match self {
            OperationFee::NotCharged => 0,
            OperationFee::Charged { flat, percent } => flat.saturating_add(*percent),
        }
    }
}

/// Computes fees from the administered commission schedule
pub struct CommissionCalculator {
    history: Arc<dyn HistoryQuery>,
}

impl CommissionCalculator {
    /// Calculator over the schedule in `history`
    pub fn new(history: Arc<dyn HistoryQuery>) -> Self {
        Self { history }
    }

    /// Fee for one operation of `source`.
    ///
    /// Non-payment kinds are never charged, and a schedule without a
    /// matching row means no fee.
    pub async fn count_commission(
        &self,
        source: &LedgerAccount,
        kind: OperationKind,
        asset: &Asset,
        amount: i64,
    ) -> Result<OperationFee> {
        if !matches!(kind, OperationKind::Payment | OperationKind::PathPayment) {
            return Ok(OperationFee::NotCharged);
        }

        let candidates = self
            .history
            .commissions(&source.address, source.account_type, asset)
            .await?;

        let mut best: Option<(u32, i64, OperationFee)> = None;
        for row in candidates {
            if !row.matches(&source.address, source.account_type, asset) {
                continue;
            }
            let fee = compute_fee(&row, amount)?;
            let key = (row.specificity(), fee.total());
            let better = match &best {
                None => true,
                Some((specificity, total, _)) => {
                    key.0 > *specificity || (key.0 == *specificity && key.1 < *total)
                }
            };
            if better {
                best = Some((key.0, key.1, fee));
            }
        }

        match best {
            Some((specificity, total, fee)) => {
                debug!(account = %source.address, %asset, specificity, total, "commission row selected");
                Ok(fee)
            }
            None => {
                debug!(account = %source.address, %asset, "no commission row matched");
                Ok(OperationFee::NotCharged)
            }
        }
    }
}

/// Exact fee of one row: flat plus floor(amount / 100 × rate)
fn compute_fee(row: &CommissionRecord, amount: i64) -> Result<OperationFee> {
    let percent = (Decimal::from(amount) * row.percent_fee / Decimal::from(100))
        .trunc()
        .to_i64()
        .ok_or(Error::FeeOverflow(amount))?;
    Ok(OperationFee::Charged {
        flat: row.flat_fee,
        percent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_core::mock::MockHistory;
    use gateway_core::{AccountType, ONE};
    use uuid::Uuid;

    fn source() -> LedgerAccount {
        LedgerAccount {
            address: "ACC001".into(),
            account_type: AccountType::RegisteredUser,
            sequence: 1,
            balance: 0,
        }
    }

    fn eur() -> Asset {
        Asset::credit("EUR", "ISSUER0001")
    }

    fn row(
        account: Option<&str>,
        account_type: Option<AccountType>,
        asset: Option<Asset>,
        flat: i64,
        percent: &str,
    ) -> CommissionRecord {
        CommissionRecord {
            id: Uuid::new_v4(),
            account: account.map(Into::into),
            account_type,
            asset,
            flat_fee: flat,
            percent_fee: percent.parse().expect("decimal literal"),
        }
    }

    fn calculator(history: Arc<MockHistory>) -> CommissionCalculator {
        CommissionCalculator::new(history as Arc<dyn HistoryQuery>)
    }

    #[tokio::test]
    async fn one_percent_of_1230_units_is_12_point_3_units() {
        let history = Arc::new(MockHistory::new());
        history.put_commission(row(None, None, None, 0, "1"));
        let calc = calculator(Arc::clone(&history));

        let fee = calc
            .count_commission(&source(), OperationKind::Payment, &eur(), 1_230 * ONE)
            .await
            .unwrap();
        // 12.3 display units, exactly representable in base units.
        assert_eq!(
            fee,
            OperationFee::Charged {
                flat: 0,
                percent: 123_000_000,
            }
        );
    }

    #[tokio::test]
    async fn non_integral_percent_truncates_toward_zero() {
        let history = Arc::new(MockHistory::new());
        history.put_commission(row(None, None, None, 0, "1"));
        let calc = calculator(Arc::clone(&history));

        // 1% of 157 base units is 1.57 base units; exact arithmetic, then
        // floor.
        let fee = calc
            .count_commission(&source(), OperationKind::Payment, &eur(), 157)
            .await
            .unwrap();
        assert_eq!(fee, OperationFee::Charged { flat: 0, percent: 1 });
    }

    #[tokio::test]
    async fn non_payment_kinds_are_not_charged() {
        let history = Arc::new(MockHistory::new());
        history.put_commission(row(None, None, None, 50, "1"));
        let calc = calculator(Arc::clone(&history));

        for kind in [
            OperationKind::CreateAccount,
            OperationKind::ChangeTrust,
            OperationKind::Administrative,
            OperationKind::PaymentReversal,
        ] {
            let fee = calc
                .count_commission(&source(), kind, &eur(), 1_000 * ONE)
                .await
                .unwrap();
            assert_eq!(fee, OperationFee::NotCharged);
            assert_eq!(fee.total(), 0);
        }
    }

    #[tokio::test]
    async fn more_specific_row_wins() {
        let history = Arc::new(MockHistory::new());
        history.put_commission(row(None, None, None, 1_000, "0"));
        history.put_commission(row(
            Some("ACC001"),
            Some(AccountType::RegisteredUser),
            None,
            10,
            "0",
        ));
        let calc = calculator(Arc::clone(&history));

        let fee = calc
            .count_commission(&source(), OperationKind::Payment, &eur(), 1_000)
            .await
            .unwrap();
        assert_eq!(
            fee,
            OperationFee::Charged {
                flat: 10,
                percent: 0,
            }
        );
    }

    #[tokio::test]
    async fn equal_specificity_breaks_toward_cheaper_fee() {
        let history = Arc::new(MockHistory::new());
        history.put_commission(row(Some("ACC001"), None, None, 500, "0"));
        history.put_commission(row(None, Some(AccountType::RegisteredUser), None, 200, "0"));
        let calc = calculator(Arc::clone(&history));

        let fee = calc
            .count_commission(&source(), OperationKind::PathPayment, &eur(), 1_000)
            .await
            .unwrap();
        assert_eq!(
            fee,
            OperationFee::Charged {
                flat: 200,
                percent: 0,
            }
        );
    }

    #[tokio::test]
    async fn empty_schedule_means_no_fee() {
        let history = Arc::new(MockHistory::new());
        let calc = calculator(Arc::clone(&history));

        let fee = calc
            .count_commission(&source(), OperationKind::Payment, &eur(), 1_000)
            .await
            .unwrap();
        assert_eq!(fee, OperationFee::NotCharged);
        assert_eq!(fee.total(), 0);
    }
}
