//! Read boundaries toward the ledger core and the durable history store
//!
//! The admission layer never talks to a database directly. It reads through
//! two narrow capabilities: [`CoreQuery`] answers questions about live
//! ledger state (accounts, trustlines) and [`HistoryQuery`] serves the
//! administered rows and settled history kept in the relational store.
//! Production adapters and test doubles implement the same traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::limits::{AccountLimits, AccountTraits};
use crate::statistics::StatsByCounterparty;
use crate::types::{
    AccountAddress, AccountType, Asset, AssetCode, LedgerAccount, OperationKind, Trustline,
};

/// Allow-list row for one asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    /// The registered asset
    pub asset: Asset,
    /// Marks the asset as subject to anonymity restrictions
    pub is_anonymous: bool,
}

/// One row of the commission schedule.
///
/// Selectors are optional; a row matches an operation when every present
/// selector matches. Rows with more present selectors are more specific.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionRecord {
    /// Row identifier
    pub id: Uuid,
    /// Matches only this source account when present
    pub account: Option<AccountAddress>,
    /// Matches only this source account type when present
    pub account_type: Option<AccountType>,
    /// Matches only this asset when present
    pub asset: Option<Asset>,
    /// Fixed part of the fee in base units
    pub flat_fee: i64,
    /// Proportional part of the fee in percent
    pub percent_fee: Decimal,
}

impl CommissionRecord {
    /// Number of present selectors; higher is more specific
    pub fn specificity(&self) -> u32 {
        self.account.is_some() as u32
            + self.account_type.is_some() as u32
            + self.asset.is_some() as u32
    }

    /// True when every present selector matches the operation profile
    pub fn matches(
        &self,
        account: &AccountAddress,
        account_type: AccountType,
        asset: &Asset,
    ) -> bool {
        if let Some(wanted) = &self.account {
            if wanted != account {
                return false;
            }
        }
        if let Some(wanted) = self.account_type {
            if wanted != account_type {
                return false;
            }
        }
        if let Some(wanted) = &self.asset {
            if wanted != asset {
                return false;
            }
        }
        true
    }
}

/// Settled operation as stored by the history ingester
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredOperation {
    /// Operation identifier
    pub id: Uuid,
    /// Operation discriminator
    pub kind: OperationKind,
    /// Source account of the operation
    pub source: AccountAddress,
    /// Kind-specific details blob
    pub details: serde_json::Value,
    /// Close time of the ledger that settled the operation
    pub created_at: DateTime<Utc>,
}

/// Details blob of a settled payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentDetails {
    /// Paying account
    pub from: AccountAddress,
    /// Receiving account
    pub to: AccountAddress,
    /// Paid amount in base units
    pub amount: i64,
    /// Commission charged on top, in base units
    pub commission_amount: i64,
    /// Paid asset
    pub asset: Asset,
}

impl StoredOperation {
    /// Decodes the details blob of a settled payment.
    ///
    /// A blob that does not parse is corrupt history, reported as an
    /// infrastructure error rather than a business rejection.
    pub fn payment_details(&self) -> Result<PaymentDetails> {
        serde_json::from_value(self.details.clone()).map_err(|e| {
            Error::MalformedRecord(format!("payment details of operation {}: {}", self.id, e))
        })
    }
}

/// Read access to live ledger state
#[async_trait]
pub trait CoreQuery: Send + Sync {
    /// Loads an account row, `None` when the address does not exist
    async fn account(&self, address: &AccountAddress) -> Result<Option<LedgerAccount>>;

    /// Loads the trustline of `address` for `asset`, `None` when absent
    async fn trustline(&self, address: &AccountAddress, asset: &Asset)
        -> Result<Option<Trustline>>;
}

/// Read access to administered rows and settled history
#[async_trait]
pub trait HistoryQuery: Send + Sync {
    /// Administered limits for one account and asset code, `None` when the
    /// account is unrestricted
    async fn account_limits(
        &self,
        account: &AccountAddress,
        asset_code: &AssetCode,
    ) -> Result<Option<AccountLimits>>;

    /// Administered traits for one account, `None` when no row exists
    async fn account_traits(&self, account: &AccountAddress) -> Result<Option<AccountTraits>>;

    /// Allow-list row for an asset, `None` when the asset is not registered
    async fn asset(&self, asset: &Asset) -> Result<Option<AssetRecord>>;

    /// Commission rows whose selectors could match the given profile.
    ///
    /// Implementations may over-approximate; callers re-check with
    /// [`CommissionRecord::matches`] before selection.
    async fn commissions(
        &self,
        account: &AccountAddress,
        account_type: AccountType,
        asset: &Asset,
    ) -> Result<Vec<CommissionRecord>>;

    /// Loads one settled operation by identifier
    async fn operation_by_id(&self, id: Uuid) -> Result<Option<StoredOperation>>;

    /// Durable statistics of one (account, asset code) pair.
    ///
    /// Returns an empty map when the account has no recorded history. This
    /// is the reload source when the fast store has no entry.
    async fn account_statistics(
        &self,
        account: &AccountAddress,
        asset_code: &AssetCode,
    ) -> Result<StatsByCounterparty>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        account: Option<&str>,
        account_type: Option<AccountType>,
        asset: Option<Asset>,
    ) -> CommissionRecord {
        CommissionRecord {
            id: Uuid::new_v4(),
            account: account.map(AccountAddress::from),
            account_type,
            asset,
            flat_fee: 0,
            percent_fee: Decimal::ZERO,
        }
    }

    #[test]
    fn specificity_counts_present_selectors() {
        let eur = Asset::credit("EUR", "ISSUER0001");
        assert_eq!(record(None, None, None).specificity(), 0);
        assert_eq!(record(Some("ACC001"), None, Some(eur)).specificity(), 2);
    }

    #[test]
    fn wildcard_row_matches_everything() {
        let eur = Asset::credit("EUR", "ISSUER0001");
        let row = record(None, None, None);
        assert!(row.matches(&"ACC001".into(), AccountType::Merchant, &eur));
    }

    #[test]
    fn present_selectors_must_all_match() {
        let eur = Asset::credit("EUR", "ISSUER0001");
        let row = record(Some("ACC001"), Some(AccountType::Merchant), None);
        assert!(row.matches(&"ACC001".into(), AccountType::Merchant, &eur));
        assert!(!row.matches(&"ACC002".into(), AccountType::Merchant, &eur));
        assert!(!row.matches(&"ACC001".into(), AccountType::Bank, &eur));
    }

    #[test]
    fn corrupt_payment_details_surface_as_malformed_record() {
        let op = StoredOperation {
            id: Uuid::new_v4(),
            kind: OperationKind::Payment,
            source: "ACC001".into(),
            details: serde_json::json!({"not": "a payment"}),
            created_at: Utc::now(),
        };
        let err = op.payment_details().unwrap_err();
        assert!(matches!(err, Error::MalformedRecord(_)));
    }
}
