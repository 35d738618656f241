//! In-memory test doubles for the query boundaries
//!
//! The mocks hold their rows in concurrent maps so tests can mutate state
//! while a validation is in flight. They are also the backing stores of the
//! integration suites in the downstream crates.

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::error::Result;
use crate::limits::{AccountLimits, AccountTraits};
use crate::query::{AssetRecord, CommissionRecord, CoreQuery, HistoryQuery, StoredOperation};
use crate::statistics::StatsByCounterparty;
use crate::types::{
    AccountAddress, AccountType, Asset, AssetCode, LedgerAccount, Trustline,
};

/// In-memory ledger core double
#[derive(Debug, Default)]
pub struct MockCore {
    accounts: DashMap<AccountAddress, LedgerAccount>,
    trustlines: DashMap<(AccountAddress, Asset), Trustline>,
}

impl MockCore {
    /// Empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an account row
    pub fn put_account(&self, account: LedgerAccount) {
        self.accounts.insert(account.address.clone(), account);
    }

    /// Convenience constructor for an account with a zero balance
    pub fn add_account(&self, address: impl Into<AccountAddress>, account_type: AccountType) {
        let address = address.into();
        self.put_account(LedgerAccount {
            address,
            account_type,
            sequence: 1,
            balance: 0,
        });
    }

    /// Inserts or replaces a trustline row
    pub fn put_trustline(&self, trustline: Trustline) {
        let key = (trustline.account.clone(), trustline.asset.clone());
        self.trustlines.insert(key, trustline);
    }

    /// Convenience constructor for a trustline with no holder-side limit
    pub fn add_trustline(
        &self,
        account: impl Into<AccountAddress>,
        asset: Asset,
        balance: i64,
    ) {
        let account = account.into();
        self.put_trustline(Trustline {
            account,
            asset,
            balance,
            limit: i64::MAX,
        });
    }
}

#[async_trait]
impl CoreQuery for MockCore {
    async fn account(&self, address: &AccountAddress) -> Result<Option<LedgerAccount>> {
        Ok(self.accounts.get(address).map(|e| e.value().clone()))
    }

    async fn trustline(
        &self,
        address: &AccountAddress,
        asset: &Asset,
    ) -> Result<Option<Trustline>> {
        let key = (address.clone(), asset.clone());
        Ok(self.trustlines.get(&key).map(|e| e.value().clone()))
    }
}

/// In-memory history store double
#[derive(Debug, Default)]
pub struct MockHistory {
    limits: DashMap<(AccountAddress, AssetCode), AccountLimits>,
    traits: DashMap<AccountAddress, AccountTraits>,
    assets: DashMap<Asset, AssetRecord>,
    commissions: RwLock<Vec<CommissionRecord>>,
    operations: DashMap<Uuid, StoredOperation>,
    statistics: DashMap<(AccountAddress, AssetCode), StatsByCounterparty>,
}

impl MockHistory {
    /// Empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a limits row
    pub fn put_limits(&self, limits: AccountLimits) {
        let key = (limits.account.clone(), limits.asset_code.clone());
        self.limits.insert(key, limits);
    }

    /// Inserts or replaces a traits row
    pub fn put_traits(&self, traits: AccountTraits) {
        self.traits.insert(traits.account.clone(), traits);
    }

    /// Registers an asset
    pub fn put_asset(&self, asset: Asset, is_anonymous: bool) {
        self.assets.insert(
            asset.clone(),
            AssetRecord {
                asset,
                is_anonymous,
            },
        );
    }

    /// Appends a commission schedule row
    pub fn put_commission(&self, record: CommissionRecord) {
        self.commissions.write().push(record);
    }

    /// Stores a settled operation
    pub fn put_operation(&self, operation: StoredOperation) {
        self.operations.insert(operation.id, operation);
    }

    /// Seeds durable statistics for one (account, asset code) pair
    pub fn put_statistics(
        &self,
        account: impl Into<AccountAddress>,
        asset_code: impl Into<AssetCode>,
        stats: StatsByCounterparty,
    ) {
        self.statistics
            .insert((account.into(), asset_code.into()), stats);
    }
}

#[async_trait]
impl HistoryQuery for MockHistory {
    async fn account_limits(
        &self,
        account: &AccountAddress,
        asset_code: &AssetCode,
    ) -> Result<Option<AccountLimits>> {
        let key = (account.clone(), asset_code.clone());
        Ok(self.limits.get(&key).map(|e| e.value().clone()))
    }

    async fn account_traits(&self, account: &AccountAddress) -> Result<Option<AccountTraits>> {
        Ok(self.traits.get(account).map(|e| e.value().clone()))
    }

    async fn asset(&self, asset: &Asset) -> Result<Option<AssetRecord>> {
        Ok(self.assets.get(asset).map(|e| e.value().clone()))
    }

    async fn commissions(
        &self,
        account: &AccountAddress,
        account_type: AccountType,
        asset: &Asset,
    ) -> Result<Vec<CommissionRecord>> {
        let rows = self.commissions.read();
        Ok(rows
            .iter()
            .filter(|r| r.matches(account, account_type, asset))
            .cloned()
            .collect())
    }

    async fn operation_by_id(&self, id: Uuid) -> Result<Option<StoredOperation>> {
        Ok(self.operations.get(&id).map(|e| e.value().clone()))
    }

    async fn account_statistics(
        &self,
        account: &AccountAddress,
        asset_code: &AssetCode,
    ) -> Result<StatsByCounterparty> {
        let key = (account.clone(), asset_code.clone());
        Ok(self
            .statistics
            .get(&key)
            .map(|e| e.value().clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_core_answers_account_and_trustline_queries() {
        let core = MockCore::new();
        core.add_account("ACC001", AccountType::Merchant);
        let eur = Asset::credit("EUR", "ISSUER0001");
        core.add_trustline("ACC001", eur.clone(), 500);

        let account = core.account(&"ACC001".into()).await.unwrap().unwrap();
        assert_eq!(account.account_type, AccountType::Merchant);

        let line = core
            .trustline(&"ACC001".into(), &eur)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(line.balance, 500);

        assert!(core.account(&"ACC404".into()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn mock_history_filters_commissions_by_selector() {
        let history = MockHistory::new();
        let eur = Asset::credit("EUR", "ISSUER0001");
        history.put_commission(CommissionRecord {
            id: Uuid::new_v4(),
            account: None,
            account_type: Some(AccountType::Merchant),
            asset: None,
            flat_fee: 10,
            percent_fee: rust_decimal::Decimal::ZERO,
        });

        let merchant_rows = history
            .commissions(&"ACC001".into(), AccountType::Merchant, &eur)
            .await
            .unwrap();
        assert_eq!(merchant_rows.len(), 1);

        let bank_rows = history
            .commissions(&"ACC001".into(), AccountType::Bank, &eur)
            .await
            .unwrap();
        assert!(bank_rows.is_empty());
    }
}
