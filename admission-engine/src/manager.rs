//! Dependency container handed into every frame

use std::sync::Arc;

use gateway_core::{
    AccountAddress, AccountType, CoreQuery, GatewayConfig, HistoryQuery, LedgerAccount,
    SharedCache,
};
use limits_engine::{CommissionCalculator, OperationFee, TransferMatrix};
use statistics_engine::StatisticsManager;

use crate::admin::AdminActionFactory;
use crate::envelope::{Operation, OperationBody};
use crate::error::Result;
use crate::metrics::Metrics;

/// Everything a frame needs to validate, passed by reference.
///
/// Built once at startup and shared across concurrent validations; all
/// mutable state lives behind the statistics manager and the shared cache.
pub struct Manager {
    /// Read access to live ledger state
    pub core: Arc<dyn CoreQuery>,
    /// Read access to administered rows and settled history
    pub history: Arc<dyn HistoryQuery>,
    /// Rolling statistics manager
    pub statistics: StatisticsManager,
    /// Account-class transfer matrix
    pub transfer_matrix: TransferMatrix,
    /// Commission calculator
    pub commissions: CommissionCalculator,
    /// Administrative action factory
    pub admin_factory: Arc<dyn AdminActionFactory>,
    /// Gateway configuration
    pub config: GatewayConfig,
    /// Process-wide reference-data cache
    pub cache: Arc<SharedCache>,
    /// Admission metrics
    pub metrics: Metrics,
}

impl Manager {
    /// Container over the given collaborators
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        core: Arc<dyn CoreQuery>,
        history: Arc<dyn HistoryQuery>,
        statistics: StatisticsManager,
        transfer_matrix: TransferMatrix,
        commissions: CommissionCalculator,
        admin_factory: Arc<dyn AdminActionFactory>,
        config: GatewayConfig,
        cache: Arc<SharedCache>,
        metrics: Metrics,
    ) -> Self {
        Self {
            core,
            history,
            statistics,
            transfer_matrix,
            commissions,
            admin_factory,
            config,
            cache,
            metrics,
        }
    }

    /// Loads an account, remembering its class in the shared cache
    pub async fn account(&self, address: &AccountAddress) -> Result<Option<LedgerAccount>> {
        let account = self.core.account(address).await?;
        if let Some(account) = &account {
            self.cache
                .remember_account_type(account.address.clone(), account.account_type);
        }
        Ok(account)
    }

    /// Account class by address, answered from the cache when possible
    pub async fn account_type(&self, address: &AccountAddress) -> Result<Option<AccountType>> {
        if let Some(account_type) = self.cache.account_type(address) {
            return Ok(Some(account_type));
        }
        Ok(self.account(address).await?.map(|a| a.account_type))
    }

    /// Fee `source` owes for `operation`.
    ///
    /// The submission layer attaches this to the admitted envelope;
    /// admission itself never rejects over fees.
    pub async fn count_commission(
        &self,
        source: &LedgerAccount,
        operation: &Operation,
    ) -> Result<OperationFee> {
        let (asset, amount) = match &operation.body {
            OperationBody::Payment(op) => (&op.asset, op.amount),
            OperationBody::PathPayment(op) => (&op.send_asset, op.send_max),
            _ => return Ok(OperationFee::NotCharged),
        };
        let fee = self
            .commissions
            .count_commission(source, operation.body.kind(), asset, amount)
            .await?;
        Ok(fee)
    }
}
