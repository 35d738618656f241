//! External payment handler
//!
//! Funds leave the gateway through an exchange agent, so outgoing
//! restrictions and ceilings apply with the exchange-agent class as the
//! counterparty; there is no incoming side to check.

use gateway_core::{AccountType, LedgerAccount};
use limits_engine::{AssetsValidator, OutgoingLimitsValidator, StatsWindow, TraitsValidator};

use crate::envelope::ExternalPaymentOp;
use crate::error::Result;
use crate::manager::Manager;
use crate::result::{AdditionalErrorInfo, ExternalPaymentResult, InnerResult};

use super::OperationFrame;

impl OperationFrame<'_> {
    pub(super) async fn check_external_payment(
        &mut self,
        manager: &Manager,
        source: &LedgerAccount,
        op: &ExternalPaymentOp,
    ) -> Result<bool> {
        let code = self.validate_external_payment(manager, source, op).await?;
        Ok(self.set(InnerResult::ExternalPayment(code)))
    }

    async fn validate_external_payment(
        &mut self,
        manager: &Manager,
        source: &LedgerAccount,
        op: &ExternalPaymentOp,
    ) -> Result<ExternalPaymentResult> {
        if op.amount <= 0 {
            return Ok(self.external_malformed("payment amount must be positive"));
        }

        let assets = AssetsValidator::new(manager.history.as_ref(), manager.cache.as_ref());
        if !assets.is_known(&op.asset).await? {
            return Ok(
                self.external_malformed(format!("asset {} is not registered", op.asset))
            );
        }
        let asset_anonymous = assets.is_anonymous(&op.asset).await?;

        let traits = TraitsValidator::new(manager.history.as_ref());
        if let Some(violation) = traits.check_outgoing(&source.address).await? {
            return Ok(self.external_malformed(violation.description().to_string()));
        }

        let outgoing =
            OutgoingLimitsValidator::new(manager.history.as_ref(), &manager.config.anonymous);
        let mut window = StatsWindow::new(
            &manager.statistics,
            source.address.clone(),
            op.asset.ledger_code(),
            self.now,
        );
        if let Some(violation) = outgoing
            .check(
                source,
                &op.asset,
                asset_anonymous,
                AccountType::ExchangeAgent,
                op.amount,
                &mut window,
            )
            .await?
        {
            return Ok(self.external_malformed(violation.description().to_string()));
        }

        self.apply_delta(
            manager,
            &source.address,
            &op.asset,
            AccountType::ExchangeAgent,
            false,
            op.amount,
        )
        .await?;

        Ok(ExternalPaymentResult::Success)
    }

    fn external_malformed(&mut self, reason: impl Into<String>) -> ExternalPaymentResult {
        self.info = Some(AdditionalErrorInfo::Reason(reason.into()));
        ExternalPaymentResult::Malformed
    }
}
