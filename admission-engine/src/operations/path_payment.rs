//! Path-payment handler
//!
//! The most involved handler: asset allow-list checks, destination
//! resolution (anonymous assets may be sent to accounts that do not exist
//! yet), the account-class transfer matrix, administered traits, outgoing
//! and incoming ceilings, then the statistics deltas. Plain payments
//! delegate here through a synthetic path payment.

use tracing::debug;

use gateway_core::{AccountType, LedgerAccount};
use limits_engine::{
    AssetsValidator, IncomingLimitsValidator, OutgoingLimitsValidator, StatsWindow,
    TraitsValidator,
};

use crate::envelope::PathPaymentOp;
use crate::error::Result;
use crate::manager::Manager;
use crate::result::{AdditionalErrorInfo, InnerResult, PathPaymentResult};

use super::OperationFrame;

impl OperationFrame<'_> {
    pub(super) async fn check_path_payment(
        &mut self,
        manager: &Manager,
        source: &LedgerAccount,
        op: &PathPaymentOp,
    ) -> Result<bool> {
        let code = self.validate_path_payment(manager, source, op).await?;
        Ok(self.set(InnerResult::PathPayment(code)))
    }

    /// Shared admission pipeline for path payments and synthetic payments.
    ///
    /// Rejections set the diagnostic side channel on the frame and return
    /// the protocol code; a success applies the outgoing and incoming
    /// statistics deltas before returning.
    pub(super) async fn validate_path_payment(
        &mut self,
        manager: &Manager,
        source: &LedgerAccount,
        op: &PathPaymentOp,
    ) -> Result<PathPaymentResult> {
        if op.send_max <= 0 || op.dest_amount <= 0 {
            return Ok(self.path_malformed("payment amount must be positive"));
        }

        let assets = AssetsValidator::new(manager.history.as_ref(), manager.cache.as_ref());
        for asset in [&op.send_asset, &op.dest_asset]
            .into_iter()
            .chain(op.path.iter())
        {
            if !assets.is_known(asset).await? {
                return Ok(self.path_malformed(format!("asset {} is not registered", asset)));
            }
        }
        let dest_asset_anonymous = assets.is_anonymous(&op.dest_asset).await?;
        let send_asset_anonymous = assets.is_anonymous(&op.send_asset).await?;

        // Resolve the destination. Anonymous assets may be sent to
        // accounts that do not exist yet; those are admitted as fresh
        // anonymous wallets with an empty trustline.
        let destination = manager.account(&op.destination).await?;
        let (destination_type, trustline_balance) = match &destination {
            Some(account) => {
                let balance = if op.dest_asset.is_native() {
                    account.balance
                } else {
                    match manager.core.trustline(&account.address, &op.dest_asset).await? {
                        Some(line) => line.balance,
                        None => return Ok(PathPaymentResult::NoTrust),
                    }
                };
                (account.account_type, balance)
            }
            None if dest_asset_anonymous => (AccountType::AnonymousUser, 0),
            None => {
                debug!(index = self.index, destination = %op.destination, "no destination account");
                return Ok(PathPaymentResult::NoDestination);
            }
        };

        if let Some(violation) = manager
            .transfer_matrix
            .check(source.account_type, destination_type)
        {
            return Ok(self.path_malformed(violation.description().to_string()));
        }

        let traits = TraitsValidator::new(manager.history.as_ref());
        if let Some(violation) = traits.check_outgoing(&source.address).await? {
            return Ok(self.path_malformed(violation.description().to_string()));
        }
        if let Some(violation) = traits.check_incoming(&op.destination).await? {
            return Ok(self.path_malformed(violation.description().to_string()));
        }

        let outgoing =
            OutgoingLimitsValidator::new(manager.history.as_ref(), &manager.config.anonymous);
        let mut source_window = StatsWindow::new(
            &manager.statistics,
            source.address.clone(),
            op.send_asset.ledger_code(),
            self.now,
        );
        if let Some(violation) = outgoing
            .check(
                source,
                &op.send_asset,
                send_asset_anonymous,
                destination_type,
                op.send_max,
                &mut source_window,
            )
            .await?
        {
            return Ok(self.path_malformed(violation.description().to_string()));
        }

        let incoming =
            IncomingLimitsValidator::new(manager.history.as_ref(), &manager.config.anonymous);
        let mut destination_window = StatsWindow::new(
            &manager.statistics,
            op.destination.clone(),
            op.dest_asset.ledger_code(),
            self.now,
        );
        if let Some(violation) = incoming
            .check(
                &op.destination,
                destination_type,
                trustline_balance,
                &op.dest_asset,
                dest_asset_anonymous,
                source.account_type,
                op.dest_amount,
                &mut destination_window,
            )
            .await?
        {
            return Ok(self.path_malformed(violation.description().to_string()));
        }

        // All checks passed: make this operation's flow visible to the
        // following operations of the transaction.
        self.apply_delta(
            manager,
            &source.address,
            &op.send_asset,
            destination_type,
            false,
            op.send_max,
        )
        .await?;
        self.apply_delta(
            manager,
            &op.destination,
            &op.dest_asset,
            source.account_type,
            true,
            op.dest_amount,
        )
        .await?;

        Ok(PathPaymentResult::Success)
    }

    fn path_malformed(&mut self, reason: impl Into<String>) -> PathPaymentResult {
        self.info = Some(AdditionalErrorInfo::Reason(reason.into()));
        PathPaymentResult::Malformed
    }
}
