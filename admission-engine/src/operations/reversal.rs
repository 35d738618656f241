//! Payment-reversal and refund handlers
//!
//! Both operations reference a settled payment and must restate its facts
//! exactly; each mismatch has its own protocol code so clients can tell a
//! stale amount from a wrong counterparty. A reversal returns the full
//! payment and only within the configured reversal window; a refund
//! returns part of it and has no window.

use chrono::Duration;

use gateway_core::{
    AccountAddress, Asset, LedgerAccount, OperationKind, PaymentDetails, StoredOperation,
};
use uuid::Uuid;

use crate::envelope::{PaymentReversalOp, RefundOp};
use crate::error::Result;
use crate::manager::Manager;
use crate::result::{AdditionalErrorInfo, InnerResult, ReversalResult};

use super::OperationFrame;

impl OperationFrame<'_> {
    pub(super) async fn check_payment_reversal(
        &mut self,
        manager: &Manager,
        source: &LedgerAccount,
        op: &PaymentReversalOp,
    ) -> Result<bool> {
        let code = self.validate_payment_reversal(manager, source, op).await?;
        Ok(self.set(InnerResult::PaymentReversal(code)))
    }

    pub(super) async fn check_refund(
        &mut self,
        manager: &Manager,
        source: &LedgerAccount,
        op: &RefundOp,
    ) -> Result<bool> {
        let code = self.validate_refund(manager, source, op).await?;
        Ok(self.set(InnerResult::Refund(code)))
    }

    async fn validate_payment_reversal(
        &mut self,
        manager: &Manager,
        source: &LedgerAccount,
        op: &PaymentReversalOp,
    ) -> Result<ReversalResult> {
        if op.amount <= 0 {
            return Ok(self.reversal_malformed("reversal amount must be positive"));
        }
        if op.commission_amount < 0 || op.commission_amount > op.amount {
            return Ok(self.reversal_malformed(
                "reversal commission must lie between zero and the reversed amount",
            ));
        }
        if op.asset.is_native() {
            return Ok(self.reversal_malformed("the native asset is not reversible"));
        }

        let stored = match load_settled_payment(manager, op.payment_id).await? {
            Some(stored) => stored,
            None => return Ok(ReversalResult::PaymentDoesNotExist),
        };
        let age = self.now.signed_duration_since(stored.created_at);
        if age > Duration::seconds(manager.config.reversal_period_secs) {
            return Ok(self.reversal_malformed("the reversal period has expired"));
        }

        let details = stored.payment_details()?;
        Ok(match_original(
            source,
            &details,
            &op.payment_source,
            op.amount,
            op.commission_amount,
            &op.asset,
        )
        .unwrap_or(ReversalResult::Success))
    }

    async fn validate_refund(
        &mut self,
        manager: &Manager,
        source: &LedgerAccount,
        op: &RefundOp,
    ) -> Result<ReversalResult> {
        if op.amount <= 0 {
            return Ok(self.reversal_malformed("refund amount must be positive"));
        }
        if op.amount > op.original_amount {
            return Ok(self.reversal_malformed("refund amount exceeds the original payment"));
        }
        if op.commission_amount < 0 {
            return Ok(self.reversal_malformed("refund commission must not be negative"));
        }
        if op.asset.is_native() {
            return Ok(self.reversal_malformed("the native asset is not refundable"));
        }

        let stored = match load_settled_payment(manager, op.payment_id).await? {
            Some(stored) => stored,
            None => return Ok(ReversalResult::PaymentDoesNotExist),
        };

        let details = stored.payment_details()?;
        Ok(match_original(
            source,
            &details,
            &op.payment_source,
            op.original_amount,
            op.commission_amount,
            &op.asset,
        )
        .unwrap_or(ReversalResult::Success))
    }

    fn reversal_malformed(&mut self, reason: &str) -> ReversalResult {
        self.info = Some(AdditionalErrorInfo::Reason(reason.to_string()));
        ReversalResult::Malformed
    }
}

async fn load_settled_payment(
    manager: &Manager,
    id: Uuid,
) -> Result<Option<StoredOperation>> {
    let stored = manager.history.operation_by_id(id).await?;
    Ok(stored.filter(|s| s.kind == OperationKind::Payment))
}

/// Compares the restated facts against the settled payment.
///
/// Returns the first mismatch code, `None` when everything matches.
fn match_original(
    source: &LedgerAccount,
    details: &PaymentDetails,
    payment_source: &AccountAddress,
    amount: i64,
    commission_amount: i64,
    asset: &Asset,
) -> Option<ReversalResult> {
    if source.address != details.to {
        return Some(ReversalResult::InvalidSource);
    }
    if *payment_source != details.from {
        return Some(ReversalResult::InvalidPaymentSender);
    }
    if amount != details.amount {
        return Some(ReversalResult::InvalidAmount);
    }
    if commission_amount != details.commission_amount {
        return Some(ReversalResult::InvalidCommission);
    }
    if *asset != details.asset {
        return Some(ReversalResult::InvalidAsset);
    }
    None
}
