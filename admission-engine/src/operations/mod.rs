//! Operation frames
//!
//! One [`OperationFrame`] validates one operation. The frame resolves the
//! effective source account, dispatches over the closed operation sum and
//! leaves behind a protocol result plus the statistics deltas it applied.
//! Handlers live in the submodules, one file per operation family.

mod admin;
mod external;
mod offers;
mod path_payment;
mod payment;
mod reversal;
mod simple;
mod trust;

use chrono::{DateTime, Utc};
use tracing::debug;

use gateway_core::{AccountAddress, AccountType, Asset, AssetCode, ContentHash};
use statistics_engine::OpReference;

use crate::envelope::{EnvelopeInfo, Operation, OperationBody};
use crate::error::{Error, Result};
use crate::manager::Manager;
use crate::result::{AdditionalErrorInfo, InnerResult, OperationOutcome, OperationResult};

/// One statistics delta applied during validation.
///
/// The transaction frame cancels these when a later operation invalidates
/// the transaction, so a rejected transaction leaves no counter residue.
#[derive(Debug, Clone)]
pub struct AppliedDelta {
    /// Account whose counters moved
    pub account: AccountAddress,
    /// Asset code of the moved counters
    pub asset_code: AssetCode,
    /// Counterparty bucket the delta landed in
    pub counterparty: AccountType,
    /// Income or outcome direction
    pub is_income: bool,
    /// Processed-op marker of the delta
    pub op: OpReference,
}

/// Completed validation of one operation
#[derive(Debug)]
pub struct CheckedOperation {
    /// Protocol result and diagnostics
    pub outcome: OperationOutcome,
    /// Statistics deltas applied while validating
    pub applied: Vec<AppliedDelta>,
}

/// Validation state of one operation
pub struct OperationFrame<'a> {
    operation: &'a Operation,
    index: u32,
    tx_source: &'a AccountAddress,
    tx_hash: ContentHash,
    now: DateTime<Utc>,
    result: Option<OperationResult>,
    info: Option<AdditionalErrorInfo>,
    applied: Vec<AppliedDelta>,
}

impl<'a> OperationFrame<'a> {
    /// Frame for the `index`-th (1-based) operation of the transaction
    pub fn new(
        operation: &'a Operation,
        index: u32,
        envelope: &'a EnvelopeInfo,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            operation,
            index,
            tx_source: &envelope.source,
            tx_hash: envelope.content_hash,
            now,
            result: None,
            info: None,
            applied: Vec::new(),
        }
    }

    /// Validates the operation and consumes the frame.
    ///
    /// Business rejections land in the returned outcome; only
    /// infrastructure failures travel the error channel.
    pub async fn check_valid(mut self, manager: &Manager) -> Result<CheckedOperation> {
        let operation = self.operation;
        let address = operation
            .source
            .as_ref()
            .unwrap_or(self.tx_source)
            .clone();

        let source = match manager.account(&address).await? {
            Some(account) => account,
            None => {
                debug!(index = self.index, source = %address, "no source account");
                self.result = Some(OperationResult::NoSourceAccount);
                return self.finish();
            }
        };

        match &operation.body {
            OperationBody::CreateAccount(op) => self.check_create_account(&source, op),
            OperationBody::Payment(op) => self.check_payment(manager, &source, op).await?,
            OperationBody::PathPayment(op) => {
                self.check_path_payment(manager, &source, op).await?
            }
            OperationBody::ManageOffer(op) => self.check_manage_offer(op),
            OperationBody::CreatePassiveOffer(op) => self.check_create_passive_offer(op),
            OperationBody::SetOptions(op) => self.check_set_options(&source, op),
            OperationBody::ChangeTrust(op) => {
                self.check_change_trust(manager, &source, op).await?
            }
            OperationBody::AllowTrust(op) => self.check_allow_trust(manager, &source, op).await?,
            OperationBody::AccountMerge(op) => self.check_account_merge(&source, op),
            OperationBody::Inflation => self.check_inflation(&source),
            OperationBody::ManageData(op) => self.check_manage_data(&source, op),
            OperationBody::Administrative(op) => {
                self.check_administrative(manager, &source, op).await?
            }
            OperationBody::PaymentReversal(op) => {
                self.check_payment_reversal(manager, &source, op).await?
            }
            OperationBody::Refund(op) => self.check_refund(manager, &source, op).await?,
            OperationBody::ExternalPayment(op) => {
                self.check_external_payment(manager, &source, op).await?
            }
            OperationBody::ManageAsset(op) => self.check_manage_asset(&source, op),
        };

        self.finish()
    }

    fn finish(self) -> Result<CheckedOperation> {
        let result = self.result.ok_or(Error::MissingResult(self.index))?;
        Ok(CheckedOperation {
            outcome: OperationOutcome {
                index: self.index,
                result,
                info: self.info,
            },
            applied: self.applied,
        })
    }

    /// Records the typed result; returns validity for handler tails
    fn set(&mut self, inner: InnerResult) -> bool {
        let valid = inner.is_success();
        self.result = Some(OperationResult::Inner(inner));
        valid
    }

    /// Records a rejection with a deterministic reason
    fn reject_with_reason(&mut self, inner: InnerResult, reason: impl Into<String>) -> bool {
        self.info = Some(AdditionalErrorInfo::Reason(reason.into()));
        self.set(inner)
    }

    /// Records a rejection naming the offending field
    fn reject_with_field(&mut self, inner: InnerResult, field: impl Into<String>) -> bool {
        self.info = Some(AdditionalErrorInfo::InvalidField(field.into()));
        self.set(inner)
    }

    /// Applies one statistics delta and remembers it for rollback
    async fn apply_delta(
        &mut self,
        manager: &Manager,
        account: &AccountAddress,
        asset: &Asset,
        counterparty: AccountType,
        is_income: bool,
        amount: i64,
    ) -> Result<()> {
        let op = OpReference {
            tx_hash: self.tx_hash,
            op_index: self.index,
        };
        let asset_code = asset.ledger_code();
        manager
            .statistics
            .update_get(
                account,
                &asset_code,
                counterparty,
                is_income,
                self.now,
                op,
                amount,
            )
            .await?;
        self.applied.push(AppliedDelta {
            account: account.clone(),
            asset_code,
            counterparty,
            is_income,
            op,
        });
        Ok(())
    }
}
