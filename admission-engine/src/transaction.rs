//! Transaction frame
//!
//! Validates a whole envelope: structural checks first, then each
//! operation in submission order through its own frame. Operations see
//! the statistics deltas of their predecessors, so a transaction that
//! fits a limit only as a whole is judged as a whole; when any operation
//! is rejected every applied delta is cancelled before the verdict is
//! returned.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::envelope::{EnvelopeInfo, OperationBody};
use crate::error::Result;
use crate::manager::Manager;
use crate::operations::{AppliedDelta, OperationFrame};
use crate::result::{
    AdditionalErrorInfo, TransactionResultCode, TransactionVerdict,
};

/// Validation of one transaction envelope
pub struct TransactionFrame {
    info: EnvelopeInfo,
    now: DateTime<Utc>,
}

impl TransactionFrame {
    /// Frame over a derived envelope, judged as of `now`
    pub fn new(info: EnvelopeInfo, now: DateTime<Utc>) -> Self {
        Self { info, now }
    }

    /// Validates the envelope and returns the verdict.
    ///
    /// The verdict carries one outcome per operation even when the
    /// transaction failed; a failed transaction cancels every applied
    /// delta before the verdict is returned. Infrastructure failures
    /// travel the error channel and propagate as-is, leaving earlier
    /// deltas in place: application is idempotent, so the caller either
    /// re-validates the same envelope or cancels it explicitly.
    pub async fn check_valid(&self, manager: &Manager) -> Result<TransactionVerdict> {
        manager.metrics.transactions_total.inc();

        let operations = &self.info.envelope.operations;
        if operations.is_empty() {
            manager.metrics.transactions_invalid.inc();
            return Ok(TransactionVerdict {
                code: TransactionResultCode::MissingOperation,
                operations: Vec::new(),
                info: None,
            });
        }
        let has_administrative = operations
            .iter()
            .any(|op| matches!(op.body, OperationBody::Administrative(_)));
        if has_administrative && operations.len() > 1 {
            manager.metrics.transactions_invalid.inc();
            return Ok(TransactionVerdict {
                code: TransactionResultCode::AdministrativeNotExclusive,
                operations: Vec::new(),
                info: Some(AdditionalErrorInfo::Reason(
                    "an administrative operation must be the only operation of its transaction"
                        .to_string(),
                )),
            });
        }

        let mut outcomes = Vec::with_capacity(operations.len());
        let mut applied: Vec<AppliedDelta> = Vec::new();
        let mut all_valid = true;

        for (position, operation) in operations.iter().enumerate() {
            let index = (position + 1) as u32;
            let frame = OperationFrame::new(operation, index, &self.info, self.now);
            let checked = match frame.check_valid(manager).await {
                Ok(checked) => checked,
                Err(error) => {
                    manager.metrics.infrastructure_errors.inc();
                    warn!(
                        tx = %self.info.content_hash,
                        index,
                        error = %error,
                        "validation aborted"
                    );
                    return Err(error);
                }
            };
            if !checked.outcome.result.is_success() {
                all_valid = false;
                manager.metrics.count_rejection(operation.body.kind());
                debug!(
                    tx = %self.info.content_hash,
                    index,
                    kind = %operation.body.kind(),
                    "operation rejected"
                );
            }
            applied.extend(checked.applied);
            outcomes.push(checked.outcome);
        }

        let code = if all_valid {
            manager.metrics.transactions_valid.inc();
            info!(
                tx = %self.info.content_hash,
                operations = operations.len(),
                "transaction admitted"
            );
            TransactionResultCode::Success
        } else {
            manager.metrics.transactions_invalid.inc();
            self.cancel_applied(manager, &applied).await?;
            TransactionResultCode::Failed
        };

        Ok(TransactionVerdict {
            code,
            operations: outcomes,
            info: None,
        })
    }

    async fn cancel_applied(&self, manager: &Manager, applied: &[AppliedDelta]) -> Result<()> {
        for delta in applied {
            manager
                .statistics
                .cancel_op(
                    &delta.account,
                    &delta.asset_code,
                    delta.counterparty,
                    delta.is_income,
                    self.now,
                    delta.op,
                )
                .await?;
        }
        Ok(())
    }
}
