//! Administered payment-block traits
//!
//! Traits are written by the administrative subsystem and read here. An
//! account without a traits row is unrestricted; the validator is
//! default-open by design so that freshly created accounts can transact
//! before any administration happened.

use gateway_core::{AccountAddress, HistoryQuery};

use crate::error::{Result, RuleViolation};

/// Checks administered incoming/outgoing payment blocks
pub struct TraitsValidator<'a> {
    history: &'a dyn HistoryQuery,
}

impl<'a> TraitsValidator<'a> {
    /// Validator reading traits from `history`
    pub fn new(history: &'a dyn HistoryQuery) -> Self {
        Self { history }
    }

    /// Rejects when `source` has outgoing payments blocked
    pub async fn check_outgoing(&self, source: &AccountAddress) -> Result<Option<RuleViolation>> {
        let traits = self.history.account_traits(source).await?;
        match traits {
            Some(row) if row.block_outcoming_payments => {
                Ok(Some(RuleViolation::Restricted(format!(
                    "outgoing payments for account {} are restricted",
                    source
                ))))
            }
            _ => Ok(None),
        }
    }

    /// Rejects when `destination` has incoming payments blocked
    pub async fn check_incoming(
        &self,
        destination: &AccountAddress,
    ) -> Result<Option<RuleViolation>> {
        let traits = self.history.account_traits(destination).await?;
        match traits {
            Some(row) if row.block_incoming_payments => {
                Ok(Some(RuleViolation::Restricted(format!(
                    "incoming payments for account {} are restricted",
                    destination
                ))))
            }
            _ => Ok(None),
        }
    }
}
