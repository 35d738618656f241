//! Administrative operation handler
//!
//! Gated on the bank master account, then delegated: payload shape is
//! checked here, the semantics of the action are the factory's business.

use gateway_core::LedgerAccount;

use crate::admin::{parse_admin_payload, AdminError, PayloadError};
use crate::envelope::AdministrativeOp;
use crate::error::{Error, Result};
use crate::manager::Manager;
use crate::result::{AdministrativeResult, InnerResult};

use super::OperationFrame;

impl OperationFrame<'_> {
    pub(super) async fn check_administrative(
        &mut self,
        manager: &Manager,
        source: &LedgerAccount,
        op: &AdministrativeOp,
    ) -> Result<bool> {
        if source.address != manager.config.bank_master_address {
            return Ok(self.set(InnerResult::Administrative(
                AdministrativeResult::NotAuthorized,
            )));
        }

        let (subject, payload) = match parse_admin_payload(&op.op_data) {
            Ok(parsed) => parsed,
            Err(PayloadError::NotJson(detail)) => {
                return Ok(self.reject_with_reason(
                    InnerResult::Administrative(AdministrativeResult::Malformed),
                    format!("administrative payload is not valid JSON: {}", detail),
                ));
            }
            Err(PayloadError::NotSingleKeyed) => {
                return Ok(self.reject_with_field(
                    InnerResult::Administrative(AdministrativeResult::Malformed),
                    "op_data",
                ));
            }
        };

        let action = match manager.admin_factory.build(&subject, payload).await {
            Ok(action) => action,
            Err(error) => return self.admin_failure(error),
        };
        match action.validate().await {
            Ok(()) => Ok(self.set(InnerResult::Administrative(AdministrativeResult::Success))),
            Err(error) => self.admin_failure(error),
        }
    }

    fn admin_failure(&mut self, error: AdminError) -> Result<bool> {
        match error {
            AdminError::InvalidField { field, .. } => Ok(self.reject_with_field(
                InnerResult::Administrative(AdministrativeResult::Malformed),
                field,
            )),
            AdminError::Problem { detail } => Ok(self.reject_with_reason(
                InnerResult::Administrative(AdministrativeResult::Malformed),
                detail,
            )),
            AdminError::Server(source) => Err(Error::AdminServer(source.to_string())),
        }
    }
}
