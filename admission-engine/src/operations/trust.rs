//! Trustline handlers
//!
//! Both trust operations only confirm at this layer that the referenced
//! asset is registered in the allow-list; authorization flags and trust
//! ceilings are the ledger's business downstream.

use gateway_core::LedgerAccount;
use limits_engine::AssetsValidator;

use crate::envelope::{AllowTrustOp, ChangeTrustOp};
use crate::error::Result;
use crate::manager::Manager;
use crate::result::{AllowTrustResult, ChangeTrustResult, InnerResult};

use super::OperationFrame;

impl OperationFrame<'_> {
    pub(super) async fn check_change_trust(
        &mut self,
        manager: &Manager,
        _source: &LedgerAccount,
        op: &ChangeTrustOp,
    ) -> Result<bool> {
        if op.asset.is_native() {
            return Ok(self.reject_with_reason(
                InnerResult::ChangeTrust(ChangeTrustResult::Malformed),
                "trust cannot be changed for the native asset",
            ));
        }
        let assets = AssetsValidator::new(manager.history.as_ref(), manager.cache.as_ref());
        if !assets.is_known(&op.asset).await? {
            return Ok(self.reject_with_reason(
                InnerResult::ChangeTrust(ChangeTrustResult::Malformed),
                format!("asset {} is not registered", op.asset),
            ));
        }
        Ok(self.set(InnerResult::ChangeTrust(ChangeTrustResult::Success)))
    }

    pub(super) async fn check_allow_trust(
        &mut self,
        manager: &Manager,
        _source: &LedgerAccount,
        op: &AllowTrustOp,
    ) -> Result<bool> {
        if op.asset.is_native() {
            return Ok(self.reject_with_reason(
                InnerResult::AllowTrust(AllowTrustResult::Malformed),
                "trust cannot be managed for the native asset",
            ));
        }
        let assets = AssetsValidator::new(manager.history.as_ref(), manager.cache.as_ref());
        if !assets.is_known(&op.asset).await? {
            return Ok(self.reject_with_reason(
                InnerResult::AllowTrust(AllowTrustResult::Malformed),
                format!("asset {} is not registered", op.asset),
            ));
        }
        Ok(self.set(InnerResult::AllowTrust(AllowTrustResult::Success)))
    }
}
