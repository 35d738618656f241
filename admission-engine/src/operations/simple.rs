//! Handlers that pass unconditionally
//!
//! These operations have no admission-level business rules; sequence,
//! balance and authorization constraints are enforced by the ledger
//! downstream. The handlers exist to stamp the success code so every
//! operation leaves a typed result.

use gateway_core::LedgerAccount;

use crate::envelope::{
    AccountMergeOp, CreateAccountOp, ManageAssetOp, ManageDataOp, SetOptionsOp,
};
use crate::result::{
    AccountMergeResult, CreateAccountResult, InflationResult, InnerResult, ManageAssetResult,
    ManageDataResult, SetOptionsResult,
};

use super::OperationFrame;

impl OperationFrame<'_> {
    pub(super) fn check_create_account(
        &mut self,
        _source: &LedgerAccount,
        _op: &CreateAccountOp,
    ) -> bool {
        self.set(InnerResult::CreateAccount(CreateAccountResult::Success))
    }

    pub(super) fn check_set_options(
        &mut self,
        _source: &LedgerAccount,
        _op: &SetOptionsOp,
    ) -> bool {
        self.set(InnerResult::SetOptions(SetOptionsResult::Success))
    }

    pub(super) fn check_inflation(&mut self, _source: &LedgerAccount) -> bool {
        self.set(InnerResult::Inflation(InflationResult::Success))
    }

    pub(super) fn check_account_merge(
        &mut self,
        _source: &LedgerAccount,
        _op: &AccountMergeOp,
    ) -> bool {
        self.set(InnerResult::AccountMerge(AccountMergeResult::Success))
    }

    pub(super) fn check_manage_data(
        &mut self,
        _source: &LedgerAccount,
        _op: &ManageDataOp,
    ) -> bool {
        self.set(InnerResult::ManageData(ManageDataResult::Success))
    }

    pub(super) fn check_manage_asset(
        &mut self,
        _source: &LedgerAccount,
        _op: &ManageAssetOp,
    ) -> bool {
        self.set(InnerResult::ManageAsset(ManageAssetResult::Success))
    }
}
