//! Offer handlers
//!
//! The exchange is disabled on this deployment: both offer operations are
//! rejected unconditionally. A passive offer is validated by synthesizing
//! the equivalent manage-offer request and copying its result code, so the
//! rejection logic exists exactly once.

use crate::envelope::{CreatePassiveOfferOp, ManageOfferOp};
use crate::result::{InnerResult, ManageOfferResult};

use super::OperationFrame;

/// Shared verdict for any offer request on this deployment
fn offer_verdict(_op: &ManageOfferOp) -> ManageOfferResult {
    ManageOfferResult::NotAllowed
}

impl OperationFrame<'_> {
    pub(super) fn check_manage_offer(&mut self, op: &ManageOfferOp) -> bool {
        let code = offer_verdict(op);
        self.reject_with_reason(
            InnerResult::ManageOffer(code),
            "offer operations are not allowed",
        )
    }

    pub(super) fn check_create_passive_offer(&mut self, op: &CreatePassiveOfferOp) -> bool {
        let synthetic = ManageOfferOp {
            selling: op.selling.clone(),
            buying: op.buying.clone(),
            amount: op.amount,
            offer_id: 0,
        };
        let code = offer_verdict(&synthetic);
        self.reject_with_reason(
            InnerResult::CreatePassiveOffer(code),
            "offer operations are not allowed",
        )
    }
}
