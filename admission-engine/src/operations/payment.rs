//! Payment handler
//!
//! A plain payment is a degenerate path payment: same asset on both ends,
//! equal amounts, empty path. The handler synthesizes that path payment,
//! runs the shared pipeline and translates the code back. The translation
//! is exhaustive on purpose; a path-only code leaking out of the shared
//! pipeline for a synthetic payment is an engine bug, not a rejection.

use gateway_core::LedgerAccount;

use crate::envelope::{PathPaymentOp, PaymentOp};
use crate::error::{Error, Result};
use crate::manager::Manager;
use crate::result::{InnerResult, PathPaymentResult, PaymentResult};

use super::OperationFrame;

fn payment_code(code: PathPaymentResult) -> Result<PaymentResult> {
    match code {
        PathPaymentResult::Success => Ok(PaymentResult::Success),
        PathPaymentResult::Malformed => Ok(PaymentResult::Malformed),
        PathPaymentResult::Underfunded => Ok(PaymentResult::Underfunded),
        PathPaymentResult::SrcNoTrust => Ok(PaymentResult::SrcNoTrust),
        PathPaymentResult::SrcNotAuthorized => Ok(PaymentResult::SrcNotAuthorized),
        PathPaymentResult::NoDestination => Ok(PaymentResult::NoDestination),
        PathPaymentResult::NoTrust => Ok(PaymentResult::NoTrust),
        PathPaymentResult::NotAuthorized => Ok(PaymentResult::NotAuthorized),
        PathPaymentResult::LineFull => Ok(PaymentResult::LineFull),
        PathPaymentResult::NoIssuer => Ok(PaymentResult::NoIssuer),
        PathPaymentResult::TooFewOffers
        | PathPaymentResult::OfferCrossSelf
        | PathPaymentResult::OverSendmax => Err(Error::UnexpectedCode(code as i32)),
    }
}

impl OperationFrame<'_> {
    pub(super) async fn check_payment(
        &mut self,
        manager: &Manager,
        source: &LedgerAccount,
        op: &PaymentOp,
    ) -> Result<bool> {
        let synthetic = PathPaymentOp {
            send_asset: op.asset.clone(),
            send_max: op.amount,
            destination: op.destination.clone(),
            dest_asset: op.asset.clone(),
            dest_amount: op.amount,
            path: Vec::new(),
        };
        let code = self.validate_path_payment(manager, source, &synthetic).await?;
        Ok(self.set(InnerResult::Payment(payment_code(code)?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_codes_translate_one_to_one() {
        let pairs = [
            (PathPaymentResult::Success, PaymentResult::Success),
            (PathPaymentResult::Malformed, PaymentResult::Malformed),
            (PathPaymentResult::NoDestination, PaymentResult::NoDestination),
            (PathPaymentResult::NoTrust, PaymentResult::NoTrust),
            (PathPaymentResult::NoIssuer, PaymentResult::NoIssuer),
        ];
        for (path, payment) in pairs {
            assert_eq!(payment_code(path).ok(), Some(payment));
            assert_eq!(path as i32, payment as i32);
        }
    }

    #[test]
    fn path_only_codes_surface_as_engine_errors() {
        for code in [
            PathPaymentResult::TooFewOffers,
            PathPaymentResult::OfferCrossSelf,
            PathPaymentResult::OverSendmax,
        ] {
            assert!(matches!(
                payment_code(code),
                Err(Error::UnexpectedCode(c)) if c == code as i32
            ));
        }
    }
}
