//! Transaction envelope and the closed operation set
//!
//! The submission layer parses raw envelopes into these types before
//! admission runs. [`OperationBody`] is a closed sum: adding an operation
//! kind extends the enum and the compiler walks every dispatch site.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use gateway_core::{AccountAddress, AccountType, Asset, ContentHash, OperationKind};

use crate::error::Result;

/// Creates a new ledger account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAccountOp {
    /// Address of the account to create
    pub destination: AccountAddress,
    /// Class assigned to the new account
    pub account_type: AccountType,
}

/// Same-asset transfer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentOp {
    /// Receiving account
    pub destination: AccountAddress,
    /// Transferred asset
    pub asset: Asset,
    /// Amount in base units
    pub amount: i64,
}

/// Cross-asset transfer over a conversion path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathPaymentOp {
    /// Asset debited from the source
    pub send_asset: Asset,
    /// Most the source is willing to spend, in base units
    pub send_max: i64,
    /// Receiving account
    pub destination: AccountAddress,
    /// Asset credited to the destination
    pub dest_asset: Asset,
    /// Amount credited, in base units
    pub dest_amount: i64,
    /// Intermediate conversion assets
    pub path: Vec<Asset>,
}

/// Places or updates an exchange offer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManageOfferOp {
    /// Asset offered
    pub selling: Asset,
    /// Asset wanted
    pub buying: Asset,
    /// Offered amount in base units
    pub amount: i64,
    /// Existing offer to update, zero to create
    pub offer_id: u64,
}

/// Places a passive exchange offer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePassiveOfferOp {
    /// Asset offered
    pub selling: Asset,
    /// Asset wanted
    pub buying: Asset,
    /// Offered amount in base units
    pub amount: i64,
}

/// Adjusts account flags and signers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SetOptionsOp {
    /// New home domain, when set
    pub home_domain: Option<String>,
    /// New master key weight, when set
    pub master_weight: Option<u8>,
}

/// Opens or resizes a trustline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeTrustOp {
    /// Trusted asset
    pub asset: Asset,
    /// New trust ceiling in base units
    pub limit: i64,
}

/// Authorizes or revokes a trustline held by another account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllowTrustOp {
    /// Account holding the trustline
    pub trustor: AccountAddress,
    /// Affected asset
    pub asset: Asset,
    /// Grant or revoke
    pub authorize: bool,
}

/// Merges the source account into another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountMergeOp {
    /// Receiving account
    pub destination: AccountAddress,
}

/// Writes a key-value pair on the source account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManageDataOp {
    /// Entry name
    pub name: String,
    /// Entry value, `None` deletes the entry
    pub value: Option<Vec<u8>>,
}

/// Bank-only configuration change riding inside a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdministrativeOp {
    /// Opaque JSON payload interpreted by the administrative subsystem
    pub op_data: String,
}

/// Reverses a settled payment in full
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentReversalOp {
    /// Identifier of the settled payment
    pub payment_id: Uuid,
    /// Claimed source of the original payment
    pub payment_source: AccountAddress,
    /// Reversed amount in base units, must equal the original
    pub amount: i64,
    /// Reversed commission in base units, must equal the original
    pub commission_amount: i64,
    /// Reversed asset, must equal the original
    pub asset: Asset,
}

/// Returns part of a settled payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundOp {
    /// Identifier of the settled payment
    pub payment_id: Uuid,
    /// Claimed source of the original payment
    pub payment_source: AccountAddress,
    /// Claimed original amount in base units, must equal the original
    pub original_amount: i64,
    /// Claimed original commission in base units, must equal the original
    pub commission_amount: i64,
    /// Refunded amount in base units, up to the original amount
    pub amount: i64,
    /// Refunded asset, must equal the original
    pub asset: Asset,
}

/// Transfer leaving the ledger through an exchange agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalPaymentOp {
    /// Off-ledger destination reference
    pub external_destination: String,
    /// Transferred asset
    pub asset: Asset,
    /// Amount in base units
    pub amount: i64,
}

/// Registers or updates an asset in the allow-list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManageAssetOp {
    /// Affected asset
    pub asset: Asset,
    /// Anonymity flag to record
    pub is_anonymous: bool,
}

/// Closed set of operation bodies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OperationBody {
    /// Creates a new ledger account
    CreateAccount(CreateAccountOp),
    /// Same-asset transfer
    Payment(PaymentOp),
    /// Cross-asset transfer
    PathPayment(PathPaymentOp),
    /// Places or updates an exchange offer
    ManageOffer(ManageOfferOp),
    /// Places a passive exchange offer
    CreatePassiveOffer(CreatePassiveOfferOp),
    /// Adjusts account flags and signers
    SetOptions(SetOptionsOp),
    /// Opens or resizes a trustline
    ChangeTrust(ChangeTrustOp),
    /// Authorizes or revokes a trustline
    AllowTrust(AllowTrustOp),
    /// Merges the source account into another
    AccountMerge(AccountMergeOp),
    /// Periodic token distribution
    Inflation,
    /// Writes a key-value pair on an account
    ManageData(ManageDataOp),
    /// Bank-only configuration change
    Administrative(AdministrativeOp),
    /// Reverses a settled payment in full
    PaymentReversal(PaymentReversalOp),
    /// Returns part of a settled payment
    Refund(RefundOp),
    /// Transfer leaving the ledger
    ExternalPayment(ExternalPaymentOp),
    /// Registers or updates an asset
    ManageAsset(ManageAssetOp),
}

impl OperationBody {
    /// Discriminator of this body
    pub fn kind(&self) -> OperationKind {
        match self {
            OperationBody::CreateAccount(_) => OperationKind::CreateAccount,
            OperationBody::Payment(_) => OperationKind::Payment,
            OperationBody::PathPayment(_) => OperationKind::PathPayment,
            OperationBody::ManageOffer(_) => OperationKind::ManageOffer,
            OperationBody::CreatePassiveOffer(_) => OperationKind::CreatePassiveOffer,
            OperationBody::SetOptions(_) => OperationKind::SetOptions,
            OperationBody::ChangeTrust(_) => OperationKind::ChangeTrust,
            OperationBody::AllowTrust(_) => OperationKind::AllowTrust,
            OperationBody::AccountMerge(_) => OperationKind::AccountMerge,
            OperationBody::Inflation => OperationKind::Inflation,
            OperationBody::ManageData(_) => OperationKind::ManageData,
            OperationBody::Administrative(_) => OperationKind::Administrative,
            OperationBody::PaymentReversal(_) => OperationKind::PaymentReversal,
            OperationBody::Refund(_) => OperationKind::Refund,
            OperationBody::ExternalPayment(_) => OperationKind::ExternalPayment,
            OperationBody::ManageAsset(_) => OperationKind::ManageAsset,
        }
    }
}

/// One operation inside a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Operation-level source override, transaction source when absent
    pub source: Option<AccountAddress>,
    /// Operation body
    pub body: OperationBody,
}

impl Operation {
    /// Operation without a source override
    pub fn new(body: OperationBody) -> Self {
        Self { source: None, body }
    }
}

/// Parsed transaction envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionEnvelope {
    /// Transaction source account
    pub source: AccountAddress,
    /// Source sequence number consumed by the transaction
    pub sequence: i64,
    /// Operations in submission order
    pub operations: Vec<Operation>,
    /// Submission instant recorded by the gateway
    pub submitted_at: DateTime<Utc>,
}

/// Immutable per-transaction digest, derived once at parse time.
///
/// Holds the content hash keying the statistics processed-op markers, plus
/// the fields the frames read on every operation.
#[derive(Debug, Clone)]
pub struct EnvelopeInfo {
    /// Content hash of the serialized envelope
    pub content_hash: ContentHash,
    /// Source sequence number
    pub sequence: i64,
    /// Transaction source account
    pub source: AccountAddress,
    /// The parsed envelope
    pub envelope: Arc<TransactionEnvelope>,
}

impl EnvelopeInfo {
    /// Derives the digest of `envelope`
    pub fn derive(envelope: TransactionEnvelope) -> Result<Self> {
        let bytes = serde_json::to_vec(&envelope).map_err(gateway_core::Error::from)?;
        Ok(Self {
            content_hash: ContentHash::of(&bytes),
            sequence: envelope.sequence,
            source: envelope.source.clone(),
            envelope: Arc::new(envelope),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn envelope(operations: Vec<Operation>) -> TransactionEnvelope {
        TransactionEnvelope {
            source: "ACC001".into(),
            sequence: 7,
            operations,
            submitted_at: Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn envelope_info_hash_is_content_addressed() {
        let payment = Operation::new(OperationBody::Payment(PaymentOp {
            destination: "ACC002".into(),
            asset: Asset::credit("EUR", "ISSUER0001"),
            amount: 100,
        }));
        let a = EnvelopeInfo::derive(envelope(vec![payment.clone()])).unwrap();
        let b = EnvelopeInfo::derive(envelope(vec![payment])).unwrap();
        let c = EnvelopeInfo::derive(envelope(vec![])).unwrap();

        assert_eq!(a.content_hash, b.content_hash);
        assert_ne!(a.content_hash, c.content_hash);
        assert_eq!(a.sequence, 7);
        assert_eq!(a.source, AccountAddress::from("ACC001"));
    }

    #[test]
    fn operation_bodies_expose_their_kind() {
        let body = OperationBody::Administrative(AdministrativeOp {
            op_data: "{}".to_string(),
        });
        assert_eq!(body.kind(), OperationKind::Administrative);
        assert_eq!(OperationBody::Inflation.kind(), OperationKind::Inflation);
    }
}
