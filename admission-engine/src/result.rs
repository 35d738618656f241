//! Protocol result codes
//!
//! Every operation produces a typed result the external rendering layer
//! serializes for clients. Client software branches on the exact numeric
//! codes, so each enum carries explicit discriminants: success is zero,
//! failures are negative. The diagnostic side channel
//! ([`AdditionalErrorInfo`]) is not part of the protocol and is attached
//! only when a rejection has a human-meaningful cause.

use serde::{Deserialize, Serialize};

use gateway_core::OperationKind;

/// Result of a create-account operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum CreateAccountResult {
    /// Admission passed
    Success = 0,
}

/// Result of a set-options operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum SetOptionsResult {
    /// Admission passed
    Success = 0,
}

/// Result of an inflation operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum InflationResult {
    /// Admission passed
    Success = 0,
}

/// Result of an account-merge operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum AccountMergeResult {
    /// Admission passed
    Success = 0,
}

/// Result of a manage-data operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum ManageDataResult {
    /// Admission passed
    Success = 0,
}

/// Result of a manage-asset operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum ManageAssetResult {
    /// Admission passed
    Success = 0,
}

/// Result of a change-trust operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum ChangeTrustResult {
    /// Admission passed
    Success = 0,
    /// Invalid input, details in the diagnostic side channel
    Malformed = -1,
}

/// Result of an allow-trust operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum AllowTrustResult {
    /// Admission passed
    Success = 0,
    /// Invalid input, details in the diagnostic side channel
    Malformed = -1,
}

/// Result of a manage-offer or create-passive-offer operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum ManageOfferResult {
    /// Admission passed
    Success = 0,
    /// Invalid input
    Malformed = -1,
    /// Offer operations are disabled on this deployment
    NotAllowed = -2,
}

/// Result of a payment operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum PaymentResult {
    /// Admission passed
    Success = 0,
    /// Invalid input or a restriction/limit rejection with diagnostics
    Malformed = -1,
    /// Source balance too low
    Underfunded = -2,
    /// Source holds no trustline for the asset
    SrcNoTrust = -3,
    /// Source trustline not authorized
    SrcNotAuthorized = -4,
    /// Destination account does not exist
    NoDestination = -5,
    /// Destination holds no trustline for the asset
    NoTrust = -6,
    /// Destination trustline not authorized
    NotAuthorized = -7,
    /// Destination trustline ceiling would be exceeded
    LineFull = -8,
    /// Asset issuer does not exist
    NoIssuer = -9,
}

/// Result of a path-payment operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum PathPaymentResult {
    /// Admission passed
    Success = 0,
    /// Invalid input or a restriction/limit rejection with diagnostics
    Malformed = -1,
    /// Source balance too low
    Underfunded = -2,
    /// Source holds no trustline for the send asset
    SrcNoTrust = -3,
    /// Source trustline not authorized
    SrcNotAuthorized = -4,
    /// Destination account does not exist
    NoDestination = -5,
    /// Destination holds no trustline for the destination asset
    NoTrust = -6,
    /// Destination trustline not authorized
    NotAuthorized = -7,
    /// Destination trustline ceiling would be exceeded
    LineFull = -8,
    /// Asset issuer does not exist
    NoIssuer = -9,
    /// Not enough offers along the path
    TooFewOffers = -10,
    /// The path would cross the sender's own offer
    OfferCrossSelf = -11,
    /// Conversion would exceed the send maximum
    OverSendmax = -12,
}

/// Result of an administrative operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum AdministrativeResult {
    /// Admission passed
    Success = 0,
    /// Unparseable payload or a field-level validation failure
    Malformed = -1,
    /// Source is not the bank master account
    NotAuthorized = -2,
}

/// Result of a payment-reversal or refund operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum ReversalResult {
    /// Admission passed
    Success = 0,
    /// Invalid input, details in the diagnostic side channel
    Malformed = -1,
    /// No settled payment with the referenced identifier
    PaymentDoesNotExist = -2,
    /// The reversing party is not the original recipient
    InvalidSource = -3,
    /// The claimed payment sender is not the original source
    InvalidPaymentSender = -4,
    /// Amount differs from the original payment
    InvalidAmount = -5,
    /// Commission differs from the original payment
    InvalidCommission = -6,
    /// Asset differs from the original payment
    InvalidAsset = -7,
}

/// Result of an external payment operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum ExternalPaymentResult {
    /// Admission passed
    Success = 0,
    /// Invalid input or a restriction/limit rejection with diagnostics
    Malformed = -1,
}

/// Typed per-operation result, tagged with the operation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "code", rename_all = "snake_case")]
pub enum InnerResult {
    /// Create-account result
    CreateAccount(CreateAccountResult),
    /// Payment result
    Payment(PaymentResult),
    /// Path-payment result
    PathPayment(PathPaymentResult),
    /// Manage-offer result
    ManageOffer(ManageOfferResult),
    /// Create-passive-offer result, sharing the offer code set
    CreatePassiveOffer(ManageOfferResult),
    /// Set-options result
    SetOptions(SetOptionsResult),
    /// Change-trust result
    ChangeTrust(ChangeTrustResult),
    /// Allow-trust result
    AllowTrust(AllowTrustResult),
    /// Account-merge result
    AccountMerge(AccountMergeResult),
    /// Inflation result
    Inflation(InflationResult),
    /// Manage-data result
    ManageData(ManageDataResult),
    /// Administrative result
    Administrative(AdministrativeResult),
    /// Payment-reversal result
    PaymentReversal(ReversalResult),
    /// Refund result
    Refund(ReversalResult),
    /// External payment result
    ExternalPayment(ExternalPaymentResult),
    /// Manage-asset result
    ManageAsset(ManageAssetResult),
}

impl InnerResult {
    /// Operation kind this result belongs to
    pub fn kind(&self) -> OperationKind {
        match self {
            InnerResult::CreateAccount(_) => OperationKind::CreateAccount,
            InnerResult::Payment(_) => OperationKind::Payment,
            InnerResult::PathPayment(_) => OperationKind::PathPayment,
            InnerResult::ManageOffer(_) => OperationKind::ManageOffer,
            InnerResult::CreatePassiveOffer(_) => OperationKind::CreatePassiveOffer,
            InnerResult::SetOptions(_) => OperationKind::SetOptions,
            InnerResult::ChangeTrust(_) => OperationKind::ChangeTrust,
            InnerResult::AllowTrust(_) => OperationKind::AllowTrust,
            InnerResult::AccountMerge(_) => OperationKind::AccountMerge,
            InnerResult::Inflation(_) => OperationKind::Inflation,
            InnerResult::ManageData(_) => OperationKind::ManageData,
            InnerResult::Administrative(_) => OperationKind::Administrative,
            InnerResult::PaymentReversal(_) => OperationKind::PaymentReversal,
            InnerResult::Refund(_) => OperationKind::Refund,
            InnerResult::ExternalPayment(_) => OperationKind::ExternalPayment,
            InnerResult::ManageAsset(_) => OperationKind::ManageAsset,
        }
    }

    /// Numeric protocol code
    pub fn code(&self) -> i32 {
        match self {
            InnerResult::CreateAccount(code) => *code as i32,
            InnerResult::Payment(code) => *code as i32,
            InnerResult::PathPayment(code) => *code as i32,
            InnerResult::ManageOffer(code) => *code as i32,
            InnerResult::CreatePassiveOffer(code) => *code as i32,
            InnerResult::SetOptions(code) => *code as i32,
            InnerResult::ChangeTrust(code) => *code as i32,
            InnerResult::AllowTrust(code) => *code as i32,
            InnerResult::AccountMerge(code) => *code as i32,
            InnerResult::Inflation(code) => *code as i32,
            InnerResult::ManageData(code) => *code as i32,
            InnerResult::Administrative(code) => *code as i32,
            InnerResult::PaymentReversal(code) => *code as i32,
            InnerResult::Refund(code) => *code as i32,
            InnerResult::ExternalPayment(code) => *code as i32,
            InnerResult::ManageAsset(code) => *code as i32,
        }
    }

    /// True when the code is the success code of its kind
    pub fn is_success(&self) -> bool {
        self.code() == 0
    }
}

/// Outer per-operation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outer", rename_all = "snake_case")]
pub enum OperationResult {
    /// The effective source account does not exist
    NoSourceAccount,
    /// Typed inner result
    Inner(InnerResult),
}

impl OperationResult {
    /// True when admission passed for the operation
    pub fn is_success(&self) -> bool {
        match self {
            OperationResult::NoSourceAccount => false,
            OperationResult::Inner(inner) => inner.is_success(),
        }
    }
}

/// Out-of-protocol diagnostic attached to a rejection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AdditionalErrorInfo {
    /// Deterministic human-readable cause
    Reason(String),
    /// Name of the offending field
    InvalidField(String),
}

/// Result of one operation together with its diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationOutcome {
    /// 1-based index of the operation inside the transaction
    pub index: u32,
    /// Protocol result
    pub result: OperationResult,
    /// Diagnostic side channel, absent on pure protocol rejections
    pub info: Option<AdditionalErrorInfo>,
}

/// Transaction-level result code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum TransactionResultCode {
    /// Every operation passed admission
    Success = 0,
    /// At least one operation was rejected
    Failed = -1,
    /// The transaction carries no operations
    MissingOperation = -2,
    /// An administrative operation was combined with other operations
    AdministrativeNotExclusive = -3,
}

/// Transaction verdict with the complete per-operation result set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionVerdict {
    /// Transaction-level code
    pub code: TransactionResultCode,
    /// Per-operation outcomes, one per operation in submission order.
    ///
    /// Complete even when the transaction failed, so clients see every
    /// rejection at once. Empty for transaction-level structural failures.
    pub operations: Vec<OperationOutcome>,
    /// Diagnostic for transaction-level structural rejections
    pub info: Option<AdditionalErrorInfo>,
}

impl TransactionVerdict {
    /// True when the transaction passed admission
    pub fn is_valid(&self) -> bool {
        self.code == TransactionResultCode::Success
    }
}
