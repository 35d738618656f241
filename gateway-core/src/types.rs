//! Core types shared across the admission gateway

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Base units per displayed currency unit (7 decimal places)
pub const ONE: i64 = 10_000_000;

/// Ledger account address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct AccountAddress(String);

impl AccountAddress {
    /// Creates an address from a string
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Returns the address as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountAddress {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Classification of a ledger account within the bank topology.
///
/// Every account carries exactly one type for its whole lifetime. The type
/// decides which counterparties it may pay, which statistics bucket its
/// payments land in and whether anonymity restrictions apply to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    /// Unidentified retail wallet, subject to anonymity restrictions
    AnonymousUser,
    /// KYC-identified retail wallet
    RegisteredUser,
    /// Payee of retail purchases
    Merchant,
    /// Distributes issued funds to retail wallets
    DistributionAgent,
    /// Collects funds back toward the bank
    SettlementAgent,
    /// Gateway for flows leaving the ledger
    ExchangeAgent,
    /// The issuing bank itself
    Bank,
}

impl AccountType {
    /// All account types, in declaration order
    pub const ALL: [AccountType; 7] = [
        AccountType::AnonymousUser,
        AccountType::RegisteredUser,
        AccountType::Merchant,
        AccountType::DistributionAgent,
        AccountType::SettlementAgent,
        AccountType::ExchangeAgent,
        AccountType::Bank,
    ];

    /// Stable lowercase name, also used as a serialized map key
    pub fn code(&self) -> &'static str {
        match self {
            AccountType::AnonymousUser => "anonymous_user",
            AccountType::RegisteredUser => "registered_user",
            AccountType::Merchant => "merchant",
            AccountType::DistributionAgent => "distribution_agent",
            AccountType::SettlementAgent => "settlement_agent",
            AccountType::ExchangeAgent => "exchange_agent",
            AccountType::Bank => "bank",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Asset code, e.g. "EUR" or "MPT"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct AssetCode(String);

impl AssetCode {
    /// Creates an asset code from a string
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Code under which the native asset is keyed in limits and statistics
    pub fn native() -> Self {
        Self("native".to_string())
    }

    /// Returns the code as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AssetCode {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Asset moved by a payment: the native ledger token or an issued credit
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Asset {
    /// The native ledger token
    Native,
    /// Credit issued by a specific account
    Credit {
        /// Asset code of the credit
        code: AssetCode,
        /// Issuing account
        issuer: AccountAddress,
    },
}

impl Asset {
    /// Creates a credit asset
    pub fn credit(code: impl Into<AssetCode>, issuer: impl Into<AccountAddress>) -> Self {
        Asset::Credit {
            code: code.into(),
            issuer: issuer.into(),
        }
    }

    /// True for the native ledger token
    pub fn is_native(&self) -> bool {
        matches!(self, Asset::Native)
    }

    /// Asset code for credit assets, `None` for the native token
    pub fn code(&self) -> Option<&AssetCode> {
        match self {
            Asset::Native => None,
            Asset::Credit { code, .. } => Some(code),
        }
    }

    /// Code under which limits and statistics for this asset are keyed
    pub fn ledger_code(&self) -> AssetCode {
        match self {
            Asset::Native => AssetCode::native(),
            Asset::Credit { code, .. } => code.clone(),
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::Native => write!(f, "native"),
            Asset::Credit { code, issuer } => write!(f, "{}:{}", code, issuer),
        }
    }
}

/// Account row as seen by the ledger core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerAccount {
    /// Account address
    pub address: AccountAddress,
    /// Account classification
    pub account_type: AccountType,
    /// Current sequence number
    pub sequence: i64,
    /// Native token balance in base units
    pub balance: i64,
}

/// Trustline row: holdings of one issued asset by one account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trustline {
    /// Holding account
    pub account: AccountAddress,
    /// Held asset
    pub asset: Asset,
    /// Balance in base units
    pub balance: i64,
    /// Maximum balance the holder accepts
    pub limit: i64,
}

/// Operation discriminator used for dispatch, metrics and stored history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Creates a new ledger account
    CreateAccount,
    /// Same-asset transfer
    Payment,
    /// Cross-asset transfer with a conversion path
    PathPayment,
    /// Places or updates an exchange offer
    ManageOffer,
    /// Places a passive exchange offer
    CreatePassiveOffer,
    /// Adjusts account flags and signers
    SetOptions,
    /// Opens or resizes a trustline
    ChangeTrust,
    /// Authorizes or revokes a trustline
    AllowTrust,
    /// Merges an account into another
    AccountMerge,
    /// Periodic token distribution
    Inflation,
    /// Writes a key-value pair on an account
    ManageData,
    /// Bank-only configuration change
    Administrative,
    /// Reverses a settled payment in full
    PaymentReversal,
    /// Returns part of a settled payment
    Refund,
    /// Transfer leaving the ledger
    ExternalPayment,
    /// Registers or updates an asset
    ManageAsset,
}

impl OperationKind {
    /// Stable lowercase name used in logs and metric labels
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::CreateAccount => "create_account",
            OperationKind::Payment => "payment",
            OperationKind::PathPayment => "path_payment",
            OperationKind::ManageOffer => "manage_offer",
            OperationKind::CreatePassiveOffer => "create_passive_offer",
            OperationKind::SetOptions => "set_options",
            OperationKind::ChangeTrust => "change_trust",
            OperationKind::AllowTrust => "allow_trust",
            OperationKind::AccountMerge => "account_merge",
            OperationKind::Inflation => "inflation",
            OperationKind::ManageData => "manage_data",
            OperationKind::Administrative => "administrative",
            OperationKind::PaymentReversal => "payment_reversal",
            OperationKind::Refund => "refund",
            OperationKind::ExternalPayment => "external_payment",
            OperationKind::ManageAsset => "manage_asset",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// SHA-256 digest identifying a transaction envelope by content
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub [u8; 32]);

impl ContentHash {
    /// Hashes raw bytes
    pub fn of(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(hasher.finalize().into())
    }

    /// Returns the digest bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex rendering used in store keys and logs
    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(64);
        for byte in self.0 {
            use fmt::Write;
            // infallible on String
            let _ = write!(out, "{:02x}", byte);
        }
        out
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.to_hex())
    }
}

/// Timestamp injected by the caller for all period arithmetic.
///
/// The gateway never reads a wall clock of its own. Admission entry points
/// take the evaluation instant as an argument so that replays and tests are
/// deterministic.
pub type EvaluationTime = DateTime<Utc>;
