//! Per-account limit and trait rows
//!
//! Limits are administered per (account, asset code) pair and read by the
//! admission validators. A value of [`NO_LIMIT`] disables the corresponding
//! ceiling; absent rows leave the account unrestricted apart from the
//! global anonymity rules.

use serde::{Deserialize, Serialize};

use crate::types::{AccountAddress, AssetCode, ONE};

/// Sentinel disabling one specific ceiling
pub const NO_LIMIT: i64 = -1;

/// Administered ceilings for one account and asset code.
///
/// Outgoing ceilings constrain what the account may spend, incoming
/// ceilings what it may receive. Daily and monthly ceilings are compared
/// against the rolling counters plus the amount under validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountLimits {
    /// Limited account
    pub account: AccountAddress,
    /// Asset code the row applies to
    pub asset_code: AssetCode,
    /// Largest single outgoing operation
    pub max_operation_out: i64,
    /// Outgoing ceiling per calendar day
    pub daily_max_out: i64,
    /// Outgoing ceiling per calendar month
    pub monthly_max_out: i64,
    /// Largest single incoming operation
    pub max_operation_in: i64,
    /// Incoming ceiling per calendar day
    pub daily_max_in: i64,
    /// Incoming ceiling per calendar month
    pub monthly_max_in: i64,
}

impl AccountLimits {
    /// Row with every ceiling disabled
    pub fn unrestricted(account: AccountAddress, asset_code: AssetCode) -> Self {
        Self {
            account,
            asset_code,
            max_operation_out: NO_LIMIT,
            daily_max_out: NO_LIMIT,
            monthly_max_out: NO_LIMIT,
            max_operation_in: NO_LIMIT,
            daily_max_in: NO_LIMIT,
            monthly_max_in: NO_LIMIT,
        }
    }
}

/// Administered per-account payment blocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountTraits {
    /// Account the traits apply to
    pub account: AccountAddress,
    /// Rejects any payment into the account
    pub block_incoming_payments: bool,
    /// Rejects any payment out of the account
    pub block_outcoming_payments: bool,
}

impl AccountTraits {
    /// Traits row with no blocks set
    pub fn clear(account: AccountAddress) -> Self {
        Self {
            account,
            block_incoming_payments: false,
            block_outcoming_payments: false,
        }
    }
}

/// Process-wide ceilings applied to anonymous accounts moving anonymous
/// assets, on top of any administered per-account limits.
///
/// The outgoing daily and monthly ceilings count spending toward anonymous
/// users, registered users and settlement agents; merchant purchases are
/// exempt. The annual ceilings instead count anonymous users, registered
/// users and merchants, treating settlement-agent traffic as off-ledger
/// collection rather than spending. [`NO_LIMIT`] disables a ceiling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnonymousUserRestrictions {
    /// Largest balance an anonymous account may reach
    pub max_balance: i64,
    /// Outgoing ceiling per calendar day
    pub max_daily_outcome: i64,
    /// Outgoing ceiling per calendar month
    pub max_monthly_outcome: i64,
    /// Outgoing ceiling per calendar year
    pub max_annual_outcome: i64,
    /// Incoming ceiling per calendar year
    pub max_annual_income: i64,
}

impl Default for AnonymousUserRestrictions {
    fn default() -> Self {
        Self {
            max_balance: 15_000 * ONE,
            max_daily_outcome: 3_000 * ONE,
            max_monthly_outcome: 40_000 * ONE,
            max_annual_outcome: 120_000 * ONE,
            max_annual_income: 240_000 * ONE,
        }
    }
}
