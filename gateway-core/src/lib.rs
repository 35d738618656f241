//! Meridian Gateway Core
//!
//! Shared data model and read boundaries of the payment admission gateway.
//!
//! # Architecture
//!
//! - **Injected time**: every period computation takes the evaluation
//!   instant as an argument, nothing here reads a wall clock
//! - **Lazy period rollover**: rolling counters are cleared on access, no
//!   job runs at midnight
//! - **Narrow read seams**: the ledger core and the history store are only
//!   reachable through the [`CoreQuery`] and [`HistoryQuery`] traits
//! - **Business outcomes are values**: rejections travel as data, the error
//!   channel is reserved for infrastructure failures

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod cache;
pub mod config;
pub mod error;
pub mod limits;
pub mod mock;
pub mod query;
pub mod statistics;
pub mod types;

// Re-exports
pub use cache::SharedCache;
pub use config::GatewayConfig;
pub use error::{Error, Result};
pub use limits::{AccountLimits, AccountTraits, AnonymousUserRestrictions, NO_LIMIT};
pub use query::{
    AssetRecord, CommissionRecord, CoreQuery, HistoryQuery, PaymentDetails, StoredOperation,
};
pub use statistics::{AccountStatistics, StatsByCounterparty};
pub use types::{
    AccountAddress, AccountType, Asset, AssetCode, ContentHash, LedgerAccount, OperationKind,
    Trustline, ONE,
};
