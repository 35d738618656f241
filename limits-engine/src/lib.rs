//! Meridian Limits Engine
//!
//! Business rule checks of the admission gateway: who may pay whom, which
//! administered blocks and ceilings apply, what commission a transfer
//! carries.
//!
//! # Architecture
//!
//! - **Rejections are values**: every checker returns
//!   `Ok(Some(RuleViolation))` for a business rejection and reserves the
//!   error channel for infrastructure failures
//! - **Deterministic diagnostics**: violation descriptions are built from
//!   the inputs alone and are stable byte for byte
//! - **Request-scoped reads**: statistics are loaded once per validation
//!   through [`StatsWindow`], never cached on the validators themselves

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod account_types;
pub mod assets;
pub mod commission;
pub mod error;
pub mod limits;
pub mod stats_window;
pub mod traits;

// Re-exports
pub use account_types::TransferMatrix;
pub use assets::AssetsValidator;
pub use commission::{CommissionCalculator, OperationFee};
pub use error::{Error, Result, RuleViolation};
pub use limits::{IncomingLimitsValidator, OutgoingLimitsValidator};
pub use stats_window::{Period, StatsWindow};
pub use traits::TraitsValidator;
