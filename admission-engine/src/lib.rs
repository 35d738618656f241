//! Meridian Admission Engine
//!
//! Pre-consensus transaction validation for the payment gateway. Every
//! submitted envelope passes through a [`TransactionFrame`], which runs
//! one [`operations::OperationFrame`] per operation: typed handlers over
//! the closed operation set, backed by the restriction and limit checkers
//! and the rolling statistics manager.
//!
//! # Architecture
//!
//! - **Rejections are values**: a rejected transaction is a successful
//!   validation with a negative code; the error channel carries only
//!   infrastructure failures
//! - **Provisional deltas**: handlers book their statistics flows as they
//!   pass, so later operations of the same transaction see them; an
//!   invalid verdict cancels every booked delta
//! - **Synthetic delegation**: a plain payment validates as a degenerate
//!   path payment, a passive offer as a manage offer, so each rule
//!   exists once

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod admin;
pub mod envelope;
pub mod error;
pub mod manager;
pub mod metrics;
pub mod operations;
pub mod result;
pub mod transaction;

// Re-exports
pub use admin::{AdminAction, AdminActionFactory, AdminError};
pub use envelope::{EnvelopeInfo, Operation, OperationBody, TransactionEnvelope};
pub use error::{Error, Result};
pub use manager::Manager;
pub use metrics::Metrics;
pub use result::{
    AdditionalErrorInfo, InnerResult, OperationOutcome, OperationResult, TransactionResultCode,
    TransactionVerdict,
};
pub use transaction::TransactionFrame;
