//! Error and violation types for the rule checkers

use thiserror::Error;

/// Infrastructure failures of the rule checkers.
///
/// Business rejections never travel through this enum; they are
/// [`RuleViolation`] values returned in the `Ok` channel.
#[derive(Error, Debug)]
pub enum Error {
    /// A query boundary failed
    #[error(transparent)]
    Core(#[from] gateway_core::Error),

    /// The statistics engine failed
    #[error(transparent)]
    Statistics(#[from] statistics_engine::Error),

    /// A commission computation left the representable range
    #[error("Commission computation overflowed for amount {0}")]
    FeeOverflow(i64),
}

/// Result type for rule checker operations
pub type Result<T> = std::result::Result<T, Error>;

/// Business rejection raised by a rule checker.
///
/// The carried description is built deterministically from the inputs
/// (addresses, amounts, configured ceilings) so that rejections are
/// reproducible byte for byte. It is surfaced to clients as diagnostic
/// text next to the protocol result code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleViolation {
    /// The transfer is restricted by account class or administered traits
    #[error("{0}")]
    Restricted(String),

    /// A configured or anonymity ceiling would be exceeded
    #[error("{0}")]
    ExceededLimit(String),
}

impl RuleViolation {
    /// The carried description
    pub fn description(&self) -> &str {
        match self {
            RuleViolation::Restricted(text) => text,
            RuleViolation::ExceededLimit(text) => text,
        }
    }
}
