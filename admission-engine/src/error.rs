//! Error types for the admission engine

use thiserror::Error;

/// Infrastructure failures of the admission engine.
///
/// Anything here aborts the whole transaction validation and must be
/// rendered as a service failure, never as a rejected transaction.
/// Business rejections travel as protocol result codes instead.
#[derive(Error, Debug)]
pub enum Error {
    /// A query boundary or the shared data model failed
    #[error(transparent)]
    Core(#[from] gateway_core::Error),

    /// The statistics engine failed
    #[error(transparent)]
    Statistics(#[from] statistics_engine::Error),

    /// A rule checker failed
    #[error(transparent)]
    Limits(#[from] limits_engine::Error),

    /// A path-payment result code has no payment-level counterpart
    #[error("Unexpected result code: path payment code {0} is not expressible as a payment code")]
    UnexpectedCode(i32),

    /// The administrative subsystem reported a server-class problem
    #[error("Administrative action failed: {0}")]
    AdminServer(String),

    /// A handler finished without stamping a result code
    #[error("Operation {0} finished validation without a result code")]
    MissingResult(u32),

    /// Metric registration failed at startup
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

/// Result type for admission engine operations
pub type Result<T> = std::result::Result<T, Error>;
