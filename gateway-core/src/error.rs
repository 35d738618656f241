//! Error types for the gateway core

use thiserror::Error;

/// Errors surfaced by the shared data model and the query boundaries.
///
/// Everything here is an infrastructure failure from the point of view of
/// admission control. Business rejections (restricted transfers, exceeded
/// limits) are ordinary values, not errors, and live with their validators.
#[derive(Error, Debug)]
pub enum Error {
    /// The ledger core could not answer a query
    #[error("Core query failed: {0}")]
    CoreQuery(String),

    /// The durable history store could not answer a query
    #[error("History query failed: {0}")]
    HistoryQuery(String),

    /// A stored record did not deserialize into its expected shape
    #[error("Malformed stored record: {0}")]
    MalformedRecord(String),

    /// JSON (de)serialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration loading or validation failure
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for gateway core operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}
