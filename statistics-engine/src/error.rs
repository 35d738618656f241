//! Error types for the statistics engine

use thiserror::Error;

/// Errors surfaced by the statistics engine
#[derive(Error, Debug)]
pub enum Error {
    /// The fast store rejected or failed a command
    #[error("Store error: {0}")]
    Store(String),

    /// A stored value did not deserialize into its expected shape
    #[error("Malformed stored value at {key}: {reason}")]
    MalformedValue {
        /// Store key holding the value
        key: String,
        /// Parse failure description
        reason: String,
    },

    /// JSON (de)serialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The durable reload source failed
    #[error("Durable reload failed: {0}")]
    Durable(#[from] gateway_core::Error),

    /// Optimistic commits kept conflicting until the attempt budget ran out
    #[error("{operation} abandoned after {attempts} conflicting attempts")]
    RetriesExhausted {
        /// Label of the abandoned operation
        operation: &'static str,
        /// Number of attempts made
        attempts: u32,
    },
}

/// Result type for statistics engine operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<redis::RedisError> for Error {
    fn from(e: redis::RedisError) -> Self {
        Error::Store(e.to_string())
    }
}
