//! Meridian Statistics Engine
//!
//! Rolling usage counters of the admission gateway, kept correct under
//! concurrent validation of transactions touching the same account.
//!
//! # Architecture
//!
//! - **Transactional store seam**: the fast store is reached only through
//!   the [`TxnKvStore`] capability; Redis WATCH/MULTI/EXEC in production,
//!   a versioned in-memory map in tests
//! - **One retry loop**: both mutations run through
//!   [`retry::run_optimistic`], bounded to [`retry::MAX_ATTEMPTS`] attempts
//! - **Idempotent by marker**: every applied delta leaves a processed-op
//!   marker; replays return the current counters, cancellation removes the
//!   marker and the delta in one atomic commit

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod error;
pub mod manager;
pub mod memory;
pub mod redis;
pub mod retry;
pub mod store;

// Re-exports
pub use error::{Error, Result};
pub use manager::{OpReference, StatisticsManager};
pub use memory::MemoryKvStore;
pub use redis::RedisKvStore;
pub use store::{KvTransaction, KvWrite, TxnKvStore};
