//! Metrics collection for observability
//!
//! Prometheus counters over the admission outcomes.
//!
//! # Metrics
//!
//! - `admission_transactions_total` - Transactions validated
//! - `admission_transactions_valid_total` - Transactions that passed
//! - `admission_transactions_invalid_total` - Transactions rejected
//! - `admission_operations_rejected_total` - Operation rejections by kind
//! - `admission_infrastructure_errors_total` - Validations aborted by errors

use prometheus::{IntCounter, IntCounterVec, Opts, Registry};
use std::sync::Arc;

use gateway_core::OperationKind;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Transactions validated
    pub transactions_total: IntCounter,

    /// Transactions that passed admission
    pub transactions_valid: IntCounter,

    /// Transactions rejected by admission
    pub transactions_invalid: IntCounter,

    /// Operation rejections, labelled by operation kind
    pub operations_rejected: IntCounterVec,

    /// Validations aborted by infrastructure errors
    pub infrastructure_errors: IntCounter,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let transactions_total = IntCounter::new(
            "admission_transactions_total",
            "Transactions validated by the admission engine",
        )?;
        registry.register(Box::new(transactions_total.clone()))?;

        let transactions_valid = IntCounter::new(
            "admission_transactions_valid_total",
            "Transactions that passed admission",
        )?;
        registry.register(Box::new(transactions_valid.clone()))?;

        let transactions_invalid = IntCounter::new(
            "admission_transactions_invalid_total",
            "Transactions rejected by admission",
        )?;
        registry.register(Box::new(transactions_invalid.clone()))?;

        let operations_rejected = IntCounterVec::new(
            Opts::new(
                "admission_operations_rejected_total",
                "Operation rejections by operation kind",
            ),
            &["kind"],
        )?;
        registry.register(Box::new(operations_rejected.clone()))?;

        let infrastructure_errors = IntCounter::new(
            "admission_infrastructure_errors_total",
            "Validations aborted by infrastructure errors",
        )?;
        registry.register(Box::new(infrastructure_errors.clone()))?;

        Ok(Self {
            transactions_total,
            transactions_valid,
            transactions_invalid,
            operations_rejected,
            infrastructure_errors,
            registry,
        })
    }

    /// Counts one operation rejection
    pub fn count_rejection(&self, kind: OperationKind) {
        self.operations_rejected
            .with_label_values(&[kind.as_str()])
            .inc();
    }
}
