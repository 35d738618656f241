//! Administrative action seam
//!
//! Administrative operations carry an opaque JSON payload with exactly one
//! top-level key naming the admin subject (commission, limits, traits,
//! ...). The engine does not interpret the payload fields; it parses the
//! envelope shape, hands subject and payload to an external factory and
//! maps the three possible outcomes into the result taxonomy: field-level
//! and generic problems become protocol rejections, server-class problems
//! abort validation as infrastructure errors.

use async_trait::async_trait;
use serde_json::Value;

/// Failure reported by the administrative subsystem
#[derive(Debug)]
pub enum AdminError {
    /// One payload field failed validation
    InvalidField {
        /// Offending field name
        field: String,
        /// Validation failure description
        reason: String,
    },
    /// The action cannot be applied for a business reason
    Problem {
        /// Problem description
        detail: String,
    },
    /// The administrative subsystem itself failed
    Server(anyhow::Error),
}

/// One administrative action built from a payload.
///
/// Admission calls [`validate`](AdminAction::validate) only; applying the
/// action belongs to the ingestion pipeline after consensus.
#[async_trait]
pub trait AdminAction: Send + Sync {
    /// Validates the action without applying it
    async fn validate(&self) -> Result<(), AdminError>;

    /// Applies the validated action
    async fn apply(&self) -> Result<(), AdminError>;
}

/// Builds administrative actions from parsed payloads
#[async_trait]
pub trait AdminActionFactory: Send + Sync {
    /// Builds the action for `subject` from its payload.
    ///
    /// An unrecognized subject is an [`AdminError::InvalidField`] on the
    /// subject key.
    async fn build(
        &self,
        subject: &str,
        payload: Value,
    ) -> Result<Box<dyn AdminAction>, AdminError>;
}

/// Shape failure of an administrative payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    /// The payload is not valid JSON
    NotJson(String),
    /// The payload is not an object with exactly one top-level key
    NotSingleKeyed,
}

/// Splits a raw administrative payload into subject and body.
///
/// The payload must be a JSON object with exactly one top-level key;
/// whether the key names a known subject is the factory's decision.
pub fn parse_admin_payload(raw: &str) -> Result<(String, Value), PayloadError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| PayloadError::NotJson(e.to_string()))?;
    let object = match value {
        Value::Object(object) => object,
        _ => return Err(PayloadError::NotSingleKeyed),
    };
    if object.len() != 1 {
        return Err(PayloadError::NotSingleKeyed);
    }
    let mut entries = object.into_iter();
    match entries.next() {
        Some((subject, body)) => Ok((subject, body)),
        None => Err(PayloadError::NotSingleKeyed),
    }
}
