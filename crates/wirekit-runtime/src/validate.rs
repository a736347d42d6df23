//! Payload validation contract

use crate::error::FieldError;

/// Implemented by payloads whose fields carry `validate` rules
///
/// Generated parsers call this once, after every input has been applied.
/// An `Err` becomes [`RequestError::Validation`](crate::RequestError::Validation).
pub trait Validate {
    /// Check the payload, returning every failed rule
    fn validate(&self) -> Result<(), Vec<FieldError>>;
}
