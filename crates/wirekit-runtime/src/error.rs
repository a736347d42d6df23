//! Error types for wirekit-runtime

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type alias for request parsing
pub type Result<T> = std::result::Result<T, RequestError>;

/// A single failed validation rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Field the rule applies to
    pub field: String,
    /// Human-readable failure
    pub message: String,
}

impl FieldError {
    /// Create a field error
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Errors produced while turning a raw request into a payload
///
/// Every variant is a client error and maps to status 400.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// A scalar input could not be converted
    #[error("invalid value for '{field}': {message}")]
    InvalidField {
        /// Payload field label
        field: String,
        /// Conversion failure
        message: String,
    },

    /// One element of a repeated input could not be converted
    #[error("invalid value for '{field}' at index {index}: {message}")]
    InvalidElement {
        /// Payload field label
        field: String,
        /// Position of the failing element
        index: usize,
        /// Conversion failure
        message: String,
    },

    /// The JSON body could not be decoded
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// The multipart form could not be read
    #[error("multipart form error: {0}")]
    Multipart(String),

    /// The decoded payload failed validation
    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<FieldError>),
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl RequestError {
    /// Conversion failure for a scalar field
    pub fn invalid_field(field: impl Into<String>, err: impl fmt::Display) -> Self {
        Self::InvalidField {
            field: field.into(),
            message: err.to_string(),
        }
    }

    /// Conversion failure for element `index` of a repeated field
    pub fn invalid_element(field: impl Into<String>, index: usize, err: impl fmt::Display) -> Self {
        Self::InvalidElement {
            field: field.into(),
            index,
            message: err.to_string(),
        }
    }

    /// Multipart parsing failure
    pub fn multipart(err: impl fmt::Display) -> Self {
        Self::Multipart(err.to_string())
    }

    /// Validation failure
    pub fn validation(errors: Vec<FieldError>) -> Self {
        Self::Validation(errors)
    }

    /// HTTP status for this error
    pub fn status(&self) -> u16 {
        400
    }
}

/// An error with an HTTP status, written as its own JSON body
///
/// Serializes as `code`, `errorCode`, `message`, and, when set, `details`
/// and `requestId`. The cause is never serialized.
#[derive(Error, Debug, Serialize)]
#[error("{message}{}", cause_suffix(.cause))]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// HTTP status
    pub code: u16,
    /// Short machine-readable code, the status text for the constructors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Human-readable message
    pub message: String,
    /// Extra structured detail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Request the error belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip)]
    #[source]
    cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

fn cause_suffix(cause: &Option<Box<dyn std::error::Error + Send + Sync>>) -> String {
    cause
        .as_ref()
        .map(|cause| format!(": {}", cause))
        .unwrap_or_default()
}

impl ApiError {
    /// Create an error with no error code
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            error_code: None,
            message: message.into(),
            details: None,
            request_id: None,
            cause: None,
        }
    }

    fn with_status(code: u16, message: impl Into<String>) -> Self {
        let mut err = Self::new(code, message);
        err.error_code = status_text(code).map(str::to_string);
        err
    }

    /// 400 Bad Request
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_status(400, message)
    }

    /// 401 Unauthorized
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::with_status(401, message)
    }

    /// 403 Forbidden
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::with_status(403, message)
    }

    /// 404 Not Found, with the message `"{resource} not found"`
    pub fn not_found(resource: impl fmt::Display) -> Self {
        Self::with_status(404, format!("{} not found", resource))
    }

    /// 406 Not Acceptable
    pub fn not_acceptable(message: impl Into<String>) -> Self {
        Self::with_status(406, message)
    }

    /// 409 Conflict
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::with_status(409, message)
    }

    /// 422 Unprocessable Entity
    pub fn unprocessable_entity(message: impl Into<String>) -> Self {
        Self::with_status(422, message)
    }

    /// 500 Internal Server Error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::with_status(500, message)
    }

    /// 501 Not Implemented
    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self::with_status(501, message)
    }

    /// 503 Service Unavailable
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::with_status(503, message)
    }

    /// 504 Gateway Timeout
    pub fn gateway_timeout(message: impl Into<String>) -> Self {
        Self::with_status(504, message)
    }

    /// Attach structured detail
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Attach the request ID
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Attach the underlying error
    pub fn with_cause(mut self, cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        self.cause = Some(cause.into());
        self
    }
}

fn status_text(code: u16) -> Option<&'static str> {
    let text = match code {
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        406 => "Not Acceptable",
        409 => "Conflict",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => return None,
    };
    Some(text)
}
