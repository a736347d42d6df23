//! Response-side contract
//!
//! [`handle_response`] is the single place a handler's result is turned
//! into bytes. Successful values are written as JSON with status 200.
//! Handlers that need a different status, extra headers, or another
//! content type return an [`HttpResponse`], which generated wrappers
//! hand to [`handle_http_response`] instead.
//!
//! Errors are written as `{"error": "..."}` with the status the error
//! exposes through [`ResponseError`], or 500. An error may supply its own
//! body instead, as [`ApiError`] does.

use serde::Serialize;
use std::fmt::Display;
use tracing::error;

use crate::error::{ApiError, RequestError};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Sink for a response
pub trait ResponseWriter {
    /// Set a response header, replacing any previous value
    fn set_header(&mut self, name: &str, value: &str);

    /// Write the status line; only the first call has any effect
    fn write_status(&mut self, status: u16);

    /// Append to the response body
    fn write_body(&mut self, body: &[u8]);
}

/// Errors that may carry an HTTP status
pub trait ResponseError: Display {
    /// Status to respond with, or `None` for 500
    fn status_code(&self) -> Option<u16> {
        None
    }

    /// Body to write in place of `{"error": "..."}`
    fn error_body(&self) -> Option<serde_json::Value> {
        None
    }
}

impl ResponseError for RequestError {
    fn status_code(&self) -> Option<u16> {
        Some(self.status())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> Option<u16> {
        Some(self.code)
    }

    fn error_body(&self) -> Option<serde_json::Value> {
        serde_json::to_value(self).ok()
    }
}

impl ResponseError for Box<dyn std::error::Error> {}

impl ResponseError for Box<dyn std::error::Error + Send + Sync> {}

/// A handler result with its own status, headers and content type
///
/// With the default `application/json` content type the body is written
/// as JSON. With any other content type a string body is written as is
/// and anything else as JSON text.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse<T> {
    /// Response status
    pub status: u16,
    /// Body, if any
    pub body: Option<T>,
    /// Extra headers, applied in order before `Content-Type`
    pub headers: Vec<(String, String)>,
    /// Content type
    pub content_type: String,
}

impl<T> HttpResponse<T> {
    /// Create a JSON response
    pub fn new(status: u16, body: T) -> Self {
        Self {
            status,
            body: Some(body),
            headers: Vec::new(),
            content_type: JSON_CONTENT_TYPE.to_string(),
        }
    }

    /// Create a response with no body
    pub fn empty(status: u16) -> Self {
        Self {
            status,
            body: None,
            headers: Vec::new(),
            content_type: JSON_CONTENT_TYPE.to_string(),
        }
    }

    /// Add a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add several headers
    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Replace the content type
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a [crate::error::FieldError]>,
}

/// Write an error response
pub fn write_error<E: ResponseError + ?Sized>(w: &mut dyn ResponseWriter, err: &E) {
    let status = err.status_code().unwrap_or(500);
    if let Some(body) = err.error_body() {
        write_json(w, status, &body);
        return;
    }
    let body = ErrorBody {
        error: err.to_string(),
        fields: None,
    };
    write_json(w, status, &body);
}

/// Write a request-parsing error, including per-field validation failures
pub fn write_request_error(w: &mut dyn ResponseWriter, err: &RequestError) {
    let fields = match err {
        RequestError::Validation(fields) => Some(fields.as_slice()),
        _ => None,
    };
    let body = ErrorBody {
        error: err.to_string(),
        fields,
    };
    write_json(w, err.status(), &body);
}

/// Serialize a handler result into the response
pub fn handle_response<T, E>(w: &mut dyn ResponseWriter, result: Result<T, E>)
where
    T: Serialize,
    E: ResponseError,
{
    match result {
        Ok(value) => write_json(w, 200, &value),
        Err(err) => write_error(w, &err),
    }
}

/// Write a handler's [`HttpResponse`], honouring its status, headers and content type
pub fn handle_http_response<T, E>(w: &mut dyn ResponseWriter, result: Result<HttpResponse<T>, E>)
where
    T: Serialize,
    E: ResponseError,
{
    let response = match result {
        Ok(response) => response,
        Err(err) => {
            write_error(w, &err);
            return;
        }
    };

    let body = match &response.body {
        None => None,
        Some(value) if is_json(&response.content_type) => match serde_json::to_vec(value) {
            Ok(bytes) => Some(bytes),
            Err(err) => return write_serialize_failure(w, &err),
        },
        Some(value) => match serde_json::to_value(value) {
            Ok(serde_json::Value::String(text)) => Some(text.into_bytes()),
            Ok(other) => Some(other.to_string().into_bytes()),
            Err(err) => return write_serialize_failure(w, &err),
        },
    };

    for (name, value) in &response.headers {
        w.set_header(name, value);
    }
    w.set_header("Content-Type", &response.content_type);
    w.write_status(response.status);
    if let Some(bytes) = body {
        w.write_body(&bytes);
    }
}

fn is_json(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(JSON_CONTENT_TYPE))
}

fn write_json<T: Serialize + ?Sized>(w: &mut dyn ResponseWriter, status: u16, value: &T) {
    match serde_json::to_vec(value) {
        Ok(bytes) => {
            w.set_header("Content-Type", JSON_CONTENT_TYPE);
            w.write_status(status);
            w.write_body(&bytes);
        }
        Err(err) => write_serialize_failure(w, &err),
    }
}

fn write_serialize_failure(w: &mut dyn ResponseWriter, err: &serde_json::Error) {
    error!(error = %err, "Failed to serialize response");
    w.set_header("Content-Type", "text/plain; charset=utf-8");
    w.write_status(500);
    w.write_body(b"internal server error");
}
