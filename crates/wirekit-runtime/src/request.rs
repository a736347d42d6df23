//! Request-side contract
//!
//! Generated parsers only ever talk to a request through [`RawRequest`].
//! Single-valued accessors return `None` when the input is absent; callers
//! treat an empty string the same way.

use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

use crate::error::{RequestError, Result};

/// Request-scoped values handed to every handler
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    values: BTreeMap<String, String>,
}

impl Context {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy with `key` set to `value`
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Look up a request-scoped value
    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// An uploaded multipart file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileHeader {
    /// Client-supplied file name
    pub filename: String,
    /// Declared content type
    pub content_type: Option<String>,
    /// File contents
    pub content: Vec<u8>,
}

impl FileHeader {
    /// Size of the file contents in bytes
    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// Untyped access to an incoming request
pub trait RawRequest {
    /// Request-scoped context
    fn context(&self) -> Context;

    /// A named path segment
    fn path_value(&self, name: &str) -> Option<&str>;

    /// All values of a query parameter, in order
    fn query_values(&self, name: &str) -> Vec<&str>;

    /// All values of a header, in order
    fn header_values(&self, name: &str) -> Vec<&str>;

    /// A cookie value
    fn cookie(&self, name: &str) -> Option<&str>;

    /// All values of a form field, in order
    fn form_values(&self, name: &str) -> Vec<&str>;

    /// All files uploaded under a form field
    fn form_files(&self, name: &str) -> Vec<FileHeader>;

    /// Raw request body
    fn body(&self) -> &[u8];

    /// First value of a query parameter
    fn query_value(&self, name: &str) -> Option<&str> {
        self.query_values(name).into_iter().next()
    }

    /// First value of a header
    fn header_value(&self, name: &str) -> Option<&str> {
        self.header_values(name).into_iter().next()
    }

    /// First value of a form field
    fn form_value(&self, name: &str) -> Option<&str> {
        self.form_values(name).into_iter().next()
    }

    /// First file uploaded under a form field
    fn form_file(&self, name: &str) -> Result<Option<FileHeader>> {
        Ok(self.form_files(name).into_iter().next())
    }

    /// Read a multipart body, buffering at most `max_memory` bytes in memory
    ///
    /// Requests that are not multipart succeed without doing anything.
    fn parse_multipart_form(&mut self, max_memory: u64) -> Result<()> {
        let _ = max_memory;
        Ok(())
    }
}

/// Decode a JSON request body
pub fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|err| RequestError::InvalidBody(err.to_string()))
}
