//! In-memory request and response implementations
//!
//! Useful for unit-testing generated wrappers without an HTTP stack.

use std::collections::BTreeMap;

use crate::error::{RequestError, Result};
use crate::request::{Context, FileHeader, RawRequest};
use crate::response::ResponseWriter;

/// A [`RawRequest`] built up in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryRequest {
    context: Context,
    path: BTreeMap<String, String>,
    query: BTreeMap<String, Vec<String>>,
    headers: BTreeMap<String, Vec<String>>,
    cookies: BTreeMap<String, String>,
    form: BTreeMap<String, Vec<String>>,
    files: BTreeMap<String, Vec<FileHeader>>,
    body: Vec<u8>,
    multipart: bool,
    multipart_parsed: bool,
}

impl MemoryRequest {
    /// Create an empty request
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request context
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Set a path segment
    pub fn with_path(mut self, name: &str, value: &str) -> Self {
        self.path.insert(name.to_string(), value.to_string());
        self
    }

    /// Append a query value
    pub fn with_query(mut self, name: &str, value: &str) -> Self {
        self.query
            .entry(name.to_string())
            .or_default()
            .push(value.to_string());
        self
    }

    /// Append a header value; names are case-insensitive
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(value.to_string());
        self
    }

    /// Set a cookie
    pub fn with_cookie(mut self, name: &str, value: &str) -> Self {
        self.cookies.insert(name.to_string(), value.to_string());
        self
    }

    /// Append a form value and mark the request as multipart
    pub fn with_form(mut self, name: &str, value: &str) -> Self {
        self.form
            .entry(name.to_string())
            .or_default()
            .push(value.to_string());
        self.multipart = true;
        self
    }

    /// Attach an uploaded file and mark the request as multipart
    pub fn with_file(mut self, name: &str, file: FileHeader) -> Self {
        self.files.entry(name.to_string()).or_default().push(file);
        self.multipart = true;
        self
    }

    /// Set the raw body
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Whether `parse_multipart_form` has been called
    pub fn multipart_parsed(&self) -> bool {
        self.multipart_parsed
    }
}

fn values<'a>(map: &'a BTreeMap<String, Vec<String>>, name: &str) -> Vec<&'a str> {
    map.get(name)
        .map(|vals| vals.iter().map(String::as_str).collect())
        .unwrap_or_default()
}

impl RawRequest for MemoryRequest {
    fn context(&self) -> Context {
        self.context.clone()
    }

    fn path_value(&self, name: &str) -> Option<&str> {
        self.path.get(name).map(String::as_str)
    }

    fn query_values(&self, name: &str) -> Vec<&str> {
        values(&self.query, name)
    }

    fn header_values(&self, name: &str) -> Vec<&str> {
        values(&self.headers, &name.to_ascii_lowercase())
    }

    fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    fn form_values(&self, name: &str) -> Vec<&str> {
        values(&self.form, name)
    }

    fn form_files(&self, name: &str) -> Vec<FileHeader> {
        self.files.get(name).cloned().unwrap_or_default()
    }

    fn body(&self) -> &[u8] {
        &self.body
    }

    fn form_file(&self, name: &str) -> Result<Option<FileHeader>> {
        if self.multipart && !self.multipart_parsed {
            return Err(RequestError::multipart("form read before multipart parsing"));
        }
        Ok(self.form_files(name).into_iter().next())
    }

    fn parse_multipart_form(&mut self, max_memory: u64) -> Result<()> {
        let size: usize = self.files.values().flatten().map(FileHeader::size).sum();
        if size as u64 > max_memory {
            return Err(RequestError::multipart(format!(
                "{} bytes exceeds the {} byte limit",
                size, max_memory
            )));
        }
        self.multipart_parsed = true;
        Ok(())
    }
}

/// A [`ResponseWriter`] that records everything written to it
#[derive(Debug, Clone, Default)]
pub struct MemoryResponse {
    /// First status written
    pub status: Option<u16>,
    /// Headers, keyed by lowercase name
    pub headers: BTreeMap<String, String>,
    /// Body bytes
    pub body: Vec<u8>,
}

impl MemoryResponse {
    /// Look up a header, case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Body as UTF-8, lossily
    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl ResponseWriter for MemoryResponse {
    fn set_header(&mut self, name: &str, value: &str) {
        self.headers
            .insert(name.to_ascii_lowercase(), value.to_string());
    }

    fn write_status(&mut self, status: u16) {
        self.status.get_or_insert(status);
    }

    fn write_body(&mut self, body: &[u8]) {
        self.body.extend_from_slice(body);
    }
}
