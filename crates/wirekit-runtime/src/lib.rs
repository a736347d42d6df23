//! Wirekit Runtime
//!
//! The contract surface that wirekit-generated wrappers compile against.
//! Services implement [`RawRequest`] and [`ResponseWriter`] over their own
//! HTTP stack.
//!
//! # Features
//!
//! - [`RawRequest`] accessors for path, query, header, cookie, form, and body input
//! - [`ResponseWriter`] sink and [`handle_response`] serialization
//! - [`HttpResponse`] for handlers that choose their status, headers or content type
//! - [`RequestError`] for conversion, body, multipart, and validation failures
//! - [`ApiError`] with constructors for the common HTTP error statuses
//! - `#[derive(Wirekit)]`, which makes `#[wirekit(..)]` field attributes legal
//! - [`parse_timestamp`] with the accepted timestamp layouts
//!
//! # Usage
//!
//! ```rust,ignore
//! use wirekit_runtime::testing::{MemoryRequest, MemoryResponse};
//!
//! let mut req = MemoryRequest::new()
//!     .with_path("id", "42")
//!     .with_query("tags", "a");
//! let mut res = MemoryResponse::default();
//! get_user_wirekit(&mut res, &mut req);
//! assert_eq!(res.status, Some(200));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod request;
pub mod response;
pub mod testing;
pub mod time;
pub mod validate;

pub use error::{ApiError, FieldError, RequestError, Result};
pub use request::{Context, FileHeader, RawRequest, decode_json};
pub use response::{
    HttpResponse, ResponseError, ResponseWriter, handle_http_response, handle_response,
    write_error, write_request_error,
};
pub use time::{TimestampError, parse_timestamp};
pub use validate::Validate;
pub use wirekit_macros::Wirekit;
