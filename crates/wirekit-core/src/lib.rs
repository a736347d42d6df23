//! Wirekit Core Library
//!
//! This crate provides the directive-agnostic foundation of wirekit:
//! - A generic source model extracted from Rust syntax trees
//! - A read-mostly cache of parsed source units
//! - Module path resolution relative to a crate's `src/` root
//! - Configuration loading (`wirekit.yaml`)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  .rs source │────▶│   Parser    │────▶│ SourceUnit  │
//! │   (files)   │     │    (syn)    │     │  (generic)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! Nothing in this crate knows about handler or DTO markers; the
//! `wirekit-codegen` scanner layers that vocabulary on top.
//!
//! # Example
//!
//! ```rust,ignore
//! use wirekit_core::{CachedParser, Parser};
//!
//! let cache = CachedParser::new(Parser::new());
//! let unit = cache.parse("src/api/users.rs")?;
//! for function in &unit.functions {
//!     println!("fn {}", function.name);
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
pub mod cache;
pub mod config;
pub mod error;
pub mod module;
pub mod parser;

pub use ast::{
    AttributeMeta, Field, Function, MetaEntry, Param, Position, Receiver, ReceiverKind, SourceUnit,
    Struct,
};
pub use cache::CachedParser;
pub use config::{CodecConfig, Config};
pub use error::{Error, Result};
pub use parser::Parser;
