//! Wirekit Code Generation
//!
//! This crate turns annotated Rust handlers into request wrappers.
//!
//! # Pipeline Overview
//!
//! ```text
//! ┌─────────┐     ┌─────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐
//! │ Source  │────▶│  Scan   │────▶│ Resolve  │────▶│ Classify │────▶│ Assemble │
//! │ (.rs)   │     │(markers)│     │ (nested) │     │ (fields) │     │(artifact)│
//! └─────────┘     └─────────┘     └──────────┘     └──────────┘     └──────────┘
//!       │                                                                  ▲
//!       └──────────────── checksum gate (skip when unchanged) ─────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use wirekit_codegen::{GenerateOptions, Pipeline};
//! use wirekit_core::Config;
//!
//! let pipeline = Pipeline::new(Config::default(), GenerateOptions::default())?;
//! let outcome = pipeline.process_file("src/api/users.rs")?;
//! println!("{}: {:?}", outcome.source.display(), outcome.status);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod checksum;
pub mod classifiers;
pub mod codecs;
pub mod directive;
pub mod error;
pub mod generator;
pub mod model;
pub mod pipeline;
pub mod resolver;
pub mod scanner;
pub mod synthesis;

pub use checksum::{Decision, Reason, RegenerationGate};
pub use classifiers::{Classifier, ClassifierRegistry, Fragment, SynthesisContext};
pub use codecs::{Codec, CodecRegistry};
pub use error::{Error, Result};
pub use generator::{GeneratedArtifact, Generator};
pub use model::{FieldDescriptor, HandlerDescriptor, StructDescriptor, Warning};
pub use pipeline::{
    BatchReport, FileFailure, FileOutcome, FileStatus, GenerateOptions, Pipeline, collect_sources,
};
pub use scanner::{ScannedUnit, Scanner};
pub use synthesis::{HandlerCode, Requirements, Synthesizer, UnitCode};
