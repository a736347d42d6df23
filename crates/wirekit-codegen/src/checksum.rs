//! Regeneration gate
//!
//! Every artifact carries the SHA-256 of the source it was generated from
//! on the line after its banner:
//!
//! ```text
//! // Code generated by wirekit. DO NOT EDIT.
//! // wirekit:checksum:3f2a...
//! ```
//!
//! When the source hash matches the recorded one, the source is not
//! scanned at all.

use std::fmt;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

/// First line of every artifact
pub const BANNER: &str = "// Code generated by wirekit. DO NOT EDIT.";

/// Prefix of the checksum marker
pub const MARKER_PREFIX: &str = "wirekit:checksum:";

/// How many leading lines are searched for the marker
pub const MARKER_SCAN_LINES: usize = 10;

static MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"wirekit:checksum:([a-f0-9]{64})").expect("checksum marker pattern is valid")
});

/// Hex SHA-256 of `bytes`
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// The marker comment line for `hash`
pub fn marker_line(hash: &str) -> String {
    format!("// {}{}", MARKER_PREFIX, hash)
}

/// Checksum recorded in the first lines of an artifact
pub fn extract_marker(artifact: &str) -> Option<String> {
    artifact
        .lines()
        .take(MARKER_SCAN_LINES)
        .find_map(|line| MARKER_RE.captures(line))
        .map(|caps| caps[1].to_string())
}

/// Insert or replace the marker in generated text
///
/// The marker goes right after the banner line, or at the top when there
/// is no banner.
pub fn embed_marker(text: &str, hash: &str) -> String {
    let marker = marker_line(hash);
    let mut out = String::with_capacity(text.len() + marker.len() + 1);
    let mut placed = false;

    for (index, line) in text.lines().enumerate() {
        if index < MARKER_SCAN_LINES && MARKER_RE.is_match(line) {
            continue;
        }
        out.push_str(line);
        out.push('\n');
        if !placed && line.contains("DO NOT EDIT") {
            out.push_str(&marker);
            out.push('\n');
            placed = true;
        }
    }

    if placed {
        out
    } else {
        format!("{}\n{}", marker, out)
    }
}

/// Why an artifact must be regenerated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    /// Regeneration was forced
    Forced,
    /// No artifact exists yet
    NoArtifact,
    /// The artifact has no checksum marker
    NoMarker,
    /// The source changed since the artifact was written
    HashMismatch,
    /// The artifact could not be read
    Unreadable,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Reason::Forced => "forced",
            Reason::NoArtifact => "no artifact",
            Reason::NoMarker => "no checksum marker",
            Reason::HashMismatch => "source changed",
            Reason::Unreadable => "artifact unreadable",
        })
    }
}

/// Outcome of consulting the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// The artifact is current
    Skip,
    /// The artifact must be written
    Regenerate(Reason),
}

impl Decision {
    /// Whether the artifact must be written
    pub fn is_regenerate(&self) -> bool {
        matches!(self, Decision::Regenerate(_))
    }
}

/// Compares source hashes against artifact markers
#[derive(Debug, Clone, Copy, Default)]
pub struct RegenerationGate {
    force: bool,
}

impl RegenerationGate {
    /// Create a gate; a forced gate always regenerates
    pub fn new(force: bool) -> Self {
        Self { force }
    }

    /// Decide whether `artifact` is stale with respect to `source`
    pub fn decide(&self, source: &[u8], artifact: &Path) -> Decision {
        if self.force {
            return Decision::Regenerate(Reason::Forced);
        }

        let existing = match std::fs::read_to_string(artifact) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Decision::Regenerate(Reason::NoArtifact);
            }
            Err(err) => {
                warn!(artifact = %artifact.display(), error = %err, "Cannot read artifact; regenerating");
                return Decision::Regenerate(Reason::Unreadable);
            }
        };

        let decision = match extract_marker(&existing) {
            None => Decision::Regenerate(Reason::NoMarker),
            Some(recorded) if recorded == content_hash(source) => Decision::Skip,
            Some(_) => Decision::Regenerate(Reason::HashMismatch),
        };
        debug!(artifact = %artifact.display(), ?decision, "Regeneration gate");
        decision
    }
}
