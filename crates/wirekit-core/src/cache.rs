//! Parsed source cache
//!
//! [`CachedParser`] memoizes [`SourceUnit`]s by absolute file path. Lookups
//! take a shared lock; a miss parses with no lock held and then takes the
//! write lock to insert. Two threads racing on the same miss both parse and
//! the last insert wins.
//!
//! Entries are never refreshed automatically. Callers that may see edited
//! files must [`invalidate`](CachedParser::invalidate) first.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::ast::SourceUnit;
use crate::error::Result;
use crate::parser::Parser;

/// A [`Parser`] with a read-mostly cache in front of it
#[derive(Debug, Default)]
pub struct CachedParser {
    parser: Parser,
    entries: RwLock<HashMap<PathBuf, Arc<SourceUnit>>>,
}

impl CachedParser {
    /// Wrap a parser with an empty cache
    pub fn new(parser: Parser) -> Self {
        Self {
            parser,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Parse `path`, returning the cached unit when present
    pub fn parse<P: AsRef<Path>>(&self, path: P) -> Result<Arc<SourceUnit>> {
        let key = cache_key(path.as_ref());

        if let Some(unit) = self.entries.read().get(&key) {
            debug!(path = %key.display(), "Parse cache hit");
            return Ok(Arc::clone(unit));
        }

        let unit = Arc::new(self.parser.parse_file(&key)?);
        self.entries.write().insert(key, Arc::clone(&unit));
        Ok(unit)
    }

    /// Drop the cached entry for `path`; returns whether one existed
    pub fn invalidate<P: AsRef<Path>>(&self, path: P) -> bool {
        let key = cache_key(path.as_ref());
        self.entries.write().remove(&key).is_some()
    }

    /// Drop every cached entry
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Whether `path` currently has a cached entry
    pub fn is_cached<P: AsRef<Path>>(&self, path: P) -> bool {
        let key = cache_key(path.as_ref());
        self.entries.read().contains_key(&key)
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

fn cache_key(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
