//! Field classifiers
//!
//! A classifier decides whether it owns a payload field and, if so,
//! writes the code that fills that field from the raw request. The
//! [`ClassifierRegistry`] keeps classifiers sorted by priority (stable, so
//! equal priorities keep registration order) and the first match wins.
//!
//! | Classifier | Priority |
//! |---|---|
//! | path | 10 |
//! | form | 15 |
//! | query | 20 |
//! | header | 30 |
//! | cookie | 35 |
//! | body | 40 |
//! | raw request | 50 |
//! | response sink | 60 |

pub mod body;
pub mod cookie;
pub mod extraction;
pub mod form;
pub mod header;
pub mod path;
pub mod query;
pub mod transport;

use std::collections::BTreeSet;

use crate::codecs::CodecRegistry;
use crate::model::FieldDescriptor;

pub use body::BodyClassifier;
pub use cookie::CookieClassifier;
pub use form::FormClassifier;
pub use header::HeaderClassifier;
pub use path::PathClassifier;
pub use query::QueryClassifier;
pub use transport::{RequestCarrierClassifier, ResponseCarrierClassifier};

/// Generated code plus the imports it needs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    /// Statements, unindented, newline-terminated
    pub code: String,
    /// `use` paths required by `code`
    pub imports: BTreeSet<String>,
}

impl Fragment {
    /// A fragment with no code
    pub fn empty() -> Self {
        Self::default()
    }

    /// A fragment with code and no imports
    pub fn code(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            imports: BTreeSet::new(),
        }
    }

    /// Add an import
    pub fn with_import(mut self, import: impl Into<String>) -> Self {
        self.imports.insert(import.into());
        self
    }

    /// Whether the fragment emits nothing
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}

/// What classifiers need while synthesizing
#[derive(Debug, Clone, Copy)]
pub struct SynthesisContext<'a> {
    /// Codecs for wire value conversion
    pub codecs: &'a CodecRegistry,
    /// Crate path of the runtime surface
    pub runtime: &'a str,
}

impl SynthesisContext<'_> {
    /// Full path of a runtime item
    pub fn runtime_item(&self, item: &str) -> String {
        format!("{}::{}", self.runtime, item)
    }
}

/// A field classifier
pub trait Classifier: Send + Sync {
    /// Short name for logs and inspection
    fn name(&self) -> &'static str;

    /// Lower runs first
    fn priority(&self) -> i32;

    /// Whether this classifier owns `field`
    fn matches(&self, field: &FieldDescriptor) -> bool;

    /// Code that fills `field` of a payload of type `owner`
    fn synthesize(
        &self,
        field: &FieldDescriptor,
        owner: &str,
        ctx: &SynthesisContext<'_>,
    ) -> Fragment;
}

/// Priority-ordered classifiers
#[derive(Default)]
pub struct ClassifierRegistry {
    classifiers: Vec<Box<dyn Classifier>>,
}

impl std::fmt::Debug for ClassifierRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl ClassifierRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in classifiers
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(PathClassifier));
        registry.register(Box::new(FormClassifier));
        registry.register(Box::new(QueryClassifier));
        registry.register(Box::new(HeaderClassifier));
        registry.register(Box::new(CookieClassifier));
        registry.register(Box::new(BodyClassifier));
        registry.register(Box::new(RequestCarrierClassifier));
        registry.register(Box::new(ResponseCarrierClassifier));
        registry
    }

    /// Add a classifier, keeping priority order
    pub fn register(&mut self, classifier: Box<dyn Classifier>) {
        self.classifiers.push(classifier);
        self.classifiers.sort_by_key(|c| c.priority());
    }

    /// First classifier, in priority order, that owns `field`
    pub fn classify(&self, field: &FieldDescriptor) -> Option<&dyn Classifier> {
        self.classifiers
            .iter()
            .find(|c| c.matches(field))
            .map(|c| c.as_ref())
    }

    /// Classifier names in priority order
    pub fn names(&self) -> Vec<&'static str> {
        self.classifiers.iter().map(|c| c.name()).collect()
    }

    /// Number of classifiers
    pub fn len(&self) -> usize {
        self.classifiers.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.classifiers.is_empty()
    }
}
