//! Type codec registry
//!
//! A [`Codec`] knows how to write the Rust expression that converts a
//! `&str` wire value into one type. Codecs are keyed purely by the
//! rendered type name, so `DateTime<Utc>` and
//! `chrono::DateTime<chrono::Utc>` are separate keys.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use minijinja::{Environment, context};
use wirekit_core::CodecConfig;

use crate::error::{Error, Result};

/// Builds a conversion expression from a `&str` source expression
pub type ParseFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

const INTEGER_TYPES: &[&str] = &[
    "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64", "u128", "usize",
];
const OTHER_PARSED_TYPES: &[&str] = &["f32", "f64", "bool", "char"];
const TIMESTAMP_TYPES: &[&str] = &["DateTime<Utc>", "chrono::DateTime<chrono::Utc>"];

/// Conversion from a wire string to one type
#[derive(Clone)]
pub struct Codec {
    type_name: String,
    fallible: bool,
    import: Option<String>,
    parse: ParseFn,
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec")
            .field("type_name", &self.type_name)
            .field("fallible", &self.fallible)
            .field("import", &self.import)
            .finish_non_exhaustive()
    }
}

impl Codec {
    /// Create a codec
    ///
    /// A fallible codec's expression evaluates to `Result<T, E>` with
    /// `E: Display`; an infallible one evaluates to `T`.
    pub fn new<F>(type_name: impl Into<String>, fallible: bool, parse: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self {
            type_name: type_name.into(),
            fallible,
            import: None,
            parse: Arc::new(parse),
        }
    }

    /// Require a `use` path wherever the codec is used
    pub fn with_import(mut self, import: impl Into<String>) -> Self {
        self.import = Some(import.into());
        self
    }

    /// Type the codec converts to
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Whether conversion can fail
    pub fn is_fallible(&self) -> bool {
        self.fallible
    }

    /// Import required by the conversion expression
    pub fn import(&self) -> Option<&str> {
        self.import.as_deref()
    }

    /// Conversion expression for `source`
    pub fn conversion(&self, source: &str) -> String {
        (self.parse)(source)
    }

    /// Statement assigning the converted `source` to `dest`
    ///
    /// Failures return `RequestError::invalid_field(label, err)` from the
    /// enclosing function.
    pub fn assign(&self, source: &str, dest: &str, optional: bool, label: &str) -> String {
        let conversion = self.conversion(source);
        if self.fallible {
            let value = if optional { "Some(parsed)" } else { "parsed" };
            format!(
                "match {conversion} {{\n    Ok(parsed) => {dest} = {value},\n    Err(err) => return Err(RequestError::invalid_field({label:?}, err)),\n}}\n"
            )
        } else if optional {
            format!("{dest} = Some({conversion});\n")
        } else {
            format!("{dest} = {conversion};\n")
        }
    }
}

/// Name-keyed collection of codecs
#[derive(Debug, Clone, Default)]
pub struct CodecRegistry {
    codecs: BTreeMap<String, Codec>,
}

impl CodecRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in codecs
    ///
    /// `runtime` is the crate path timestamp parsing is imported from.
    pub fn with_builtins(runtime: &str) -> Self {
        let mut registry = Self::new();

        for ty in INTEGER_TYPES.iter().chain(OTHER_PARSED_TYPES) {
            let ty = *ty;
            registry.register(Codec::new(ty, true, move |src| {
                format!("{}.parse::<{}>()", src, ty)
            }));
        }

        registry.register(Codec::new("String", false, |src| {
            format!("{}.to_string()", src)
        }));

        for ty in TIMESTAMP_TYPES {
            registry.register(
                Codec::new(*ty, true, |src| format!("parse_timestamp({})", src))
                    .with_import(format!("{}::parse_timestamp", runtime)),
            );
        }

        registry
    }

    /// Add a codec, replacing and returning any codec for the same type
    pub fn register(&mut self, codec: Codec) -> Option<Codec> {
        self.codecs.insert(codec.type_name.clone(), codec)
    }

    /// Add codecs declared in configuration
    ///
    /// Each `parse` template is rendered once with `value` bound to a
    /// placeholder, so a template error surfaces here rather than during
    /// synthesis.
    pub fn register_config(&mut self, entries: &[CodecConfig]) -> Result<()> {
        const PLACEHOLDER: &str = "__wirekit_value__";
        let env = Environment::new();

        for entry in entries {
            let rendered = env
                .render_str(&entry.parse, context! { value => PLACEHOLDER })
                .map_err(|err| Error::InvalidCodec {
                    type_name: entry.type_name.clone(),
                    message: err.to_string(),
                })?;
            if !rendered.contains(PLACEHOLDER) {
                return Err(Error::InvalidCodec {
                    type_name: entry.type_name.clone(),
                    message: "parse expression does not use `value`".to_string(),
                });
            }

            let mut codec = Codec::new(entry.type_name.clone(), entry.fallible, move |src| {
                rendered.replace(PLACEHOLDER, src)
            });
            if let Some(import) = &entry.import {
                codec = codec.with_import(import.clone());
            }
            if self.register(codec).is_some() {
                tracing::debug!(type_name = %entry.type_name, "Configured codec overrides existing");
            }
        }
        Ok(())
    }

    /// Look up the codec for a type
    pub fn get(&self, type_name: &str) -> Option<&Codec> {
        self.codecs.get(type_name)
    }

    /// Whether a codec exists for a type
    pub fn contains(&self, type_name: &str) -> bool {
        self.codecs.contains_key(type_name)
    }

    /// Number of registered codecs
    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    /// Whether no codecs are registered
    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }
}
