//! Generic source model
//!
//! A [`SourceUnit`] is the directive-agnostic view of one Rust source file:
//! its named-field structs, its functions and methods, and the aliases its
//! `use` items bring into scope. Types are carried as rendered strings
//! (`Option<Vec<String>>`, `&mut dyn ResponseWriter`) together with the
//! wrapper flags downstream consumers care about.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A 1-based line/column location in a source file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    /// 1-based line number
    pub line: usize,
    /// 1-based column number
    pub column: usize,
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// One parsed source file
#[derive(Debug, Clone, Default, Serialize)]
pub struct SourceUnit {
    /// Module name (last segment of the module path, or the file stem)
    pub module: String,
    /// File the unit was parsed from
    pub path: PathBuf,
    /// Module path relative to the crate root, e.g. `["api", "users"]`
    pub module_path: Vec<String>,
    /// Import table: alias → full path
    pub imports: BTreeMap<String, String>,
    /// Named-field structs keyed by name
    pub structs: BTreeMap<String, Struct>,
    /// Free functions and `impl` methods in declaration order
    pub functions: Vec<Function>,
}

impl SourceUnit {
    /// Look up a struct declared in this unit
    pub fn find_struct(&self, name: &str) -> Option<&Struct> {
        self.structs.get(name)
    }

    /// Resolve an import alias to its full path
    pub fn import(&self, alias: &str) -> Option<&str> {
        self.imports.get(alias).map(String::as_str)
    }
}

/// A struct declaration with named fields
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Struct {
    /// Struct name
    pub name: String,
    /// Doc comment lines, trimmed
    pub docs: Vec<String>,
    /// Non-doc attributes on the struct
    pub attributes: Vec<AttributeMeta>,
    /// Fields in declaration order
    pub fields: Vec<Field>,
    /// Location of the struct name
    pub position: Position,
}

/// A named struct field
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Field {
    /// Field identifier as written (may carry `r#`)
    pub name: String,
    /// Full rendered type
    pub type_name: String,
    /// Type with any outer `Option` and then `Vec` stripped
    pub base_type: String,
    /// The outer type is `Option<T>`
    pub is_optional: bool,
    /// The type (after `Option`) is `Vec<T>`
    pub is_slice: bool,
    /// Element type when `is_slice` is set
    pub element_type: Option<String>,
    /// Doc comment lines, trimmed
    pub docs: Vec<String>,
    /// Non-doc attributes on the field
    pub attributes: Vec<AttributeMeta>,
    /// Location of the field name
    pub position: Position,
}

impl Field {
    /// Find the first attribute with the given path (e.g. `serde`)
    pub fn attribute(&self, path: &str) -> Option<&AttributeMeta> {
        self.attributes.iter().find(|a| a.path == path)
    }
}

/// A parsed attribute such as `#[serde(rename = "id", default)]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttributeMeta {
    /// Attribute path, e.g. `serde` or `wirekit`
    pub path: String,
    /// Top-level entries of a list-style attribute
    pub entries: Vec<MetaEntry>,
    /// The attribute's inner tokens as written
    pub raw: String,
}

impl AttributeMeta {
    /// Value of the first entry with `key`; `Some("")` when the key is bare
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.value.as_deref().unwrap_or(""))
    }
}

/// One `key` or `key = value` entry of a list attribute
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetaEntry {
    /// Entry key
    pub key: String,
    /// Value; string literals are unquoted, other expressions are rendered
    pub value: Option<String>,
}

/// A free function or an `impl` method
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Function {
    /// Function name
    pub name: String,
    /// Doc comment lines, trimmed
    pub docs: Vec<String>,
    /// Receiver for methods and associated functions
    pub receiver: Option<Receiver>,
    /// Declared `async`
    pub is_async: bool,
    /// Parameters, excluding any `self` receiver
    pub params: Vec<Param>,
    /// Results: `Result<T, E>` yields two, `()` or no return yields none
    pub results: Vec<Param>,
    /// Location of the function name
    pub position: Position,
}

/// The `impl` block a function was declared in
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Receiver {
    /// Rendered self type of the `impl` block
    pub type_name: String,
    /// How the function takes `self`
    pub kind: ReceiverKind,
}

/// How a method takes its receiver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiverKind {
    /// No `self` parameter (associated function)
    #[default]
    Static,
    /// `self`
    Value,
    /// `&self`
    Ref,
    /// `&mut self`
    RefMut,
}

/// A function parameter or result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Param {
    /// Binding name, or `_` when the pattern is not a plain identifier
    pub name: String,
    /// Full rendered type
    pub type_name: String,
    /// Type with leading references stripped
    pub base_type: String,
    /// Taken by shared reference
    pub is_ref: bool,
    /// Taken by mutable reference
    pub is_mut_ref: bool,
}

/// Last `::` segment of a rendered path, ignoring generic arguments
///
/// `chrono::DateTime<chrono::Utc>` → `DateTime`
pub fn last_segment(type_name: &str) -> &str {
    let head = type_name.split('<').next().unwrap_or(type_name);
    head.rsplit("::").next().unwrap_or(head).trim()
}
