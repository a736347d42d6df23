//! Per-field directives
//!
//! A field's wire binding comes from two places:
//!
//! - the structured tag, i.e. `#[wirekit(query = "q", default = "10")]`
//!   plus `#[serde(rename = "..")]` (read as a `json` entry) and
//!   `#[serde(flatten)]`
//! - freeform doc lines such as `/// in: header X-Request-Id` and
//!   `/// default: 10`
//!
//! Tag entries win over doc directives wherever both apply.

use serde::Serialize;
use std::fmt;
use wirekit_core::AttributeMeta;

/// Where a field's value comes from on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Path segment
    Path,
    /// Query string
    Query,
    /// Request header
    Header,
    /// Cookie
    Cookie,
    /// Form field or multipart file
    Form,
    /// JSON request body
    Body,
}

impl Source {
    /// Directive spelling of the source
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Path => "path",
            Source::Query => "query",
            Source::Header => "header",
            Source::Cookie => "cookie",
            Source::Form => "form",
            Source::Body => "body",
        }
    }

    /// Tag key that names this source
    pub fn tag_key(&self) -> &'static str {
        match self {
            Source::Body => "json",
            other => other.as_str(),
        }
    }

    /// Parse a directive spelling
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "path" => Some(Source::Path),
            "query" => Some(Source::Query),
            "header" => Some(Source::Header),
            "cookie" => Some(Source::Cookie),
            "form" => Some(Source::Form),
            "body" => Some(Source::Body),
            _ => None,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed structured tag entries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StructTag {
    entries: Vec<(String, Option<String>)>,
    raw: String,
}

impl StructTag {
    /// Build a tag from a field's `wirekit` and `serde` attributes
    pub fn from_attributes(attributes: &[AttributeMeta]) -> Self {
        let mut entries = Vec::new();
        let mut raw = Vec::new();

        for attr in attributes {
            match attr.path.as_str() {
                "wirekit" => {
                    entries.extend(attr.entries.iter().map(|e| (e.key.clone(), e.value.clone())));
                    raw.push(format!("wirekit({})", attr.raw));
                }
                "serde" => {
                    if let Some(name) = attr.lookup("rename").filter(|n| !n.is_empty()) {
                        entries.push(("json".to_string(), Some(name.to_string())));
                    }
                    if attr.lookup("flatten").is_some() {
                        entries.push(("flatten".to_string(), None));
                    }
                    raw.push(format!("serde({})", attr.raw));
                }
                _ => {}
            }
        }

        Self {
            entries,
            raw: raw.join(", "),
        }
    }

    /// Value of the first entry with `key`; `Some("")` for a bare key
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_deref().unwrap_or(""))
    }

    /// Whether any entry has `key`
    pub fn has(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    /// Non-empty value for `key`
    pub fn value(&self, key: &str) -> Option<&str> {
        self.lookup(key).filter(|v| !v.is_empty())
    }

    /// The attribute text the tag was read from
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Whether the tag has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Freeform directive parsed from doc lines
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Directive {
    /// Source named by `in: SOURCE [NAME]`
    pub source: Option<Source>,
    /// Wire name named by `in: SOURCE NAME`
    pub name: Option<String>,
    /// Value named by `default: VALUE`
    pub default: Option<String>,
}

impl Directive {
    /// Parse doc lines; the first `in:` and the first `default:` win
    pub fn parse(docs: &[String]) -> Self {
        let mut directive = Self::default();

        for line in docs {
            let line = line.trim();
            if let Some(rest) = line.strip_prefix("in:") {
                if directive.source.is_some() {
                    continue;
                }
                let mut words = rest.split_whitespace();
                let Some(source) = words.next().and_then(Source::parse) else {
                    continue;
                };
                directive.source = Some(source);
                directive.name = words.next().map(str::to_string);
            } else if let Some(rest) = line.strip_prefix("default:") {
                let value = rest.trim();
                if directive.default.is_none() && !value.is_empty() {
                    directive.default = Some(value.to_string());
                }
            }
        }

        directive
    }

    /// Wire name when the directive names `source`
    pub fn name_for(&self, source: Source) -> Option<&str> {
        if self.source == Some(source) {
            self.name.as_deref().filter(|n| !n.is_empty())
        } else {
            None
        }
    }
}

/// `snake_case` → `camelCase`, with any `r#` prefix dropped
pub fn camel_case(name: &str) -> String {
    let name = name.strip_prefix("r#").unwrap_or(name);
    let mut out = String::with_capacity(name.len());
    let mut upper = false;

    for c in name.chars() {
        if c == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
