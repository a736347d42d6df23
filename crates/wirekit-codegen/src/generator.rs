//! Artifact assembly
//!
//! Renders synthesized code into the per-file artifact through a
//! `minijinja` template. The artifact is a child module of the source
//! module, mounted with
//!
//! ```rust,ignore
//! #[path = "users_wirekit.rs"]
//! mod users_wirekit;
//! ```
//!
//! so it opens with `use super::*;`.

use minijinja::{AutoEscape, Environment, context};
use serde::Serialize;

use crate::checksum::{BANNER, marker_line};
use crate::error::Result;
use crate::synthesis::{HandlerCode, UnitCode};

const TEMPLATE_NAME: &str = "artifact.rs.j2";
const TEMPLATE: &str = include_str!("../templates/artifact.rs.j2");

/// A rendered artifact
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedArtifact {
    /// Source module name
    pub module: String,
    /// Full artifact text
    pub content: String,
    /// `use` paths in the artifact
    pub imports: Vec<String>,
    /// Per-handler synthesis data
    pub handlers: Vec<HandlerCode>,
    /// Source hash recorded in the marker
    pub checksum: String,
}

/// Artifact renderer
pub struct Generator {
    env: Environment<'static>,
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator").finish_non_exhaustive()
    }
}

impl Generator {
    /// Create a generator with the built-in artifact template
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.add_template(TEMPLATE_NAME, TEMPLATE)?;
        Ok(Self { env })
    }

    /// Render the artifact for `module` generated from a source hashing to `checksum`
    pub fn render(&self, module: &str, checksum: &str, code: UnitCode) -> Result<GeneratedArtifact> {
        let items: Vec<&str> = code.items.iter().map(|item| item.trim_end()).collect();
        let template = self.env.get_template(TEMPLATE_NAME)?;
        let content = template.render(context! {
            banner => BANNER,
            marker => marker_line(checksum),
            module => module,
            imports => &code.imports,
            items => items,
        })?;

        Ok(GeneratedArtifact {
            module: module.to_string(),
            content,
            imports: code.imports,
            handlers: code.handlers,
            checksum: checksum.to_string(),
        })
    }
}

/// Declaration that mounts an artifact file as a child module
pub fn module_declaration(artifact_file: &str) -> String {
    let module = artifact_file.strip_suffix(".rs").unwrap_or(artifact_file);
    format!("#[path = \"{}\"]\nmod {};", artifact_file, module)
}
