//! Module path resolution
//!
//! Maps between files under a crate's `src/` directory and Rust module
//! paths. The crate root is the nearest ancestor directory holding a
//! `Cargo.toml`.

use std::path::{Path, PathBuf};

/// Find the `src/` directory of the crate that contains `file`
pub fn crate_src_root(file: &Path) -> Option<PathBuf> {
    let file = std::path::absolute(file).ok()?;
    file.ancestors()
        .skip(1)
        .find(|dir| dir.join("Cargo.toml").is_file())
        .map(|dir| dir.join("src"))
        .filter(|src| file.starts_with(src))
}

/// Module path of `file` relative to `src_root`
///
/// `src/lib.rs` → `[]`, `src/api/mod.rs` → `["api"]`,
/// `src/api/users.rs` → `["api", "users"]`.
pub fn module_path_of(file: &Path, src_root: &Path) -> Vec<String> {
    let file = std::path::absolute(file).unwrap_or_else(|_| file.to_path_buf());
    let Ok(relative) = file.strip_prefix(src_root) else {
        return file_stem(&file).into_iter().collect();
    };

    let mut segments: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if let Some(last) = segments.pop() {
        let stem = last.strip_suffix(".rs").unwrap_or(&last).to_string();
        let is_root = segments.is_empty() && (stem == "lib" || stem == "main");
        if stem != "mod" && !is_root {
            segments.push(stem);
        }
    }
    segments
}

/// Module path for `file`, using its crate root when one can be found
pub fn module_path_for(file: &Path) -> Vec<String> {
    match crate_src_root(file) {
        Some(src) => module_path_of(file, &src),
        None => file_stem(file).into_iter().collect(),
    }
}

/// Locate the file that defines `segments` under `src_root`
///
/// Tries `a/b.rs` then `a/b/mod.rs`; the empty path maps to `lib.rs` or
/// `main.rs`.
pub fn module_file(src_root: &Path, segments: &[String]) -> Option<PathBuf> {
    if segments.is_empty() {
        return ["lib.rs", "main.rs"]
            .iter()
            .map(|name| src_root.join(name))
            .find(|p| p.is_file());
    }

    let mut dir = src_root.to_path_buf();
    for segment in &segments[..segments.len() - 1] {
        dir.push(segment);
    }
    let last = &segments[segments.len() - 1];

    let flat = dir.join(format!("{}.rs", last));
    if flat.is_file() {
        return Some(flat);
    }
    let nested = dir.join(last).join("mod.rs");
    nested.is_file().then_some(nested)
}

fn file_stem(file: &Path) -> Option<String> {
    file.file_stem().map(|s| s.to_string_lossy().into_owned())
}
