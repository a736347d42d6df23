//! Nested type resolution
//!
//! Every non-special field whose base type names a struct gets a resolved
//! copy of that struct attached as [`FieldDescriptor::nested`]. Types are
//! found in the current unit first, then in other modules of the same
//! crate through the unit's `use` aliases and `crate::`/`super::`/`self::`
//! paths. A foreign struct is resolved against its own file's imports.
//!
//! One visited set is shared across a whole root resolution. A type that
//! has already been expanded anywhere under the root gets a stub with no
//! fields, which is what terminates cycles.
//!
//! Loading failures are not errors: the field simply stays unresolved.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;
use wirekit_core::module::{crate_src_root, module_file};
use wirekit_core::{CachedParser, SourceUnit, Struct};

use crate::model::{FieldDescriptor, StructDescriptor};

type ModuleKey = (PathBuf, Vec<String>);

/// A type name located in another module
struct ForeignType {
    module: Vec<String>,
    name: String,
    unit: Arc<SourceUnit>,
}

/// Resolves nested struct types within and across modules
pub struct Resolver<'a> {
    cache: &'a CachedParser,
    modules: HashMap<ModuleKey, Option<Arc<SourceUnit>>>,
}

impl<'a> Resolver<'a> {
    /// Create a resolver that loads foreign modules through `cache`
    pub fn new(cache: &'a CachedParser) -> Self {
        Self {
            cache,
            modules: HashMap::new(),
        }
    }

    /// Resolve every struct declared in `unit`
    pub fn resolve_unit(&mut self, unit: &SourceUnit) -> BTreeMap<String, StructDescriptor> {
        unit.structs
            .values()
            .map(|s| {
                let mut visited = HashSet::new();
                (s.name.clone(), self.expand(s, unit, &mut visited))
            })
            .collect()
    }

    /// Find and resolve a struct named by `type_name` as seen from `unit`
    ///
    /// Used for handler payloads declared outside the handler's file.
    pub fn find_struct(&mut self, type_name: &str, unit: &SourceUnit) -> Option<StructDescriptor> {
        let name = lookup_name(type_name);
        if let Some(local) = unit.structs.get(name) {
            return Some(self.expand(local, unit, &mut HashSet::new()));
        }

        let foreign = self.load_foreign(name, unit)?;
        let found = foreign.unit.structs.get(&foreign.name)?;
        debug!(type_name, module = %foreign.module.join("::"), "Resolved foreign payload");
        Some(self.expand(found, &foreign.unit, &mut HashSet::new()))
    }

    /// Number of modules the resolver has tried to load
    pub fn loaded_modules(&self) -> usize {
        self.modules.len()
    }

    fn expand(
        &mut self,
        s: &Struct,
        unit: &SourceUnit,
        visited: &mut HashSet<String>,
    ) -> StructDescriptor {
        let mut desc = StructDescriptor::from_ast(s);
        if !visited.insert(struct_key(unit, &s.name)) {
            return desc.stub();
        }
        self.resolve_fields(&mut desc.fields, unit, visited);
        desc
    }

    fn resolve_fields(
        &mut self,
        fields: &mut [FieldDescriptor],
        unit: &SourceUnit,
        visited: &mut HashSet<String>,
    ) {
        for field in fields.iter_mut().filter(|f| !f.is_special()) {
            let name = lookup_name(&field.base_type);

            if let Some(local) = unit.structs.get(name) {
                field.nested = Some(Box::new(self.expand(local, unit, visited)));
                continue;
            }

            let Some(foreign) = self.load_foreign(name, unit) else {
                continue;
            };
            match foreign.unit.structs.get(&foreign.name) {
                Some(found) => {
                    field.module_qualifier = Some(format!("crate::{}", foreign.module.join("::")));
                    field.nested = Some(Box::new(self.expand(found, &foreign.unit, visited)));
                }
                None => debug!(
                    field = %field.name,
                    type_name = %field.base_type,
                    "Nested type not declared in its module"
                ),
            }
        }
    }

    /// Locate and load the module that declares `name`, a path or alias
    fn load_foreign(&mut self, name: &str, unit: &SourceUnit) -> Option<ForeignType> {
        let segments = absolute_path(name, unit)?;
        let (struct_name, module) = segments.split_last()?;
        let src_root = crate_src_root(&unit.path)?;
        let loaded = self.load_module(&src_root, module)?;
        Some(ForeignType {
            module: module.to_vec(),
            name: struct_name.clone(),
            unit: loaded,
        })
    }

    fn load_module(&mut self, src_root: &Path, module: &[String]) -> Option<Arc<SourceUnit>> {
        let key = (src_root.to_path_buf(), module.to_vec());
        if let Some(cached) = self.modules.get(&key) {
            return cached.clone();
        }

        let loaded = match module_file(src_root, module) {
            Some(file) => match self.cache.parse(&file) {
                Ok(unit) => Some(unit),
                Err(err) => {
                    debug!(file = %file.display(), error = %err, "Skipping unloadable module");
                    None
                }
            },
            None => {
                debug!(module = %module.join("::"), "No source file for module");
                None
            }
        };
        self.modules.insert(key, loaded.clone());
        loaded
    }
}

/// Name used for struct lookup: generics and `Box` dropped
fn lookup_name(type_name: &str) -> &str {
    let mut ty = type_name.trim();
    while let Some(inner) = ty
        .strip_prefix("Box<")
        .and_then(|rest| rest.strip_suffix('>'))
    {
        ty = inner.trim();
    }
    ty.split('<').next().unwrap_or(ty).trim()
}

fn struct_key(unit: &SourceUnit, name: &str) -> String {
    let mut key = unit.module_path.join("::");
    key.push_str("::");
    key.push_str(name);
    key
}

/// Crate-relative path segments for a type named in `unit`
///
/// `None` when the name is a bare identifier with no import, which means
/// it is a local, primitive, or prelude type.
fn absolute_path(name: &str, unit: &SourceUnit) -> Option<Vec<String>> {
    let mut segments: Vec<String> = name
        .trim_start_matches("::")
        .split("::")
        .map(str::to_string)
        .collect();

    if let Some(path) = unit.import(&segments[0]) {
        let mut expanded: Vec<String> = path.split("::").map(str::to_string).collect();
        expanded.extend(segments.drain(1..));
        segments = expanded;
    } else if segments.len() == 1 {
        return None;
    }

    let mut base = unit.module_path.clone();
    let mut rest = segments.as_slice();
    match rest.first().map(String::as_str) {
        Some("crate") => {
            base.clear();
            rest = &rest[1..];
        }
        Some("self") => rest = &rest[1..],
        Some("super") => {
            while rest.first().map(String::as_str) == Some("super") {
                base.pop()?;
                rest = &rest[1..];
            }
        }
        _ => {}
    }

    base.extend(rest.iter().cloned());
    (!base.is_empty()).then_some(base)
}
