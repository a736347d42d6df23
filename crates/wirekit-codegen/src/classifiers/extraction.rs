//! Shared extraction helpers
//!
//! Every wire-source classifier funnels through [`extract`]: scalars read
//! the single-valued accessor, `Vec` fields the multi-valued one. Values
//! are converted with the field type's codec, or with `From<String>` when
//! no codec is registered.
//!
//! Absent and empty inputs leave the field at its default, or apply the
//! field's declared default. A present value that fails to convert is an
//! error, never a silent default.

use std::collections::BTreeSet;

use tracing::debug;

use crate::classifiers::{Fragment, SynthesisContext};
use crate::codecs::Codec;
use crate::model::FieldDescriptor;

/// Converts wire strings to one field's value type
pub struct Converter<'a> {
    codec: Option<&'a Codec>,
    type_name: &'a str,
}

impl<'a> Converter<'a> {
    /// Converter for `field`'s value type
    pub fn for_field(field: &'a FieldDescriptor, owner: &str, ctx: &SynthesisContext<'a>) -> Self {
        let type_name = field.value_type();
        let codec = ctx.codecs.get(type_name);
        if codec.is_none() {
            debug!(
                owner,
                field = %field.name,
                type_name,
                "No codec registered; converting with From<String>"
            );
        }
        Self { codec, type_name }
    }

    /// Whether conversion can fail
    pub fn is_fallible(&self) -> bool {
        self.codec.is_some_and(Codec::is_fallible)
    }

    /// Conversion expression for `source`
    pub fn conversion(&self, source: &str) -> String {
        match self.codec {
            Some(codec) => codec.conversion(source),
            None => format!("<{}>::from({}.to_string())", self.type_name, source),
        }
    }

    /// Statement assigning the converted `source` to `dest`
    pub fn assign(&self, source: &str, dest: &str, optional: bool, label: &str) -> String {
        match self.codec {
            Some(codec) => codec.assign(source, dest, optional, label),
            None if optional => format!("{} = Some({});\n", dest, self.conversion(source)),
            None => format!("{} = {};\n", dest, self.conversion(source)),
        }
    }

    /// Imports the generated conversion needs
    pub fn imports(&self, ctx: &SynthesisContext<'_>) -> BTreeSet<String> {
        let mut imports = BTreeSet::new();
        if let Some(import) = self.codec.and_then(Codec::import) {
            imports.insert(import.to_string());
        }
        if self.is_fallible() {
            imports.insert(ctx.runtime_item("RequestError"));
        }
        imports
    }
}

/// Fill `field` from `single` (an `Option<&str>` expression) or `multi`
/// (a `Vec<&str>` expression) depending on whether it is a `Vec`
pub fn extract(
    field: &FieldDescriptor,
    owner: &str,
    label: &str,
    single: &str,
    multi: &str,
    ctx: &SynthesisContext<'_>,
) -> Fragment {
    if field.is_slice {
        repeated(field, owner, label, multi, ctx)
    } else {
        scalar(field, owner, label, single, ctx)
    }
}

/// Fill a scalar field from an `Option<&str>` accessor
pub fn scalar(
    field: &FieldDescriptor,
    owner: &str,
    label: &str,
    accessor: &str,
    ctx: &SynthesisContext<'_>,
) -> Fragment {
    let converter = Converter::for_field(field, owner, ctx);
    let dest = field.dest();
    let present = converter.assign("val", &dest, field.is_optional, label);

    let code = match field.default_value() {
        None => format!(
            "if let Some(val) = {accessor}.filter(|v| !v.is_empty()) {{\n{}}}\n",
            indent(&present, 1)
        ),
        Some(default) => {
            let fallback = converter.assign(&format!("{:?}", default), &dest, field.is_optional, label);
            format!(
                "match {accessor}.filter(|v| !v.is_empty()) {{\n    Some(val) => {{\n{}    }}\n    None => {{\n{}    }}\n}}\n",
                indent(&present, 2),
                indent(&fallback, 2)
            )
        }
    };

    Fragment {
        code,
        imports: converter.imports(ctx),
    }
}

/// Fill a `Vec` field from a `Vec<&str>` accessor
///
/// A declared default is a comma-separated list used when no value is
/// present. Element failures report their index.
pub fn repeated(
    field: &FieldDescriptor,
    owner: &str,
    label: &str,
    accessor: &str,
    ctx: &SynthesisContext<'_>,
) -> Fragment {
    let converter = Converter::for_field(field, owner, ctx);
    let mut imports = converter.imports(ctx);
    let mut code = String::from("{\n");

    match field.default_value() {
        Some(default) => {
            code.push_str(&format!("    let mut vals: Vec<&str> = {accessor};\n"));
            code.push_str(&format!(
                "    if vals.is_empty() {{\n        vals = {:?}.split(',').collect();\n    }}\n",
                default
            ));
        }
        None => code.push_str(&format!("    let vals: Vec<&str> = {accessor};\n")),
    }

    code.push_str("    if !vals.is_empty() {\n");
    code.push_str("        let mut items = Vec::with_capacity(vals.len());\n");
    if converter.is_fallible() {
        imports.insert(ctx.runtime_item("RequestError"));
        code.push_str("        for (i, val) in vals.into_iter().enumerate() {\n");
        code.push_str(&format!(
            "            items.push(match {} {{\n                Ok(parsed) => parsed,\n                Err(err) => return Err(RequestError::invalid_element({:?}, i, err)),\n            }});\n",
            converter.conversion("val"),
            label
        ));
    } else {
        code.push_str("        for val in vals {\n");
        code.push_str(&format!("            items.push({});\n", converter.conversion("val")));
    }
    code.push_str("        }\n");

    let value = if field.is_optional { "Some(items)" } else { "items" };
    code.push_str(&format!("        {} = {};\n", field.dest(), value));
    code.push_str("    }\n}\n");

    Fragment { code, imports }
}

/// Indent every non-empty line by `levels` × 4 spaces
pub fn indent(code: &str, levels: usize) -> String {
    let pad = "    ".repeat(levels);
    let mut out = String::with_capacity(code.len() + pad.len() * 4);
    for line in code.lines() {
        if !line.is_empty() {
            out.push_str(&pad);
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}
