//! Form field and multipart file classifier
//!
//! `FileHeader` fields are always claimed here, bound or not. Generated
//! parsers call `parse_multipart_form` before any form access.

use crate::classifiers::extraction::extract;
use crate::classifiers::{Classifier, Fragment, SynthesisContext};
use crate::directive::Source;
use crate::model::FieldDescriptor;

/// Fills fields bound to form values or multipart files
pub struct FormClassifier;

impl Classifier for FormClassifier {
    fn name(&self) -> &'static str {
        "form"
    }

    fn priority(&self) -> i32 {
        15
    }

    fn matches(&self, field: &FieldDescriptor) -> bool {
        field.is_file || field.bound_to(Source::Form)
    }

    fn synthesize(
        &self,
        field: &FieldDescriptor,
        owner: &str,
        ctx: &SynthesisContext<'_>,
    ) -> Fragment {
        let name = field.wire_name(Source::Form);
        if field.is_file {
            return file(field, &name);
        }
        extract(
            field,
            owner,
            &name,
            &format!("r.form_value({:?})", name),
            &format!("r.form_values({:?})", name),
            ctx,
        )
    }
}

fn file(field: &FieldDescriptor, name: &str) -> Fragment {
    let dest = field.dest();
    let code = if field.is_slice {
        let value = if field.is_optional { "Some(files)" } else { "files" };
        format!(
            "{{\n    let files = r.form_files({name:?});\n    if !files.is_empty() {{\n        {dest} = {value};\n    }}\n}}\n"
        )
    } else {
        let value = if field.is_optional { "Some(file)" } else { "file" };
        format!("if let Some(file) = r.form_file({name:?})? {{\n    {dest} = {value};\n}}\n")
    };
    Fragment::code(code)
}
