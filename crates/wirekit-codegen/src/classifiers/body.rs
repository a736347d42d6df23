//! JSON body classifier
//!
//! A field marked `in: body` (or tagged `json = "body"`) receives the
//! whole decoded body. It runs after every wire-source classifier, and
//! only when the body is non-empty.

use crate::classifiers::{Classifier, Fragment, SynthesisContext};
use crate::model::FieldDescriptor;

/// Decodes the JSON body into a designated field
pub struct BodyClassifier;

impl Classifier for BodyClassifier {
    fn name(&self) -> &'static str {
        "body"
    }

    fn priority(&self) -> i32 {
        40
    }

    fn matches(&self, field: &FieldDescriptor) -> bool {
        field.is_body
    }

    fn synthesize(
        &self,
        field: &FieldDescriptor,
        _owner: &str,
        ctx: &SynthesisContext<'_>,
    ) -> Fragment {
        Fragment::code(format!(
            "if !r.body().is_empty() {{\n    {} = decode_json(r.body())?;\n}}\n",
            field.dest()
        ))
        .with_import(ctx.runtime_item("decode_json"))
    }
}
