//! Path segment classifier

use crate::classifiers::extraction::extract;
use crate::classifiers::{Classifier, Fragment, SynthesisContext};
use crate::directive::Source;
use crate::model::FieldDescriptor;

/// Fills fields bound to a named path segment
pub struct PathClassifier;

impl Classifier for PathClassifier {
    fn name(&self) -> &'static str {
        "path"
    }

    fn priority(&self) -> i32 {
        10
    }

    fn matches(&self, field: &FieldDescriptor) -> bool {
        field.bound_to(Source::Path)
    }

    fn synthesize(
        &self,
        field: &FieldDescriptor,
        owner: &str,
        ctx: &SynthesisContext<'_>,
    ) -> Fragment {
        let name = field.wire_name(Source::Path);
        extract(
            field,
            owner,
            &name,
            &format!("r.path_value({:?})", name),
            &format!("r.path_value({:?}).into_iter().collect()", name),
            ctx,
        )
    }
}
