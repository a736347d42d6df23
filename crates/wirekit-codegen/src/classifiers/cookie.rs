//! Cookie classifier

use crate::classifiers::extraction::extract;
use crate::classifiers::{Classifier, Fragment, SynthesisContext};
use crate::directive::Source;
use crate::model::FieldDescriptor;

/// Fills fields bound to a cookie
pub struct CookieClassifier;

impl Classifier for CookieClassifier {
    fn name(&self) -> &'static str {
        "cookie"
    }

    fn priority(&self) -> i32 {
        35
    }

    fn matches(&self, field: &FieldDescriptor) -> bool {
        field.bound_to(Source::Cookie)
    }

    fn synthesize(
        &self,
        field: &FieldDescriptor,
        owner: &str,
        ctx: &SynthesisContext<'_>,
    ) -> Fragment {
        let name = field.wire_name(Source::Cookie);
        extract(
            field,
            owner,
            &name,
            &format!("r.cookie({:?})", name),
            &format!("r.cookie({:?}).into_iter().collect()", name),
            ctx,
        )
    }
}
