//! Query string classifier

use crate::classifiers::extraction::extract;
use crate::classifiers::{Classifier, Fragment, SynthesisContext};
use crate::directive::Source;
use crate::model::FieldDescriptor;

/// Fills fields bound to a query parameter
pub struct QueryClassifier;

impl Classifier for QueryClassifier {
    fn name(&self) -> &'static str {
        "query"
    }

    fn priority(&self) -> i32 {
        20
    }

    fn matches(&self, field: &FieldDescriptor) -> bool {
        field.bound_to(Source::Query)
    }

    fn synthesize(
        &self,
        field: &FieldDescriptor,
        owner: &str,
        ctx: &SynthesisContext<'_>,
    ) -> Fragment {
        let name = field.wire_name(Source::Query);
        extract(
            field,
            owner,
            &name,
            &format!("r.query_value({:?})", name),
            &format!("r.query_values({:?})", name),
            ctx,
        )
    }
}
