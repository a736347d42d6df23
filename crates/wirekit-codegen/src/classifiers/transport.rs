//! Transport carrier classifiers
//!
//! Payload fields typed as a raw request or a response sink cannot be
//! filled from wire input. These classifiers claim them so no other
//! classifier tries, and emit nothing.

use crate::classifiers::{Classifier, Fragment, SynthesisContext};
use crate::model::FieldDescriptor;

/// Claims `RawRequest` fields
pub struct RequestCarrierClassifier;

impl Classifier for RequestCarrierClassifier {
    fn name(&self) -> &'static str {
        "raw_request"
    }

    fn priority(&self) -> i32 {
        50
    }

    fn matches(&self, field: &FieldDescriptor) -> bool {
        field.is_request_carrier
    }

    fn synthesize(&self, _: &FieldDescriptor, _: &str, _: &SynthesisContext<'_>) -> Fragment {
        Fragment::empty()
    }
}

/// Claims `ResponseWriter` fields
pub struct ResponseCarrierClassifier;

impl Classifier for ResponseCarrierClassifier {
    fn name(&self) -> &'static str {
        "response_writer"
    }

    fn priority(&self) -> i32 {
        60
    }

    fn matches(&self, field: &FieldDescriptor) -> bool {
        field.is_response_carrier
    }

    fn synthesize(&self, _: &FieldDescriptor, _: &str, _: &SynthesisContext<'_>) -> Fragment {
        Fragment::empty()
    }
}
