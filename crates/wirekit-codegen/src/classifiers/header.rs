//! Header classifier

use crate::classifiers::extraction::extract;
use crate::classifiers::{Classifier, Fragment, SynthesisContext};
use crate::directive::Source;
use crate::model::FieldDescriptor;

/// Fills fields bound to a request header
pub struct HeaderClassifier;

impl Classifier for HeaderClassifier {
    fn name(&self) -> &'static str {
        "header"
    }

    fn priority(&self) -> i32 {
        30
    }

    fn matches(&self, field: &FieldDescriptor) -> bool {
        field.bound_to(Source::Header)
    }

    fn synthesize(
        &self,
        field: &FieldDescriptor,
        owner: &str,
        ctx: &SynthesisContext<'_>,
    ) -> Fragment {
        let name = field.wire_name(Source::Header);
        extract(
            field,
            owner,
            &name,
            &format!("r.header_value({:?})", name),
            &format!("r.header_values({:?})", name),
            ctx,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codecs::CodecRegistry;
    use crate::directive::Directive;

    #[test]
    fn test_header_with_default() {
        let field = FieldDescriptor {
            name: "request_id".to_string(),
            base_type: "String".to_string(),
            directive: Directive::parse(&[
                "in: header X-Request-Id".to_string(),
                "default: none".to_string(),
            ]),
            ..Default::default()
        };
        let codecs = CodecRegistry::with_builtins("rt");
        let ctx = SynthesisContext {
            codecs: &codecs,
            runtime: "rt",
        };
        let fragment = HeaderClassifier.synthesize(&field, "Req", &ctx);
        assert!(fragment.code.contains("match r.header_value(\"X-Request-Id\")"));
        assert!(fragment.code.contains("payload.request_id = \"none\".to_string();"));
    }
}
