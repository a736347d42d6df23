//! Code synthesis
//!
//! Turns validated handlers into two functions each: a parser that builds
//! the payload from a raw request, and a wrapper that parses, calls the
//! handler and hands the result to `handle_response`, or to
//! `handle_http_response` when the handler returns an `HttpResponse`.
//!
//! Parser body order:
//!
//! 1. multipart parsing, when any field reads form input
//! 2. payload init, `Default::default()` or the whole JSON body
//! 3. classifier fragments, by priority then field order
//! 4. raw body assignment
//! 5. validation, when any field carries a `validate` entry
//!
//! Method handlers are emitted inside `impl Type { .. }` blocks so parser
//! names cannot clash across types.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;
use wirekit_core::ReceiverKind;
use wirekit_core::ast::last_segment;

use crate::classifiers::extraction::indent;
use crate::classifiers::{ClassifierRegistry, Fragment, SynthesisContext};
use crate::directive::Source;
use crate::model::{FieldDescriptor, HandlerDescriptor, Passing, StructDescriptor, Transport};

const BASE_IMPORTS: &[&str] = &[
    "RawRequest",
    "RequestError",
    "ResponseWriter",
    "handle_response",
    "write_request_error",
];

const HTTP_RESPONDER: &str = "handle_http_response";

/// Steps a handler's parser needs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Requirements {
    /// Initialize the payload from the JSON body
    pub json_init: bool,
    /// Assign the raw body to a field
    pub raw_body: bool,
    /// Run `Validate::validate`
    pub validate: bool,
    /// Parse a multipart form first
    pub multipart: bool,
}

/// Which classifier filled which field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldBinding {
    /// Place expression, e.g. `payload.page.limit`
    pub field: String,
    /// Classifier name
    pub classifier: &'static str,
}

/// Generated code for one handler
#[derive(Debug, Clone, Serialize)]
pub struct HandlerCode {
    /// Handler name
    pub handler: String,
    /// Receiver type for methods
    pub receiver: Option<String>,
    /// Parser function source
    pub parser: String,
    /// Wrapper function source
    pub wrapper: String,
    /// Parser steps in use
    pub requirements: Requirements,
    /// Fields bound by classifiers, in emission order
    pub bindings: Vec<FieldBinding>,
    /// `use` paths required
    pub imports: BTreeSet<String>,
}

/// Generated code for one source unit
#[derive(Debug, Clone, Default, Serialize)]
pub struct UnitCode {
    /// Sorted, deduplicated `use` paths
    pub imports: Vec<String>,
    /// Top-level items: free functions and `impl` blocks
    pub items: Vec<String>,
    /// Per-handler code
    pub handlers: Vec<HandlerCode>,
}

/// Synthesizes parser and wrapper functions
pub struct Synthesizer<'a> {
    classifiers: &'a ClassifierRegistry,
    ctx: SynthesisContext<'a>,
    multipart_max_memory: u64,
}

impl<'a> Synthesizer<'a> {
    /// Create a synthesizer
    pub fn new(
        classifiers: &'a ClassifierRegistry,
        ctx: SynthesisContext<'a>,
        multipart_max_memory: u64,
    ) -> Self {
        Self {
            classifiers,
            ctx,
            multipart_max_memory,
        }
    }

    /// Synthesize every handler of a unit and group methods by receiver
    pub fn unit(&self, handlers: &[HandlerDescriptor]) -> UnitCode {
        let handlers: Vec<HandlerCode> = handlers.iter().map(|h| self.handler(h)).collect();

        let mut imports = BTreeSet::new();
        let mut groups: Vec<(Option<&str>, Vec<&HandlerCode>)> = Vec::new();
        for code in &handlers {
            imports.extend(code.imports.iter().cloned());
            let key = code.receiver.as_deref();
            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, members)) => members.push(code),
                None => groups.push((key, vec![code])),
            }
        }

        let items = groups
            .into_iter()
            .map(|(receiver, members)| {
                let functions: Vec<String> = members
                    .iter()
                    .flat_map(|code| [code.parser.clone(), code.wrapper.clone()])
                    .collect();
                let functions = functions.join("\n");
                match receiver {
                    Some(ty) => format!("impl {} {{\n{}}}\n", ty, indent(&functions, 1)),
                    None => functions,
                }
            })
            .collect();

        UnitCode {
            imports: imports.into_iter().collect(),
            items,
            handlers,
        }
    }

    /// Synthesize one handler
    pub fn handler(&self, handler: &HandlerDescriptor) -> HandlerCode {
        let mut imports: BTreeSet<String> = BASE_IMPORTS
            .iter()
            .map(|item| self.ctx.runtime_item(item))
            .collect();
        let responder = responder(handler);
        if responder == HTTP_RESPONDER {
            imports.insert(self.ctx.runtime_item(HTTP_RESPONDER));
        }

        let mut leaves = Vec::new();
        let mut requirements = Requirements::default();
        if let Some(payload) = &handler.payload {
            leaf_fields(payload, &[], &mut leaves);
            requirements = requirements_of(payload, &leaves);
        }

        let (raw_fields, classified): (Vec<_>, Vec<_>) =
            leaves.into_iter().partition(|f| f.is_raw_body);

        let owner = handler.payload_type.as_str();
        let mut fragments: Vec<(i32, usize, Fragment, FieldBinding)> = Vec::new();
        for (index, field) in classified.iter().enumerate() {
            match self.classifiers.classify(field) {
                Some(classifier) => fragments.push((
                    classifier.priority(),
                    index,
                    classifier.synthesize(field, owner, &self.ctx),
                    FieldBinding {
                        field: field.dest(),
                        classifier: classifier.name(),
                    },
                )),
                None => debug!(
                    owner,
                    field = %field.dest(),
                    tag = field.tag.raw(),
                    "No classifier; field keeps its default"
                ),
            }
        }
        fragments.sort_by_key(|(priority, index, _, _)| (*priority, *index));

        let mut bindings = Vec::with_capacity(fragments.len());
        let mut body = String::new();
        if requirements.multipart {
            body.push_str(&format!(
                "r.parse_multipart_form({})?;\n",
                self.multipart_max_memory
            ));
        }
        if requirements.json_init {
            imports.insert(self.ctx.runtime_item("decode_json"));
            body.push_str(&format!(
                "let mut payload: {owner} = if r.body().is_empty() {{\n    Default::default()\n}} else {{\n    decode_json(r.body())?\n}};\n"
            ));
        } else {
            body.push_str(&format!("let mut payload: {owner} = Default::default();\n"));
        }
        for (_, _, fragment, binding) in fragments {
            imports.extend(fragment.imports);
            body.push_str(&fragment.code);
            bindings.push(binding);
        }
        for field in &raw_fields {
            let value = if field.is_optional {
                "Some(r.body().to_vec().into())"
            } else {
                "r.body().to_vec().into()"
            };
            body.push_str(&format!("{} = {};\n", field.dest(), value));
        }
        if requirements.validate {
            imports.insert(self.ctx.runtime_item("Validate"));
            body.push_str("payload.validate().map_err(RequestError::validation)?;\n");
        }
        body.push_str("Ok(payload)\n");

        let parser = format!(
            "fn {}(r: &mut dyn RawRequest) -> Result<{}, RequestError> {{\n{}}}\n",
            parser_name(&handler.name),
            owner,
            indent(&body, 1)
        );

        HandlerCode {
            handler: handler.name.clone(),
            receiver: handler.receiver.as_ref().map(|r| r.type_name.clone()),
            parser,
            wrapper: wrapper(handler, responder),
            requirements,
            bindings,
            imports,
        }
    }
}

/// `parse_NAME_request`
pub fn parser_name(handler: &str) -> String {
    format!("parse_{}_request", handler)
}

/// `NAME_wirekit`
pub fn wrapper_name(handler: &str) -> String {
    format!("{}_wirekit", handler)
}

/// Runtime function the wrapper hands the handler's result to
fn responder(handler: &HandlerDescriptor) -> &'static str {
    let success = handler
        .results
        .first()
        .map(|result| result.type_name.as_str())
        .unwrap_or_default();
    if last_segment(success) == "HttpResponse" {
        HTTP_RESPONDER
    } else {
        "handle_response"
    }
}

fn wrapper(handler: &HandlerDescriptor, responder: &str) -> String {
    let kind = handler.receiver.as_ref().map(|r| r.kind);
    let self_param = match kind {
        None | Some(ReceiverKind::Static) => "",
        Some(ReceiverKind::Value) => "self, ",
        Some(ReceiverKind::Ref) => "&self, ",
        Some(ReceiverKind::RefMut) => "&mut self, ",
    };
    let (parse_call, callee) = match kind {
        None => (parser_name(&handler.name), handler.name.clone()),
        Some(ReceiverKind::Static) => (
            format!("Self::{}", parser_name(&handler.name)),
            format!("Self::{}", handler.name),
        ),
        Some(_) => (
            format!("Self::{}", parser_name(&handler.name)),
            format!("self.{}", handler.name),
        ),
    };

    let mut args = vec![
        handler.context.apply("ctx"),
        handler.payload_passing.apply("payload"),
    ];
    args.extend(handler.transports.iter().map(|t| match t {
        Transport::ResponseWriter => "&mut *w".to_string(),
        Transport::RawRequest { mutable: true } => "&mut *r".to_string(),
        Transport::RawRequest { mutable: false } => "&*r".to_string(),
    }));

    let binding = |name: &str, passing: Passing| match passing {
        Passing::RefMut => format!("let mut {}", name),
        _ => format!("let {}", name),
    };

    let mut body = String::new();
    body.push_str(&format!("{} = r.context();\n", binding("ctx", handler.context)));
    body.push_str(&format!(
        "{} = match {}(r) {{\n    Ok(payload) => payload,\n    Err(err) => {{\n        write_request_error(w, &err);\n        return;\n    }}\n}};\n",
        binding("payload", handler.payload_passing),
        parse_call
    ));
    body.push_str(&format!(
        "let result = {}({}){};\n",
        callee,
        args.join(", "),
        if handler.is_async { ".await" } else { "" }
    ));
    body.push_str(&format!("{}(w, result);\n", responder));

    format!(
        "pub(crate) {}fn {}({}w: &mut dyn ResponseWriter, r: &mut dyn RawRequest) {{\n{}}}\n",
        if handler.is_async { "async " } else { "" },
        wrapper_name(&handler.name),
        self_param,
        indent(&body, 1)
    )
}

/// Flatten embedded structs into leaf fields with access prefixes
fn leaf_fields(desc: &StructDescriptor, prefix: &[String], out: &mut Vec<FieldDescriptor>) {
    for field in &desc.fields {
        if !field.is_embedded {
            let mut leaf = field.clone();
            leaf.access_prefix = prefix.to_vec();
            out.push(leaf);
            continue;
        }
        if field.is_optional {
            debug!(owner = %desc.name, field = %field.name, "Skipping optional embedded struct");
            continue;
        }
        match &field.nested {
            Some(nested) => {
                let mut inner = prefix.to_vec();
                inner.push(field.name.clone());
                leaf_fields(nested, &inner, out);
            }
            None => debug!(owner = %desc.name, field = %field.name, "Embedded type unresolved"),
        }
    }
}

fn requirements_of(payload: &StructDescriptor, leaves: &[FieldDescriptor]) -> Requirements {
    let has_body_field = leaves.iter().any(|f| f.is_body);
    Requirements {
        json_init: !has_body_field && payload.any_field(&|f: &FieldDescriptor| f.tag.has("json")),
        raw_body: leaves.iter().any(|f| f.is_raw_body),
        validate: payload.any_field(&|f: &FieldDescriptor| f.tag.has("validate")),
        multipart: payload.any_field(&|f: &FieldDescriptor| f.is_file || f.bound_to(Source::Form)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codecs::CodecRegistry;
    use crate::resolver::Resolver;
    use crate::scanner::Scanner;
    use std::path::Path;
    use wirekit_core::{CachedParser, Parser};

    fn synthesize(source: &str) -> UnitCode {
        let unit = Parser::new()
            .parse_source(source, Path::new("src/api.rs"), vec!["api".to_string()])
            .unwrap();
        let cache = CachedParser::default();
        let scanned = Scanner::new().scan(&unit, &mut Resolver::new(&cache));
        let codecs = CodecRegistry::with_builtins("rt");
        let classifiers = ClassifierRegistry::with_builtins();
        let ctx = SynthesisContext {
            codecs: &codecs,
            runtime: "rt",
        };
        Synthesizer::new(&classifiers, ctx, 1024).unit(&scanned.handlers)
    }

    #[test]
    fn test_free_handler_wrapper() {
        let code = synthesize(
            r#"
            #[derive(Default)]
            struct GetUser {
                /// in: path
                id: u64,
            }
            /// wirekit:handler
            fn get_user(ctx: &Context, req: GetUser) -> Result<User, ApiError> { todo!() }
            "#,
        );

        let handler = &code.handlers[0];
        assert_eq!(
            handler.wrapper,
            "pub(crate) fn get_user_wirekit(w: &mut dyn ResponseWriter, r: &mut dyn RawRequest) {\n    let ctx = r.context();\n    let payload = match parse_get_user_request(r) {\n        Ok(payload) => payload,\n        Err(err) => {\n            write_request_error(w, &err);\n            return;\n        }\n    };\n    let result = get_user(&ctx, payload);\n    handle_response(w, result);\n}\n"
        );
        assert!(handler.parser.starts_with(
            "fn parse_get_user_request(r: &mut dyn RawRequest) -> Result<GetUser, RequestError> {\n    let mut payload: GetUser = Default::default();\n"
        ));
        assert!(handler.parser.ends_with("    Ok(payload)\n}\n"));
        assert_eq!(handler.requirements, Requirements::default());
        assert_eq!(code.items.len(), 1);
    }

    #[test]
    fn test_method_handlers_grouped_in_impl() {
        let code = synthesize(
            r#"
            #[derive(Default)]
            struct Req {}
            impl Api {
                /// wirekit:handler
                async fn a(&self, ctx: Context, req: &mut Req, r: &dyn RawRequest, w: &mut dyn ResponseWriter) -> Result<(), ApiError> { todo!() }
                /// wirekit:handler
                fn b(ctx: Context, req: Req) -> Result<(), ApiError> { todo!() }
            }
            "#,
        );

        assert_eq!(code.items.len(), 1);
        let item = &code.items[0];
        assert!(item.starts_with("impl Api {\n    fn parse_a_request("));
        assert!(item.contains("    pub(crate) async fn a_wirekit(&self, w: &mut dyn ResponseWriter"));
        assert!(item.contains("let mut payload = match Self::parse_a_request(r) {"));
        assert!(item.contains("let result = self.a(ctx, &mut payload, &*r, &mut *w).await;"));
        assert!(item.contains("let result = Self::b(ctx, payload);"));
        assert!(item.ends_with("}\n"));
    }

    #[test]
    fn test_embedded_fields_spliced_with_prefix() {
        let code = synthesize(
            r#"
            #[derive(Default)]
            struct Page {
                /// in: query
                limit: u32,
            }
            #[derive(Default)]
            struct List {
                #[serde(flatten)]
                page: Page,
                #[wirekit(flatten)]
                extra: Option<Page>,
                /// in: header X-Trace
                trace: String,
            }
            /// wirekit:handler
            fn list(ctx: Context, req: List) -> Result<(), ApiError> { todo!() }
            "#,
        );

        let handler = &code.handlers[0];
        let fields: Vec<&str> = handler.bindings.iter().map(|b| b.field.as_str()).collect();
        assert_eq!(fields, vec!["payload.page.limit", "payload.trace"]);
        assert!(handler.parser.contains("payload.page.limit = parsed"));
        assert!(!handler.requirements.json_init);
    }

    #[test]
    fn test_requirements_detected_recursively() {
        let code = synthesize(
            r#"
            #[derive(Default)]
            struct Meta {
                #[wirekit(validate = "required")]
                title: String,
                #[wirekit(json = "fileName")]
                name: String,
            }
            #[derive(Default)]
            struct Upload {
                meta: Meta,
                avatar: Option<FileHeader>,
                #[wirekit(raw_body)]
                raw: Vec<u8>,
            }
            /// wirekit:handler
            fn upload(ctx: Context, req: Upload) -> Result<(), ApiError> { todo!() }
            "#,
        );

        let handler = &code.handlers[0];
        assert_eq!(
            handler.requirements,
            Requirements {
                json_init: true,
                raw_body: true,
                validate: true,
                multipart: true,
            }
        );
        let parser = &handler.parser;
        let multipart = parser.find("r.parse_multipart_form(1024)?;").unwrap();
        let init = parser.find("decode_json(r.body())?").unwrap();
        let file = parser.find("r.form_file(\"avatar\")?").unwrap();
        let raw = parser.find("payload.raw = r.body().to_vec().into();").unwrap();
        let validate = parser.find("payload.validate().map_err(RequestError::validation)?;").unwrap();
        assert!(multipart < init && init < file && file < raw && raw < validate);
        assert!(handler.imports.contains("rt::Validate"));
        assert!(handler.imports.contains("rt::decode_json"));
    }

    #[test]
    fn test_body_field_suppresses_json_init() {
        let code = synthesize(
            r#"
            #[derive(Default)]
            struct Create {
                /// in: body
                item: Item,
                #[serde(rename = "tenantId")]
                /// in: header X-Tenant
                tenant: String,
            }
            /// wirekit:handler
            fn create(ctx: Context, req: Create) -> Result<(), ApiError> { todo!() }
            "#,
        );

        let handler = &code.handlers[0];
        assert!(!handler.requirements.json_init);
        let classifiers: Vec<&str> = handler.bindings.iter().map(|b| b.classifier).collect();
        assert_eq!(classifiers, vec!["header", "body"]);
    }

    #[test]
    fn test_http_response_handler_uses_http_responder() {
        let code = synthesize(
            r#"
            #[derive(Default)]
            struct Create {}
            /// wirekit:handler
            fn create(ctx: Context, req: Create) -> Result<HttpResponse<Item>, ApiError> { todo!() }
            /// wirekit:handler
            fn list(ctx: Context, req: Create) -> Result<rt::HttpResponse<Vec<Item>>, ApiError> { todo!() }
            /// wirekit:handler
            fn plain(ctx: Context, req: Create) -> Result<Vec<HttpResponse<Item>>, ApiError> { todo!() }
            "#,
        );

        let [create, list, plain] = &code.handlers[..] else {
            panic!("expected three handlers");
        };
        assert!(create.wrapper.contains("    handle_http_response(w, result);\n"));
        assert!(create.imports.contains("rt::handle_http_response"));
        assert!(list.wrapper.contains("    handle_http_response(w, result);\n"));
        assert!(plain.wrapper.contains("    handle_response(w, result);\n"));
        assert!(!plain.imports.contains("rt::handle_http_response"));
        assert!(code.imports.contains(&"rt::handle_http_response".to_string()));
    }

    #[test]
    fn test_unresolved_payload_defaults() {
        let code = synthesize(
            r#"
            /// wirekit:handler
            fn ping(ctx: Context, req: Ping) -> Result<(), ApiError> { todo!() }
            "#,
        );
        assert_eq!(
            code.handlers[0].parser,
            "fn parse_ping_request(r: &mut dyn RawRequest) -> Result<Ping, RequestError> {\n    let mut payload: Ping = Default::default();\n    Ok(payload)\n}\n"
        );
    }

    #[test]
    fn test_imports_sorted_and_deduplicated() {
        let code = synthesize(
            r#"
            #[derive(Default)]
            struct A {
                /// in: query
                at: DateTime<Utc>,
            }
            /// wirekit:handler
            fn one(ctx: Context, req: A) -> Result<(), ApiError> { todo!() }
            /// wirekit:handler
            fn two(ctx: Context, req: A) -> Result<(), ApiError> { todo!() }
            "#,
        );
        assert_eq!(
            code.imports,
            vec![
                "rt::RawRequest",
                "rt::RequestError",
                "rt::ResponseWriter",
                "rt::handle_response",
                "rt::parse_timestamp",
                "rt::write_request_error",
            ]
        );
        assert_eq!(code.items.len(), 1);
        assert!(code.items[0].contains("fn parse_one_request"));
        assert!(code.items[0].contains("fn two_wirekit"));
    }
}
