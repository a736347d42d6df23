//! Directive scanner
//!
//! Filters a generic [`SourceUnit`] for the wirekit markers and validates
//! handler shapes. A handler must look like
//!
//! ```text
//! fn NAME(ctx: Context, payload: P [, w: &mut dyn ResponseWriter] [, r: &dyn RawRequest]) -> Result<T, E>
//! ```
//!
//! with the transports in either order and `E` ending in `Error`. Anything
//! else is skipped with a [`Warning`] and scanning continues.

use std::path::PathBuf;

use serde::Serialize;
use tracing::debug;
use wirekit_core::{Function, Param, SourceUnit};

use crate::model::{
    HANDLER_MARKER, HandlerDescriptor, Passing, StructDescriptor, Transport, Warning,
    carrier_segment,
};
use crate::resolver::Resolver;

/// Handlers and DTOs found in one source unit
#[derive(Debug, Clone, Serialize)]
pub struct ScannedUnit {
    /// Module name
    pub module: String,
    /// Source file
    pub path: PathBuf,
    /// Handlers that passed shape validation, in declaration order
    pub handlers: Vec<HandlerDescriptor>,
    /// Resolved structs carrying the DTO marker
    pub dtos: Vec<StructDescriptor>,
    /// Non-fatal problems
    pub warnings: Vec<Warning>,
}

/// Marker filter and handler shape validator
#[derive(Debug, Clone, Copy, Default)]
pub struct Scanner;

impl Scanner {
    /// Create a scanner
    pub fn new() -> Self {
        Self
    }

    /// Scan `unit`, resolving payloads and DTOs through `resolver`
    pub fn scan(&self, unit: &SourceUnit, resolver: &mut Resolver<'_>) -> ScannedUnit {
        let mut handlers = Vec::new();
        let mut warnings = Vec::new();

        for function in unit.functions.iter().filter(|f| is_handler(f)) {
            let warn = |reason: String| Warning {
                file: unit.path.clone(),
                position: function.position,
                function: function.name.clone(),
                reason,
            };

            let mut handler = match validate_shape(function) {
                Ok(handler) => handler,
                Err(reason) => {
                    debug!(function = %function.name, %reason, "Skipping handler");
                    warnings.push(warn(reason));
                    continue;
                }
            };

            handler.payload = resolver.find_struct(&handler.payload_type, unit);
            if handler.payload.is_none() {
                warnings.push(warn(format!(
                    "payload type {} not found; parsing yields Default::default()",
                    handler.payload_type
                )));
            }
            handlers.push(handler);
        }

        let dtos = resolver
            .resolve_unit(unit)
            .into_values()
            .filter(|s| s.is_dto)
            .collect();

        ScannedUnit {
            module: unit.module.clone(),
            path: unit.path.clone(),
            handlers,
            dtos,
            warnings,
        }
    }
}

fn is_handler(function: &Function) -> bool {
    function.docs.iter().any(|line| line.contains(HANDLER_MARKER))
}

/// Check a marked function against the handler shape
///
/// The payload is left unresolved.
pub fn validate_shape(function: &Function) -> Result<HandlerDescriptor, String> {
    if let Some(receiver) = &function.receiver
        && receiver.type_name.contains('<')
    {
        return Err(format!(
            "generic receiver {} is not supported",
            receiver.type_name
        ));
    }

    let params = &function.params;
    if !(2..=4).contains(&params.len()) {
        return Err(format!(
            "expected 2 to 4 parameters, found {}",
            params.len()
        ));
    }

    let context = &params[0];
    if carrier_segment(&context.type_name) != "Context" {
        return Err(format!(
            "first parameter must be a Context, found {}",
            context.type_name
        ));
    }

    let payload = &params[1];
    if matches!(
        carrier_segment(&payload.type_name),
        "Context" | "ResponseWriter" | "RawRequest"
    ) {
        return Err(format!(
            "second parameter must be the payload, found {}",
            payload.type_name
        ));
    }

    let transports = transports(&params[2..])?;

    if function.results.len() != 2 {
        return Err(format!(
            "expected Result<T, E> return, found {} results",
            function.results.len()
        ));
    }
    let error = &function.results[1];
    if !carrier_segment(&error.type_name).ends_with("Error") {
        return Err(format!(
            "error type {} does not look like an error",
            error.type_name
        ));
    }

    Ok(HandlerDescriptor {
        name: function.name.clone(),
        receiver: function.receiver.clone(),
        is_async: function.is_async,
        params: params.clone(),
        results: function.results.clone(),
        context: Passing::of(context),
        payload_type: payload.base_type.clone(),
        payload_passing: Passing::of(payload),
        payload: None,
        has_raw_response: transports.contains(&Transport::ResponseWriter),
        has_raw_request: transports
            .iter()
            .any(|t| matches!(t, Transport::RawRequest { .. })),
        transports,
        position: function.position,
    })
}

fn transports(extra: &[Param]) -> Result<Vec<Transport>, String> {
    let mut out: Vec<Transport> = Vec::with_capacity(extra.len());

    for param in extra {
        let transport = match carrier_segment(&param.type_name) {
            "ResponseWriter" if param.is_mut_ref => Transport::ResponseWriter,
            "ResponseWriter" => {
                return Err(format!(
                    "response sink must be taken as &mut, found {}",
                    param.type_name
                ));
            }
            "RawRequest" if param.is_ref => Transport::RawRequest {
                mutable: param.is_mut_ref,
            },
            "RawRequest" => {
                return Err(format!(
                    "raw request must be taken by reference, found {}",
                    param.type_name
                ));
            }
            _ => {
                return Err(format!("unexpected parameter type {}", param.type_name));
            }
        };

        let duplicate = out
            .iter()
            .any(|seen| std::mem::discriminant(seen) == std::mem::discriminant(&transport));
        if duplicate {
            let what = match transport {
                Transport::ResponseWriter => "response sink",
                Transport::RawRequest { .. } => "raw request",
            };
            return Err(format!("duplicate {} parameter", what));
        }
        out.push(transport);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::path::Path;
    use wirekit_core::{CachedParser, Parser};

    fn scan(source: &str) -> ScannedUnit {
        let unit = Parser::new()
            .parse_source(source, Path::new("src/api.rs"), vec!["api".to_string()])
            .unwrap();
        let cache = CachedParser::default();
        let mut resolver = Resolver::new(&cache);
        Scanner::new().scan(&unit, &mut resolver)
    }

    fn function(source: &str) -> Function {
        Parser::new()
            .parse_source(source, Path::new("src/api.rs"), vec![])
            .unwrap()
            .functions
            .remove(0)
    }

    #[test]
    fn test_scan_finds_marked_handlers() {
        let scanned = scan(
            r#"
            /// wirekit:dto
            #[derive(Default)]
            struct GetUser { id: u64 }

            /// wirekit:handler
            fn get_user(ctx: &Context, req: GetUser) -> Result<User, ApiError> { todo!() }

            fn helper(ctx: &Context, req: GetUser) -> Result<User, ApiError> { todo!() }
            "#,
        );

        assert_eq!(scanned.module, "api");
        assert_eq!(scanned.handlers.len(), 1);
        let handler = &scanned.handlers[0];
        assert_eq!(handler.name, "get_user");
        assert_eq!(handler.context, Passing::Ref);
        assert_eq!(handler.payload_passing, Passing::Value);
        assert_eq!(handler.payload.as_ref().unwrap().name, "GetUser");
        assert_eq!(scanned.dtos.len(), 1);
        assert!(scanned.warnings.is_empty());
    }

    #[test]
    fn test_bad_shape_is_warning_and_scan_continues() {
        let scanned = scan(
            r#"
            /// wirekit:handler
            fn one(ctx: Context) -> Result<(), ApiError> { todo!() }

            /// wirekit:handler
            fn two(ctx: Context, req: Req) -> Result<(), ApiError> { todo!() }

            #[derive(Default)]
            struct Req {}
            "#,
        );

        assert_eq!(scanned.handlers.len(), 1);
        assert_eq!(scanned.handlers[0].name, "two");
        assert_eq!(scanned.warnings.len(), 1);
        assert_eq!(scanned.warnings[0].function, "one");
        assert_eq!(
            scanned.warnings[0].reason,
            "expected 2 to 4 parameters, found 1"
        );
        assert_eq!(scanned.warnings[0].position.line, 3);
    }

    #[test]
    fn test_missing_payload_still_wrapped() {
        let scanned = scan(
            r#"
            /// wirekit:handler
            fn list(ctx: Context, req: &Elsewhere) -> Result<Vec<u8>, ApiError> { todo!() }
            "#,
        );
        assert_eq!(scanned.handlers.len(), 1);
        assert!(scanned.handlers[0].payload.is_none());
        assert_eq!(scanned.handlers[0].payload_type, "Elsewhere");
        assert!(scanned.warnings[0].reason.contains("not found"));
    }

    #[test]
    fn test_transports_in_either_order() {
        let handler = validate_shape(&function(
            "fn h(ctx: Context, p: P, r: &mut dyn RawRequest, w: &mut dyn ResponseWriter) -> Result<(), Box<dyn std::error::Error>> { todo!() }",
        ))
        .unwrap();
        assert_eq!(
            handler.transports,
            vec![
                Transport::RawRequest { mutable: true },
                Transport::ResponseWriter
            ]
        );
        assert!(handler.has_raw_request && handler.has_raw_response);
    }

    #[rstest]
    #[case("fn h(c: Context, p: P) -> Result<(), ApiError>", None)]
    #[case("fn h(c: &mut Context, p: &mut P) -> Result<(), HandlerError>", None)]
    #[case("fn h(c: Context, p: P, w: &mut dyn ResponseWriter) -> Result<(), Box<dyn Error + Send>>", None)]
    #[case(
        "fn h(c: Context, p: P, a: &dyn RawRequest, b: &dyn RawRequest, w: &mut dyn ResponseWriter) -> Result<(), ApiError>",
        Some("expected 2 to 4 parameters, found 5")
    )]
    #[case("fn h(p: P, c: Context) -> Result<(), ApiError>", Some("first parameter must be a Context, found P"))]
    #[case(
        "fn h(c: Context, w: &mut dyn ResponseWriter) -> Result<(), ApiError>",
        Some("second parameter must be the payload, found &mut dyn ResponseWriter")
    )]
    #[case(
        "fn h(c: Context, p: P, a: &dyn RawRequest, b: &mut dyn RawRequest) -> Result<(), ApiError>",
        Some("duplicate raw request parameter")
    )]
    #[case(
        "fn h(c: Context, p: P, w: &dyn ResponseWriter) -> Result<(), ApiError>",
        Some("response sink must be taken as &mut, found &dyn ResponseWriter")
    )]
    #[case("fn h(c: Context, p: P, n: u32) -> Result<(), ApiError>", Some("unexpected parameter type u32"))]
    #[case("fn h(c: Context, p: P) -> User", Some("expected Result<T, E> return, found 1 results"))]
    #[case("fn h(c: Context, p: P) -> Result<(), String>", Some("error type String does not look like an error"))]
    fn test_handler_shapes(#[case] signature: &str, #[case] expected: Option<&str>) {
        let result = validate_shape(&function(&format!("{} {{ todo!() }}", signature)));
        match expected {
            None => assert!(result.is_ok(), "{:?}", result.err()),
            Some(reason) => assert_eq!(result.unwrap_err(), reason),
        }
    }

    #[test]
    fn test_generic_receiver_rejected() {
        let scanned = scan(
            r#"
            impl<T> Api<T> {
                /// wirekit:handler
                fn get(&self, ctx: Context, req: Req) -> Result<(), ApiError> { todo!() }
            }
            "#,
        );
        assert!(scanned.handlers.is_empty());
        assert_eq!(
            scanned.warnings[0].reason,
            "generic receiver Api<T> is not supported"
        );
    }

    #[test]
    fn test_method_handler_receiver() {
        let scanned = scan(
            r#"
            #[derive(Default)]
            struct Req {}
            impl Api {
                /// wirekit:handler
                async fn get(&mut self, ctx: Context, req: Req) -> Result<(), ApiError> { todo!() }
            }
            "#,
        );
        let handler = &scanned.handlers[0];
        assert!(handler.is_async);
        let receiver = handler.receiver.as_ref().unwrap();
        assert_eq!(receiver.type_name, "Api");
        assert_eq!(receiver.kind, wirekit_core::ReceiverKind::RefMut);
    }
}
