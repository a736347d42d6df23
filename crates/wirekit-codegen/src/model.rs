//! Directive-aware descriptors
//!
//! These are the scanner's view of a source unit: struct and field
//! descriptors carrying their parsed directives and derived flags, and
//! handler descriptors that passed shape validation.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use wirekit_core::ast::{self, last_segment};
use wirekit_core::{Param, Position, Receiver};

use crate::directive::{Directive, Source, StructTag, camel_case};

/// Doc marker that designates a handler function
pub const HANDLER_MARKER: &str = "wirekit:handler";

/// Doc marker that designates a request payload struct
pub const DTO_MARKER: &str = "wirekit:dto";

/// A struct field with its directives and derived flags
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldDescriptor {
    /// Field identifier as written
    pub name: String,
    /// Full rendered type
    pub type_name: String,
    /// Type with `Option` and `Vec` wrappers stripped
    pub base_type: String,
    /// Wrapped in `Option`
    pub is_optional: bool,
    /// A `Vec` (possibly inside `Option`)
    pub is_slice: bool,
    /// Element type for `Vec` fields
    pub element_type: Option<String>,
    /// Structured tag entries
    pub tag: StructTag,
    /// Freeform doc directive
    pub directive: Directive,
    /// Decoded from the JSON body as a whole
    pub is_body: bool,
    /// Receives the raw body bytes
    pub is_raw_body: bool,
    /// A response sink carrier
    pub is_response_carrier: bool,
    /// A raw request carrier
    pub is_request_carrier: bool,
    /// Flattened into its parent
    pub is_embedded: bool,
    /// A multipart file upload
    pub is_file: bool,
    /// Resolved copy of the field's struct type
    pub nested: Option<Box<StructDescriptor>>,
    /// Module the nested type was loaded from, when foreign
    pub module_qualifier: Option<String>,
    /// Field names leading to this field when spliced from embedded structs
    pub access_prefix: Vec<String>,
    /// Location of the field name
    pub position: Position,
}

impl FieldDescriptor {
    /// Build a descriptor from a generic field
    pub fn from_ast(field: &ast::Field) -> Self {
        let tag = StructTag::from_attributes(&field.attributes);
        let directive = Directive::parse(&field.docs);
        let carrier = carrier_segment(&field.type_name);
        let base_segment = last_segment(&field.base_type);

        let is_body = directive.source == Some(Source::Body) || tag.lookup("json") == Some("body");
        let is_raw_body = tag.has("raw_body") || (!field.is_slice && base_segment == "Bytes");
        let module_qualifier = field
            .base_type
            .split('<')
            .next()
            .and_then(|head| head.rsplit_once("::"))
            .map(|(module, _)| module.to_string());

        Self {
            name: field.name.clone(),
            type_name: field.type_name.clone(),
            base_type: field.base_type.clone(),
            is_optional: field.is_optional,
            is_slice: field.is_slice,
            element_type: field.element_type.clone(),
            is_body,
            is_raw_body,
            is_response_carrier: carrier == "ResponseWriter",
            is_request_carrier: carrier == "RawRequest",
            is_embedded: tag.has("flatten"),
            is_file: base_segment == "FileHeader",
            tag,
            directive,
            nested: None,
            module_qualifier,
            access_prefix: Vec::new(),
            position: field.position,
        }
    }

    /// Fields the resolver never descends into
    pub fn is_special(&self) -> bool {
        self.is_raw_body || self.is_response_carrier || self.is_request_carrier || self.is_file
    }

    /// Type each wire value converts to: the element type for `Vec`s
    pub fn value_type(&self) -> &str {
        &self.base_type
    }

    /// Wire name for `source`
    ///
    /// A non-empty tag value wins, then a doc directive naming the same
    /// source, then the field name in camelCase.
    pub fn wire_name(&self, source: Source) -> String {
        if let Some(name) = self.tag.value(source.tag_key()) {
            return name.to_string();
        }
        if let Some(name) = self.directive.name_for(source) {
            return name.to_string();
        }
        camel_case(&self.name)
    }

    /// Whether the tag or the doc directive binds the field to `source`
    pub fn bound_to(&self, source: Source) -> bool {
        self.tag.has(source.tag_key()) || self.directive.source == Some(source)
    }

    /// Default value; a tag `default` wins over a doc directive
    pub fn default_value(&self) -> Option<&str> {
        self.tag
            .value("default")
            .or(self.directive.default.as_deref())
    }

    /// Place expression the field is assigned through, e.g. `payload.page.limit`
    pub fn dest(&self) -> String {
        let mut dest = String::from("payload");
        for part in &self.access_prefix {
            dest.push('.');
            dest.push_str(part);
        }
        dest.push('.');
        dest.push_str(&self.name);
        dest
    }
}

/// Last path segment of a carrier type, through `&`, `dyn`, `Box` and `Option`
pub fn carrier_segment(type_name: &str) -> &str {
    let mut ty = type_name.trim();
    loop {
        let before = ty;
        ty = ty.trim_start_matches('&').trim_start();
        if let Some(rest) = ty.strip_prefix("'") {
            ty = rest.split_once(' ').map(|(_, t)| t).unwrap_or(rest);
        }
        ty = ty.strip_prefix("mut ").unwrap_or(ty);
        ty = ty.strip_prefix("dyn ").unwrap_or(ty);
        for wrapper in ["Box<", "Option<"] {
            if let Some(inner) = strip_wrapper(ty, wrapper) {
                ty = inner;
            }
        }
        if ty == before {
            break;
        }
    }
    let ty = ty.split('+').next().unwrap_or(ty).trim();
    last_segment(ty)
}

fn strip_wrapper<'a>(ty: &'a str, wrapper: &str) -> Option<&'a str> {
    let head = ty.split('<').next()?;
    let short = &wrapper[..wrapper.len() - 1];
    if head != short && !head.ends_with(&format!("::{}", short)) {
        return None;
    }
    let start = ty.find('<')? + 1;
    let inner = ty.get(start..ty.len().checked_sub(1)?)?;
    ty.ends_with('>').then_some(inner.trim())
}

/// A struct with directive-aware fields
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StructDescriptor {
    /// Struct name
    pub name: String,
    /// Fields in declaration order
    pub fields: Vec<FieldDescriptor>,
    /// Carries the DTO marker
    pub is_dto: bool,
    /// Location of the struct name
    pub position: Position,
}

impl StructDescriptor {
    /// Build an unresolved descriptor from a generic struct
    pub fn from_ast(s: &ast::Struct) -> Self {
        Self {
            name: s.name.clone(),
            fields: s.fields.iter().map(FieldDescriptor::from_ast).collect(),
            is_dto: s.docs.iter().any(|d| d.contains(DTO_MARKER)),
            position: s.position,
        }
    }

    /// The same struct with its fields dropped
    pub fn stub(&self) -> Self {
        Self {
            name: self.name.clone(),
            fields: Vec::new(),
            is_dto: self.is_dto,
            position: self.position,
        }
    }

    /// Whether any field, through embedded and nested structs, satisfies `pred`
    pub fn any_field<F>(&self, pred: &F) -> bool
    where
        F: Fn(&FieldDescriptor) -> bool,
    {
        self.fields.iter().any(|field| {
            pred(field)
                || field
                    .nested
                    .as_ref()
                    .is_some_and(|nested| nested.any_field(pred))
        })
    }
}

/// How a handler parameter is passed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Passing {
    /// By value
    #[default]
    Value,
    /// By shared reference
    Ref,
    /// By mutable reference
    RefMut,
}

impl Passing {
    /// Passing mode of a parameter
    pub fn of(param: &Param) -> Self {
        match (param.is_ref, param.is_mut_ref) {
            (true, true) => Passing::RefMut,
            (true, false) => Passing::Ref,
            _ => Passing::Value,
        }
    }

    /// Expression passing `binding` this way
    pub fn apply(&self, binding: &str) -> String {
        match self {
            Passing::Value => binding.to_string(),
            Passing::Ref => format!("&{}", binding),
            Passing::RefMut => format!("&mut {}", binding),
        }
    }
}

/// A transport parameter following the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    /// `&mut dyn ResponseWriter`
    ResponseWriter,
    /// `&dyn RawRequest` or `&mut dyn RawRequest`
    RawRequest {
        /// Taken mutably
        mutable: bool,
    },
}

/// A function that passed handler shape validation
#[derive(Debug, Clone, Serialize)]
pub struct HandlerDescriptor {
    /// Function name
    pub name: String,
    /// Receiver for methods
    pub receiver: Option<Receiver>,
    /// Declared `async`
    pub is_async: bool,
    /// Parameters after any receiver
    pub params: Vec<Param>,
    /// Results: success type and error type
    pub results: Vec<Param>,
    /// How the context is passed
    pub context: Passing,
    /// Payload type as written, references stripped
    pub payload_type: String,
    /// How the payload is passed
    pub payload_passing: Passing,
    /// Resolved payload struct, when found
    pub payload: Option<StructDescriptor>,
    /// Transport parameters in declaration order
    pub transports: Vec<Transport>,
    /// Takes the raw request
    pub has_raw_request: bool,
    /// Takes the response sink
    pub has_raw_response: bool,
    /// Location of the function name
    pub position: Position,
}

/// A non-fatal scanning problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    /// File the function lives in
    pub file: PathBuf,
    /// Location of the function name
    pub position: Position,
    /// Function name
    pub function: String,
    /// What was wrong
    pub reason: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: function {}: {}",
            self.file.display(),
            self.position.line,
            self.position.column,
            self.function,
            self.reason
        )
    }
}
