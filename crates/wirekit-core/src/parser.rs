//! Generic Rust source parser
//!
//! Parses a file with `syn` and walks its items once, collecting structs,
//! functions, `impl` methods, and `use` aliases into a [`SourceUnit`].
//! Inline `mod { .. }` blocks are not descended into.

use std::collections::BTreeMap;
use std::path::Path;

use quote::ToTokens;
use syn::punctuated::Punctuated;
use syn::{
    Attribute, FnArg, GenericArgument, Item, ItemFn, ItemImpl, ItemStruct, Pat, PathArguments,
    ReturnType, Signature, Token, Type, TypeParamBound, UseTree,
};
use tracing::debug;

use crate::ast::{
    AttributeMeta, Field, Function, MetaEntry, Param, Position, Receiver, ReceiverKind, SourceUnit,
    Struct,
};
use crate::error::{Error, Result};
use crate::module;

/// Stateless Rust source parser
#[derive(Debug, Clone, Default)]
pub struct Parser;

impl Parser {
    /// Create a new parser
    pub fn new() -> Self {
        Self
    }

    /// Read and parse a file from disk
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<SourceUnit> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.display().to_string(),
            source,
        })?;
        let module_path = module::module_path_for(path);
        self.parse_source(&source, path, module_path)
    }

    /// Parse source text that claims to live at `path` with `module_path`
    pub fn parse_source(
        &self,
        source: &str,
        path: &Path,
        module_path: Vec<String>,
    ) -> Result<SourceUnit> {
        let file = syn::parse_file(source).map_err(|err| {
            let start = err.span().start();
            Error::Parse {
                path: path.display().to_string(),
                line: start.line,
                column: start.column + 1,
                message: err.to_string(),
            }
        })?;

        let module = module_path
            .last()
            .cloned()
            .or_else(|| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "crate".to_string());

        let mut unit = SourceUnit {
            module,
            path: path.to_path_buf(),
            module_path,
            ..Default::default()
        };

        for item in &file.items {
            match item {
                Item::Struct(s) => {
                    if let Some(parsed) = parse_struct(s) {
                        unit.structs.insert(parsed.name.clone(), parsed);
                    }
                }
                Item::Fn(f) => unit.functions.push(parse_fn(f)),
                Item::Impl(i) => parse_impl(i, &mut unit.functions),
                Item::Use(u) => collect_use(&u.tree, &mut Vec::new(), &mut unit.imports),
                _ => {}
            }
        }

        debug!(
            path = %path.display(),
            structs = unit.structs.len(),
            functions = unit.functions.len(),
            "Parsed source unit"
        );
        Ok(unit)
    }
}

fn parse_struct(item: &ItemStruct) -> Option<Struct> {
    let syn::Fields::Named(named) = &item.fields else {
        return None;
    };

    let fields = named
        .named
        .iter()
        .filter_map(|f| {
            let ident = f.ident.as_ref()?;
            let shape = TypeShape::of(&f.ty);
            Some(Field {
                name: ident.to_string(),
                type_name: render_type(&f.ty),
                base_type: shape.base_type,
                is_optional: shape.is_optional,
                is_slice: shape.is_slice,
                element_type: shape.element_type,
                docs: doc_lines(&f.attrs),
                attributes: attribute_metas(&f.attrs),
                position: position_of(ident.span()),
            })
        })
        .collect();

    Some(Struct {
        name: item.ident.to_string(),
        docs: doc_lines(&item.attrs),
        attributes: attribute_metas(&item.attrs),
        fields,
        position: position_of(item.ident.span()),
    })
}

fn parse_fn(item: &ItemFn) -> Function {
    let mut function = parse_signature(&item.sig);
    function.docs = doc_lines(&item.attrs);
    function
}

fn parse_impl(item: &ItemImpl, out: &mut Vec<Function>) {
    // Trait impls are not user handlers.
    if item.trait_.is_some() {
        return;
    }
    let self_type = render_type(&item.self_ty);

    for impl_item in &item.items {
        let syn::ImplItem::Fn(method) = impl_item else {
            continue;
        };
        let mut function = parse_signature(&method.sig);
        function.docs = doc_lines(&method.attrs);
        let kind = match method.sig.receiver() {
            None => ReceiverKind::Static,
            Some(r) if r.reference.is_none() => ReceiverKind::Value,
            Some(r) if r.mutability.is_some() => ReceiverKind::RefMut,
            Some(_) => ReceiverKind::Ref,
        };
        function.receiver = Some(Receiver {
            type_name: self_type.clone(),
            kind,
        });
        out.push(function);
    }
}

fn parse_signature(sig: &Signature) -> Function {
    let params = sig
        .inputs
        .iter()
        .filter_map(|arg| match arg {
            FnArg::Receiver(_) => None,
            FnArg::Typed(pat) => {
                let name = match pat.pat.as_ref() {
                    Pat::Ident(ident) => ident.ident.to_string(),
                    _ => "_".to_string(),
                };
                Some(param(name, &pat.ty))
            }
        })
        .collect();

    let results = match &sig.output {
        ReturnType::Default => Vec::new(),
        ReturnType::Type(_, ty) => match result_args(ty) {
            Some(args) => args
                .into_iter()
                .map(|t| param(String::new(), t))
                .collect(),
            None if is_unit(ty) => Vec::new(),
            None => vec![param(String::new(), ty)],
        },
    };

    Function {
        name: sig.ident.to_string(),
        docs: Vec::new(),
        receiver: None,
        is_async: sig.asyncness.is_some(),
        params,
        results,
        position: position_of(sig.ident.span()),
    }
}

fn param(name: String, ty: &Type) -> Param {
    let (base, is_ref, is_mut_ref) = match ty {
        Type::Reference(r) => (render_type(&r.elem), true, r.mutability.is_some()),
        _ => (render_type(ty), false, false),
    };
    Param {
        name,
        type_name: render_type(ty),
        base_type: base,
        is_ref,
        is_mut_ref,
    }
}

/// Type arguments of a `Result<T, E>` return, or `None` for any other type
fn result_args(ty: &Type) -> Option<Vec<&Type>> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != "Result" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    Some(
        args.args
            .iter()
            .filter_map(|a| match a {
                GenericArgument::Type(t) => Some(t),
                _ => None,
            })
            .collect(),
    )
}

fn is_unit(ty: &Type) -> bool {
    matches!(ty, Type::Tuple(t) if t.elems.is_empty())
}

/// Wrapper flags of a field type
struct TypeShape {
    base_type: String,
    is_optional: bool,
    is_slice: bool,
    element_type: Option<String>,
}

impl TypeShape {
    fn of(ty: &Type) -> Self {
        let (inner, is_optional) = match single_generic(ty, "Option") {
            Some(inner) => (inner, true),
            None => (ty, false),
        };
        match single_generic(inner, "Vec") {
            Some(element) => {
                let element = render_type(element);
                Self {
                    base_type: element.clone(),
                    is_optional,
                    is_slice: true,
                    element_type: Some(element),
                }
            }
            None => Self {
                base_type: render_type(inner),
                is_optional,
                is_slice: false,
                element_type: None,
            },
        }
    }
}

/// `T` when `ty` is `NAME<T>` (by last path segment)
fn single_generic<'a>(ty: &'a Type, name: &str) -> Option<&'a Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != name {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) if args.args.len() == 1 => Some(inner),
        _ => None,
    }
}

/// Render a type the way it would be written in source
pub fn render_type(ty: &Type) -> String {
    match ty {
        Type::Path(p) if p.qself.is_none() => render_path(&p.path),
        Type::Reference(r) => {
            let mut out = String::from("&");
            if let Some(lifetime) = &r.lifetime {
                out.push_str(&format!("'{} ", lifetime.ident));
            }
            if r.mutability.is_some() {
                out.push_str("mut ");
            }
            out.push_str(&render_type(&r.elem));
            out
        }
        Type::TraitObject(t) => format!("dyn {}", render_bounds(&t.bounds)),
        Type::ImplTrait(t) => format!("impl {}", render_bounds(&t.bounds)),
        Type::Slice(s) => format!("[{}]", render_type(&s.elem)),
        Type::Array(a) => format!(
            "[{}; {}]",
            render_type(&a.elem),
            a.len.to_token_stream()
        ),
        Type::Tuple(t) => {
            let elems: Vec<String> = t.elems.iter().map(render_type).collect();
            if elems.len() == 1 {
                format!("({},)", elems[0])
            } else {
                format!("({})", elems.join(", "))
            }
        }
        Type::Paren(p) => render_type(&p.elem),
        Type::Group(g) => render_type(&g.elem),
        Type::Never(_) => "!".to_string(),
        other => other.to_token_stream().to_string(),
    }
}

fn render_path(path: &syn::Path) -> String {
    let mut out = String::new();
    if path.leading_colon.is_some() {
        out.push_str("::");
    }
    let segments: Vec<String> = path
        .segments
        .iter()
        .map(|segment| {
            let ident = segment.ident.to_string();
            match &segment.arguments {
                PathArguments::None => ident,
                PathArguments::AngleBracketed(args) => {
                    let args: Vec<String> = args.args.iter().map(render_generic_arg).collect();
                    format!("{}<{}>", ident, args.join(", "))
                }
                PathArguments::Parenthesized(args) => {
                    format!("{}{}", ident, args.to_token_stream())
                }
            }
        })
        .collect();
    out.push_str(&segments.join("::"));
    out
}

fn render_generic_arg(arg: &GenericArgument) -> String {
    match arg {
        GenericArgument::Type(t) => render_type(t),
        GenericArgument::Lifetime(l) => format!("'{}", l.ident),
        GenericArgument::AssocType(a) => format!("{} = {}", a.ident, render_type(&a.ty)),
        other => other.to_token_stream().to_string(),
    }
}

fn render_bounds(bounds: &Punctuated<TypeParamBound, Token![+]>) -> String {
    bounds
        .iter()
        .map(|bound| match bound {
            TypeParamBound::Trait(t) => render_path(&t.path),
            TypeParamBound::Lifetime(l) => format!("'{}", l.ident),
            other => other.to_token_stream().to_string(),
        })
        .collect::<Vec<_>>()
        .join(" + ")
}

/// Flatten a `use` tree into alias → path entries
fn collect_use(tree: &UseTree, prefix: &mut Vec<String>, out: &mut BTreeMap<String, String>) {
    match tree {
        UseTree::Path(p) => {
            prefix.push(p.ident.to_string());
            collect_use(&p.tree, prefix, out);
            prefix.pop();
        }
        UseTree::Name(n) => {
            if n.ident == "self" {
                if let Some(parent) = prefix.last() {
                    out.insert(parent.clone(), prefix.join("::"));
                }
            } else {
                let alias = n.ident.to_string();
                out.insert(alias.clone(), join_path(prefix, &alias));
            }
        }
        UseTree::Rename(r) => {
            let target = if r.ident == "self" {
                prefix.join("::")
            } else {
                join_path(prefix, &r.ident.to_string())
            };
            if r.rename != "_" && !target.is_empty() {
                out.insert(r.rename.to_string(), target);
            }
        }
        UseTree::Glob(_) => {}
        UseTree::Group(g) => {
            for item in &g.items {
                collect_use(item, prefix, out);
            }
        }
    }
}

fn join_path(prefix: &[String], last: &str) -> String {
    if prefix.is_empty() {
        last.to_string()
    } else {
        format!("{}::{}", prefix.join("::"), last)
    }
}

/// Trimmed `///` and `#[doc = ".."]` lines
fn doc_lines(attrs: &[Attribute]) -> Vec<String> {
    attrs
        .iter()
        .filter(|a| a.path().is_ident("doc"))
        .filter_map(|a| match &a.meta {
            syn::Meta::NameValue(nv) => match &nv.value {
                syn::Expr::Lit(syn::ExprLit {
                    lit: syn::Lit::Str(s),
                    ..
                }) => Some(s.value()),
                _ => None,
            },
            _ => None,
        })
        .flat_map(|text| {
            text.lines()
                .map(|l| l.trim().to_string())
                .collect::<Vec<_>>()
        })
        .filter(|line| !line.is_empty())
        .collect()
}

/// Non-doc attributes with their top-level entries
fn attribute_metas(attrs: &[Attribute]) -> Vec<AttributeMeta> {
    attrs
        .iter()
        .filter(|a| !a.path().is_ident("doc"))
        .map(|attr| {
            let path = render_path(attr.path());
            match &attr.meta {
                syn::Meta::List(list) => {
                    let mut entries = Vec::new();
                    // Attributes that don't follow `key [= value]` syntax keep
                    // whatever entries were read before the first error.
                    let parsed = attr.parse_nested_meta(|meta| {
                        let key = render_path(&meta.path);
                        let value = if meta.input.peek(Token![=]) {
                            let expr: syn::Expr = meta.value()?.parse()?;
                            Some(expr_value(&expr))
                        } else {
                            skip_nested(&meta)?;
                            None
                        };
                        entries.push(MetaEntry { key, value });
                        Ok(())
                    });
                    if let Err(err) = parsed {
                        debug!(
                            attribute = %path,
                            kept = entries.len(),
                            error = %err,
                            "Stopped reading attribute entries"
                        );
                    }
                    AttributeMeta {
                        path,
                        entries,
                        raw: list.tokens.to_string(),
                    }
                }
                syn::Meta::NameValue(nv) => AttributeMeta {
                    path,
                    entries: Vec::new(),
                    raw: nv.value.to_token_stream().to_string(),
                },
                syn::Meta::Path(_) => AttributeMeta {
                    path,
                    entries: Vec::new(),
                    raw: String::new(),
                },
            }
        })
        .collect()
}

fn skip_nested(meta: &syn::meta::ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|inner| {
            if inner.input.peek(Token![=]) {
                let _: syn::Expr = inner.value()?.parse()?;
            } else {
                skip_nested(&inner)?;
            }
            Ok(())
        })?;
    }
    Ok(())
}

fn expr_value(expr: &syn::Expr) -> String {
    match expr {
        syn::Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Str(s),
            ..
        }) => s.value(),
        other => other.to_token_stream().to_string(),
    }
}

fn position_of(span: proc_macro2::Span) -> Position {
    let start = span.start();
    Position {
        line: start.line,
        column: start.column + 1,
    }
}
