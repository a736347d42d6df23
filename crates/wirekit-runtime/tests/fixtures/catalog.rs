//! Handlers covering every built-in codec and input source.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wirekit_runtime::{
    ApiError, Context, FieldError, FileHeader, HttpResponse, RawRequest, Validate, Wirekit,
};

#[path = "catalog_wirekit.rs"]
pub mod catalog_wirekit;

/// wirekit:dto
#[derive(Debug, Default, Wirekit)]
pub struct Scalars {
    /// in: query i8
    pub int8: Option<i8>,
    /// in: query i16
    pub int16: Option<i16>,
    /// in: query i32
    pub int32: Option<i32>,
    /// in: query i64
    pub int64: Option<i64>,
    /// in: query i128
    pub int128: Option<i128>,
    /// in: query isize
    pub int_size: Option<isize>,
    /// in: query u8
    pub uint8: Option<u8>,
    /// in: query u16
    pub uint16: Option<u16>,
    /// in: query u32
    pub uint32: Option<u32>,
    /// in: query u64
    pub uint64: Option<u64>,
    /// in: query u128
    pub uint128: Option<u128>,
    /// in: query usize
    pub uint_size: Option<usize>,
    /// in: query f32
    pub float32: Option<f32>,
    /// in: query f64
    pub float64: Option<f64>,
    /// in: query bool
    pub flag: Option<bool>,
    /// in: query char
    pub letter: Option<char>,
    /// in: query string
    pub text: Option<String>,
    /// in: query
    pub at: Option<DateTime<Utc>>,
    #[wirekit(query = "ids")]
    pub ids: Vec<u32>,
}

/// wirekit:dto
#[derive(Debug, Default, Wirekit)]
pub struct CreateItem {
    /// in: cookie session
    pub session: Option<String>,
    /// in: header X-Ignored
    #[wirekit(header = "X-Tenant", default = "public")]
    pub tenant: String,
    #[wirekit(query = "dryRun")]
    pub dry_run: bool,
    /// in: body
    #[wirekit(validate = "required")]
    pub item: NewItem,
}

#[derive(Debug, Default, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub price: f64,
}

impl Validate for CreateItem {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        if self.item.name.trim().is_empty() {
            return Err(vec![FieldError::new("name", "is required")]);
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct Item {
    pub name: String,
    pub price: f64,
    pub tenant: String,
}

/// wirekit:dto
#[derive(Debug, Default)]
pub struct Upload {
    /// in: form
    pub title: String,
    /// in: form label
    pub labels: Vec<String>,
    pub attachment: Option<FileHeader>,
    /// in: form extra
    pub extras: Vec<FileHeader>,
    /// in: form
    /// default: 1
    pub copies: u8,
}

#[derive(Debug, Serialize)]
pub struct UploadSummary {
    pub title: String,
    pub labels: Vec<String>,
    pub attachment: Option<String>,
    pub attachment_size: usize,
    pub extras: Vec<String>,
    pub copies: u8,
}

/// wirekit:dto
#[derive(Debug, Default, Deserialize, Wirekit)]
#[serde(default)]
pub struct Import {
    #[serde(rename = "sourceName")]
    pub source: String,
    /// in: path
    pub batch: u32,
    #[wirekit(flatten)]
    #[serde(skip)]
    pub paging: Paging,
    #[wirekit(raw_body)]
    #[serde(skip)]
    pub raw: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct Paging {
    /// in: query
    pub page: u16,
    /// in: query per_page
    /// default: 20
    pub per_page: usize,
}

#[derive(Debug, Serialize)]
pub struct ImportSummary {
    pub source: String,
    pub batch: u32,
    pub page: u16,
    pub per_page: usize,
    pub raw_len: usize,
    pub content_type: Option<String>,
    pub imported: usize,
}

fn put<T: ToString>(out: &mut BTreeMap<String, String>, name: &str, value: Option<T>) {
    if let Some(value) = value {
        out.insert(name.to_string(), value.to_string());
    }
}

/// wirekit:handler
pub fn echo_scalars(_ctx: Context, req: Scalars) -> Result<BTreeMap<String, String>, ApiError> {
    let mut out = BTreeMap::new();
    put(&mut out, "i8", req.int8);
    put(&mut out, "i16", req.int16);
    put(&mut out, "i32", req.int32);
    put(&mut out, "i64", req.int64);
    put(&mut out, "i128", req.int128);
    put(&mut out, "isize", req.int_size);
    put(&mut out, "u8", req.uint8);
    put(&mut out, "u16", req.uint16);
    put(&mut out, "u32", req.uint32);
    put(&mut out, "u64", req.uint64);
    put(&mut out, "u128", req.uint128);
    put(&mut out, "usize", req.uint_size);
    put(&mut out, "f32", req.float32);
    put(&mut out, "f64", req.float64);
    put(&mut out, "bool", req.flag);
    put(&mut out, "char", req.letter);
    put(&mut out, "string", req.text);
    put(&mut out, "at", req.at.map(|at| at.to_rfc3339()));
    if !req.ids.is_empty() {
        let ids: Vec<String> = req.ids.iter().map(u32::to_string).collect();
        out.insert("ids".to_string(), ids.join(","));
    }
    Ok(out)
}

/// wirekit:handler
pub fn create_item(_ctx: Context, req: CreateItem) -> Result<HttpResponse<Item>, ApiError> {
    if req.session.is_none() {
        return Err(ApiError::unauthorized("session cookie required"));
    }
    if req.item.name == "taken" {
        return Err(ApiError::conflict("item name taken").with_details(serde_json::json!({
            "name": req.item.name,
        })));
    }
    let status = if req.dry_run { 200 } else { 201 };
    let location = format!("/items/{}", req.item.name);
    Ok(HttpResponse::new(
        status,
        Item {
            name: req.item.name,
            price: req.item.price,
            tenant: req.tenant,
        },
    )
    .with_header("Location", location))
}

/// wirekit:handler
pub fn upload(_ctx: Context, req: Upload) -> Result<UploadSummary, ApiError> {
    Ok(UploadSummary {
        title: req.title,
        labels: req.labels,
        attachment: req.attachment.as_ref().map(|file| file.filename.clone()),
        attachment_size: req.attachment.as_ref().map_or(0, FileHeader::size),
        extras: req.extras.into_iter().map(|file| file.filename).collect(),
        copies: req.copies,
    })
}

#[derive(Debug, Default)]
pub struct Importer {
    pub imported: usize,
}

impl Importer {
    /// wirekit:handler
    pub fn import_batch(
        &mut self,
        _ctx: &Context,
        req: Import,
        r: &dyn RawRequest,
    ) -> Result<ImportSummary, ApiError> {
        if req.source.is_empty() {
            return Err(ApiError::unprocessable_entity("sourceName is required"));
        }
        self.imported += 1;
        Ok(ImportSummary {
            source: req.source,
            batch: req.batch,
            page: req.paging.page,
            per_page: req.paging.per_page,
            raw_len: req.raw.len(),
            content_type: r.header_value("Content-Type").map(str::to_string),
            imported: self.imported,
        })
    }
}
