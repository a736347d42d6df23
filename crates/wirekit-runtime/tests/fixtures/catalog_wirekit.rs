// Code generated by wirekit. DO NOT EDIT.
// wirekit:checksum:bc4d2fc0e8b374297ce153b54e3005fc8ba838530904d089cc2b2c9768214b8c
//! Request wrappers for module `catalog`.

#![allow(unused_imports, unused_mut, unused_variables, clippy::all)]

use super::*;
use wirekit_runtime::RawRequest;
use wirekit_runtime::RequestError;
use wirekit_runtime::ResponseWriter;
use wirekit_runtime::Validate;
use wirekit_runtime::decode_json;
use wirekit_runtime::handle_http_response;
use wirekit_runtime::handle_response;
use wirekit_runtime::parse_timestamp;
use wirekit_runtime::write_request_error;

fn parse_echo_scalars_request(r: &mut dyn RawRequest) -> Result<Scalars, RequestError> {
    let mut payload: Scalars = Default::default();
    if let Some(val) = r.query_value("i8").filter(|v| !v.is_empty()) {
        match val.parse::<i8>() {
            Ok(parsed) => payload.int8 = Some(parsed),
            Err(err) => return Err(RequestError::invalid_field("i8", err)),
        }
    }
    if let Some(val) = r.query_value("i16").filter(|v| !v.is_empty()) {
        match val.parse::<i16>() {
            Ok(parsed) => payload.int16 = Some(parsed),
            Err(err) => return Err(RequestError::invalid_field("i16", err)),
        }
    }
    if let Some(val) = r.query_value("i32").filter(|v| !v.is_empty()) {
        match val.parse::<i32>() {
            Ok(parsed) => payload.int32 = Some(parsed),
            Err(err) => return Err(RequestError::invalid_field("i32", err)),
        }
    }
    if let Some(val) = r.query_value("i64").filter(|v| !v.is_empty()) {
        match val.parse::<i64>() {
            Ok(parsed) => payload.int64 = Some(parsed),
            Err(err) => return Err(RequestError::invalid_field("i64", err)),
        }
    }
    if let Some(val) = r.query_value("i128").filter(|v| !v.is_empty()) {
        match val.parse::<i128>() {
            Ok(parsed) => payload.int128 = Some(parsed),
            Err(err) => return Err(RequestError::invalid_field("i128", err)),
        }
    }
    if let Some(val) = r.query_value("isize").filter(|v| !v.is_empty()) {
        match val.parse::<isize>() {
            Ok(parsed) => payload.int_size = Some(parsed),
            Err(err) => return Err(RequestError::invalid_field("isize", err)),
        }
    }
    if let Some(val) = r.query_value("u8").filter(|v| !v.is_empty()) {
        match val.parse::<u8>() {
            Ok(parsed) => payload.uint8 = Some(parsed),
            Err(err) => return Err(RequestError::invalid_field("u8", err)),
        }
    }
    if let Some(val) = r.query_value("u16").filter(|v| !v.is_empty()) {
        match val.parse::<u16>() {
            Ok(parsed) => payload.uint16 = Some(parsed),
            Err(err) => return Err(RequestError::invalid_field("u16", err)),
        }
    }
    if let Some(val) = r.query_value("u32").filter(|v| !v.is_empty()) {
        match val.parse::<u32>() {
            Ok(parsed) => payload.uint32 = Some(parsed),
            Err(err) => return Err(RequestError::invalid_field("u32", err)),
        }
    }
    if let Some(val) = r.query_value("u64").filter(|v| !v.is_empty()) {
        match val.parse::<u64>() {
            Ok(parsed) => payload.uint64 = Some(parsed),
            Err(err) => return Err(RequestError::invalid_field("u64", err)),
        }
    }
    if let Some(val) = r.query_value("u128").filter(|v| !v.is_empty()) {
        match val.parse::<u128>() {
            Ok(parsed) => payload.uint128 = Some(parsed),
            Err(err) => return Err(RequestError::invalid_field("u128", err)),
        }
    }
    if let Some(val) = r.query_value("usize").filter(|v| !v.is_empty()) {
        match val.parse::<usize>() {
            Ok(parsed) => payload.uint_size = Some(parsed),
            Err(err) => return Err(RequestError::invalid_field("usize", err)),
        }
    }
    if let Some(val) = r.query_value("f32").filter(|v| !v.is_empty()) {
        match val.parse::<f32>() {
            Ok(parsed) => payload.float32 = Some(parsed),
            Err(err) => return Err(RequestError::invalid_field("f32", err)),
        }
    }
    if let Some(val) = r.query_value("f64").filter(|v| !v.is_empty()) {
        match val.parse::<f64>() {
            Ok(parsed) => payload.float64 = Some(parsed),
            Err(err) => return Err(RequestError::invalid_field("f64", err)),
        }
    }
    if let Some(val) = r.query_value("bool").filter(|v| !v.is_empty()) {
        match val.parse::<bool>() {
            Ok(parsed) => payload.flag = Some(parsed),
            Err(err) => return Err(RequestError::invalid_field("bool", err)),
        }
    }
    if let Some(val) = r.query_value("char").filter(|v| !v.is_empty()) {
        match val.parse::<char>() {
            Ok(parsed) => payload.letter = Some(parsed),
            Err(err) => return Err(RequestError::invalid_field("char", err)),
        }
    }
    if let Some(val) = r.query_value("string").filter(|v| !v.is_empty()) {
        payload.text = Some(val.to_string());
    }
    if let Some(val) = r.query_value("at").filter(|v| !v.is_empty()) {
        match parse_timestamp(val) {
            Ok(parsed) => payload.at = Some(parsed),
            Err(err) => return Err(RequestError::invalid_field("at", err)),
        }
    }
    {
        let vals: Vec<&str> = r.query_values("ids");
        if !vals.is_empty() {
            let mut items = Vec::with_capacity(vals.len());
            for (i, val) in vals.into_iter().enumerate() {
                items.push(match val.parse::<u32>() {
                    Ok(parsed) => parsed,
                    Err(err) => return Err(RequestError::invalid_element("ids", i, err)),
                });
            }
            payload.ids = items;
        }
    }
    Ok(payload)
}

pub(crate) fn echo_scalars_wirekit(w: &mut dyn ResponseWriter, r: &mut dyn RawRequest) {
    let ctx = r.context();
    let payload = match parse_echo_scalars_request(r) {
        Ok(payload) => payload,
        Err(err) => {
            write_request_error(w, &err);
            return;
        }
    };
    let result = echo_scalars(ctx, payload);
    handle_response(w, result);
}

fn parse_create_item_request(r: &mut dyn RawRequest) -> Result<CreateItem, RequestError> {
    let mut payload: CreateItem = Default::default();
    if let Some(val) = r.query_value("dryRun").filter(|v| !v.is_empty()) {
        match val.parse::<bool>() {
            Ok(parsed) => payload.dry_run = parsed,
            Err(err) => return Err(RequestError::invalid_field("dryRun", err)),
        }
    }
    match r.header_value("X-Tenant").filter(|v| !v.is_empty()) {
        Some(val) => {
            payload.tenant = val.to_string();
        }
        None => {
            payload.tenant = "public".to_string();
        }
    }
    if let Some(val) = r.cookie("session").filter(|v| !v.is_empty()) {
        payload.session = Some(val.to_string());
    }
    if !r.body().is_empty() {
        payload.item = decode_json(r.body())?;
    }
    payload.validate().map_err(RequestError::validation)?;
    Ok(payload)
}

pub(crate) fn create_item_wirekit(w: &mut dyn ResponseWriter, r: &mut dyn RawRequest) {
    let ctx = r.context();
    let payload = match parse_create_item_request(r) {
        Ok(payload) => payload,
        Err(err) => {
            write_request_error(w, &err);
            return;
        }
    };
    let result = create_item(ctx, payload);
    handle_http_response(w, result);
}

fn parse_upload_request(r: &mut dyn RawRequest) -> Result<Upload, RequestError> {
    r.parse_multipart_form(33554432)?;
    let mut payload: Upload = Default::default();
    if let Some(val) = r.form_value("title").filter(|v| !v.is_empty()) {
        payload.title = val.to_string();
    }
    {
        let vals: Vec<&str> = r.form_values("label");
        if !vals.is_empty() {
            let mut items = Vec::with_capacity(vals.len());
            for val in vals {
                items.push(val.to_string());
            }
            payload.labels = items;
        }
    }
    if let Some(file) = r.form_file("attachment")? {
        payload.attachment = Some(file);
    }
    {
        let files = r.form_files("extra");
        if !files.is_empty() {
            payload.extras = files;
        }
    }
    match r.form_value("copies").filter(|v| !v.is_empty()) {
        Some(val) => {
            match val.parse::<u8>() {
                Ok(parsed) => payload.copies = parsed,
                Err(err) => return Err(RequestError::invalid_field("copies", err)),
            }
        }
        None => {
            match "1".parse::<u8>() {
                Ok(parsed) => payload.copies = parsed,
                Err(err) => return Err(RequestError::invalid_field("copies", err)),
            }
        }
    }
    Ok(payload)
}

pub(crate) fn upload_wirekit(w: &mut dyn ResponseWriter, r: &mut dyn RawRequest) {
    let ctx = r.context();
    let payload = match parse_upload_request(r) {
        Ok(payload) => payload,
        Err(err) => {
            write_request_error(w, &err);
            return;
        }
    };
    let result = upload(ctx, payload);
    handle_response(w, result);
}

impl Importer {
    fn parse_import_batch_request(r: &mut dyn RawRequest) -> Result<Import, RequestError> {
        let mut payload: Import = if r.body().is_empty() {
            Default::default()
        } else {
            decode_json(r.body())?
        };
        if let Some(val) = r.path_value("batch").filter(|v| !v.is_empty()) {
            match val.parse::<u32>() {
                Ok(parsed) => payload.batch = parsed,
                Err(err) => return Err(RequestError::invalid_field("batch", err)),
            }
        }
        if let Some(val) = r.query_value("page").filter(|v| !v.is_empty()) {
            match val.parse::<u16>() {
                Ok(parsed) => payload.paging.page = parsed,
                Err(err) => return Err(RequestError::invalid_field("page", err)),
            }
        }
        match r.query_value("per_page").filter(|v| !v.is_empty()) {
            Some(val) => {
                match val.parse::<usize>() {
                    Ok(parsed) => payload.paging.per_page = parsed,
                    Err(err) => return Err(RequestError::invalid_field("per_page", err)),
                }
            }
            None => {
                match "20".parse::<usize>() {
                    Ok(parsed) => payload.paging.per_page = parsed,
                    Err(err) => return Err(RequestError::invalid_field("per_page", err)),
                }
            }
        }
        payload.raw = r.body().to_vec().into();
        Ok(payload)
    }

    pub(crate) fn import_batch_wirekit(&mut self, w: &mut dyn ResponseWriter, r: &mut dyn RawRequest) {
        let ctx = r.context();
        let payload = match Self::parse_import_batch_request(r) {
            Ok(payload) => payload,
            Err(err) => {
                write_request_error(w, &err);
                return;
            }
        };
        let result = self.import_batch(&ctx, payload, &*r);
        handle_response(w, result);
    }
}
