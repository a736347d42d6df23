// Code generated by wirekit. DO NOT EDIT.
// wirekit:checksum:6f10ef3f2f15ac0f2378f08f11567489402de6e7d71425f882c7b61d77fccf64
//! Request wrappers for module `users`.

#![allow(unused_imports, unused_mut, unused_variables, clippy::all)]

use super::*;
use wirekit_runtime::RawRequest;
use wirekit_runtime::RequestError;
use wirekit_runtime::ResponseWriter;
use wirekit_runtime::handle_response;
use wirekit_runtime::write_request_error;

fn parse_get_user_request(r: &mut dyn RawRequest) -> Result<GetUser, RequestError> {
    let mut payload: GetUser = Default::default();
    if let Some(val) = r.path_value("id").filter(|v| !v.is_empty()) {
        match val.parse::<u64>() {
            Ok(parsed) => payload.id = parsed,
            Err(err) => return Err(RequestError::invalid_field("id", err)),
        }
    }
    if let Some(val) = r.query_value("verbose").filter(|v| !v.is_empty()) {
        match val.parse::<bool>() {
            Ok(parsed) => payload.verbose = Some(parsed),
            Err(err) => return Err(RequestError::invalid_field("verbose", err)),
        }
    }
    if let Some(val) = r.header_value("X-Request-Id").filter(|v| !v.is_empty()) {
        payload.request_id = val.to_string();
    }
    Ok(payload)
}

pub(crate) fn get_user_wirekit(w: &mut dyn ResponseWriter, r: &mut dyn RawRequest) {
    let ctx = r.context();
    let payload = match parse_get_user_request(r) {
        Ok(payload) => payload,
        Err(err) => {
            write_request_error(w, &err);
            return;
        }
    };
    let result = get_user(&ctx, payload);
    handle_response(w, result);
}

impl Directory {
    fn parse_search_request(r: &mut dyn RawRequest) -> Result<SearchUsers, RequestError> {
        let mut payload: SearchUsers = Default::default();
        if let Some(val) = r.query_value("q").filter(|v| !v.is_empty()) {
            payload.filter = val.to_string();
        }
        match r.query_value("limit").filter(|v| !v.is_empty()) {
            Some(val) => {
                match val.parse::<u32>() {
                    Ok(parsed) => payload.limit = parsed,
                    Err(err) => return Err(RequestError::invalid_field("limit", err)),
                }
            }
            None => {
                match "10".parse::<u32>() {
                    Ok(parsed) => payload.limit = parsed,
                    Err(err) => return Err(RequestError::invalid_field("limit", err)),
                }
            }
        }
        {
            let vals: Vec<&str> = r.query_values("tags");
            if !vals.is_empty() {
                let mut items = Vec::with_capacity(vals.len());
                for val in vals {
                    items.push(val.to_string());
                }
                payload.tags = items;
            }
        }
        Ok(payload)
    }

    pub(crate) fn search_wirekit(&self, w: &mut dyn ResponseWriter, r: &mut dyn RawRequest) {
        let ctx = r.context();
        let payload = match Self::parse_search_request(r) {
            Ok(payload) => payload,
            Err(err) => {
                write_request_error(w, &err);
                return;
            }
        };
        let result = self.search(ctx, &payload, &mut *w);
        handle_response(w, result);
    }
}
