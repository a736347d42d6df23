//! Handlers mounted by the generated wrapper tests.

use std::fmt;

use serde::Serialize;
use wirekit_runtime::{Context, ResponseError, ResponseWriter};

#[path = "users_wirekit.rs"]
pub mod users_wirekit;

/// wirekit:dto
#[derive(Debug, Default)]
pub struct GetUser {
    /// in: path
    pub id: u64,
    /// in: query
    pub verbose: Option<bool>,
    /// in: header X-Request-Id
    pub request_id: String,
}

/// wirekit:dto
#[derive(Debug, Default)]
pub struct SearchUsers {
    /// in: query q
    pub filter: String,
    /// in: query
    /// default: 10
    pub limit: u32,
    /// in: query
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub verbose: bool,
    pub request_id: String,
}

#[derive(Debug)]
pub struct ApiError(pub u16);

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "api error {}", self.0)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> Option<u16> {
        Some(self.0)
    }
}

/// wirekit:handler
pub fn get_user(ctx: &Context, req: GetUser) -> Result<User, ApiError> {
    if req.id == 0 {
        return Err(ApiError(404));
    }
    Ok(User {
        id: req.id,
        name: ctx.value("user").unwrap_or("anonymous").to_string(),
        verbose: req.verbose.unwrap_or(false),
        request_id: req.request_id,
    })
}

pub struct Directory {
    pub names: Vec<String>,
}

impl Directory {
    /// wirekit:handler
    pub fn search(
        &self,
        _ctx: Context,
        req: &SearchUsers,
        w: &mut dyn ResponseWriter,
    ) -> Result<Vec<String>, ApiError> {
        w.set_header("X-Tags", &req.tags.join(","));
        Ok(self
            .names
            .iter()
            .filter(|name| name.contains(&req.filter))
            .take(req.limit as usize)
            .cloned()
            .collect())
    }
}
