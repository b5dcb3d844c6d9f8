//! Pure helpers that turn a `RequestSpec` into request parts.

use std::collections::BTreeMap;

use serde_json::Value;
use url::{ParseError, Url};

use crate::error::TaskError;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Serialize the body for the wire.
///
/// Strings pass through untouched and `null` counts as no body. Any other
/// JSON value is only accepted in JSON-endpoint mode.
pub fn format_body(body: Option<&Value>, json_endpoint: bool) -> Result<Option<String>, TaskError> {
    match body {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(value) if json_endpoint => Ok(Some(value.to_string())),
        Some(_) => Err(TaskError::BodyType),
    }
}

/// Merge user headers over the defaults. Header names compare
/// case-insensitively, so an explicit `content-type` replaces the JSON
/// default.
pub fn format_headers(headers: &BTreeMap<String, String>, json_endpoint: bool) -> Vec<(String, String)> {
    let mut merged: Vec<(String, String)> = Vec::new();
    if json_endpoint {
        merged.push(("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string()));
    }
    for (name, value) in headers {
        match merged.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some(existing) => *existing = (name.clone(), value.clone()),
            None => merged.push((name.clone(), value.clone())),
        }
    }
    merged
}

pub fn parse_url(url: &str) -> Result<Url, TaskError> {
    Url::parse(url).map_err(|e| invalid_url(url, e))
}

/// Combine the base URL and optional path by relative-reference
/// resolution. An empty or absent path leaves the base unchanged.
pub fn resolve_target(base: &Url, path: Option<&str>) -> Result<Url, TaskError> {
    match path {
        None | Some("") => Ok(base.clone()),
        Some(path) => base.join(path).map_err(|e| invalid_url(path, e)),
    }
}

/// Resolve a `Location` value. Relative locations are anchored on the
/// request's original base URL, never on an intermediate hop.
pub fn resolve_redirect(location: &str, original_base: &Url) -> Result<Url, TaskError> {
    match Url::parse(location) {
        Ok(url) => Ok(url),
        Err(ParseError::RelativeUrlWithoutBase) => original_base
            .join(location)
            .map_err(|e| invalid_url(location, e)),
        Err(e) => Err(invalid_url(location, e)),
    }
}

fn invalid_url(url: &str, err: ParseError) -> TaskError {
    TaskError::InvalidUrl {
        url: url.to_string(),
        reason: err.to_string(),
    }
}
