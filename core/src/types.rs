//! Parameter set and result shapes exchanged with the external harness.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::TaskError;
use crate::tls::TlsOptions;

/// Redirect limit used when `follow_redirects` is set without
/// `max_redirects`.
pub const DEFAULT_MAX_REDIRECTS: u32 = 20;

/// One HTTP operation as described by the harness.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RequestSpec {
    /// Verb name, any case. Validated when the request is executed.
    pub method: String,
    pub base_url: String,
    #[serde(default)]
    pub path: Option<String>,
    /// Raw text, or any JSON value when `json_endpoint` is set.
    #[serde(default)]
    pub body: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub json_endpoint: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub follow_redirects: bool,
    #[serde(default)]
    pub max_redirects: Option<u32>,
    #[serde(flatten)]
    pub tls: TlsOptions,
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl RequestSpec {
    pub fn new(method: &str, base_url: &str) -> Self {
        Self {
            method: method.to_string(),
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    pub fn max_redirects(&self) -> u32 {
        self.max_redirects.unwrap_or(DEFAULT_MAX_REDIRECTS)
    }
}

/// Decoded response body: UTF-8 text, or parsed JSON in JSON-endpoint mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Text(String),
    Json(Value),
}

impl ResponseBody {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseBody::Text(text) => Some(text),
            ResponseBody::Json(_) => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }
}

/// The single output of an invocation.
///
/// Serializes as `{"body": ..., "status_code": ...}` on success and as
/// `{"_error": {"msg": ..., "kind": ..., "details": {...}}}` on failure.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskResult {
    Success {
        body: ResponseBody,
        status_code: u16,
    },
    Failure {
        message: String,
        kind: String,
        details: Value,
    },
}

impl TaskResult {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskResult::Success { .. })
    }

    /// Error kind for failures, e.g. `http_request/connect-error`.
    pub fn kind(&self) -> Option<&str> {
        match self {
            TaskResult::Failure { kind, .. } => Some(kind),
            TaskResult::Success { .. } => None,
        }
    }
}

impl From<TaskError> for TaskResult {
    fn from(err: TaskError) -> Self {
        TaskResult::Failure {
            message: err.to_string(),
            kind: err.kind(),
            details: err.details(),
        }
    }
}

#[derive(Serialize)]
struct ErrorPayload<'a> {
    msg: &'a str,
    kind: &'a str,
    details: &'a Value,
}

impl Serialize for TaskResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TaskResult::Success { body, status_code } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("body", body)?;
                map.serialize_entry("status_code", status_code)?;
                map.end()
            }
            TaskResult::Failure {
                message,
                kind,
                details,
            } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(
                    "_error",
                    &ErrorPayload {
                        msg: message,
                        kind,
                        details,
                    },
                )?;
                map.end()
            }
        }
    }
}
