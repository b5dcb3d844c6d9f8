//! Error taxonomy for the request executor.
//!
//! # Design
//! Every anticipated failure is a `TaskError` variant. Each variant carries
//! a human-readable message (its `Display`), a stable machine-readable kind
//! under the `http_request/` namespace, and a small JSON `details` object.
//! The executor converts these into the error variant of `TaskResult` at its
//! outer boundary, so callers never see an unstructured failure.

use serde_json::{json, Value};
use thiserror::Error;

/// Namespace prefixed to every error kind.
pub const KIND_NAMESPACE: &str = "http_request";

/// Errors raised anywhere in the request pipeline.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The method name is not one of the supported verbs.
    #[error("Invalid method '{0}': expected one of GET, POST, PUT, PATCH, DELETE, HEAD, OPTIONS")]
    InvalidMethod(String),

    /// A non-string body was supplied without JSON-endpoint mode.
    #[error("body must be a String when json_endpoint is false")]
    BodyType,

    /// The base URL, path, or a redirect location could not be turned into
    /// an absolute URL.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// DNS, TCP, TLS handshake, or any other transport failure.
    #[error("Failed to connect to {uri}: {message}")]
    Connect { uri: String, message: String },

    /// The connection was made but the response body could not be read,
    /// including bodies over the size limit. Reported as `connect-error`.
    #[error("Failed to read response from {uri}: {message}")]
    ResponseRead { uri: String, message: String },

    /// The redirect chain is longer than `max_redirects`.
    #[error("Too many redirects (max: {max_redirects})")]
    TooManyRedirects { max_redirects: u32 },

    /// The response body is not valid JSON in JSON-endpoint mode.
    #[error("Unable to parse response body as JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The response body is not valid in its declared charset.
    #[error("Unable to decode response body as {charset}: {reason}")]
    Encoding { charset: String, reason: String },

    /// CA bundle, client certificate, or key could not be loaded.
    #[error("Invalid TLS configuration for {field}: {reason}")]
    TlsConfig { field: &'static str, reason: String },

    /// The parameter set handed over by the harness is malformed.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
}

impl TaskError {
    /// The kind identifier without namespace, e.g. `connect-error`.
    pub fn code(&self) -> &'static str {
        match self {
            TaskError::InvalidMethod(_) => "invalid-method",
            TaskError::BodyType => "body-type-error",
            TaskError::InvalidUrl { .. } => "invalid-url",
            TaskError::Connect { .. } | TaskError::ResponseRead { .. } => "connect-error",
            TaskError::TooManyRedirects { .. } => "too-many-redirects-error",
            TaskError::JsonParse(_) => "json-parse-error",
            TaskError::Encoding { .. } => "encoding-error",
            TaskError::TlsConfig { .. } => "tls-config-error",
            TaskError::InvalidParameters(_) => "invalid-parameters",
        }
    }

    /// The namespaced kind, e.g. `http_request/connect-error`.
    pub fn kind(&self) -> String {
        format!("{KIND_NAMESPACE}/{}", self.code())
    }

    /// Structured context for the error, always a JSON object.
    pub fn details(&self) -> Value {
        match self {
            TaskError::InvalidMethod(method) => json!({ "method": method }),
            TaskError::InvalidUrl { url, .. } => json!({ "url": url }),
            TaskError::Connect { uri, .. } | TaskError::ResponseRead { uri, .. } => {
                json!({ "uri": uri })
            }
            TaskError::TooManyRedirects { max_redirects } => {
                json!({ "max_redirects": max_redirects })
            }
            TaskError::Encoding { charset, .. } => json!({ "charset": charset }),
            TaskError::TlsConfig { field, .. } => json!({ "field": field }),
            TaskError::BodyType | TaskError::JsonParse(_) | TaskError::InvalidParameters(_) => {
                json!({})
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_namespaced() {
        assert_eq!(
            TaskError::TooManyRedirects { max_redirects: 3 }.kind(),
            "http_request/too-many-redirects-error"
        );
        assert_eq!(TaskError::BodyType.kind(), "http_request/body-type-error");
        assert_eq!(
            TaskError::InvalidMethod("FETCH".into()).kind(),
            "http_request/invalid-method"
        );
    }

    #[test]
    fn too_many_redirects_message_includes_limit() {
        let err = TaskError::TooManyRedirects { max_redirects: 3 };
        assert_eq!(err.to_string(), "Too many redirects (max: 3)");
        assert_eq!(err.details()["max_redirects"], 3);
    }

    #[test]
    fn connect_message_includes_uri() {
        let err = TaskError::Connect {
            uri: "http://127.0.0.1:9/".into(),
            message: "connection refused".into(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to connect to http://127.0.0.1:9/: connection refused"
        );
        assert_eq!(err.details()["uri"], "http://127.0.0.1:9/");
    }

    #[test]
    fn body_read_failure_is_a_connect_error_with_its_own_message() {
        let err = TaskError::ResponseRead {
            uri: "http://127.0.0.1:9/big".into(),
            message: "body exceeds limit".into(),
        };
        assert_eq!(err.kind(), "http_request/connect-error");
        assert_eq!(
            err.to_string(),
            "Failed to read response from http://127.0.0.1:9/big: body exceeds limit"
        );
        assert_eq!(err.details()["uri"], "http://127.0.0.1:9/big");
    }

    #[test]
    fn json_parse_wraps_parser_message() {
        let parse_err = serde_json::from_str::<Value>("not json").unwrap_err();
        let expected = parse_err.to_string();
        let err = TaskError::from(parse_err);
        assert_eq!(err.code(), "json-parse-error");
        assert!(err.to_string().ends_with(&expected));
    }

    #[test]
    fn details_is_always_an_object() {
        let errors = [
            TaskError::BodyType,
            TaskError::InvalidParameters("x".into()),
            TaskError::TlsConfig { field: "cacert", reason: "missing".into() },
        ];
        for err in errors {
            assert!(err.details().is_object(), "{}", err.code());
        }
    }
}
