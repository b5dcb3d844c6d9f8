//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! The result envelope carries a status code for quick branching in C and
//! the full `TaskResult` rendered as JSON, so the C side never has to mirror
//! the body's shape. Conversion functions live here to keep `lib.rs`
//! focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use http_task_core::{TaskError, TaskResult};

/// Outcome codes returned in `FfiTaskResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    /// The task produced an `_error` result; see `json` for the kind.
    Task = 1,
    NullArg = 2,
    InvalidUtf8 = 3,
    Panic = 4,
}

/// Result envelope for `http_task_execute`.
///
/// `json` is always a NUL-terminated JSON document in the task output shape:
/// `{"body", "status_code"}` on success, `{"_error": {...}}` otherwise.
/// `status_code` is the final HTTP status on success and 0 otherwise.
#[repr(C)]
pub struct FfiTaskResult {
    pub error_code: FfiErrorCode,
    pub status_code: u16,
    pub json: *mut c_char,
}

impl FfiTaskResult {
    pub(crate) fn from_result(result: &TaskResult) -> *mut Self {
        let (error_code, status_code) = match result {
            TaskResult::Success { status_code, .. } => (FfiErrorCode::Ok, *status_code),
            TaskResult::Failure { .. } => (FfiErrorCode::Task, 0),
        };
        let json = serde_json::to_string(result).unwrap_or_else(|e| {
            serde_json::json!({
                "_error": {
                    "msg": format!("cannot serialize result: {e}"),
                    "kind": "http_request/ffi-error",
                    "details": {}
                }
            })
            .to_string()
        });
        Self::boxed(error_code, status_code, &json)
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        let result = TaskResult::from(TaskError::InvalidParameters(format!("null argument: {name}")));
        Self::with_code(FfiErrorCode::NullArg, &result)
    }

    pub(crate) fn invalid_utf8() -> *mut Self {
        let result = TaskResult::from(TaskError::InvalidParameters(
            "parameters are not valid UTF-8".to_string(),
        ));
        Self::with_code(FfiErrorCode::InvalidUtf8, &result)
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        let json = serde_json::json!({
            "_error": {
                "msg": msg,
                "kind": "http_request/panic",
                "details": {}
            }
        });
        Self::boxed(FfiErrorCode::Panic, 0, &json.to_string())
    }

    fn with_code(error_code: FfiErrorCode, result: &TaskResult) -> *mut Self {
        let json = serde_json::to_string(result).unwrap_or_default();
        Self::boxed(error_code, 0, &json)
    }

    fn boxed(error_code: FfiErrorCode, status_code: u16, json: &str) -> *mut Self {
        let json = CString::new(json).unwrap_or_default().into_raw();
        Box::into_raw(Box::new(FfiTaskResult {
            error_code,
            status_code,
            json,
        }))
    }
}
