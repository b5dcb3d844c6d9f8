//! C-ABI wrapper around `http-task-core`.
//!
//! # Overview
//! Exposes the request executor through `extern "C"` functions so any
//! language with a C FFI can run an HTTP task: pass the parameter set as a
//! JSON string, receive the task output as a JSON string.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - A single `FfiTaskResult` envelope conveys success and every error
//!   uniformly; the C caller owns it and must release it with
//!   `http_task_free_result`.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::catch_unwind;

use http_task_core::{input, Executor, TaskResult};

pub use types::*;

/// Run one HTTP task described by the JSON object in `params`.
///
/// Never returns null. The caller must free the result with
/// `http_task_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn http_task_execute(params: *const c_char) -> *mut FfiTaskResult {
    catch_unwind(|| {
        if params.is_null() {
            return FfiTaskResult::null_arg("params");
        }
        let Ok(params) = unsafe { CStr::from_ptr(params) }.to_str() else {
            return FfiTaskResult::invalid_utf8();
        };
        let result = match input::from_json(params) {
            Ok(spec) => Executor::new().execute(&spec),
            Err(err) => TaskResult::from(err),
        };
        FfiTaskResult::from_result(&result)
    })
    .unwrap_or_else(|_| FfiTaskResult::panic("panic inside http_task_execute"))
}

/// Free a result returned by `http_task_execute`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn http_task_free_result(result: *mut FfiTaskResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.json.is_null() {
            drop(unsafe { CString::from_raw(result.json) });
        }
    });
}

/// Version of this library as a static NUL-terminated string.
#[unsafe(no_mangle)]
pub extern "C" fn http_task_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}
