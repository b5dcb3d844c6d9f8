//! Task-oriented HTTP request executor.
//!
//! # Overview
//! Given a declarative `RequestSpec` (method, URL, headers, body, redirect
//! policy, TLS material) the executor performs one logical HTTP operation,
//! optionally following a bounded redirect chain, and returns a
//! `TaskResult`: the decoded body with the final status code, or a
//! structured error with a stable `http_request/<kind>` identifier.
//!
//! # Design
//! - `Executor` is stateless apart from its `Transport`; nothing is cached
//!   or reused between invocations.
//! - Request formatting, URL resolution and body decoding are pure
//!   functions over plain data (`format`, `decode`, `http`).
//! - Only `transport::UreqTransport` touches the network, so the redirect
//!   loop is tested against a scripted transport.

pub mod decode;
pub mod error;
pub mod executor;
pub mod format;
pub mod http;
pub mod input;
pub mod tls;
pub mod transport;
pub mod types;

pub use error::TaskError;
pub use executor::Executor;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use tls::TlsOptions;
pub use transport::{Transport, UreqTransport};
pub use types::{RequestSpec, ResponseBody, TaskResult};
