//! The request executor: normalize, send, follow redirects, decode.
//!
//! # Design
//! `Executor` owns only its `Transport` and keeps no state between calls.
//! Every invocation builds its own URL, headers and body, runs the
//! dispatch-and-redirect loop, and converts any `TaskError` into the error
//! variant of `TaskResult` at the boundary.

use log::{debug, warn};

use crate::decode::parse_response_body;
use crate::error::TaskError;
use crate::format::{format_body, format_headers, parse_url, resolve_redirect, resolve_target};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};
use crate::types::{RequestSpec, ResponseBody, TaskResult};

#[derive(Debug, Clone, Default)]
pub struct Executor<T = UreqTransport> {
    transport: T,
}

impl Executor<UreqTransport> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: Transport> Executor<T> {
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run the request described by `spec`. Never fails: errors become
    /// `TaskResult::Failure`.
    pub fn execute(&self, spec: &RequestSpec) -> TaskResult {
        match self.try_execute(spec) {
            Ok((body, status_code)) => TaskResult::Success { body, status_code },
            Err(err) => {
                warn!("{}: {err}", err.kind());
                err.into()
            }
        }
    }

    /// Run the request and return the decoded body with the final status.
    pub fn try_execute(&self, spec: &RequestSpec) -> Result<(ResponseBody, u16), TaskError> {
        let method: HttpMethod = spec.method.parse()?;
        let base = parse_url(&spec.base_url)?;
        let mut uri = resolve_target(&base, spec.path.as_deref())?;
        let body = format_body(spec.body.as_ref(), spec.json_endpoint)?;
        let headers = format_headers(&spec.headers, spec.json_endpoint);
        let max_redirects = spec.max_redirects();

        let mut redirects = 0;
        let response: HttpResponse = loop {
            let request = HttpRequest {
                method,
                url: uri.to_string(),
                headers: headers.clone(),
                body: body.clone(),
            };
            let tls = (uri.scheme() == "https").then_some(&spec.tls);
            let response = self.transport.send(&request, tls)?;

            if !response.is_redirect() || !spec.follow_redirects {
                break response;
            }
            if redirects >= max_redirects {
                return Err(TaskError::TooManyRedirects { max_redirects });
            }
            redirects += 1;

            let location = response.location().ok_or_else(|| TaskError::InvalidUrl {
                url: request.url.clone(),
                reason: format!("{} response has no Location header", response.status),
            })?;
            uri = resolve_redirect(location, &base)?;
            debug!("redirect {redirects}/{max_redirects}: {} -> {uri}", request.url);
        };

        let body = parse_response_body(&response, method, spec.json_endpoint)?;
        Ok((body, response.status))
    }
}
