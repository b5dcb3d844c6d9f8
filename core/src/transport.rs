//! The seam between the executor and the network.
//!
//! # Design
//! `Transport` sends exactly one request and hands back the raw response;
//! it never follows redirects and never treats an HTTP status as a failure.
//! `UreqTransport` builds a fresh agent for every call so nothing (pooled
//! connections, TLS state) outlives a single attempt.

use log::debug;
use ureq::http;

use crate::error::TaskError;
use crate::http::{HttpRequest, HttpResponse};
use crate::tls::TlsOptions;

/// Upper bound on a response body read into memory.
pub const MAX_RESPONSE_SIZE: u64 = 64 * 1024 * 1024;

pub trait Transport {
    /// Send one request. `tls` is only given for `https` targets.
    fn send(&self, request: &HttpRequest, tls: Option<&TlsOptions>) -> Result<HttpResponse, TaskError>;
}

/// Blocking transport backed by `ureq`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqTransport;

impl UreqTransport {
    fn agent(&self, tls: Option<&TlsOptions>) -> Result<ureq::Agent, TaskError> {
        let mut config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0)
            .max_redirects_will_error(false);
        if let Some(tls) = tls {
            config = config.tls_config(tls.to_ureq_config()?);
        }
        Ok(config.build().new_agent())
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest, tls: Option<&TlsOptions>) -> Result<HttpResponse, TaskError> {
        let agent = self.agent(tls)?;
        let connect_error = |message: String| TaskError::Connect {
            uri: request.url.clone(),
            message,
        };

        let mut builder = http::Request::builder()
            .method(request.method.as_str())
            .uri(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let result = match &request.body {
            Some(body) => builder
                .body(body.clone().into_bytes())
                .map(|req| agent.run(req)),
            None => builder.body(()).map(|req| agent.run(req)),
        };
        let mut response = result
            .map_err(|e| connect_error(e.to_string()))?
            .map_err(|e| connect_error(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .body_mut()
            .with_config()
            .limit(MAX_RESPONSE_SIZE)
            .read_to_vec()
            .map_err(|e| TaskError::ResponseRead {
                uri: request.url.clone(),
                message: e.to_string(),
            })?;
        debug!("{} {} -> {} ({} bytes)", request.method, request.url, status, body.len());

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
