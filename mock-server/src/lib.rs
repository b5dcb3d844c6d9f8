//! httpbin-style echo server used to exercise the request executor over
//! real HTTP.
//!
//! Echo routes reflect the method, query, headers and body back as JSON.
//! Redirect routes issue `302 Found` chains with absolute or relative
//! `Location` values, and the encoding routes serve bodies in declared
//! charsets so response decoding can be checked end to end.

use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    extract::{Path, Query},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpListener;

/// Echo payload returned by `/get`, `/post`, `/anything` and friends.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub url: String,
    pub args: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub data: String,
    pub json: Option<Value>,
}

#[derive(Deserialize)]
pub struct RedirectTo {
    pub url: String,
    pub status_code: Option<u16>,
}

/// Body served by `/encoding/latin1`, before encoding.
pub const LATIN1_TEXT: &str = "caf\u{e9} cr\u{e8}me br\u{fb}l\u{e9}e";

pub fn app() -> Router {
    Router::new()
        .route("/get", get(echo))
        .route("/post", any(echo))
        .route("/put", any(echo))
        .route("/patch", any(echo))
        .route("/delete", any(echo))
        .route("/anything", any(echo))
        .route("/anything/{*rest}", any(echo))
        .route("/headers", any(headers))
        .route("/redirect-to", any(redirect_to))
        .route("/absolute-redirect/{n}", any(absolute_redirect))
        .route("/relative-redirect/{n}", any(relative_redirect))
        .route("/status/{code}", any(status))
        .route("/encoding/utf8", get(encoding_utf8))
        .route("/encoding/latin1", get(encoding_latin1))
        .route("/encoding/invalid", get(encoding_invalid))
        .route("/encoding/unknown", get(encoding_unknown))
        .route("/html", get(html))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Canonicalize a lowercase header name the way httpbin reports it
/// (`content-type` -> `Content-Type`).
pub fn title_case(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

fn header_map(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .map(|(k, v)| (title_case(k.as_str()), String::from_utf8_lossy(v.as_bytes()).into_owned()))
        .collect()
}

fn host(headers: &HeaderMap) -> String {
    headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost")
        .to_string()
}

async fn echo(
    method: Method,
    uri: Uri,
    Query(args): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Echo> {
    let data = String::from_utf8_lossy(&body).into_owned();
    let json = serde_json::from_slice(&body).ok();
    Json(Echo {
        method: method.to_string(),
        url: format!("http://{}{}", host(&headers), uri),
        args,
        headers: header_map(&headers),
        data,
        json,
    })
}

async fn headers(headers: HeaderMap) -> Json<Value> {
    Json(serde_json::json!({ "headers": header_map(&headers) }))
}

fn found(location: String, status: StatusCode) -> Response {
    let mut response = status.into_response();
    if let Ok(value) = HeaderValue::from_str(&location) {
        response.headers_mut().insert(header::LOCATION, value);
    }
    response
}

async fn redirect_to(Query(params): Query<RedirectTo>) -> Response {
    let status = params
        .status_code
        .and_then(|code| StatusCode::from_u16(code).ok())
        .filter(|code| code.is_redirection())
        .unwrap_or(StatusCode::FOUND);
    found(params.url, status)
}

async fn absolute_redirect(Path(n): Path<u32>, headers: HeaderMap) -> Response {
    let host = host(&headers);
    let location = if n <= 1 {
        format!("http://{host}/get")
    } else {
        format!("http://{host}/absolute-redirect/{}", n - 1)
    };
    found(location, StatusCode::FOUND)
}

async fn relative_redirect(Path(n): Path<u32>) -> Response {
    let location = if n <= 1 {
        "/get".to_string()
    } else {
        format!("/relative-redirect/{}", n - 1)
    };
    found(location, StatusCode::FOUND)
}

async fn status(Path(code): Path<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}

async fn encoding_utf8() -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "\u{2713} unicode \u{263a}",
    )
        .into_response()
}

/// Latin-1 is a byte-per-codepoint encoding for U+0000..U+00FF.
async fn encoding_latin1() -> Response {
    let bytes: Vec<u8> = LATIN1_TEXT.chars().map(|c| c as u32 as u8).collect();
    (
        [(header::CONTENT_TYPE, "text/plain; charset=ISO-8859-1")],
        bytes,
    )
        .into_response()
}

async fn encoding_invalid() -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        vec![0x66u8, 0x6f, 0xff, 0xfe],
    )
        .into_response()
}

async fn encoding_unknown() -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=x-no-such-charset")],
        "plain ascii",
    )
        .into_response()
}

async fn html() -> Response {
    (
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        "<!doctype html><html><body>not json</body></html>",
    )
        .into_response()
}
