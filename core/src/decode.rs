//! Response body decoding.
//!
//! Bytes are decoded strictly with the charset declared in `Content-Type`
//! (WHATWG labels), defaulting to UTF-8. Malformed input and unknown
//! labels surface as `encoding-error` rather than being replaced.

use encoding_rs::{Encoding, UTF_8};

use crate::error::TaskError;
use crate::http::{HttpMethod, HttpResponse};
use crate::types::ResponseBody;

pub fn decode_body(bytes: &[u8], charset: Option<&str>) -> Result<String, TaskError> {
    let encoding = match charset {
        Some(label) => Encoding::for_label(label.as_bytes()).ok_or_else(|| TaskError::Encoding {
            charset: label.to_string(),
            reason: "unknown charset".to_string(),
        })?,
        None => UTF_8,
    };
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
        .ok_or_else(|| TaskError::Encoding {
            charset: charset.unwrap_or("utf-8").to_string(),
            reason: "invalid byte sequence".to_string(),
        })
}

/// Whether the response cannot carry a body: any `HEAD` response, and
/// `204 No Content` / `304 Not Modified`.
pub fn is_bodiless(response: &HttpResponse, method: HttpMethod) -> bool {
    method == HttpMethod::Head || matches!(response.status, 204 | 304)
}

/// Decode a final response into the result body.
///
/// Bodiless responses are returned as empty text in raw mode and as `null`
/// in JSON-endpoint mode. Any other empty body is parsed like the rest, so
/// JSON-endpoint mode reports it as a parse error.
pub fn parse_response_body(
    response: &HttpResponse,
    method: HttpMethod,
    json_endpoint: bool,
) -> Result<ResponseBody, TaskError> {
    if is_bodiless(response, method) {
        return Ok(if json_endpoint {
            ResponseBody::Json(serde_json::Value::Null)
        } else {
            ResponseBody::Text(String::new())
        });
    }

    let text = decode_body(&response.body, response.charset())?;
    if json_endpoint {
        Ok(ResponseBody::Json(serde_json::from_str(&text)?))
    } else {
        Ok(ResponseBody::Text(text))
    }
}
