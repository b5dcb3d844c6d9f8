//! Parameter intake for the `http_request` binary.
//!
//! Parameters arrive as a JSON object on stdin. With empty stdin they are
//! collected from `PT_<name>` environment variables instead; string-typed
//! parameters are taken verbatim and the rest are parsed as JSON when
//! possible. `body` is only decoded as JSON when it holds an object or an
//! array, or when `PT_json_endpoint` is true; otherwise it stays raw text.

use std::io::Read;

use serde_json::{Map, Value};

use crate::error::TaskError;
use crate::types::RequestSpec;

const ENV_PREFIX: &str = "PT_";

const STRING_PARAMS: [&str; 6] = ["method", "base_url", "path", "cacert", "cert", "key"];

pub fn from_json(input: &str) -> Result<RequestSpec, TaskError> {
    serde_json::from_str(input).map_err(|e| TaskError::InvalidParameters(e.to_string()))
}

pub fn from_env<I>(vars: I) -> Result<RequestSpec, TaskError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut params = Map::new();
    let mut body = None;
    for (name, raw) in vars {
        let Some(param) = name.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        if param == "body" {
            body = Some(raw);
            continue;
        }
        let value = if STRING_PARAMS.contains(&param) {
            Value::String(raw)
        } else {
            serde_json::from_str(&raw).unwrap_or(Value::String(raw))
        };
        params.insert(param.to_string(), value);
    }
    if let Some(raw) = body {
        let json_endpoint = params.get("json_endpoint") == Some(&Value::Bool(true));
        params.insert("body".to_string(), env_body(raw, json_endpoint));
    }
    serde_json::from_value(Value::Object(params)).map_err(|e| TaskError::InvalidParameters(e.to_string()))
}

fn env_body(raw: String, json_endpoint: bool) -> Value {
    match serde_json::from_str::<Value>(&raw) {
        Ok(value) if json_endpoint || value.is_object() || value.is_array() => value,
        _ => Value::String(raw),
    }
}

/// Read parameters from `reader`, falling back to `vars` when it is empty.
pub fn read_spec<R, I>(mut reader: R, vars: I) -> Result<RequestSpec, TaskError>
where
    R: Read,
    I: IntoIterator<Item = (String, String)>,
{
    let mut input = String::new();
    reader
        .read_to_string(&mut input)
        .map_err(|e| TaskError::InvalidParameters(format!("cannot read stdin: {e}")))?;
    if input.trim().is_empty() {
        from_env(vars)
    } else {
        from_json(&input)
    }
}
