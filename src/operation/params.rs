//! Request parameter parsing
//!
//! Parameters come from `--body` (a JSON object) and repeated
//! `--param Key=Value` flags. Values that parse as JSON are used as such,
//! anything else is sent as a string.

use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};

/// Parse a single `Key=Value` pair
pub fn parse_param(pair: &str) -> Result<(String, JsonValue)> {
    let (key, raw) = pair
        .split_once('=')
        .ok_or_else(|| Error::misuse(format!("Parameter '{pair}' must look like Key=Value")))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(Error::misuse(format!("Parameter '{pair}' has an empty name")));
    }

    let value = serde_json::from_str(raw).unwrap_or_else(|_| JsonValue::String(raw.to_string()));
    Ok((key.to_string(), value))
}

/// Build request parameters; `--param` values override keys from `--body`
pub fn parse_params(body: Option<&str>, pairs: &[String]) -> Result<JsonObject> {
    let mut params = match body {
        Some(raw) => match serde_json::from_str::<JsonValue>(raw)? {
            JsonValue::Object(map) => map,
            _ => return Err(Error::misuse("--body must be a JSON object")),
        },
        None => JsonObject::new(),
    };

    for pair in pairs {
        let (key, value) = parse_param(pair)?;
        params.insert(key, value);
    }
    Ok(params)
}
