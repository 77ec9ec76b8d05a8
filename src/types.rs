//! Common types used throughout service-pager
//!
//! Shared type aliases and small enums used by more than one module.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// Generic key-value map with string keys and values
pub type StringMap = HashMap<String, String>;

// ============================================================================
// Backoff Type
// ============================================================================

/// Backoff strategy between transport retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}

// ============================================================================
// JSON Protocol Version
// ============================================================================

/// AWS JSON protocol version spoken by a service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JsonVersion {
    /// `application/x-amz-json-1.0`
    #[serde(rename = "1.0")]
    V1_0,
    /// `application/x-amz-json-1.1`
    #[default]
    #[serde(rename = "1.1")]
    V1_1,
}

impl JsonVersion {
    /// Content type header value for this protocol version
    pub fn content_type(self) -> &'static str {
        match self {
            JsonVersion::V1_0 => "application/x-amz-json-1.0",
            JsonVersion::V1_1 => "application/x-amz-json-1.1",
        }
    }
}

impl fmt::Display for JsonVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonVersion::V1_0 => write!(f, "1.0"),
            JsonVersion::V1_1 => write!(f, "1.1"),
        }
    }
}

// ============================================================================
// Path Lookup
// ============================================================================

/// Get a nested value by dot-notation path (e.g., "Cluster.Hsms")
pub fn lookup_path<'a>(value: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    if path.is_empty() || path == "$" {
        return Some(value);
    }

    let mut current = value;
    for part in path.split('.') {
        match current {
            JsonValue::Object(map) => current = map.get(part)?,
            JsonValue::Array(items) => current = items.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        }
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_type_serde() {
        let parsed: BackoffType = serde_yaml::from_str("linear").unwrap();
        assert_eq!(parsed, BackoffType::Linear);
        assert_eq!(BackoffType::default(), BackoffType::Exponential);
    }

    #[test]
    fn test_json_version() {
        let parsed: JsonVersion = serde_yaml::from_str("\"1.0\"").unwrap();
        assert_eq!(parsed, JsonVersion::V1_0);
        assert_eq!(JsonVersion::V1_1.content_type(), "application/x-amz-json-1.1");
        assert_eq!(JsonVersion::default().to_string(), "1.1");
    }

    #[test]
    fn test_lookup_path() {
        let value = serde_json::json!({
            "Cluster": {"Hsms": [{"HsmId": "hsm-1"}, {"HsmId": "hsm-2"}]},
            "NextToken": null
        });

        assert_eq!(lookup_path(&value, "$"), Some(&value));
        assert_eq!(
            lookup_path(&value, "Cluster.Hsms.1.HsmId"),
            Some(&serde_json::json!("hsm-2"))
        );
        assert_eq!(
            lookup_path(&value, "$.Cluster.Hsms.0.HsmId"),
            Some(&serde_json::json!("hsm-1"))
        );
        assert_eq!(lookup_path(&value, "NextToken"), Some(&JsonValue::Null));
        assert_eq!(lookup_path(&value, "Cluster.Missing"), None);
        assert_eq!(lookup_path(&value, "Cluster.Hsms.x"), None);
    }
}
