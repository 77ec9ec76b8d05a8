//! Request and response shapes for AWS JSON operations

use crate::error::{ServiceError, ServiceResult};
use crate::pagination::{normalize_token, PageRequest, PageResponse};
use crate::types::{lookup_path, JsonObject, JsonValue};

// ============================================================================
// Request
// ============================================================================

/// One page request: the JSON body plus the members the pager may set
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRequest {
    /// Request body sent to the service
    pub body: JsonObject,
    token_member: Option<String>,
    page_size_member: Option<String>,
}

impl JsonRequest {
    /// Create a request from body parameters
    pub fn new(
        body: JsonObject,
        token_member: Option<String>,
        page_size_member: Option<String>,
    ) -> Self {
        Self {
            body,
            token_member,
            page_size_member,
        }
    }

    /// Consume the request, returning the body as a JSON value
    pub fn into_body(self) -> JsonValue {
        JsonValue::Object(self.body)
    }
}

impl PageRequest for JsonRequest {
    fn set_continuation_token(&mut self, token: Option<String>) {
        let Some(member) = &self.token_member else {
            return;
        };
        match token {
            Some(token) => {
                self.body.insert(member.clone(), JsonValue::String(token));
            }
            None => {
                self.body.remove(member);
            }
        }
    }

    fn supports_page_size(&self) -> bool {
        self.page_size_member.is_some()
    }

    fn set_page_size(&mut self, size: i32) {
        if let Some(member) = &self.page_size_member {
            self.body.insert(member.clone(), JsonValue::from(size));
        }
    }
}

// ============================================================================
// Response
// ============================================================================

/// One decoded page
#[derive(Debug, Clone, PartialEq)]
pub struct JsonResponse {
    body: JsonValue,
    items: Vec<JsonValue>,
    next_token: Option<String>,
}

impl JsonResponse {
    /// Decode a response body.
    ///
    /// A missing or null items member is an empty page; a single object
    /// counts as one item.
    pub fn from_body(
        body: JsonValue,
        items_path: &str,
        token_member: Option<&str>,
    ) -> ServiceResult<Self> {
        if !body.is_object() {
            return Err(ServiceError::malformed(format!(
                "expected a JSON object, got {}",
                kind_of(&body)
            )));
        }

        let items = match lookup_path(&body, items_path) {
            None | Some(JsonValue::Null) => Vec::new(),
            Some(JsonValue::Array(items)) => items.clone(),
            Some(item) => vec![item.clone()],
        };

        let next_token = match token_member.and_then(|member| lookup_path(&body, member)) {
            None | Some(JsonValue::Null) => None,
            Some(JsonValue::String(token)) => normalize_token(Some(token)),
            Some(other) => {
                return Err(ServiceError::malformed(format!(
                    "continuation token must be a string, got {}",
                    kind_of(other)
                )))
            }
        };

        Ok(Self {
            body,
            items,
            next_token,
        })
    }

    /// Full response body
    pub fn body(&self) -> &JsonValue {
        &self.body
    }

    /// Items on this page
    pub fn items(&self) -> &[JsonValue] {
        &self.items
    }

    /// Consume the response, returning the full body
    pub fn into_body(self) -> JsonValue {
        self.body
    }
}

impl PageResponse for JsonResponse {
    type Item = JsonValue;

    fn item_count(&self) -> usize {
        self.items.len()
    }

    fn next_token(&self) -> Option<&str> {
        self.next_token.as_deref()
    }

    fn into_items(self) -> Vec<JsonValue> {
        self.items
    }
}

fn kind_of(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
