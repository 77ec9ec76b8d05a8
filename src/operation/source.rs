//! `JsonOperation`: a catalog operation bound to a client and parameters

use super::types::{JsonRequest, JsonResponse};
use crate::catalog::ResolvedOperation;
use crate::error::{Error, Result, ServiceResult};
use crate::http::HttpClient;
use crate::loader::{OperationDefinition, PaginationDefinition, ServiceDefinition};
use crate::pagination::PageSource;
use crate::types::{JsonObject, JsonValue, JsonVersion};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Page source for one AWS JSON list/describe operation
#[derive(Debug, Clone)]
pub struct JsonOperation {
    client: Arc<HttpClient>,
    endpoint: String,
    target: String,
    json_version: JsonVersion,
    items_path: String,
    pagination: Option<PaginationDefinition>,
    params: JsonObject,
}

impl JsonOperation {
    /// Bind an operation to a client, an endpoint and request parameters.
    ///
    /// Fails when a required parameter is missing or when the parameters
    /// try to set a member the pager owns.
    pub fn new(
        client: Arc<HttpClient>,
        service: &ServiceDefinition,
        operation: &OperationDefinition,
        endpoint: impl Into<String>,
        params: JsonObject,
    ) -> Result<Self> {
        for required in &operation.required_params {
            if params.get(required).map_or(true, JsonValue::is_null) {
                return Err(Error::misuse(format!(
                    "{} requires parameter '{}'",
                    operation.alias, required
                )));
            }
        }

        if let Some(pagination) = &operation.pagination {
            if params.contains_key(&pagination.input_token) {
                return Err(Error::misuse(format!(
                    "Set '{}' with --next-token, not as a parameter",
                    pagination.input_token
                )));
            }
            if let Some(member) = &pagination.page_size_param {
                if params.contains_key(member) {
                    return Err(Error::misuse(format!(
                        "Set '{member}' with --page-size, not as a parameter"
                    )));
                }
            }
        }

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            target: service.target_for(operation),
            json_version: service.json_version,
            items_path: operation.items_path.clone(),
            pagination: operation.pagination.clone(),
            params,
        })
    }

    /// Bind a resolved catalog entry
    pub fn from_resolved(
        client: Arc<HttpClient>,
        resolved: ResolvedOperation<'_>,
        endpoint: impl Into<String>,
        params: JsonObject,
    ) -> Result<Self> {
        Self::new(
            client,
            resolved.service,
            resolved.operation,
            endpoint,
            params,
        )
    }

    /// Endpoint requests are sent to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// `X-Amz-Target` header value
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Bound request parameters
    pub fn params(&self) -> &JsonObject {
        &self.params
    }

    /// A single bound parameter
    pub fn param(&self, name: &str) -> Option<&JsonValue> {
        self.params.get(name)
    }
}

#[async_trait]
impl PageSource for JsonOperation {
    type Request = JsonRequest;
    type Response = JsonResponse;

    fn build_request(&self) -> JsonRequest {
        JsonRequest::new(
            self.params.clone(),
            self.pagination.as_ref().map(|p| p.input_token.clone()),
            self.pagination
                .as_ref()
                .and_then(|p| p.page_size_param.clone()),
        )
    }

    async fn invoke(&self, request: JsonRequest) -> ServiceResult<JsonResponse> {
        debug!(target_op = %self.target, endpoint = %self.endpoint, "Invoking operation");
        let body = self
            .client
            .call_json(
                &self.endpoint,
                &self.target,
                self.json_version,
                &request.into_body(),
            )
            .await?;

        JsonResponse::from_body(
            body,
            &self.items_path,
            self.pagination.as_ref().map(|p| p.output_token.as_str()),
        )
    }
}
