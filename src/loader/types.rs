//! Loader types
//!
//! Declarative service definition types for YAML parsing.

use crate::pagination::{BudgetMode, FetchOptions};
use crate::types::JsonVersion;
use serde::{Deserialize, Serialize};

/// Placeholder substituted with the region in endpoint templates
pub const REGION_PLACEHOLDER: &str = "{region}";

// ============================================================================
// Service Definition
// ============================================================================

/// Top-level service definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ServiceDefinition {
    /// Service name (e.g., "cloudhsmv2")
    pub name: String,
    /// Human-readable title
    #[serde(default)]
    pub title: Option<String>,
    /// Prefix of the `X-Amz-Target` header (e.g., "BaldrApiService")
    pub target_prefix: String,
    /// JSON protocol version
    #[serde(default)]
    pub json_version: JsonVersion,
    /// Endpoint template; `{region}` is replaced at call time
    pub endpoint: String,
    /// Operations exposed by this service
    pub operations: Vec<OperationDefinition>,
}

impl ServiceDefinition {
    /// Resolve the endpoint for a region
    pub fn endpoint_for(&self, region: &str) -> String {
        self.endpoint.replace(REGION_PLACEHOLDER, region)
    }

    /// Full `X-Amz-Target` value for an operation
    pub fn target_for(&self, operation: &OperationDefinition) -> String {
        format!("{}.{}", self.target_prefix, operation.action)
    }

    /// Find an operation by name or alias (case-insensitive)
    pub fn operation(&self, name: &str) -> Option<&OperationDefinition> {
        self.operations.iter().find(|op| op.matches(name))
    }
}

// ============================================================================
// Operation Definition
// ============================================================================

/// A single list/describe operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OperationDefinition {
    /// Operation name within the service (e.g., "describe-backups")
    pub name: String,
    /// Command alias in Verb-Noun form (e.g., "Get-HSM2Backup")
    pub alias: String,
    /// API action name (e.g., "DescribeBackups")
    pub action: String,
    /// Short description
    #[serde(default)]
    pub description: Option<String>,
    /// Dotted path to the result items in the response
    pub items_path: String,
    /// Parameters the request must carry
    #[serde(default)]
    pub required_params: Vec<String>,
    /// Pagination settings; absent for single-call operations
    #[serde(default)]
    pub pagination: Option<PaginationDefinition>,
}

impl OperationDefinition {
    /// Check a name or alias against this operation
    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name) || self.alias.eq_ignore_ascii_case(name)
    }

    /// Whether the operation returns more than one page
    pub fn is_paginated(&self) -> bool {
        self.pagination.is_some()
    }

    /// Default fetch options for this operation
    pub fn fetch_options(&self) -> FetchOptions {
        match &self.pagination {
            Some(pagination) => FetchOptions {
                max_page_size: pagination.max_page_size,
                budget_mode: pagination.mode,
                ..Default::default()
            },
            // One call is all there is
            None => FetchOptions::new().with_manual_control(true),
        }
    }
}

// ============================================================================
// Pagination Definition
// ============================================================================

/// How an operation pages its results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PaginationDefinition {
    /// Request member carrying the continuation token
    #[serde(default = "default_token_member")]
    pub input_token: String,
    /// Response member carrying the continuation token
    #[serde(default = "default_token_member")]
    pub output_token: String,
    /// Request member carrying the page size, if the operation has one
    #[serde(default)]
    pub page_size_param: Option<String>,
    /// Largest page size the service accepts
    #[serde(default)]
    pub max_page_size: Option<i32>,
    /// Budget policy used when the caller sets a budget
    #[serde(default)]
    pub mode: BudgetMode,
}

fn default_token_member() -> String {
    "NextToken".to_string()
}
