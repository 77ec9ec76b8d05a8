//! Tests for YAML loader module

use super::*;
use crate::error::Error;
use crate::pagination::BudgetMode;
use crate::types::JsonVersion;

const MINIMAL: &str = r#"
name: test-service
target_prefix: TestService_20200101
endpoint: https://test.{region}.amazonaws.com
operations:
  - name: list-widgets
    alias: Get-Widget
    action: ListWidgets
    items_path: Widgets
    pagination:
      page_size_param: MaxResults
      max_page_size: 100
"#;

// ============================================================================
// Basic Loading Tests
// ============================================================================

#[test]
fn test_load_minimal_service() {
    let def = load_service_from_str(MINIMAL).unwrap();
    assert_eq!(def.name, "test-service");
    assert_eq!(def.target_prefix, "TestService_20200101");
    assert_eq!(def.json_version, JsonVersion::V1_1);
    assert_eq!(def.operations.len(), 1);

    let op = &def.operations[0];
    assert_eq!(op.alias, "Get-Widget");
    assert!(op.required_params.is_empty());
    assert!(op.is_paginated());
}

#[test]
fn test_pagination_defaults() {
    let def = load_service_from_str(MINIMAL).unwrap();
    let pagination = def.operations[0].pagination.as_ref().unwrap();

    assert_eq!(pagination.input_token, "NextToken");
    assert_eq!(pagination.output_token, "NextToken");
    assert_eq!(pagination.max_page_size, Some(100));
    assert_eq!(pagination.mode, BudgetMode::Downstream);
}

#[test]
fn test_endpoint_and_target() {
    let def = load_service_from_str(MINIMAL).unwrap();
    assert_eq!(
        def.endpoint_for("eu-west-1"),
        "https://test.eu-west-1.amazonaws.com"
    );
    assert_eq!(
        def.target_for(&def.operations[0]),
        "TestService_20200101.ListWidgets"
    );
}

#[test]
fn test_operation_lookup_is_case_insensitive() {
    let def = load_service_from_str(MINIMAL).unwrap();
    assert!(def.operation("get-widget").is_some());
    assert!(def.operation("LIST-WIDGETS").is_some());
    assert!(def.operation("Get-Gadget").is_none());
}

#[test]
fn test_fetch_options_from_pagination() {
    let def = load_service_from_str(MINIMAL).unwrap();
    let options = def.operations[0].fetch_options();
    assert_eq!(options.max_page_size, Some(100));
    assert!(!options.manual_control);
}

#[test]
fn test_unpaginated_operation_is_single_call() {
    let yaml = r#"
name: test-service
target_prefix: Test
json_version: "1.0"
endpoint: https://test.example.com
operations:
  - name: get-settings
    alias: Get-Setting
    action: GetSettings
    items_path: settings
"#;
    let def = load_service_from_str(yaml).unwrap();
    assert_eq!(def.json_version, JsonVersion::V1_0);

    let op = &def.operations[0];
    assert!(!op.is_paginated());
    assert!(op.fetch_options().manual_control);
}

// ============================================================================
// Validation Tests
// ============================================================================

#[test]
fn test_reject_bad_alias() {
    let yaml = MINIMAL.replace("Get-Widget", "get_widget");
    let err = load_service_from_str(&yaml).unwrap_err();
    assert!(err.to_string().contains("Verb-Noun"));
}

#[test]
fn test_reject_duplicate_alias() {
    let yaml = format!(
        "{MINIMAL}  - name: list-other\n    alias: get-widget\n    action: ListOther\n    items_path: Other\n"
    );
    let err = load_service_from_str(&yaml).unwrap_err();
    assert!(err.to_string().contains("Duplicate operation alias"));
}

#[test]
fn test_reject_zero_max_page_size() {
    let yaml = MINIMAL.replace("max_page_size: 100", "max_page_size: 0");
    let err = load_service_from_str(&yaml).unwrap_err();
    assert!(matches!(err, Error::InvalidConfigValue { .. }));
}

#[test]
fn test_reject_max_page_size_without_param() {
    let yaml = MINIMAL.replace("      page_size_param: MaxResults\n", "");
    let err = load_service_from_str(&yaml).unwrap_err();
    assert!(err.to_string().contains("page_size_param"));
}

#[test]
fn test_reject_invalid_endpoint() {
    let yaml = MINIMAL.replace("https://test.{region}.amazonaws.com", "not a url");
    assert!(load_service_from_str(&yaml).is_err());
}

#[test]
fn test_reject_non_http_endpoint() {
    let yaml = MINIMAL.replace("https://", "ftp://");
    let err = load_service_from_str(&yaml).unwrap_err();
    assert!(err.to_string().contains("http(s)"));
}

#[test]
fn test_reject_no_operations() {
    let yaml = r#"
name: empty
target_prefix: Test
endpoint: https://test.example.com
operations: []
"#;
    assert!(load_service_from_str(yaml).is_err());
}

#[test]
fn test_reject_malformed_yaml() {
    let err = load_service_from_str("name: [unclosed").unwrap_err();
    assert!(err.to_string().contains("Failed to parse service YAML"));
}

// ============================================================================
// File / Built-in Loading Tests
// ============================================================================

#[test]
fn test_load_builtin_by_name() {
    let def = load_service("cloudhsmv2").unwrap();
    assert_eq!(def.target_prefix, "BaldrApiService");
    assert!(def.operation("Get-HSM2Backup").is_some());
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("widgets.yaml");
    std::fs::write(&path, MINIMAL).unwrap();

    let def = load_service(&path).unwrap();
    assert_eq!(def.name, "test-service");
}

#[test]
fn test_load_missing_file_lists_builtins() {
    let err = load_service("./does-not-exist.yaml").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("not found"));
    assert!(message.contains("devicefarm"));
}
