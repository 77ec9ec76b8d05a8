//! Tests for the HTTP client module

use super::*;
use crate::error::ServiceError;
use crate::types::{BackoffType, JsonVersion};
use reqwest::StatusCode;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_client() -> HttpClient {
    let config = HttpClientConfig::builder()
        .no_rate_limit()
        .max_retries(2)
        .backoff(
            BackoffType::Constant,
            Duration::from_millis(5),
            Duration::from_millis(20),
        )
        .build();
    HttpClient::with_config(config).unwrap()
}

#[test]
fn test_http_client_config_default() {
    let config = HttpClientConfig::default();
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.max_retries, 3);
    assert!(config.rate_limit.is_some());
    assert!(config.user_agent.starts_with("service-pager/"));
}

#[test]
fn test_http_client_config_builder() {
    let config = HttpClientConfig::builder()
        .timeout(Duration::from_secs(60))
        .max_retries(5)
        .backoff(
            BackoffType::Linear,
            Duration::from_millis(200),
            Duration::from_secs(30),
        )
        .header("X-Custom", "value")
        .user_agent("test-agent/1.0")
        .build();

    assert_eq!(config.timeout, Duration::from_secs(60));
    assert_eq!(config.max_retries, 5);
    assert_eq!(config.backoff_type, BackoffType::Linear);
    assert_eq!(config.initial_backoff, Duration::from_millis(200));
    assert_eq!(config.max_backoff, Duration::from_secs(30));
    assert_eq!(
        config.default_headers.get("X-Custom"),
        Some(&"value".to_string())
    );
    assert_eq!(config.user_agent, "test-agent/1.0");
}

#[test]
fn test_calculate_backoff() {
    let config = HttpClientConfig::builder()
        .backoff(
            BackoffType::Exponential,
            Duration::from_millis(100),
            Duration::from_millis(500),
        )
        .build();
    let client = HttpClient::with_config(config).unwrap();

    assert_eq!(client.calculate_backoff(0), Duration::from_millis(100));
    assert_eq!(client.calculate_backoff(1), Duration::from_millis(200));
    assert_eq!(client.calculate_backoff(2), Duration::from_millis(400));
    assert_eq!(client.calculate_backoff(3), Duration::from_millis(500));
    assert_eq!(client.calculate_backoff(40), Duration::from_millis(500));
}

#[test]
fn test_parse_error_namespaced_code() {
    let body = r#"{"__type":"com.amazonaws.cloudhsmv2#CloudHsmResourceNotFoundException","message":"no such cluster"}"#;
    let err = parse_error(StatusCode::BAD_REQUEST, None, body);

    match err {
        ServiceError::Api {
            status,
            code,
            message,
        } => {
            assert_eq!(status, 400);
            assert_eq!(code, "CloudHsmResourceNotFoundException");
            assert_eq!(message, "no such cluster");
        }
        other => panic!("Expected Api error, got {other:?}"),
    }
}

#[test]
fn test_parse_error_header_code_and_uri_suffix() {
    let err = parse_error(
        StatusCode::BAD_REQUEST,
        Some("ArgumentException:http://internal.amazon.com/coral/"),
        r#"{"Message":"bad arn"}"#,
    );
    assert_eq!(err.code(), Some("ArgumentException"));
    assert!(err.to_string().contains("bad arn"));
}

#[test]
fn test_parse_error_throttling() {
    let err = parse_error(
        StatusCode::BAD_REQUEST,
        None,
        r#"{"__type":"ThrottlingException","message":"Rate exceeded"}"#,
    );
    assert!(matches!(err, ServiceError::Throttled { .. }));
    assert!(err.is_retryable());
}

#[test]
fn test_parse_error_non_json_body() {
    let err = parse_error(StatusCode::BAD_GATEWAY, None, "upstream down");
    assert_eq!(err.code(), Some("InternalFailure"));
    assert!(err.to_string().contains("upstream down"));
}

#[tokio::test]
async fn test_call_json_sends_protocol_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("X-Amz-Target", "BaldrApiService.DescribeBackups"))
        .and(header("Content-Type", "application/x-amz-json-1.1"))
        .and(body_json(json!({"MaxResults": 10})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Backups": [{"BackupId": "backup-1"}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = fast_client();
    let body = client
        .call_json(
            &mock_server.uri(),
            "BaldrApiService.DescribeBackups",
            JsonVersion::V1_1,
            &json!({"MaxResults": 10}),
        )
        .await
        .unwrap();

    assert_eq!(body["Backups"][0]["BackupId"], "backup-1");
}

#[tokio::test]
async fn test_call_json_default_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("X-Forwarded-Signer", "proxy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .no_rate_limit()
        .header("X-Forwarded-Signer", "proxy")
        .build();
    let client = HttpClient::with_config(config).unwrap();

    client
        .call_json(&mock_server.uri(), "Svc.Op", JsonVersion::V1_0, &json!({}))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_call_json_empty_body_is_empty_document() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let body = fast_client()
        .call_json(&mock_server.uri(), "Svc.Op", JsonVersion::V1_1, &json!({}))
        .await
        .unwrap();
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn test_call_json_client_error_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "__type": "ValidationException",
            "message": "1 validation error detected"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = fast_client()
        .call_json(&mock_server.uri(), "Svc.Op", JsonVersion::V1_1, &json!({}))
        .await
        .unwrap_err();

    assert_eq!(err.code(), Some("ValidationException"));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_call_json_retries_throttling() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "__type": "ThrottlingException",
            "message": "Rate exceeded"
        })))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&mock_server)
        .await;

    let body = fast_client()
        .call_json(&mock_server.uri(), "Svc.Op", JsonVersion::V1_1, &json!({}))
        .await
        .unwrap();
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn test_call_json_gives_up_after_retries() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;

    let err = fast_client()
        .call_json(&mock_server.uri(), "Svc.Op", JsonVersion::V1_1, &json!({}))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Api { status: 503, .. }));
}

#[tokio::test]
async fn test_call_json_malformed_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let err = fast_client()
        .call_json(&mock_server.uri(), "Svc.Op", JsonVersion::V1_1, &json!({}))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Malformed { .. }));
}

#[test]
fn test_client_debug_reports_rate_limiting() {
    let limited = format!("{:?}", HttpClient::new().unwrap());
    assert!(limited.contains("rate_limited: true"));

    let unlimited = format!("{:?}", fast_client());
    assert!(unlimited.contains("rate_limited: false"));
}
