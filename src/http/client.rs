//! HTTP client for AWS JSON protocol calls
//!
//! Every call is a `POST /` whose body is a JSON document and whose
//! operation is named by the `X-Amz-Target` header. The client handles:
//! - Automatic retries with configurable backoff
//! - Rate limiting to stay clear of service throttling
//! - Mapping AWS error documents onto [`ServiceError`]

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::error::{is_throttling_code, Error, Result, ServiceError, ServiceResult};
use crate::types::{BackoffType, JsonVersion, StringMap};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Header naming the operation in the AWS JSON protocol
pub const TARGET_HEADER: &str = "X-Amz-Target";

/// Header some services use for the error code instead of the body
const ERROR_TYPE_HEADER: &str = "x-amzn-errortype";

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout
    pub timeout: Duration,
    /// Maximum number of retries
    pub max_retries: u32,
    /// Initial delay for backoff
    pub initial_backoff: Duration,
    /// Maximum delay for backoff
    pub max_backoff: Duration,
    /// Type of backoff strategy
    pub backoff_type: BackoffType,
    /// Rate limiter configuration
    pub rate_limit: Option<RateLimiterConfig>,
    /// Headers added to every request
    pub default_headers: StringMap,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(20),
            backoff_type: BackoffType::Exponential,
            rate_limit: Some(RateLimiterConfig::default()),
            default_headers: StringMap::new(),
            user_agent: format!("service-pager/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set max retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set backoff configuration
    pub fn backoff(mut self, backoff_type: BackoffType, initial: Duration, max: Duration) -> Self {
        self.config.backoff_type = backoff_type;
        self.config.initial_backoff = initial;
        self.config.max_backoff = max;
        self
    }

    /// Set rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Disable rate limiting
    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit = None;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// HTTP client with retry and rate limiting
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    rate_limiter: Option<RateLimiter>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("rate_limited", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// Client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Invoke one JSON protocol operation and return the decoded response
    /// document
    pub async fn call_json(
        &self,
        url: &str,
        target: &str,
        version: JsonVersion,
        body: &Value,
    ) -> ServiceResult<Value> {
        let max_retries = self.config.max_retries;
        let payload = body.to_string();

        let mut last_error = None;
        let mut attempt = 0;

        while attempt <= max_retries {
            if let Some(ref limiter) = self.rate_limiter {
                limiter.wait().await;
            }

            let mut req = self
                .client
                .post(url)
                .header(CONTENT_TYPE, version.content_type())
                .header(TARGET_HEADER, target);

            for (key, value) in &self.config.default_headers {
                req = req.header(key.as_str(), value.as_str());
            }

            match req.body(payload.clone()).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        debug!("Call succeeded: {target}");
                        return decode_body(response).await;
                    }

                    let retry_after = extract_retry_after(&response);
                    let error = error_from_response(response).await;

                    if error.is_retryable() && attempt < max_retries {
                        let delay = retry_after.unwrap_or_else(|| self.calculate_backoff(attempt));
                        warn!(
                            "{target} failed with {}, attempt {}/{}, retrying in {:?}",
                            status.as_u16(),
                            attempt + 1,
                            max_retries + 1,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        last_error = Some(error);
                        continue;
                    }

                    return Err(error);
                }
                Err(e) => {
                    if e.is_timeout() {
                        let timeout_ms = self.config.timeout.as_millis() as u64;
                        if attempt < max_retries {
                            let delay = self.calculate_backoff(attempt);
                            warn!(
                                "{target} timed out, attempt {}/{}, retrying in {:?}",
                                attempt + 1,
                                max_retries + 1,
                                delay
                            );
                            tokio::time::sleep(delay).await;
                            attempt += 1;
                            last_error = Some(ServiceError::Timeout { timeout_ms });
                            continue;
                        }
                        return Err(ServiceError::Timeout { timeout_ms });
                    }

                    if e.is_connect() && attempt < max_retries {
                        let delay = self.calculate_backoff(attempt);
                        warn!(
                            "Connection error, attempt {}/{}, retrying in {:?}",
                            attempt + 1,
                            max_retries + 1,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        last_error = Some(ServiceError::Transport(e));
                        continue;
                    }

                    return Err(ServiceError::Transport(e));
                }
            }
        }

        Err(last_error.unwrap_or(ServiceError::MaxRetriesExceeded { max_retries }))
    }

    /// Calculate backoff delay for a given attempt
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let delay = match self.config.backoff_type {
            BackoffType::Constant => self.config.initial_backoff,
            BackoffType::Linear => self.config.initial_backoff * (attempt + 1),
            BackoffType::Exponential => {
                let factor = 2u32.saturating_pow(attempt);
                self.config.initial_backoff.saturating_mul(factor)
            }
        };

        std::cmp::min(delay, self.config.max_backoff)
    }
}

/// Decode a successful response; an empty body is an empty document
async fn decode_body(response: Response) -> ServiceResult<Value> {
    let text = response.text().await?;
    if text.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    serde_json::from_str(&text)
        .map_err(|e| ServiceError::malformed(format!("response is not valid JSON: {e}")))
}

async fn error_from_response(response: Response) -> ServiceError {
    let status = response.status();
    let header_code = response
        .headers()
        .get(ERROR_TYPE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let body = response.text().await.unwrap_or_default();
    parse_error(status, header_code.as_deref(), &body)
}

/// Build a [`ServiceError`] from an AWS JSON error response
pub fn parse_error(status: StatusCode, header_code: Option<&str>, body: &str) -> ServiceError {
    let document: Option<Value> = serde_json::from_str(body).ok();
    let field = |names: &[&str]| -> Option<String> {
        let doc = document.as_ref()?;
        names
            .iter()
            .find_map(|name| doc.get(*name).and_then(Value::as_str))
            .map(String::from)
    };

    let code = header_code
        .map(String::from)
        .or_else(|| field(&["__type", "code", "Code"]))
        .map(|raw| sanitize_error_code(&raw))
        .unwrap_or_else(|| fallback_code(status).to_string());
    let message = field(&["message", "Message", "errorMessage"]).unwrap_or_else(|| body.to_string());

    if status == StatusCode::TOO_MANY_REQUESTS || is_throttling_code(&code) {
        ServiceError::Throttled { code, message }
    } else {
        ServiceError::Api {
            status: status.as_u16(),
            code,
            message,
        }
    }
}

/// Strip the namespace (`ns#Code`) and any trailing `:uri` from an error code
fn sanitize_error_code(raw: &str) -> String {
    let without_uri = raw.split(':').next().unwrap_or(raw);
    without_uri
        .rsplit('#')
        .next()
        .unwrap_or(without_uri)
        .to_string()
}

fn fallback_code(status: StatusCode) -> &'static str {
    if status == StatusCode::TOO_MANY_REQUESTS {
        "TooManyRequestsException"
    } else if status.is_server_error() {
        "InternalFailure"
    } else {
        "UnknownError"
    }
}

/// Extract retry-after header value
fn extract_retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs)
}
