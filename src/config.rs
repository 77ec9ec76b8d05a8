//! Runtime settings
//!
//! Settings come from built-in defaults, an optional YAML file, the
//! environment and CLI flags, in that order of precedence. The last two
//! are applied by the CLI through [`Settings::with_overrides`].

use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::loader::ServiceDefinition;
use crate::types::{BackoffType, StringMap};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

// ============================================================================
// Settings
// ============================================================================

/// Runtime settings for service calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// AWS region substituted into endpoint templates
    #[serde(default = "default_region")]
    pub region: String,

    /// Endpoint used instead of the service template (e.g., a local mock)
    #[serde(default)]
    pub endpoint_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Transport retries per page request
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff between retries
    #[serde(default)]
    pub backoff: BackoffSettings,

    /// Client-side rate limit; `null` disables it
    #[serde(default = "default_rate_limit")]
    pub rate_limit: Option<RateLimiterConfig>,

    /// Extra headers sent with every request
    #[serde(default)]
    pub headers: StringMap,

    /// Where resume tokens are kept
    #[serde(default)]
    pub state_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            region: default_region(),
            endpoint_url: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            backoff: BackoffSettings::default(),
            rate_limit: default_rate_limit(),
            headers: StringMap::new(),
            state_file: None,
        }
    }
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_rate_limit() -> Option<RateLimiterConfig> {
    Some(RateLimiterConfig::default())
}

/// Backoff configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffSettings {
    /// Backoff strategy
    #[serde(rename = "type")]
    pub backoff_type: BackoffType,
    /// First delay in milliseconds
    pub initial_ms: u64,
    /// Largest delay in milliseconds
    pub max_ms: u64,
}

impl Default for BackoffSettings {
    fn default() -> Self {
        Self {
            backoff_type: BackoffType::Exponential,
            initial_ms: 100,
            max_ms: 20_000,
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::Io(e)
            }
        })?;
        Self::from_yaml(&content)
    }

    /// Parse settings from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty file is all defaults
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Self = serde_yaml::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load from `path` when given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    /// Apply environment/CLI overrides
    #[must_use]
    pub fn with_overrides(mut self, region: Option<String>, endpoint_url: Option<String>) -> Self {
        if let Some(region) = region {
            self.region = region;
        }
        if endpoint_url.is_some() {
            self.endpoint_url = endpoint_url;
        }
        self
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.region.trim().is_empty() {
            return Err(Error::invalid_value("region", "cannot be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(Error::invalid_value("timeout_secs", "must be at least 1"));
        }
        if self.backoff.initial_ms > self.backoff.max_ms {
            return Err(Error::invalid_value(
                "backoff",
                format!(
                    "initial_ms ({}) exceeds max_ms ({})",
                    self.backoff.initial_ms, self.backoff.max_ms
                ),
            ));
        }
        if let Some(endpoint) = &self.endpoint_url {
            Url::parse(endpoint)
                .map_err(|e| Error::invalid_value("endpoint_url", e.to_string()))?;
        }
        Ok(())
    }

    /// HTTP client configuration derived from these settings
    pub fn http_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .max_retries(self.max_retries)
            .backoff(
                self.backoff.backoff_type,
                Duration::from_millis(self.backoff.initial_ms),
                Duration::from_millis(self.backoff.max_ms),
            );

        builder = match &self.rate_limit {
            Some(rate_limit) => builder.rate_limit(rate_limit.clone()),
            None => builder.no_rate_limit(),
        };
        for (key, value) in &self.headers {
            builder = builder.header(key, value);
        }
        builder.build()
    }

    /// Endpoint for a service: the override when set, else its template
    pub fn endpoint_for(&self, service: &ServiceDefinition) -> String {
        self.endpoint_url
            .clone()
            .unwrap_or_else(|| service.endpoint_for(&self.region))
    }
}
