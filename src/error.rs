//! Error types for service-pager
//!
//! Two layers: [`ServiceError`] describes a failed remote call (what the
//! transport and the fetch loop deal in), [`Error`] is what every public
//! API returns.

use thiserror::Error;

/// Error codes AWS uses to signal throttling on JSON protocol services
const THROTTLING_CODES: &[&str] = &[
    "ThrottlingException",
    "Throttling",
    "ThrottledException",
    "RequestThrottledException",
    "TooManyRequestsException",
    "ProvisionedThroughputExceededException",
    "TransactionInProgressException",
    "RequestLimitExceeded",
    "SlowDown",
];

/// A remote call failed
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{code} (HTTP {status}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("throttled by service ({code}): {message}")]
    Throttled { code: String, message: String },

    #[error("request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("max retries ({max_retries}) exceeded")]
    MaxRetriesExceeded { max_retries: u32 },

    #[error("malformed service response: {message}")]
    Malformed { message: String },
}

impl ServiceError {
    /// Create an API error
    pub fn api(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create a malformed-response error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Service error code, when the service sent one
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } | Self::Throttled { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Check if this error is worth retrying at the transport layer
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Throttled { .. } | Self::Timeout { .. } => true,
            Self::Api { status, code, .. } => {
                is_retryable_status(*status) || is_throttling_code(code)
            }
            Self::MaxRetriesExceeded { .. } | Self::Malformed { .. } => false,
        }
    }
}

/// The main error type for service-pager
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Remote Call Errors
    // ============================================================================
    #[error("Service call failed: {0}")]
    Service(#[from] ServiceError),

    // ============================================================================
    // Caller Errors
    // ============================================================================
    #[error("Invalid request: {message}")]
    CallerMisuse { message: String },

    #[error("Unknown operation '{name}'")]
    UnknownOperation { name: String },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // State Errors
    // ============================================================================
    #[error("State error: {message}")]
    State { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a caller misuse error
    pub fn misuse(message: impl Into<String>) -> Self {
        Self::CallerMisuse {
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an unknown operation error
    pub fn unknown_operation(name: impl Into<String>) -> Self {
        Self::UnknownOperation { name: name.into() }
    }

    /// Create a state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Service(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Check if this error is a remote call failure
    pub fn is_service(&self) -> bool {
        matches!(self, Error::Service(_))
    }
}

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Check if an AWS error code means the request was throttled
pub fn is_throttling_code(code: &str) -> bool {
    THROTTLING_CODES.contains(&code)
}

/// Result type alias for service-pager
pub type Result<T> = std::result::Result<T, Error>;

/// Result type for a single remote call
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
