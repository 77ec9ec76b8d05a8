//! HTTP transport module
//!
//! Performs AWS JSON protocol calls with retry, backoff and rate limiting.
//! This is the layer below a page source: the fetch loop never retries on
//! its own, everything transient is absorbed here.

mod client;
mod rate_limit;

pub use client::{
    parse_error, HttpClient, HttpClientConfig, HttpClientConfigBuilder, TARGET_HEADER,
};
pub use rate_limit::{RateLimiter, RateLimiterConfig};

#[cfg(test)]
mod tests;
