//! Error types for rasterization calls.

use thiserror::Error;

/// Result type for rasterization operations.
pub type Result<T> = std::result::Result<T, RasterizeError>;

/// Errors from the label rendering endpoint.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RasterizeError {
    /// Non-2xx response that is not a rate limit.
    #[error("HTTP error: {status} - {message}")]
    Http { status: u16, message: String },

    /// Network-level failure (DNS, connect, reset).
    #[error("connection failed: {0}")]
    Connection(String),

    /// Request timed out.
    #[error("request timeout")]
    Timeout,

    /// HTTP 429. `retry_after_ms` is taken from the Retry-After header
    /// when the server sent one.
    #[error("rate limited")]
    RateLimited { retry_after_ms: Option<u64> },

    /// All attempts for one label used up; the label is failed, not the batch.
    #[error("retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },

    /// Client misconfiguration (bad endpoint URL, bad TLS setup).
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl RasterizeError {
    /// Whether another attempt can succeed. Rate limits, timeouts,
    /// connection failures, and any non-2xx status are all transient per
    /// the retry policy; only configuration errors and exhaustion are
    /// terminal.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            RasterizeError::Configuration(_) | RasterizeError::RetriesExhausted { .. }
        )
    }

    /// Server-requested delay, if this is a rate limit that carried one.
    pub fn retry_after(&self) -> Option<std::time::Duration> {
        match self {
            RasterizeError::RateLimited {
                retry_after_ms: Some(ms),
            } => Some(std::time::Duration::from_millis(*ms)),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RasterizeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RasterizeError::Timeout
        } else if e.is_connect() {
            RasterizeError::Connection(e.to_string())
        } else if let Some(status) = e.status() {
            RasterizeError::Http {
                status: status.as_u16(),
                message: e.to_string(),
            }
        } else {
            RasterizeError::Connection(e.to_string())
        }
    }
}
