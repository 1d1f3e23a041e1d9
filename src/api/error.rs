//! API error types for the Linear client.
//!
//! Every failure on the request path is an [`ApiError`] carrying a kind, a
//! human message and an HTTP-status-like code. Retry decisions are made from
//! [`ApiError::is_retryable`] and nowhere else.

use std::fmt;

use thiserror::Error;

/// Classification of an API failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Transport-level failure with no HTTP response.
    Network,
    /// HTTP 401 - the API key was rejected.
    Auth,
    /// HTTP 429 or a local rate limiter rejection.
    RateLimit,
    /// Any other non-200 status, or GraphQL errors in a 200 response.
    Api,
    /// Bad caller input. Never produced by the network layer.
    Validation,
    /// The caller's deadline or cancellation fired while waiting.
    Cancelled,
}

impl ErrorKind {
    /// Short lowercase name used in error messages and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::Auth => "auth",
            ErrorKind::RateLimit => "ratelimit",
            ErrorKind::Api => "api",
            ErrorKind::Validation => "validation",
            ErrorKind::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error returned by the Linear API client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Linear API error [{kind}]: {message} (code: {code})")]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
    /// HTTP status, or 0 when no response was received.
    pub code: u16,
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, code: u16) -> Self {
        Self {
            kind,
            message: message.into(),
            code,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message, 0)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Auth, message, 401)
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RateLimit, message, 429)
    }

    pub fn api(message: impl Into<String>, code: u16) -> Self {
        Self::new(ErrorKind::Api, message, code)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message, 0)
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cancelled, message, 0)
    }

    /// Whether a retry could plausibly succeed.
    ///
    /// Network and rate-limit failures are always retryable. API failures
    /// are retryable only for 5xx codes. Everything else fails fast.
    pub fn is_retryable(&self) -> bool {
        match self.kind {
            ErrorKind::Network | ErrorKind::RateLimit => true,
            ErrorKind::Api => (500..600).contains(&self.code),
            ErrorKind::Auth | ErrorKind::Validation | ErrorKind::Cancelled => false,
        }
    }
}
