//! Error types for the HTTP gateway

use thiserror::Error;

/// Message carried by [`GatewayError::Api`] when the server answers 500
pub const INTERNAL_SERVER_ERROR_MESSAGE: &str = "Internal Scratch server error";

/// Message carried by [`GatewayError::RateLimited`] when the server answers 429
pub const RATE_LIMITED_MESSAGE: &str = "You are being rate-limited (or blocked) by Scratch";

/// Message carried by [`GatewayError::BadRequest`]
pub const BAD_REQUEST_MESSAGE: &str = "Make sure all provided arguments are valid";

/// Errors that can occur while talking to a remote server through the gateway
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Transport-level failure before a response was obtained
    /// (DNS, connection refused, TLS, timeout, body read)
    #[error("Failed to fetch: {0}")]
    Fetch(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),

    /// The server rejected our credentials (401 or 403)
    #[error("Unauthorized")]
    Unauthorized,

    /// The server reported an internal failure (500)
    #[error("{0}")]
    Api(String),

    /// The server is rate-limiting or blocking us (429)
    #[error("{0}")]
    RateLimited(String),

    /// The server rejected the shape of the request
    #[error("{0}")]
    BadRequest(String),

    /// The configured proxy could not be used
    #[error("Invalid proxy configuration: {0}")]
    InvalidProxy(String),

    /// The gateway configuration was rejected
    #[error("Invalid gateway configuration: {0}")]
    InvalidConfig(String),

    /// A response body could not be decoded as requested
    #[error("Failed to decode response body: {0}")]
    Decode(String),
}

impl GatewayError {
    pub(crate) fn fetch<E>(cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        GatewayError::Fetch(Box::new(cause))
    }
}

/// Result type for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;
