use thiserror::Error;

use http_gateway::GatewayError;

/// Errors raised by a single update check
#[derive(Error, Debug)]
pub enum CheckError {
    /// The data source could not be fetched
    #[error("Gateway request failed: {0}")]
    Gateway(#[from] GatewayError),

    /// Any other failure reported by a concrete poller
    #[error("{0}")]
    Other(String),
}

impl CheckError {
    pub fn other(message: impl Into<String>) -> Self {
        CheckError::Other(message.into())
    }
}

/// Errors that can occur while driving a polling event handler
#[derive(Error, Debug)]
pub enum HandlerError {
    /// The update interval was zero
    #[error("Update interval must be greater than 0")]
    InvalidInterval,

    /// The configuration was rejected
    #[error("Invalid handler configuration: {0}")]
    Configuration(String),

    /// The background worker thread could not be spawned
    #[error("Failed to spawn poll worker: {0}")]
    Spawn(#[source] std::io::Error),

    /// A foreground loop was stopped by a failing check
    #[error("Poll loop stopped by a failed check: {0}")]
    Check(#[source] CheckError),

    /// The background worker panicked before it could be joined
    #[error("Poll worker panicked")]
    WorkerPanicked,
}

/// Result type for handler operations
pub type Result<T> = std::result::Result<T, HandlerError>;
