//! Configuration for the HTTP gateway
//!
//! The proxy used to be a process-wide mutable setting. It now lives here and
//! is fixed when the gateway is constructed, so every request made through a
//! given gateway sees the same value.

use std::time::Duration;

use crate::error::{GatewayError, Result};

/// Configuration for an [`HttpGateway`](crate::HttpGateway)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Proxy every request is routed through, e.g. `http://proxy.local:3128`
    /// or `socks5://127.0.0.1:1080`
    /// Default: None
    pub proxy: Option<String>,

    /// Timeout for establishing a connection
    /// Default: 10 seconds
    pub connect_timeout: Duration,

    /// User agent sent with every request
    /// Default: "scratch-sdk/<version>"
    pub user_agent: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("scratch-sdk/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl GatewayConfig {
    /// Create a new GatewayConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> Result<()> {
        if let Some(proxy) = &self.proxy {
            if proxy.trim().is_empty() {
                return Err(GatewayError::InvalidProxy(
                    "Proxy address must not be empty".to_string(),
                ));
            }
        }

        if self.connect_timeout == Duration::ZERO {
            return Err(GatewayError::InvalidConfig(
                "Connect timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
