//! Centralized HTTP request gateway
//!
//! Every outbound request in scratch-sdk goes through [`HttpGateway`] so that
//! transport failures and the server's error conventions are turned into
//! [`GatewayError`] values in exactly one place. Successful responses are
//! handed back untouched; interpreting the body is left to the caller.
//!
//! ```rust,ignore
//! use http_gateway::{GatewayConfig, HttpGateway, RequestOptions};
//!
//! let gateway = HttpGateway::with_config(
//!     GatewayConfig::new().with_proxy("http://proxy.local:3128"),
//! )?;
//!
//! let response = gateway.get(
//!     "https://api.scratch.mit.edu/users/griffpatch",
//!     RequestOptions::new().header("Accept", "application/json"),
//! )?;
//! println!("{}", response.text());
//! ```

mod config;
mod error;
mod request;
mod response;

pub use config::GatewayConfig;
pub use error::{
    GatewayError, Result, BAD_REQUEST_MESSAGE, INTERNAL_SERVER_ERROR_MESSAGE,
    RATE_LIMITED_MESSAGE,
};
pub use request::RequestOptions;
pub use response::Response;

use std::fmt;

/// Body the server sends when it rejects the shape of a request
pub const BAD_REQUEST_BODY: &str = r#"{"code":"BadRequest","message":""}"#;

/// HTTP verbs supported by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP client that maps transport failures and server error conventions
/// to [`GatewayError`]
#[derive(Debug, Clone)]
pub struct HttpGateway {
    agent: ureq::Agent,
    config: GatewayConfig,
}

impl HttpGateway {
    /// Create a gateway with default configuration and no proxy
    pub fn new() -> Self {
        let config = GatewayConfig::default();
        Self {
            agent: base_agent(&config).build(),
            config,
        }
    }

    /// Create a gateway from an explicit configuration
    pub fn with_config(config: GatewayConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = base_agent(&config);
        if let Some(proxy) = &config.proxy {
            let proxy =
                ureq::Proxy::new(proxy).map_err(|e| GatewayError::InvalidProxy(e.to_string()))?;
            builder = builder.proxy(proxy);
        }

        tracing::debug!(proxy = ?config.proxy, "HTTP gateway configured");

        Ok(Self {
            agent: builder.build(),
            config,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn get(&self, url: &str, options: RequestOptions) -> Result<Response> {
        self.request(Method::Get, url, options)
    }

    pub fn post(&self, url: &str, options: RequestOptions) -> Result<Response> {
        self.request(Method::Post, url, options)
    }

    pub fn put(&self, url: &str, options: RequestOptions) -> Result<Response> {
        self.request(Method::Put, url, options)
    }

    pub fn delete(&self, url: &str, options: RequestOptions) -> Result<Response> {
        self.request(Method::Delete, url, options)
    }

    /// Issue a request and check the response
    ///
    /// Transport errors become [`GatewayError::Fetch`]. Responses are then run
    /// through [`check_response`]; anything that passes is returned as-is,
    /// including status codes the check does not know about.
    pub fn request(&self, method: Method, url: &str, options: RequestOptions) -> Result<Response> {
        let mut request = self.agent.request(method.as_str(), url);

        for (name, value) in options.plain_headers() {
            request = request.set(name, value);
        }
        if let Some(cookie) = options.cookie_header() {
            request = request.set("Cookie", &cookie);
        }
        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }

        tracing::trace!(%method, url, "Sending request");

        let outcome = if let Some(data) = &options.data {
            let form: Vec<(&str, &str)> = data
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            request.send_form(&form)
        } else if let Some(json) = &options.json {
            request.send_json(json)
        } else {
            request.call()
        };

        let response = match outcome {
            Ok(response) => Response::read(response)?,
            // ureq treats 4xx/5xx as errors; those are still responses to us
            Err(ureq::Error::Status(_, response)) => Response::read(response)?,
            Err(ureq::Error::Transport(transport)) => {
                tracing::debug!(%method, url, error = %transport, "Transport failure");
                return Err(GatewayError::fetch(transport));
            }
        };

        check_response(&response)?;
        Ok(response)
    }
}

impl Default for HttpGateway {
    fn default() -> Self {
        Self::new()
    }
}

fn base_agent(config: &GatewayConfig) -> ureq::AgentBuilder {
    ureq::AgentBuilder::new()
        .timeout_connect(config.connect_timeout)
        .user_agent(&config.user_agent)
}

/// Map a response to the typed failure it represents, if any
///
/// First match wins: 401/403, then 500, then 429, then the BadRequest body.
pub fn check_response(response: &Response) -> Result<()> {
    match response.status() {
        401 | 403 => return Err(GatewayError::Unauthorized),
        500 => {
            return Err(GatewayError::Api(
                INTERNAL_SERVER_ERROR_MESSAGE.to_string(),
            ))
        }
        429 => return Err(GatewayError::RateLimited(RATE_LIMITED_MESSAGE.to_string())),
        _ => {}
    }

    if response.bytes() == BAD_REQUEST_BODY.as_bytes() {
        return Err(GatewayError::BadRequest(BAD_REQUEST_MESSAGE.to_string()));
    }

    Ok(())
}
