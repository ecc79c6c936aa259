//! Subscriber setup for programs that drive a polling handler
//!
//! The handler and watcher only emit `tracing` events: a `debug!` per poll
//! iteration, `warn!` for failed checks, `info!` when a worker starts or
//! stops. Nothing is printed until the embedding program installs a
//! subscriber, and a library must not do that on its own because only one
//! global subscriber can exist per process. These helpers are for the
//! program's `main`, called once before the first `start`.
//!
//! ```rust,ignore
//! use scratch_event_handler::logging::{init_logging, LoggingMode};
//!
//! init_logging(LoggingMode::Development)?;
//! // or let the environment decide:
//! scratch_event_handler::logging::init_logging_from_env()?;
//! ```
//!
//! Filtering is taken from `SCRATCH_LOG_LEVEL`, then `RUST_LOG`, then the
//! mode's own level.

use std::str::FromStr;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

/// Environment variable read by [`init_logging_from_env`]
pub const LOG_MODE_ENV: &str = "SCRATCH_LOG_MODE";

/// Environment variable holding a filter directive, e.g.
/// `scratch_event_handler=trace,http_gateway=debug`
pub const LOG_LEVEL_ENV: &str = "SCRATCH_LOG_LEVEL";

/// Where the handler's `tracing` events go
///
/// `Silent` is the default: a poll loop running every few hundred
/// milliseconds would otherwise flood the host program's terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoggingMode {
    /// Install nothing; events are discarded
    #[default]
    Silent,
    /// One compact stderr line per event, `info` and above
    Development,
    /// Multi-line output with thread names and source locations, `debug` and above
    Debug,
    /// Newline-delimited JSON records, `info` and above, for log shippers
    Json,
}

impl LoggingMode {
    fn default_level(self) -> &'static str {
        match self {
            LoggingMode::Silent => "off",
            LoggingMode::Development | LoggingMode::Json => "info",
            LoggingMode::Debug => "debug",
        }
    }
}

impl FromStr for LoggingMode {
    type Err = LoggingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "silent" | "off" => Ok(LoggingMode::Silent),
            "development" | "dev" => Ok(LoggingMode::Development),
            "debug" => Ok(LoggingMode::Debug),
            "json" => Ok(LoggingMode::Json),
            other => Err(LoggingError::UnknownMode(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// A global subscriber was already installed
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),

    #[error("Unknown logging mode '{0}' (expected silent, development, debug or json)")]
    UnknownMode(String),
}

/// Install the global subscriber for `mode`
///
/// Fails with [`LoggingError::TracingInit`] if a subscriber is already set.
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    let layer: Box<dyn Layer<Registry> + Send + Sync> = match mode {
        LoggingMode::Silent => return Ok(()),
        LoggingMode::Development => fmt::layer()
            .compact()
            .with_target(false)
            .boxed(),
        LoggingMode::Debug => fmt::layer()
            .pretty()
            .with_thread_names(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LoggingMode::Json => fmt::layer()
            .json()
            .with_current_span(false)
            .with_thread_names(true)
            .boxed(),
    };

    Registry::default()
        .with(layer)
        .with(env_filter(mode.default_level()))
        .try_init()
        .map_err(|e| LoggingError::TracingInit(e.to_string()))
}

/// Install the subscriber named by `SCRATCH_LOG_MODE`
///
/// An unset variable means [`LoggingMode::Silent`]; an unrecognized value is
/// an error rather than a silent fallback.
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    let mode = match std::env::var(LOG_MODE_ENV) {
        Ok(value) => value.parse()?,
        Err(_) => LoggingMode::default(),
    };

    init_logging(mode)
}

/// Unset or unparseable directives fall through to the next source
fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_LEVEL_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Whether any global subscriber is installed, by us or by the host program
pub fn is_initialized() -> bool {
    tracing::dispatcher::has_been_set()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_installs_nothing() {
        assert_eq!(LoggingMode::default(), LoggingMode::Silent);
        assert!(init_logging(LoggingMode::Silent).is_ok());
    }

    #[test]
    fn test_parse_modes() {
        assert_eq!("development".parse::<LoggingMode>().unwrap(), LoggingMode::Development);
        assert_eq!("DEV".parse::<LoggingMode>().unwrap(), LoggingMode::Development);
        assert_eq!(" debug ".parse::<LoggingMode>().unwrap(), LoggingMode::Debug);
        assert_eq!("json".parse::<LoggingMode>().unwrap(), LoggingMode::Json);
        assert_eq!("".parse::<LoggingMode>().unwrap(), LoggingMode::Silent);
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        match "loud".parse::<LoggingMode>() {
            Err(LoggingError::UnknownMode(name)) => assert_eq!(name, "loud"),
            other => panic!("Expected UnknownMode, got {:?}", other),
        }
    }
}
