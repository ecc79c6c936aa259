//! Configuration types for polling event handlers

use std::time::Duration;

use crate::error::HandlerError;

/// What the poll loop does when an update check fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Log the failure, fire `on_error`, and try again next interval
    #[default]
    LogAndContinue,
    /// Log the failure, fire `on_error`, mark the handler not running and
    /// leave the loop
    Stop,
}

/// Where the poll loop runs once a handler is started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Spawn a worker thread and return immediately
    #[default]
    Background,
    /// Run the loop on the calling thread until paused
    Foreground,
}

/// Configuration for a [`PollingEventHandler`](crate::PollingEventHandler)
#[derive(Debug, Clone)]
pub struct HandlerConfig {
    /// Behaviour on a failed update check
    /// Default: LogAndContinue
    pub error_policy: ErrorPolicy,

    /// Interval used by `start_default`
    /// Default: 100 milliseconds
    pub default_interval: Duration,

    /// Name given to the background worker thread
    /// Default: "poll-worker"
    pub thread_name: String,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            error_policy: ErrorPolicy::LogAndContinue,
            default_interval: Duration::from_millis(100),
            thread_name: "poll-worker".to_string(),
        }
    }
}

impl HandlerConfig {
    /// Create a new HandlerConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// A config whose loop ends on the first failed check
    pub fn fail_fast() -> Self {
        Self {
            error_policy: ErrorPolicy::Stop,
            ..Default::default()
        }
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> Result<(), HandlerError> {
        if self.default_interval == Duration::ZERO {
            return Err(HandlerError::InvalidInterval);
        }

        if self.thread_name.is_empty() || self.thread_name.contains('\0') {
            return Err(HandlerError::Configuration(
                "Thread name must be non-empty and contain no NUL bytes".to_string(),
            ));
        }

        Ok(())
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    pub fn with_default_interval(mut self, interval: Duration) -> Self {
        self.default_interval = interval;
        self
    }

    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }
}
