//! Polling event handler lifecycle
//!
//! A [`PollingEventHandler`] owns one [`UpdateCheck`] implementation and runs
//! it repeatedly, either on a background worker thread or on the caller's
//! thread, dispatching named callbacks from an [`EventRegistry`].
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use scratch_event_handler::{PollingEventHandler, RunMode};
//!
//! let mut handler = PollingEventHandler::new(my_poller);
//! handler.event("on_ready", |_| println!("ready"));
//! handler.event("on_set", |event| println!("set: {}", event.data));
//!
//! handler.start(Duration::from_millis(250), RunMode::Background)?;
//! // ...
//! handler.stop()?;
//! ```

use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use serde_json::Value;

use crate::config::{HandlerConfig, RunMode};
use crate::error::{CheckError, HandlerError, Result};
use crate::event::{Event, EventRegistry, ON_READY};
use crate::worker::{spawn_poll_worker, Liveness, PollLoop};

/// One step of a poll loop: look at the data source and fire events for
/// whatever changed since the previous call
///
/// Implementations keep their own record of previously observed state.
/// Closures of the form `FnMut(&EventRegistry) -> Result<(), CheckError>`
/// implement this trait.
pub trait UpdateCheck: Send + 'static {
    fn check_for_updates(&mut self, events: &EventRegistry) -> std::result::Result<(), CheckError>;
}

impl<F> UpdateCheck for F
where
    F: FnMut(&EventRegistry) -> std::result::Result<(), CheckError> + Send + 'static,
{
    fn check_for_updates(&mut self, events: &EventRegistry) -> std::result::Result<(), CheckError> {
        self(events)
    }
}

/// Cloneable handle for halting a handler from another thread or from
/// inside a callback
///
/// This is the way to end a loop started with [`RunMode::Foreground`].
#[derive(Debug, Clone)]
pub struct HandlerControl {
    liveness: Arc<Liveness>,
}

impl HandlerControl {
    /// Same as [`PollingEventHandler::pause`]
    pub fn pause(&self) {
        self.liveness.halt();
    }

    pub fn is_running(&self) -> bool {
        self.liveness.is_running()
    }
}

/// Drives an [`UpdateCheck`] with a start/stop/pause/resume lifecycle
pub struct PollingEventHandler<C: UpdateCheck> {
    checker: Arc<Mutex<C>>,
    events: EventRegistry,
    liveness: Arc<Liveness>,
    config: HandlerConfig,
    update_interval: Duration,
    worker: Option<JoinHandle<()>>,
}

impl<C: UpdateCheck> PollingEventHandler<C> {
    /// Create an inactive handler with default configuration
    pub fn new(checker: C) -> Self {
        let config = HandlerConfig::default();
        Self {
            checker: Arc::new(Mutex::new(checker)),
            events: EventRegistry::new(),
            liveness: Arc::new(Liveness::default()),
            update_interval: config.default_interval,
            config,
            worker: None,
        }
    }

    /// Create an inactive handler with custom configuration
    pub fn with_config(checker: C, config: HandlerConfig) -> Result<Self> {
        config.validate()?;

        let mut handler = Self::new(checker);
        handler.update_interval = config.default_interval;
        handler.config = config;
        Ok(handler)
    }

    /// Register `callback` under `name`, replacing any previous registration
    ///
    /// Names are not checked against what the poller emits; a misspelled
    /// name simply never fires.
    pub fn event<F>(&self, name: impl Into<String>, callback: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.events.register(name, callback);
    }

    /// Alias of [`event`](Self::event)
    pub fn register_event<F>(&self, name: impl Into<String>, callback: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.event(name, callback);
    }

    pub fn events(&self) -> &EventRegistry {
        &self.events
    }

    pub fn control(&self) -> HandlerControl {
        HandlerControl {
            liveness: Arc::clone(&self.liveness),
        }
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.liveness.is_running()
    }

    /// Interval used by the most recent `start`
    pub fn update_interval(&self) -> Duration {
        self.update_interval
    }

    /// Whether a background worker handle is held
    pub fn has_worker(&self) -> bool {
        self.worker.is_some()
    }

    /// Start polling with the configured default interval in the background
    pub fn start_default(&mut self) -> Result<()> {
        self.start(self.config.default_interval, RunMode::Background)
    }

    /// Start polling every `update_interval`
    ///
    /// Does nothing if the handler is already running. `on_ready` fires
    /// before the first check. In [`RunMode::Foreground`] this blocks until
    /// the loop is halted through a [`HandlerControl`], and returns the
    /// failing check's error if the loop ended under
    /// [`ErrorPolicy::Stop`](crate::ErrorPolicy::Stop).
    pub fn start(&mut self, update_interval: Duration, mode: RunMode) -> Result<()> {
        if self.liveness.is_running() {
            tracing::debug!("Handler already running, ignoring start");
            return Ok(());
        }

        if update_interval == Duration::ZERO {
            return Err(HandlerError::InvalidInterval);
        }

        // A paused worker may still be finishing its last check
        self.join_worker()?;

        self.update_interval = update_interval;
        self.liveness.activate();

        if self.events.emit(ON_READY, Value::Null) {
            tracing::debug!("Fired {}", ON_READY);
        }

        let poll_loop = PollLoop {
            checker: Arc::clone(&self.checker),
            events: self.events.clone(),
            liveness: Arc::clone(&self.liveness),
            interval: update_interval,
            error_policy: self.config.error_policy,
        };

        match mode {
            RunMode::Background => {
                let worker = spawn_poll_worker(&self.config.thread_name, poll_loop).map_err(|e| {
                    self.liveness.halt();
                    HandlerError::Spawn(e)
                })?;
                self.worker = Some(worker);
                tracing::debug!("Poll worker '{}' spawned", self.config.thread_name);
                Ok(())
            }
            RunMode::Foreground => poll_loop.run().map_err(HandlerError::Check),
        }
    }

    /// Permanently stop the background worker and wait for it to exit
    ///
    /// Does nothing if no worker was started. The handler can be started
    /// again afterwards.
    pub fn stop(&mut self) -> Result<()> {
        if self.worker.is_none() {
            return Ok(());
        }

        self.liveness.halt();
        self.join_worker()?;
        tracing::debug!("Handler stopped");
        Ok(())
    }

    /// Halt polling without joining the worker
    ///
    /// The loop exits after at most the check currently in flight; the
    /// worker handle is kept until the next `start` or `stop`.
    pub fn pause(&self) {
        self.liveness.halt();
    }

    /// Restart a paused handler in the background with the previous interval
    pub fn resume(&mut self) -> Result<()> {
        if self.liveness.is_running() {
            return Ok(());
        }

        self.start(self.update_interval, RunMode::Background)
    }

    fn join_worker(&mut self) -> Result<()> {
        match self.worker.take() {
            Some(worker) => worker.join().map_err(|_| {
                tracing::error!("Poll worker panicked");
                HandlerError::WorkerPanicked
            }),
            None => Ok(()),
        }
    }
}

impl<C: UpdateCheck> Drop for PollingEventHandler<C> {
    fn drop(&mut self) {
        if self.worker.is_some() {
            tracing::debug!("PollingEventHandler dropping, stopping worker");
            let _ = self.stop();
        }
    }
}

impl<C: UpdateCheck> std::fmt::Debug for PollingEventHandler<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollingEventHandler")
            .field("running", &self.is_running())
            .field("update_interval", &self.update_interval)
            .field("events", &self.events)
            .field("has_worker", &self.has_worker())
            .finish()
    }
}
