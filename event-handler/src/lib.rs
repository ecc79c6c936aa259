//! # scratch-sdk event handlers
//!
//! A small polling framework: something checks an external source for
//! changes at a fixed interval and fires callbacks registered under event
//! names.
//!
//! ## Overview
//!
//! - [`UpdateCheck`] is the one step a concrete poller supplies: fetch,
//!   compare with what it saw last time, emit events for the differences.
//! - [`PollingEventHandler`] wraps a poller with `start`/`stop`/`pause`/
//!   `resume` and an [`EventRegistry`] of callbacks.
//! - [`ResourceWatcher`] is a ready-made poller that watches a URL through
//!   the [`http_gateway`] crate.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use http_gateway::HttpGateway;
//! use scratch_event_handler::{PollingEventHandler, ResourceWatcher, RunMode};
//!
//! let watcher = ResourceWatcher::new(
//!     HttpGateway::new(),
//!     "https://api.scratch.mit.edu/users/griffpatch/messages/count",
//! );
//!
//! let mut handler = PollingEventHandler::new(watcher);
//! handler.event("on_ready", |_| println!("watching"));
//! handler.event("on_change", |event| println!("now: {}", event.data["current"]));
//!
//! handler.start(Duration::from_secs(5), RunMode::Background)?;
//! ```
//!
//! ## Events fired by the framework
//!
//! - `on_ready` fires once, synchronously, at the start of `start()`.
//! - `on_error` fires with the error message when an update check fails.
//!
//! What happens after a failed check is set by [`ErrorPolicy`]: the default
//! logs and retries on the next interval.

pub mod config;
pub mod error;
pub mod event;
pub mod handler;
pub mod logging;
pub mod watcher;
mod worker;

// Re-export main types for convenience
pub use config::{ErrorPolicy, HandlerConfig, RunMode};
pub use error::{CheckError, HandlerError, Result};
pub use event::{Event, EventCallback, EventRegistry, ON_ERROR, ON_READY};
pub use handler::{HandlerControl, PollingEventHandler, UpdateCheck};
pub use watcher::{ResourceWatcher, ON_CHANGE};

/// Prelude module for convenient imports
///
/// ```rust
/// use scratch_event_handler::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        CheckError, ErrorPolicy, Event, EventRegistry, HandlerConfig, HandlerControl,
        HandlerError, PollingEventHandler, ResourceWatcher, Result, RunMode, UpdateCheck,
    };
}
