//! Named events and the callback registry

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use serde_json::Value;

/// Fired once, synchronously, when a handler starts
pub const ON_READY: &str = "on_ready";

/// Fired when an update check fails, with the error message as data
pub const ON_ERROR: &str = "on_error";

/// An occurrence handed to a registered callback
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub name: String,
    /// Event-specific payload; `Null` when the event carries nothing
    pub data: Value,
}

impl Event {
    pub fn new(name: impl Into<String>, data: Value) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// Callback invoked when a named event fires
pub type EventCallback = Arc<dyn Fn(&Event) + Send + Sync + 'static>;

/// Thread-safe map from event name to callback
///
/// Any name is accepted. Registering a name twice replaces the first
/// callback. Clones share the same underlying map.
#[derive(Clone, Default)]
pub struct EventRegistry {
    callbacks: Arc<RwLock<HashMap<String, EventCallback>>>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` under `name`, replacing any previous one
    pub fn register<F>(&self, name: impl Into<String>, callback: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let name = name.into();
        let mut callbacks = self
            .callbacks
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if callbacks.insert(name.clone(), Arc::new(callback)).is_some() {
            tracing::debug!("Replaced callback for event '{}'", name);
        } else {
            tracing::debug!("Registered callback for event '{}'", name);
        }
    }

    /// Remove the callback for `name`, returning whether one existed
    pub fn unregister(&self, name: &str) -> bool {
        self.callbacks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
            .is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.callbacks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Names with a registered callback, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .callbacks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Invoke the callback registered for `name`
    ///
    /// Returns false when nothing is registered under that name. The lock is
    /// released before the callback runs, so callbacks may register events.
    pub fn emit(&self, name: &str, data: Value) -> bool {
        let callback = self
            .callbacks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned();

        match callback {
            Some(callback) => {
                tracing::trace!("Dispatching event '{}'", name);
                callback(&Event::new(name, data));
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRegistry")
            .field("events", &self.names())
            .finish()
    }
}
