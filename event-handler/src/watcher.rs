//! ResourceWatcher - fires an event whenever a polled URL's body changes

use http_gateway::{HttpGateway, RequestOptions};
use serde_json::json;

use crate::error::CheckError;
use crate::event::EventRegistry;
use crate::handler::UpdateCheck;

/// Default event fired when the watched body changes
pub const ON_CHANGE: &str = "on_change";

/// Polls a URL through the gateway and diffs each body against the last one
///
/// The first successful fetch only records a baseline. After that, every
/// differing body fires the change event with
/// `{"previous": <old body>, "current": <new body>}` as data. Bodies are
/// compared byte for byte; the event carries them as text, with invalid UTF-8
/// replaced by U+FFFD.
#[derive(Debug)]
pub struct ResourceWatcher {
    gateway: HttpGateway,
    url: String,
    options: RequestOptions,
    event_name: String,
    last_body: Option<Vec<u8>>,
}

impl ResourceWatcher {
    pub fn new(gateway: HttpGateway, url: impl Into<String>) -> Self {
        Self {
            gateway,
            url: url.into(),
            options: RequestOptions::new(),
            event_name: ON_CHANGE.to_string(),
            last_body: None,
        }
    }

    /// Options (headers, cookies, timeout) sent with every poll
    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_event_name(mut self, name: impl Into<String>) -> Self {
        self.event_name = name.into();
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Body seen on the most recent successful poll
    pub fn last_body(&self) -> Option<&[u8]> {
        self.last_body.as_deref()
    }
}

impl UpdateCheck for ResourceWatcher {
    fn check_for_updates(&mut self, events: &EventRegistry) -> Result<(), CheckError> {
        let body = self
            .gateway
            .get(&self.url, self.options.clone())?
            .into_bytes();

        match self.last_body.replace(body.clone()) {
            None => {
                tracing::debug!("Recorded baseline for {} ({} bytes)", self.url, body.len());
            }
            Some(previous) if previous != body => {
                tracing::debug!("Change detected at {}", self.url);
                events.emit(
                    &self.event_name,
                    json!({
                        "previous": String::from_utf8_lossy(&previous),
                        "current": String::from_utf8_lossy(&body),
                    }),
                );
            }
            Some(_) => {}
        }

        Ok(())
    }
}
