//! Watch URL - polls a URL and prints whenever its body changes
//!
//! Demonstrates the whole lifecycle on a background worker:
//! - `on_ready` fires before the first poll
//! - `on_change` fires with the previous and current body
//! - `on_error` reports failed polls (which are retried)
//! - Ctrl+C stops the worker and exits
//!
//! Run with: cargo run -p scratch-sdk-event-handler --example watch_url -- <url> [interval-ms]
//!
//! Set `SCRATCH_LOG_MODE=development` to see the handler's own logging.

use std::sync::mpsc;
use std::time::Duration;

use http_gateway::{GatewayConfig, HttpGateway};
use scratch_event_handler::logging::init_logging_from_env;
use scratch_event_handler::{PollingEventHandler, ResourceWatcher, RunMode, ON_CHANGE, ON_ERROR, ON_READY};

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    init_logging_from_env()?;

    let mut args = std::env::args().skip(1);
    let url = args
        .next()
        .unwrap_or_else(|| "https://api.scratch.mit.edu/health".to_string());
    let interval = args
        .next()
        .and_then(|ms| ms.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(2));

    let mut config = GatewayConfig::new().with_connect_timeout(Duration::from_secs(5));
    if let Ok(proxy) = std::env::var("SCRATCH_PROXY") {
        config = config.with_proxy(proxy);
    }
    let gateway = HttpGateway::with_config(config)?;

    let mut handler = PollingEventHandler::new(ResourceWatcher::new(gateway, url.clone()));

    handler.event(ON_READY, move |_| println!("Watching {} every {:?}", url, interval));
    handler.event(ON_CHANGE, |event| {
        println!("Changed:\n  before: {}\n  after:  {}", event.data["previous"], event.data["current"]);
    });
    handler.event(ON_ERROR, |event| eprintln!("Poll failed: {}", event.data));

    let (stop_tx, stop_rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = stop_tx.send(());
    })?;

    handler.start(interval, RunMode::Background)?;

    let _ = stop_rx.recv();
    println!("\nStopping...");
    handler.stop()?;

    Ok(())
}
