//! Lifecycle tests for PollingEventHandler running on a background worker

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use scratch_event_handler::prelude::*;
use scratch_event_handler::{ON_ERROR, ON_READY};

/// Poll `condition` until it holds or `timeout` passes
fn wait_until(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

/// Checker that counts its calls
fn counting_checker(
    calls: Arc<AtomicUsize>,
) -> impl FnMut(&EventRegistry) -> std::result::Result<(), CheckError> + Send + 'static {
    move |_: &EventRegistry| -> std::result::Result<(), CheckError> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn test_background_start_returns_immediately() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut handler = PollingEventHandler::new(counting_checker(Arc::clone(&calls)));

    let started = Instant::now();
    handler
        .start(Duration::from_secs(2), RunMode::Background)
        .unwrap();
    assert!(started.elapsed() < Duration::from_millis(500));
    assert!(handler.is_running());
    assert!(handler.has_worker());

    handler.stop().unwrap();
}

#[test]
fn test_stop_returns_within_one_interval() {
    let interval = Duration::from_millis(500);
    let calls = Arc::new(AtomicUsize::new(0));
    let mut handler = PollingEventHandler::new(counting_checker(Arc::clone(&calls)));

    handler.start(interval, RunMode::Background).unwrap();
    assert!(wait_until(Duration::from_secs(2), || calls.load(Ordering::SeqCst) >= 1));

    // The worker is now sleeping
    let stopping = Instant::now();
    handler.stop().unwrap();
    assert!(stopping.elapsed() < interval + Duration::from_millis(200));

    assert!(!handler.is_running());
    assert!(!handler.has_worker());

    // Nothing polls after stop
    let after_stop = calls.load(Ordering::SeqCst);
    thread::sleep(Duration::from_millis(100));
    assert_eq!(calls.load(Ordering::SeqCst), after_stop);
}

#[test]
fn test_start_is_idempotent() {
    let threads = Arc::new(Mutex::new(HashSet::new()));
    let in_flight = Arc::new(AtomicUsize::new(0));
    let max_in_flight = Arc::new(AtomicUsize::new(0));

    let (t, f, m) = (
        Arc::clone(&threads),
        Arc::clone(&in_flight),
        Arc::clone(&max_in_flight),
    );
    let mut handler = PollingEventHandler::new(
        move |_: &EventRegistry| -> std::result::Result<(), CheckError> {
            let now = f.fetch_add(1, Ordering::SeqCst) + 1;
            m.fetch_max(now, Ordering::SeqCst);
            t.lock().unwrap().insert(thread::current().id());
            thread::sleep(Duration::from_millis(5));
            f.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        },
    );

    let ready = Arc::new(AtomicUsize::new(0));
    let r = Arc::clone(&ready);
    handler.event(ON_READY, move |_| {
        r.fetch_add(1, Ordering::SeqCst);
    });

    handler
        .start(Duration::from_millis(10), RunMode::Background)
        .unwrap();
    handler
        .start(Duration::from_millis(10), RunMode::Background)
        .unwrap();
    thread::sleep(Duration::from_millis(150));
    handler.stop().unwrap();

    assert_eq!(threads.lock().unwrap().len(), 1);
    assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);
    assert_eq!(ready.load(Ordering::SeqCst), 1);
}

#[test]
fn test_on_ready_fires_once_before_first_poll() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let poll_log = Arc::clone(&log);
    let mut handler = PollingEventHandler::new(
        move |_: &EventRegistry| -> std::result::Result<(), CheckError> {
            poll_log.lock().unwrap().push("poll");
            Ok(())
        },
    );

    let ready_log = Arc::clone(&log);
    handler.event(ON_READY, move |event| {
        assert_eq!(event.name, ON_READY);
        assert!(event.data.is_null());
        ready_log.lock().unwrap().push("ready");
    });

    handler
        .start(Duration::from_millis(10), RunMode::Background)
        .unwrap();
    assert!(wait_until(Duration::from_secs(2), || log.lock().unwrap().len() >= 3));
    handler.stop().unwrap();

    let log = log.lock().unwrap();
    assert_eq!(log[0], "ready");
    assert_eq!(log.iter().filter(|entry| **entry == "ready").count(), 1);
}

#[test]
fn test_pause_then_resume_keeps_interval() {
    let interval = Duration::from_millis(30);
    let calls = Arc::new(AtomicUsize::new(0));
    let mut handler = PollingEventHandler::new(counting_checker(Arc::clone(&calls)));

    handler.start(interval, RunMode::Background).unwrap();
    assert!(wait_until(Duration::from_secs(2), || calls.load(Ordering::SeqCst) >= 1));

    handler.pause();
    assert!(!handler.is_running());
    // Pause does not release the worker handle
    assert!(handler.has_worker());

    handler.resume().unwrap();
    assert!(handler.is_running());
    assert_eq!(handler.update_interval(), interval);

    let resumed_at = calls.load(Ordering::SeqCst);
    assert!(wait_until(Duration::from_secs(2), || {
        calls.load(Ordering::SeqCst) > resumed_at
    }));

    handler.stop().unwrap();
}

#[test]
fn test_pause_halts_within_one_check() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut handler = PollingEventHandler::new(counting_checker(Arc::clone(&calls)));

    handler
        .start(Duration::from_secs(5), RunMode::Background)
        .unwrap();
    assert!(wait_until(Duration::from_secs(2), || calls.load(Ordering::SeqCst) >= 1));

    let pausing = Instant::now();
    handler.pause();

    // The sleeping worker wakes and exits well before its 5s interval
    let paused_at = calls.load(Ordering::SeqCst);
    handler.stop().unwrap();
    assert!(pausing.elapsed() < Duration::from_secs(1));
    assert_eq!(calls.load(Ordering::SeqCst), paused_at);
}

#[test]
fn test_resume_when_running_is_noop() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut handler = PollingEventHandler::new(counting_checker(calls));

    handler
        .start(Duration::from_millis(20), RunMode::Background)
        .unwrap();
    handler.resume().unwrap();
    assert_eq!(handler.update_interval(), Duration::from_millis(20));
    handler.stop().unwrap();
}

#[test]
fn test_restart_after_stop() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut handler = PollingEventHandler::new(counting_checker(Arc::clone(&calls)));

    handler
        .start(Duration::from_millis(10), RunMode::Background)
        .unwrap();
    handler.stop().unwrap();

    let before = calls.load(Ordering::SeqCst);
    handler.resume().unwrap();
    assert!(wait_until(Duration::from_secs(2), || calls.load(Ordering::SeqCst) > before));
    handler.stop().unwrap();
}

#[test]
fn test_drop_stops_worker() {
    let calls = Arc::new(AtomicUsize::new(0));
    {
        let mut handler = PollingEventHandler::new(counting_checker(Arc::clone(&calls)));
        handler
            .start(Duration::from_millis(10), RunMode::Background)
            .unwrap();
        assert!(wait_until(Duration::from_secs(2), || calls.load(Ordering::SeqCst) >= 1));
    }

    let after_drop = calls.load(Ordering::SeqCst);
    thread::sleep(Duration::from_millis(60));
    assert_eq!(calls.load(Ordering::SeqCst), after_drop);
}

#[test]
fn test_failed_checks_are_logged_and_retried_by_default() {
    let mut handler = PollingEventHandler::new(
        |_: &EventRegistry| -> std::result::Result<(), CheckError> {
            Err(CheckError::other("feed unavailable"))
        },
    );

    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&errors);
    handler.event(ON_ERROR, move |event| {
        sink.lock().unwrap().push(event.data.clone());
    });

    handler
        .start(Duration::from_millis(5), RunMode::Background)
        .unwrap();
    assert!(wait_until(Duration::from_secs(2), || errors.lock().unwrap().len() >= 3));
    assert!(handler.is_running());
    handler.stop().unwrap();

    let errors = errors.lock().unwrap();
    assert!(errors
        .iter()
        .all(|e| e.as_str() == Some("feed unavailable")));
}

#[test]
fn test_stop_policy_clears_running_in_background() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut handler = PollingEventHandler::with_config(
        move |_: &EventRegistry| -> std::result::Result<(), CheckError> {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(CheckError::other("fatal"))
        },
        HandlerConfig::fail_fast(),
    )
    .unwrap();

    let errors = Arc::new(AtomicUsize::new(0));
    let e = Arc::clone(&errors);
    handler.event(ON_ERROR, move |_| {
        e.fetch_add(1, Ordering::SeqCst);
    });

    handler
        .start(Duration::from_millis(5), RunMode::Background)
        .unwrap();
    assert!(wait_until(Duration::from_secs(2), || !handler.is_running()));

    // The loop ended itself; the handle is still held until stop
    assert!(handler.has_worker());
    handler.stop().unwrap();
    assert!(!handler.has_worker());

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(errors.load(Ordering::SeqCst), 1);
}

#[test]
fn test_control_pauses_background_worker() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut handler = PollingEventHandler::new(counting_checker(Arc::clone(&calls)));
    let control = handler.control();

    handler
        .start(Duration::from_millis(10), RunMode::Background)
        .unwrap();
    assert!(control.is_running());

    thread::spawn(move || control.pause()).join().unwrap();
    assert!(!handler.is_running());
    handler.stop().unwrap();
}
