//! The poll loop and the thread that runs it
//!
//! The loop is strictly sequential: check, sleep, check again. Liveness is a
//! shared flag read once per iteration. The sleep waits on a condvar so that
//! clearing the flag wakes it immediately; the only thing that can delay a
//! halt is a check that is already in flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde_json::Value;

use crate::config::ErrorPolicy;
use crate::error::CheckError;
use crate::event::{EventRegistry, ON_ERROR};
use crate::handler::UpdateCheck;

/// Liveness flag plus the condvar the loop sleeps on
#[derive(Debug, Default)]
pub(crate) struct Liveness {
    running: AtomicBool,
    wake_lock: Mutex<()>,
    wake: Condvar,
}

impl Liveness {
    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub(crate) fn activate(&self) {
        self.running.store(true, Ordering::SeqCst);
    }

    /// Clear the flag and wake a sleeping loop
    pub(crate) fn halt(&self) {
        self.running.store(false, Ordering::SeqCst);
        // Taking the lock orders this notify after any in-progress predicate check
        let _guard = self.wake_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.wake.notify_all();
    }

    /// Sleep for `interval` or until halted, whichever comes first
    fn sleep(&self, interval: Duration) {
        let guard = self.wake_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = self
            .wake
            .wait_timeout_while(guard, interval, |_| self.is_running())
            .unwrap_or_else(PoisonError::into_inner);
    }
}

/// Everything one run of the poll loop needs
pub(crate) struct PollLoop<C> {
    pub(crate) checker: Arc<Mutex<C>>,
    pub(crate) events: EventRegistry,
    pub(crate) liveness: Arc<Liveness>,
    pub(crate) interval: Duration,
    pub(crate) error_policy: ErrorPolicy,
}

impl<C: UpdateCheck> PollLoop<C> {
    /// Run until the liveness flag is cleared
    ///
    /// Returns the failing check's error only when the error policy is
    /// [`ErrorPolicy::Stop`].
    pub(crate) fn run(&self) -> Result<(), CheckError> {
        tracing::info!("Poll loop started (interval: {:?})", self.interval);

        let mut iteration: u64 = 0;
        while self.liveness.is_running() {
            iteration += 1;

            let outcome = {
                let mut checker = self.checker.lock().unwrap_or_else(PoisonError::into_inner);
                checker.check_for_updates(&self.events)
            };

            if let Err(e) = outcome {
                self.events.emit(ON_ERROR, Value::String(e.to_string()));

                match self.error_policy {
                    ErrorPolicy::LogAndContinue => {
                        tracing::warn!("Update check {} failed, will retry: {}", iteration, e);
                    }
                    ErrorPolicy::Stop => {
                        tracing::error!("Update check {} failed, stopping poll loop: {}", iteration, e);
                        self.liveness.halt();
                        return Err(e);
                    }
                }
            }

            self.liveness.sleep(self.interval);
        }

        tracing::info!("Poll loop stopped after {} iterations", iteration);
        Ok(())
    }
}

/// Spawns the background poll worker thread
pub(crate) fn spawn_poll_worker<C: UpdateCheck>(
    thread_name: &str,
    poll_loop: PollLoop<C>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(thread_name.to_string())
        .spawn(move || {
            // Failures were already logged and reported through on_error
            let _ = poll_loop.run();
        })
}
