//! Single-slot wait/notify primitive correlating one inbound callback with
//! one waiting driver.
//!
//! The control plane invokes the status-callback endpoint on its own
//! timeline, fully decoupled from the driver that triggered the call. The
//! driver suspends here until that independent event arrives. A signal that
//! fires before anyone waits is retained and consumed by the next wait, so
//! callers must [`CallbackSignal::reset`] before arming to avoid picking up
//! a stale signal from a previous run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

/// Result of waiting on a [`CallbackSignal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The signal fired, either before or during the wait.
    Signaled,
    /// The timeout elapsed with no signal. Every wait carries a timeout so a
    /// missing callback surfaces as a failure instead of an indefinite hang.
    TimedOut,
}

/// A binary, resettable signal with at most one outstanding armed waiter.
#[derive(Debug, Default)]
pub struct CallbackSignal {
    fired: AtomicBool,
    notify: Notify,
}

impl CallbackSignal {
    /// Creates a signal in the idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears any pending signaled state. Never blocks.
    pub fn reset(&self) {
        self.fired.store(false, Ordering::SeqCst);
    }

    /// Wakes the armed waiter, or leaves the signal primed for the next
    /// wait if no one is armed. Signaling with no waiter is not an error.
    pub fn signal(&self) {
        self.fired.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    /// Suspends until [`CallbackSignal::signal`] fires or the timeout
    /// elapses. Consumes the signaled state on wake.
    pub async fn wait(&self, timeout: Duration) -> WaitOutcome {
        let deadline = Instant::now() + timeout;
        loop {
            // Register interest before checking the flag so a concurrent
            // signal() between the check and the await cannot be missed.
            let notified = self.notify.notified();
            if self.fired.swap(false, Ordering::SeqCst) {
                return WaitOutcome::Signaled;
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return WaitOutcome::TimedOut;
            }
        }
    }
}
