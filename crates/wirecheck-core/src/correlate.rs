//! Per-run callback correlation.
//!
//! Each correlated test run registers a token here and embeds it in the
//! status-callback URL handed to the control plane. The inbound callback
//! then self-identifies, so concurrent runs cannot cross-wire each other's
//! callbacks the way a single process-wide signal slot would.

use crate::signal::{CallbackSignal, WaitOutcome};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Opaque token identifying one pending correlated wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CorrelationToken(u64);

impl fmt::Display for CorrelationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl CorrelationToken {
    /// Parses a token from its display form. Returns `None` for anything
    /// that is not a hex token.
    pub fn parse(s: &str) -> Option<Self> {
        u64::from_str_radix(s, 16).ok().map(CorrelationToken)
    }
}

/// Map from correlation token to the one-shot signal a driver is waiting on.
#[derive(Debug, Default)]
pub struct CorrelationTable {
    next: AtomicU64,
    slots: Mutex<HashMap<u64, Arc<CallbackSignal>>>,
}

impl CorrelationTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new pending wait and returns its handle.
    pub async fn begin(self: &Arc<Self>) -> PendingCallback {
        let id = self.next.fetch_add(1, Ordering::Relaxed);
        let signal = Arc::new(CallbackSignal::new());
        self.slots.lock().await.insert(id, Arc::clone(&signal));
        debug!(token = %CorrelationToken(id), "Registered pending callback");
        PendingCallback {
            token: CorrelationToken(id),
            signal,
            table: Arc::clone(self),
        }
    }

    /// Completes the wait registered under `token`.
    ///
    /// Returns false for an unknown token. That is not an error: the
    /// control plane may retry a callback after the driver already gave up.
    pub async fn complete(&self, token: CorrelationToken) -> bool {
        let slots = self.slots.lock().await;
        match slots.get(&token.0) {
            Some(signal) => {
                signal.signal();
                true
            }
            None => {
                warn!(token = %token, "Callback for unknown or expired token");
                false
            }
        }
    }

    /// Number of waits currently registered.
    pub async fn pending(&self) -> usize {
        self.slots.lock().await.len()
    }

    async fn remove(&self, token: CorrelationToken) {
        self.slots.lock().await.remove(&token.0);
    }
}

/// Handle for one registered correlated wait.
///
/// The slot is removed from the table when the wait finishes, whichever way
/// it finishes.
pub struct PendingCallback {
    token: CorrelationToken,
    signal: Arc<CallbackSignal>,
    table: Arc<CorrelationTable>,
}

impl PendingCallback {
    /// The token to embed in the status-callback URL.
    pub fn token(&self) -> CorrelationToken {
        self.token
    }

    /// Waits for the callback, with a mandatory timeout.
    pub async fn wait(self, timeout: Duration) -> WaitOutcome {
        let outcome = self.signal.wait(timeout).await;
        self.table.remove(self.token).await;
        outcome
    }

    /// Abandons the wait without blocking, releasing the slot.
    pub async fn cancel(self) {
        self.table.remove(self.token).await;
    }
}
