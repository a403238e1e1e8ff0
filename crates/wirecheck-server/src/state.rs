//! Shared per-process state behind the HTTP surface.

use std::sync::Arc;
use tokio::sync::Mutex;
use wirecheck_core::{CorrelationTable, HarnessConfig, TestRunner};

/// Everything the handlers need, shared via `Arc`.
///
/// Responders are logically stateless; the correlation table is the single
/// point of shared mutable state they touch. The run lock serializes test
/// execution so at most one driver is ever in flight.
pub struct AppState {
    pub config: Arc<HarnessConfig>,
    pub runner: TestRunner,
    pub correlations: Arc<CorrelationTable>,
    /// Held for the duration of any run-tests invocation.
    pub run_lock: Mutex<()>,
}
