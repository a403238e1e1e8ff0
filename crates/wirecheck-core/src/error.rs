//! Error types shared between the runner and the test suites.

use std::time::Duration;

/// Failure of one driver run. Always local to the test that produced it;
/// at worst it aborts the remainder of a run-all sequence.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// The outbound control-plane call failed (non-2xx or transport error).
    /// This is harness breakage to debug, not a verdict on the endpoint
    /// under test.
    #[error("trigger request failed: {0}")]
    Trigger(String),

    /// The expected status callback never arrived within the wait budget.
    #[error("no status callback received for {label} within {waited:?}")]
    CallbackTimeout { label: String, waited: Duration },

    /// The suite's configuration is incomplete for this driver.
    #[error("suite configuration incomplete: {0}")]
    Config(String),
}

/// Errors from the test runner itself, distinct from test failures.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("no test registered under label '{0}'")]
    UnknownTest(String),

    #[error("test '{0}' has no driver; it is exercised via its responder only")]
    NoDriver(String),
}
