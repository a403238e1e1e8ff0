//! # wirecheck-core
//!
//! Core functionality for the Wirecheck call-flow test harness.
//!
//! This crate provides:
//! - Configuration loading and validation
//! - The test registry mapping labels to drivers and responders
//! - The sequential, fail-fast test runner
//! - Callback correlation between outbound triggers and inbound callbacks
//! - The relay call session state machine (answer, record, hang up)

mod config;
mod correlate;
mod error;
mod registry;
mod relay;
mod runner;
mod signal;

pub use config::{
    CallConfig, ConfigError, ConfigWarning, HarnessConfig, RelayConfig, ResponseConfig,
    TargetConfig, TelephonyConfig, TlsConfig,
};
pub use correlate::{CorrelationTable, CorrelationToken, PendingCallback};
pub use error::{DriverError, RunnerError};
pub use registry::{RegistryError, TestDefinition, TestDriver, TestRegistry, TestSuite};
pub use relay::{
    AudioDirection, CallControl, CallControlError, IncomingCall, RecordingParams, RecordingResult,
    RelayCallSession, RelayConsumer, SessionState,
};
pub use runner::{RunReport, TestOutcome, TestRunner};
pub use signal::{CallbackSignal, WaitOutcome};
