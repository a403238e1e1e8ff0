//! Test registry mapping labels to drivers.
//!
//! Every test is independently routable: its responder lives at a distinct
//! externally-visible path derived from the label, so the control plane's
//! fetch can be aimed precisely at the variant under test. Suites contribute
//! their tests without the runner knowing their internals.

use crate::error::DriverError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Initiates one test by triggering an outbound control-plane action.
#[async_trait]
pub trait TestDriver: Send + Sync {
    /// Runs the trigger and, for correlated tests, waits for the callback.
    async fn run(&self) -> Result<(), DriverError>;
}

/// One registered test.
#[derive(Clone)]
pub struct TestDefinition {
    /// Unique key, namespaced per suite (e.g. `cxml-fetch/ssl`).
    pub label: String,

    /// Absent for pure responder checks that have no independent trigger.
    pub driver: Option<Arc<dyn TestDriver>>,
}

impl TestDefinition {
    /// A test with a driver.
    pub fn with_driver(label: impl Into<String>, driver: Arc<dyn TestDriver>) -> Self {
        Self {
            label: label.into(),
            driver: Some(driver),
        }
    }

    /// A responder-only test.
    pub fn responder_only(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            driver: None,
        }
    }
}

impl std::fmt::Debug for TestDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestDefinition")
            .field("label", &self.label)
            .field("has_driver", &self.driver.is_some())
            .finish()
    }
}

/// A provider of related tests sharing a label namespace.
pub trait TestSuite {
    /// Suite name, used for diagnostics and collision reports.
    fn name(&self) -> &str;

    /// The suite's tests, in the order they should execute.
    fn tests(&self) -> Vec<TestDefinition>;
}

/// Immutable mapping from label to test, insertion order preserved.
///
/// Built once at startup by merging suites; read-only afterwards. Label
/// collisions fail registration loudly instead of silently overwriting, so
/// a misnamespaced suite is caught before any test runs.
#[derive(Default)]
pub struct TestRegistry {
    entries: Vec<TestDefinition>,
    index: HashMap<String, usize>,
}

impl TestRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges a suite's tests into the registry.
    pub fn register(&mut self, suite: &dyn TestSuite) -> Result<(), RegistryError> {
        for test in suite.tests() {
            if self.index.contains_key(&test.label) {
                return Err(RegistryError::DuplicateLabel {
                    label: test.label,
                    suite: suite.name().to_string(),
                });
            }
            self.index.insert(test.label.clone(), self.entries.len());
            self.entries.push(test);
        }
        info!(suite = suite.name(), total = self.entries.len(), "Registered test suite");
        Ok(())
    }

    /// Looks up a test by label.
    pub fn lookup(&self, label: &str) -> Option<&TestDefinition> {
        self.index.get(label).map(|&i| &self.entries[i])
    }

    /// All tests in insertion order. This is the run-all execution order.
    pub fn all(&self) -> impl Iterator<Item = &TestDefinition> {
        self.entries.iter()
    }

    /// Number of registered tests.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no tests are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Errors building the registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("label '{label}' from suite '{suite}' is already registered")]
    DuplicateLabel { label: String, suite: String },
}
