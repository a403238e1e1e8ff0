//! Sequential, fail-fast test execution.
//!
//! Correlated tests share the configured callback host, so at most one
//! driver may be in flight at a time. Strict sequential execution with
//! stop-on-first-failure is a correctness requirement here, not a
//! simplification.

use crate::error::{DriverError, RunnerError};
use crate::registry::TestRegistry;
use std::sync::Arc;
use tracing::{error, info};

/// Result of one driver invocation.
#[derive(Debug)]
pub struct TestOutcome {
    /// Label of the test that ran.
    pub label: String,
    /// The driver's verdict.
    pub result: Result<(), DriverError>,
}

impl TestOutcome {
    /// True when the driver reported success.
    pub fn passed(&self) -> bool {
        self.result.is_ok()
    }
}

/// Report for a run-all sequence.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Outcomes in execution order. Tests after the first failure are
    /// absent: they were never started.
    pub outcomes: Vec<TestOutcome>,
}

impl RunReport {
    /// True when every executed driver passed.
    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(TestOutcome::passed)
    }

    /// Label of the first failed test, if any.
    pub fn first_failure(&self) -> Option<&str> {
        self.outcomes
            .iter()
            .find(|o| !o.passed())
            .map(|o| o.label.as_str())
    }

    /// Number of drivers that were invoked.
    pub fn executed(&self) -> usize {
        self.outcomes.len()
    }
}

/// Executes registered tests one by one.
pub struct TestRunner {
    registry: Arc<TestRegistry>,
}

impl TestRunner {
    /// Creates a runner over the given registry.
    pub fn new(registry: Arc<TestRegistry>) -> Self {
        Self { registry }
    }

    /// The registry this runner executes from.
    pub fn registry(&self) -> &TestRegistry {
        &self.registry
    }

    /// Runs every test with a driver, in registration order, stopping at
    /// the first failure. Responder-only entries are skipped.
    pub async fn run_all(&self) -> RunReport {
        let mut report = RunReport::default();

        for test in self.registry.all() {
            let Some(driver) = &test.driver else {
                continue;
            };

            info!(test = %test.label, "Running test");
            let result = driver.run().await;
            let passed = result.is_ok();

            if let Err(err) = &result {
                error!(test = %test.label, error = %err, "Test failed");
            } else {
                info!(test = %test.label, "Test completed successfully");
            }

            report.outcomes.push(TestOutcome {
                label: test.label.clone(),
                result,
            });

            if !passed {
                break;
            }
        }

        report
    }

    /// Runs a single named test. Unknown labels and responder-only labels
    /// are runner errors, distinct from a test failing.
    pub async fn run_one(&self, label: &str) -> Result<TestOutcome, RunnerError> {
        let test = self
            .registry
            .lookup(label)
            .ok_or_else(|| RunnerError::UnknownTest(label.to_string()))?;

        let driver = test
            .driver
            .as_ref()
            .ok_or_else(|| RunnerError::NoDriver(label.to_string()))?;

        info!(test = %test.label, "Running single test");
        let result = driver.run().await;
        if let Err(err) = &result {
            error!(test = %test.label, error = %err, "Test failed");
        }

        Ok(TestOutcome {
            label: test.label.clone(),
            result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{TestDefinition, TestDriver, TestSuite};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingDriver {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl TestDriver for CountingDriver {
        async fn run(&self) -> Result<(), DriverError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(DriverError::Trigger("simulated".to_string()))
            } else {
                Ok(())
            }
        }
    }

    struct DriverSuite {
        tests: Vec<TestDefinition>,
    }

    impl TestSuite for DriverSuite {
        fn name(&self) -> &str {
            "drivers"
        }

        fn tests(&self) -> Vec<TestDefinition> {
            self.tests.clone()
        }
    }

    fn runner_with(tests: Vec<TestDefinition>) -> TestRunner {
        let mut registry = TestRegistry::new();
        registry.register(&DriverSuite { tests }).unwrap();
        TestRunner::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn empty_registry_returns_immediately() {
        let runner = TestRunner::new(Arc::new(TestRegistry::new()));
        let report = runner.run_all().await;
        assert!(report.all_passed());
        assert_eq!(report.executed(), 0);
    }

    #[tokio::test]
    async fn run_all_stops_at_first_failure() {
        let calls: Vec<Arc<AtomicUsize>> =
            (0..5).map(|_| Arc::new(AtomicUsize::new(0))).collect();

        let tests = calls
            .iter()
            .enumerate()
            .map(|(i, c)| {
                TestDefinition::with_driver(
                    format!("t/{i}"),
                    Arc::new(CountingDriver {
                        calls: Arc::clone(c),
                        fail: i == 2,
                    }),
                )
            })
            .collect();

        let report = runner_with(tests).run_all().await;

        // Drivers 1-3 executed, 4-5 never started.
        assert_eq!(report.executed(), 3);
        assert_eq!(report.first_failure(), Some("t/2"));
        let counts: Vec<_> = calls.iter().map(|c| c.load(Ordering::SeqCst)).collect();
        assert_eq!(counts, vec![1, 1, 1, 0, 0]);
    }

    #[tokio::test]
    async fn run_all_skips_responder_only_entries() {
        let calls = Arc::new(AtomicUsize::new(0));
        let tests = vec![
            TestDefinition::responder_only("t/responder"),
            TestDefinition::with_driver(
                "t/driven",
                Arc::new(CountingDriver {
                    calls: Arc::clone(&calls),
                    fail: false,
                }),
            ),
        ];

        let report = runner_with(tests).run_all().await;
        assert!(report.all_passed());
        assert_eq!(report.executed(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn run_one_distinguishes_unknown_from_failure() {
        let runner = runner_with(vec![TestDefinition::with_driver(
            "t/fails",
            Arc::new(CountingDriver {
                calls: Arc::new(AtomicUsize::new(0)),
                fail: true,
            }),
        )]);

        let err = runner.run_one("t/missing").await.unwrap_err();
        assert!(matches!(err, RunnerError::UnknownTest(_)));

        let outcome = runner.run_one("t/fails").await.unwrap();
        assert!(!outcome.passed());
    }

    #[tokio::test]
    async fn run_one_rejects_responder_only_tests() {
        let runner = runner_with(vec![TestDefinition::responder_only("t/responder")]);
        let err = runner.run_one("t/responder").await.unwrap_err();
        assert!(matches!(err, RunnerError::NoDriver(_)));
    }
}
