//! General markup responder suite.
//!
//! Pure responder checks: these have no independent trigger and exist so
//! the control plane (or an operator with curl) can aim a fetch at a known
//! deterministic document.

use wirecheck_core::{TestDefinition, TestSuite};

/// Label prefix for this suite.
pub const SUITE: &str = "cxml";

const LABELS: &[&str] = &[
    "ok",
    "delayed",
    "custom-response",
    "inner-status-callback",
    "status-callback",
];

/// The general responder suite.
#[derive(Debug, Default)]
pub struct CxmlSuite;

impl TestSuite for CxmlSuite {
    fn name(&self) -> &str {
        SUITE
    }

    fn tests(&self) -> Vec<TestDefinition> {
        LABELS
            .iter()
            .map(|label| TestDefinition::responder_only(format!("{SUITE}/{label}")))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_entries_are_responder_only() {
        let tests = CxmlSuite.tests();
        assert_eq!(tests.len(), LABELS.len());
        assert!(tests.iter().all(|t| t.driver.is_none()));
        assert!(tests.iter().all(|t| t.label.starts_with("cxml/")));
    }
}
