//! HTTP harness for webhook-driven call-flow tests.
//!
//! This crate owns the responder surface (the markup and media endpoints a
//! telephony platform fetches during a call) and the test registry that
//! drives calls against that surface. [`build_state`] wires a
//! [`HarnessConfig`] into a ready [`AppState`]; [`build_router`] exposes it
//! over HTTP.

pub mod markup;
pub mod media;
pub mod responders;
pub mod router;
pub mod state;
pub mod suites;

use crate::suites::cxml::CxmlSuite;
use crate::suites::cxml_fetch::CxmlFetchSuite;
use crate::suites::playback::PlaybackSuite;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::error;
use wirecheck_client::{TelephonyClient, TelephonyError};
use wirecheck_core::{CorrelationTable, HarnessConfig, RegistryError, TestRegistry, TestRunner};

pub use router::build_router;
pub use state::AppState;

/// Wiring failures when assembling the harness.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("failed to build telephony client: {0}")]
    Telephony(#[from] TelephonyError),
}

/// Assembles the shared state from a loaded configuration.
///
/// A missing telephony credential does not abort startup: the responder
/// endpoints stay useful on their own, so the suites degrade to
/// responder-only registrations and log what is missing.
pub fn build_state(config: HarnessConfig) -> Result<Arc<AppState>, BuildError> {
    let config = Arc::new(config);
    let correlations = Arc::new(CorrelationTable::new());

    let client = if config.has_telephony_auth() {
        Some(Arc::new(TelephonyClient::new(&config.telephony, &config.tls)?))
    } else {
        error!("Telephony credentials are not configured, call drivers are disabled");
        None
    };

    let mut registry = TestRegistry::new();
    registry.register(&CxmlFetchSuite::new(Arc::clone(&config), client.clone()))?;
    registry.register(&CxmlSuite)?;
    registry.register(&PlaybackSuite::new(
        Arc::clone(&config),
        client,
        Arc::clone(&correlations),
    ))?;

    let runner = TestRunner::new(Arc::new(registry));
    Ok(Arc::new(AppState {
        config,
        runner,
        correlations,
        run_lock: Mutex::new(()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_without_credentials() {
        let state = build_state(HarnessConfig::default()).unwrap();
        // Responder-only entries are still registered.
        assert!(!state.runner.registry().is_empty());
    }

    #[test]
    fn builds_with_credentials() {
        let mut config = HarnessConfig::default();
        config.telephony.project_id = "proj".into();
        config.telephony.space_id = "example.signalwire.com".into();
        config.telephony.api_token = "token".into();
        config.target.hostname = "example.test".into();
        config.target.ip = "127.0.0.1".into();
        config.call.to_number = "+15550001111".into();
        config.call.from_number = "+15550002222".into();
        let state = build_state(config).unwrap();
        // With a full config the driven labels resolve to runnable tests.
        assert!(state.runner.registry().lookup("cxml-fetch/hostname").is_some());
        assert!(state.runner.registry().lookup("cxml/playback/mp3").is_some());
    }
}
