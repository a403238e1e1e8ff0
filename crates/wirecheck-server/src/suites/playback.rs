//! Media playback test suite.
//!
//! Correlated tests: the driver registers a correlation token, hands the
//! control plane a status-callback URL carrying that token, and then
//! suspends until the callback arrives (or the wait budget runs out). The
//! fetched document instructs playback of a media file hosted by this
//! harness.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use wirecheck_client::{CreateCall, StatusCallback, TelephonyClient};
use wirecheck_core::{
    CorrelationTable, DriverError, HarnessConfig, TestDefinition, TestDriver, TestSuite,
    WaitOutcome,
};

/// Label prefix for this suite.
pub const SUITE: &str = "cxml/playback";

/// Responder-only delayed variant.
pub const DELAYED_MP3: &str = "delayed-mp3";

/// Labels with a driver.
const DRIVEN: &[&str] = &["avi", "mp3"];

/// True when `label` names a variant of this suite.
pub fn is_known_label(label: &str) -> bool {
    label == DELAYED_MP3 || DRIVEN.contains(&label)
}

/// Driver for one correlated playback test.
struct PlaybackDriver {
    label: &'static str,
    config: Arc<HarnessConfig>,
    client: Arc<TelephonyClient>,
    correlations: Arc<CorrelationTable>,
}

impl PlaybackDriver {
    fn full_label(&self) -> String {
        format!("{SUITE}/{}", self.label)
    }
}

#[async_trait]
impl TestDriver for PlaybackDriver {
    async fn run(&self) -> Result<(), DriverError> {
        let target = &self.config.target;
        let pending = self.correlations.begin().await;

        let fetch_url = format!(
            "http://{}:{}/endpoints/{SUITE}/{}",
            target.hostname, target.http_port, self.label
        );
        let callback_url = format!(
            "http://{}:{}/endpoints/cxml/status-callback?token={}",
            target.hostname,
            target.http_port,
            pending.token()
        );

        info!(test = %self.full_label(), %fetch_url, "Triggering playback test");

        let trigger = self
            .client
            .create_call(&CreateCall {
                fetch_url,
                to: self.config.call.to_number.clone(),
                from: self.config.call.from_number.clone(),
                status_callback: Some(StatusCallback { url: callback_url }),
            })
            .await;

        if let Err(err) = trigger {
            // No callback can arrive for a trigger that never happened.
            pending.cancel().await;
            return Err(DriverError::Trigger(err.to_string()));
        }

        let budget = Duration::from_secs(self.config.response.callback_timeout_secs);
        match pending.wait(budget).await {
            WaitOutcome::Signaled => {
                info!(test = %self.full_label(), "Status callback received, test complete");
                Ok(())
            }
            WaitOutcome::TimedOut => Err(DriverError::CallbackTimeout {
                label: self.full_label(),
                waited: budget,
            }),
        }
    }
}

/// The playback suite.
pub struct PlaybackSuite {
    config: Arc<HarnessConfig>,
    client: Option<Arc<TelephonyClient>>,
    correlations: Arc<CorrelationTable>,
}

impl PlaybackSuite {
    pub fn new(
        config: Arc<HarnessConfig>,
        client: Option<Arc<TelephonyClient>>,
        correlations: Arc<CorrelationTable>,
    ) -> Self {
        Self {
            config,
            client,
            correlations,
        }
    }

    fn driver_client(&self) -> Option<&Arc<TelephonyClient>> {
        if !self.config.drivers_ready() {
            return None;
        }
        self.client.as_ref()
    }
}

impl TestSuite for PlaybackSuite {
    fn name(&self) -> &str {
        SUITE
    }

    fn tests(&self) -> Vec<TestDefinition> {
        let client = self.driver_client();
        if client.is_none() {
            error!(
                suite = SUITE,
                "Required host/auth/number configuration missing; registering responders only"
            );
        }

        let mut tests: Vec<TestDefinition> = DRIVEN
            .iter()
            .map(|label| match client {
                Some(client) => TestDefinition::with_driver(
                    format!("{SUITE}/{label}"),
                    Arc::new(PlaybackDriver {
                        label,
                        config: Arc::clone(&self.config),
                        client: Arc::clone(client),
                        correlations: Arc::clone(&self.correlations),
                    }),
                ),
                None => TestDefinition::responder_only(format!("{SUITE}/{label}")),
            })
            .collect();

        tests.push(TestDefinition::responder_only(format!("{SUITE}/{DELAYED_MP3}")));
        tests
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suite_contributes_drivers_and_the_delayed_responder() {
        let suite = PlaybackSuite::new(
            Arc::new(HarnessConfig::default()),
            None,
            Arc::new(CorrelationTable::new()),
        );
        let tests = suite.tests();

        let labels: Vec<_> = tests.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "cxml/playback/avi",
                "cxml/playback/mp3",
                "cxml/playback/delayed-mp3"
            ]
        );
        // No config, so no drivers.
        assert!(tests.iter().all(|t| t.driver.is_none()));
    }

    #[test]
    fn known_labels_cover_driven_and_delayed() {
        assert!(is_known_label("avi"));
        assert!(is_known_label("mp3"));
        assert!(is_known_label("delayed-mp3"));
        assert!(!is_known_label("wav"));
    }
}
