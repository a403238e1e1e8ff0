//! Fetch-URL test suite.
//!
//! Each variant triggers a control-plane call whose fetch URL aims at this
//! harness over a different transport: hostname vs IP addressing, plaintext
//! vs TLS, the primary vs the alternate port, and an artificially delayed
//! responder. The test passes when the trigger is accepted; what the
//! control plane then fetches is observed on the responder side.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info};
use wirecheck_client::{CreateCall, TelephonyClient};
use wirecheck_core::{DriverError, HarnessConfig, TestDefinition, TestDriver, TestSuite};

/// Label prefix for this suite.
pub const SUITE: &str = "cxml-fetch";

/// Which configured listener port a variant dials.
#[derive(Debug, Clone, Copy)]
enum Port {
    Primary,
    Alternate,
    Tls,
}

/// One addressing variant of the fetch test.
#[derive(Debug, Clone, Copy)]
struct FetchVariant {
    label: &'static str,
    use_ip: bool,
    tls: bool,
    port: Port,
}

const VARIANTS: &[FetchVariant] = &[
    FetchVariant { label: "hostname", use_ip: false, tls: false, port: Port::Primary },
    FetchVariant { label: "port-8080", use_ip: false, tls: false, port: Port::Alternate },
    FetchVariant { label: "port-8080-ip", use_ip: true, tls: false, port: Port::Alternate },
    FetchVariant { label: "port-8080-ssl", use_ip: false, tls: true, port: Port::Alternate },
    FetchVariant { label: "port-8080-ip-ssl", use_ip: true, tls: true, port: Port::Alternate },
    FetchVariant { label: "ip", use_ip: true, tls: false, port: Port::Primary },
    FetchVariant { label: "ssl", use_ip: false, tls: true, port: Port::Tls },
    FetchVariant { label: "ip-ssl", use_ip: true, tls: true, port: Port::Tls },
    FetchVariant { label: "delay", use_ip: false, tls: false, port: Port::Primary },
];

/// True when `label` names a variant of this suite.
pub fn is_known_label(label: &str) -> bool {
    VARIANTS.iter().any(|v| v.label == label)
}

impl FetchVariant {
    fn full_label(&self) -> String {
        format!("{SUITE}/{}", self.label)
    }

    /// The fetch URL handed to the control plane for this variant.
    fn fetch_url(&self, config: &HarnessConfig) -> String {
        let scheme = if self.tls { "https" } else { "http" };
        let host = if self.use_ip {
            &config.target.ip
        } else {
            &config.target.hostname
        };
        let port = match self.port {
            Port::Primary => config.target.http_port,
            Port::Alternate => config.target.alt_port,
            Port::Tls => config.target.tls_port,
        };
        format!("{scheme}://{host}:{port}/endpoints/{SUITE}/{}", self.label)
    }
}

/// Driver for one fetch variant. Uncorrelated: the trigger response alone
/// determines the verdict.
struct FetchDriver {
    variant: FetchVariant,
    config: Arc<HarnessConfig>,
    client: Arc<TelephonyClient>,
}

#[async_trait]
impl TestDriver for FetchDriver {
    async fn run(&self) -> Result<(), DriverError> {
        let fetch_url = self.variant.fetch_url(&self.config);
        info!(test = %self.variant.full_label(), %fetch_url, "Triggering fetch test");

        self.client
            .create_call(&CreateCall {
                fetch_url,
                to: self.config.call.to_number.clone(),
                from: self.config.call.from_number.clone(),
                status_callback: None,
            })
            .await
            .map_err(|err| DriverError::Trigger(err.to_string()))
    }
}

/// The fetch suite. Without complete configuration it contributes
/// responder-only definitions so the endpoints stay reachable.
pub struct CxmlFetchSuite {
    config: Arc<HarnessConfig>,
    client: Option<Arc<TelephonyClient>>,
}

impl CxmlFetchSuite {
    pub fn new(config: Arc<HarnessConfig>, client: Option<Arc<TelephonyClient>>) -> Self {
        Self { config, client }
    }

    fn driver_client(&self) -> Option<&Arc<TelephonyClient>> {
        if !self.config.drivers_ready() {
            return None;
        }
        self.client.as_ref()
    }
}

impl TestSuite for CxmlFetchSuite {
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

        VARIANTS
            .iter()
            .map(|variant| match client {
                Some(client) => TestDefinition::with_driver(
                    variant.full_label(),
                    Arc::new(FetchDriver {
                        variant: *variant,
                        config: Arc::clone(&self.config),
                        client: Arc::clone(client),
                    }),
                ),
                None => TestDefinition::responder_only(variant.full_label()),
            })
            .collect()
    }
}
