//! Configuration types for the Wirecheck harness.
//!
//! Configuration is an explicit value object constructed once at startup and
//! passed by reference into every component that needs it. Values come from a
//! YAML file, optionally overridden by environment variables with the
//! `wirecheck_` prefix (mirroring how the harness was historically driven
//! from CI environments).

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "wirecheck_";

/// Top-level configuration for the harness.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Control-plane credentials.
    #[serde(default)]
    pub telephony: TelephonyConfig,

    /// Hostnames, addresses and ports the control plane fetches back into.
    #[serde(default)]
    pub target: TargetConfig,

    /// Calling/called party identifiers used for every triggered call.
    #[serde(default)]
    pub call: CallConfig,

    /// Responder behavior: artificial delays, override bodies, media files.
    #[serde(default)]
    pub response: ResponseConfig,

    /// Inbound relay call consumer settings.
    #[serde(default)]
    pub relay: RelayConfig,

    /// TLS policy for the outbound control-plane client.
    #[serde(default)]
    pub tls: TlsConfig,

    /// When set, `/run-tests` executes only this label instead of the
    /// whole registry.
    #[serde(default)]
    pub run_only: Option<String>,
}

/// Credentials for the Telephony Control API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelephonyConfig {
    /// Project identifier, doubles as the Basic-auth username.
    #[serde(default)]
    pub project_id: String,

    /// Space hostname the REST API lives under. Empty selects the
    /// development space fallback.
    #[serde(default)]
    pub space_id: String,

    /// API token, the Basic-auth password.
    #[serde(default)]
    pub api_token: String,
}

/// Where the control plane should fetch documents from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Hostname variants resolve against this name.
    #[serde(default)]
    pub hostname: String,

    /// IP variants dial this address directly.
    #[serde(default)]
    pub ip: String,

    /// Primary plaintext listener port.
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Alternate plaintext listener port exercised by the port-8080 variants.
    #[serde(default = "default_alt_port")]
    pub alt_port: u16,

    /// TLS port used when building https fetch URLs. Termination itself is
    /// handled by fronting infrastructure, not by this process.
    #[serde(default = "default_tls_port")]
    pub tls_port: u16,
}

fn default_http_port() -> u16 {
    80
}

fn default_alt_port() -> u16 {
    8080
}

fn default_tls_port() -> u16 {
    443
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            hostname: String::new(),
            ip: String::new(),
            http_port: default_http_port(),
            alt_port: default_alt_port(),
            tls_port: default_tls_port(),
        }
    }
}

/// Party identifiers for triggered calls.
///
/// Every test uses the same pair for simplicity. If the "to" number is a
/// real provisioned number it will be executed as part of the call; point it
/// at something inert.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallConfig {
    #[serde(default)]
    pub to_number: String,

    #[serde(default)]
    pub from_number: String,
}

/// Responder-side tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseConfig {
    /// Artificial delay applied by the delayed responders, in milliseconds.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Replacement body for the custom-response endpoint.
    #[serde(default)]
    pub override_body: Option<String>,

    /// Directory holding the media files served to playback tests.
    #[serde(default = "default_media_dir")]
    pub media_dir: String,

    /// How long a correlated driver waits for its status callback before the
    /// test is failed with a callback timeout.
    #[serde(default = "default_callback_timeout")]
    pub callback_timeout_secs: u64,
}

fn default_delay_ms() -> u64 {
    4000
}

fn default_media_dir() -> String {
    "media".to_string()
}

fn default_callback_timeout() -> u64 {
    120
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            override_body: None,
            media_dir: default_media_dir(),
            callback_timeout_secs: default_callback_timeout(),
        }
    }
}

/// Relay consumer settings. The consumer only starts when a context is
/// configured.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Named inbound-call listening channel.
    #[serde(default)]
    pub context: Option<String>,

    /// Relay service host override.
    #[serde(default)]
    pub host: Option<String>,
}

/// TLS policy for the outbound control-plane client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsConfig {
    /// Accept certificates whose subject does not match the responder
    /// hostname under test. Responder hostnames are ad hoc, so the subject
    /// rarely matches; chain and expiry validation stay strict. This is
    /// test-environment leniency, not production policy.
    #[serde(default = "default_true")]
    pub accept_hostname_mismatch: bool,
}

fn default_true() -> bool {
    true
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            accept_hostname_mismatch: default_true(),
        }
    }
}

impl HarnessConfig {
    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        debug!(path = %path_ref.display(), "Loading configuration from file");
        let content = std::fs::read_to_string(path_ref)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Applies `wirecheck_`-prefixed environment variable overrides.
    ///
    /// The key set matches the flat keys the harness has always accepted, so
    /// existing CI environments keep working without a config file.
    pub fn apply_env(&mut self) {
        self.apply_env_from(std::env::vars());
    }

    fn apply_env_from(&mut self, vars: impl Iterator<Item = (String, String)>) {
        for (key, value) in vars {
            let Some(stripped) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match stripped {
                "test_project_id" => self.telephony.project_id = value,
                "test_space_id" => self.telephony.space_id = value,
                "test_api_token" => self.telephony.api_token = value,
                "test_hostname" => self.target.hostname = value,
                "test_ip" => self.target.ip = value,
                "test_to_number" => self.call.to_number = value,
                "test_from_number" => self.call.from_number = value,
                "test_response" => self.response.override_body = Some(value),
                "test_delay_ms" => {
                    if let Ok(ms) = value.parse() {
                        self.response.delay_ms = ms;
                    }
                }
                "test_to_run" => self.run_only = Some(value),
                "relay_context" => self.relay.context = Some(value),
                "relay_host" => self.relay.host = Some(value),
                other => debug!(key = other, "Ignoring unknown override"),
            }
        }
    }

    /// Validates the configuration and returns warnings.
    ///
    /// Missing settings are never fatal to the process: they disable the
    /// test suites that need them while the rest of the harness still runs.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if !self.has_target_hosts() {
            warnings.push(ConfigWarning::MissingSetting {
                fields: "target.hostname, target.ip",
                effect: "fetch and playback suites will register responders only",
            });
        }

        if !self.has_telephony_auth() {
            warnings.push(ConfigWarning::MissingSetting {
                fields: "telephony.project_id, telephony.space_id, telephony.api_token",
                effect: "no drivers can trigger control-plane calls",
            });
        }

        if !self.has_call_numbers() {
            // The vendor docs claim these are optional; call creation fails
            // without them regardless.
            warnings.push(ConfigWarning::MissingSetting {
                fields: "call.to_number, call.from_number",
                effect: "call creation requests will be rejected",
            });
        }

        if self.relay.context.is_none() {
            warnings.push(ConfigWarning::MissingSetting {
                fields: "relay.context",
                effect: "relay call consumer will not start",
            });
        }

        warnings
    }

    /// True when control-plane credentials are complete.
    pub fn has_telephony_auth(&self) -> bool {
        !self.telephony.project_id.is_empty()
            && !self.telephony.space_id.is_empty()
            && !self.telephony.api_token.is_empty()
    }

    /// True when both target addressing modes are configured.
    pub fn has_target_hosts(&self) -> bool {
        !self.target.hostname.is_empty() && !self.target.ip.is_empty()
    }

    /// True when both party identifiers are configured.
    pub fn has_call_numbers(&self) -> bool {
        !self.call.to_number.is_empty() && !self.call.from_number.is_empty()
    }

    /// True when every setting the driver suites need is present.
    pub fn drivers_ready(&self) -> bool {
        self.has_telephony_auth() && self.has_target_hosts() && self.has_call_numbers()
    }
}

/// Configuration warnings emitted during validation.
#[derive(Debug, Clone)]
pub enum ConfigWarning {
    /// A setting group is absent and a harness capability is degraded.
    MissingSetting {
        fields: &'static str,
        effect: &'static str,
    },
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::MissingSetting { fields, effect } => {
                write!(f, "Warning [{}]: not set - {}", fields, effect)
            }
        }
    }
}

/// Errors loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_config() -> HarnessConfig {
        let yaml = r#"
telephony:
  project_id: "proj-1"
  space_id: "example.signalwire.com"
  api_token: "tok"
target:
  hostname: "fetch.example.com"
  ip: "203.0.113.7"
call:
  to_number: "+15550001111"
  from_number: "+15550002222"
"#;
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn defaults_fill_ports_and_delay() {
        let config = HarnessConfig::default();
        assert_eq!(config.target.http_port, 80);
        assert_eq!(config.target.alt_port, 8080);
        assert_eq!(config.target.tls_port, 443);
        assert_eq!(config.response.delay_ms, 4000);
        assert!(config.tls.accept_hostname_mismatch);
    }

    #[test]
    fn complete_config_passes_driver_gate() {
        let config = complete_config();
        assert!(config.has_telephony_auth());
        assert!(config.has_target_hosts());
        assert!(config.has_call_numbers());
        assert!(config.drivers_ready());
    }

    #[test]
    fn missing_auth_warns_but_is_not_fatal() {
        let mut config = complete_config();
        config.telephony.api_token.clear();

        assert!(!config.drivers_ready());
        let warnings = config.validate();
        assert!(warnings.iter().any(|w| {
            matches!(w, ConfigWarning::MissingSetting { fields, .. }
                if fields.contains("api_token"))
        }));
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = HarnessConfig::default();
        let vars = vec![
            ("wirecheck_test_hostname".to_string(), "h.example".to_string()),
            ("wirecheck_test_ip".to_string(), "198.51.100.4".to_string()),
            ("wirecheck_test_delay_ms".to_string(), "250".to_string()),
            ("wirecheck_test_to_run".to_string(), "cxml-fetch/ssl".to_string()),
            ("unrelated".to_string(), "ignored".to_string()),
        ];
        config.apply_env_from(vars.into_iter());

        assert_eq!(config.target.hostname, "h.example");
        assert_eq!(config.target.ip, "198.51.100.4");
        assert_eq!(config.response.delay_ms, 250);
        assert_eq!(config.run_only.as_deref(), Some("cxml-fetch/ssl"));
    }

    #[test]
    fn unparseable_delay_keeps_default() {
        let mut config = HarnessConfig::default();
        let vars = vec![("wirecheck_test_delay_ms".to_string(), "soon".to_string())];
        config.apply_env_from(vars.into_iter());
        assert_eq!(config.response.delay_ms, 4000);
    }

    #[test]
    fn from_file_round_trip() {
        use std::io::Write;
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("wirecheck.yml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"target:\n  hostname: \"a.example\"\n  ip: \"192.0.2.1\"\n")
            .unwrap();

        let config = HarnessConfig::from_file(&path).unwrap();
        assert_eq!(config.target.hostname, "a.example");
        assert!(config.has_target_hosts());
    }
}
