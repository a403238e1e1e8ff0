//! Call creation against the telephony control plane.

use base64::Engine;
use tracing::{debug, info, warn};
use wirecheck_core::{TelephonyConfig, TlsConfig};

/// Development space used when no space is configured.
const DEFAULT_SPACE: &str = "dev.swire.io";

/// Status-callback event filter: fire once the call is answered.
const STATUS_CALLBACK_EVENT: &str = "answered";

/// Parameters for one call-creation request.
#[derive(Debug, Clone)]
pub struct CreateCall {
    /// URL the control plane fetches its call script from. This is the
    /// whole point of the harness: the URL aims back at a responder here.
    pub fetch_url: String,
    pub to: String,
    pub from: String,
    /// Present for correlated tests only.
    pub status_callback: Option<StatusCallback>,
}

/// Out-of-band status callback registration.
#[derive(Debug, Clone)]
pub struct StatusCallback {
    pub url: String,
}

/// Errors from the control-plane client.
#[derive(Debug, thiserror::Error)]
pub enum TelephonyError {
    #[error("client construction failed: {0}")]
    Build(#[source] reqwest::Error),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("control plane returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Client for the call-creation endpoint of the Telephony Control API.
pub struct TelephonyClient {
    http: reqwest::Client,
    calls_url: String,
    authorization: String,
}

impl TelephonyClient {
    /// Builds a client from configuration.
    ///
    /// When `tls.accept_hostname_mismatch` is set, certificate subject
    /// mismatches against responder hostnames under test are tolerated.
    /// Chain and expiry validation remain strict either way.
    pub fn new(telephony: &TelephonyConfig, tls: &TlsConfig) -> Result<Self, TelephonyError> {
        let mut builder = reqwest::Client::builder();
        if tls.accept_hostname_mismatch {
            builder = builder.danger_accept_invalid_hostnames(true);
        }
        let http = builder.build().map_err(TelephonyError::Build)?;

        let credentials = format!("{}:{}", telephony.project_id, telephony.api_token);
        let authorization = format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(credentials)
        );

        Ok(Self {
            http,
            calls_url: calls_url(&telephony.space_id, &telephony.project_id),
            authorization,
        })
    }

    /// The resolved call-creation endpoint URL.
    pub fn calls_url(&self) -> &str {
        &self.calls_url
    }

    /// Creates a new call.
    ///
    /// Success is any 2xx from the control plane. A failure here means the
    /// trigger itself broke, which is harness breakage to debug, not a
    /// verdict on the endpoint under test.
    pub async fn create_call(&self, call: &CreateCall) -> Result<(), TelephonyError> {
        let mut form: Vec<(&str, &str)> = vec![
            ("Url", call.fetch_url.as_str()),
            ("To", call.to.as_str()),
            ("From", call.from.as_str()),
        ];
        if let Some(cb) = &call.status_callback {
            form.push(("StatusCallback", cb.url.as_str()));
            form.push(("StatusCallbackEvent", STATUS_CALLBACK_EVENT));
        }

        debug!(url = %self.calls_url, fetch_url = %call.fetch_url, "Creating call");

        let response = self
            .http
            .post(&self.calls_url)
            .header(reqwest::header::AUTHORIZATION, &self.authorization)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.is_success() {
            info!(%status, "Call creation request succeeded");
            debug!(body = %body, "Control plane response");
            Ok(())
        } else {
            warn!(%status, body = %body, "Call creation request failed");
            Err(TelephonyError::Status { status, body })
        }
    }
}

/// Builds the call-creation URL for a space and project.
///
/// An empty space selects the development fallback. A space that already
/// carries a scheme is used verbatim, which is how integration tests point
/// the client at a simulated control plane over plain HTTP.
fn calls_url(space_id: &str, project_id: &str) -> String {
    let base = if space_id.is_empty() {
        format!("https://{DEFAULT_SPACE}")
    } else if space_id.contains("://") {
        space_id.trim_end_matches('/').to_string()
    } else {
        format!("https://{space_id}")
    };
    format!("{base}/api/laml/2010-04-01/Accounts/{project_id}/Calls")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calls_url_uses_configured_space() {
        assert_eq!(
            calls_url("example.signalwire.com", "p-1"),
            "https://example.signalwire.com/api/laml/2010-04-01/Accounts/p-1/Calls"
        );
    }

    #[test]
    fn empty_space_falls_back_to_dev() {
        assert_eq!(
            calls_url("", "p-1"),
            "https://dev.swire.io/api/laml/2010-04-01/Accounts/p-1/Calls"
        );
    }

    #[test]
    fn space_with_scheme_is_used_verbatim() {
        assert_eq!(
            calls_url("http://127.0.0.1:8099/", "p-1"),
            "http://127.0.0.1:8099/api/laml/2010-04-01/Accounts/p-1/Calls"
        );
    }
}
