//! Responder endpoints answering the control plane's inbound requests.
//!
//! Responders log every request for diagnosis and always answer with a
//! deterministic payload; malformed input never propagates past this
//! boundary.

use crate::markup::{self, MARKUP_CONTENT_TYPE};
use crate::state::AppState;
use crate::suites::playback;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use wirecheck_core::CorrelationToken;

/// Logs method, path and headers of an inbound request.
pub fn log_request(method: &Method, uri: &Uri, headers: &HeaderMap) {
    debug!(%method, path = %uri.path(), "Inbound request");
    for (name, value) in headers {
        debug!(header = %name, value = ?value, "Request header");
    }
}

fn markup_response(body: String) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, MARKUP_CONTENT_TYPE)],
        body,
    )
        .into_response()
}

/// `/endpoints/cxml/{label}`: the general markup responders.
pub async fn cxml_endpoint(
    State(state): State<Arc<AppState>>,
    Path(label): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    log_request(&method, &uri, &headers);

    match label.as_str() {
        "ok" => markup_response(markup::ok_document(None)),
        "custom-response" => markup_response(markup::ok_document(
            state.config.response.override_body.as_deref(),
        )),
        "delayed" => {
            tokio::time::sleep(Duration::from_millis(state.config.response.delay_ms)).await;
            markup_response(markup::ok_document(None))
        }
        "status-callback" | "inner-status-callback" => {
            status_callback(&state, &params, &body).await
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Records receipt of a status callback and wakes the waiting driver.
async fn status_callback(
    state: &AppState,
    params: &HashMap<String, String>,
    body: &str,
) -> Response {
    info!("Status callback received");
    info!(content = %body, "Status callback content");

    match params.get("token").and_then(|t| CorrelationToken::parse(t)) {
        Some(token) => {
            state.correlations.complete(token).await;
        }
        None => warn!("Status callback without a parseable correlation token"),
    }

    markup_response(markup::ok_document(None))
}

/// `/endpoints/cxml-fetch/{label}`: responders for the fetch suite.
///
/// Every variant is answered with the minimal OK document; the `delay`
/// variant holds the response for the configured time first.
pub async fn cxml_fetch_endpoint(
    State(state): State<Arc<AppState>>,
    Path(label): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    log_request(&method, &uri, &headers);

    if !crate::suites::cxml_fetch::is_known_label(&label) {
        return StatusCode::NOT_FOUND.into_response();
    }

    if label == "delay" {
        tokio::time::sleep(Duration::from_millis(state.config.response.delay_ms)).await;
    }

    markup_response(markup::ok_document(None))
}

/// `/endpoints/cxml/playback/{label}`: play documents for the playback
/// suite, pointing back at this harness's media responder.
pub async fn playback_endpoint(
    State(state): State<Arc<AppState>>,
    Path(label): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    log_request(&method, &uri, &headers);

    if !playback::is_known_label(&label) {
        return StatusCode::NOT_FOUND.into_response();
    }

    if label == playback::DELAYED_MP3 {
        tokio::time::sleep(Duration::from_millis(state.config.response.delay_ms)).await;
    }

    let url = markup::media_url(
        &state.config.target.hostname,
        state.config.target.http_port,
        &label,
    );
    markup_response(markup::play_document(&url))
}
