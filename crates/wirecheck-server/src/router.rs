//! The externally visible HTTP surface.

use crate::media::media_endpoint;
use crate::responders::{
    cxml_endpoint, cxml_fetch_endpoint, log_request, playback_endpoint,
};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tracing::{info, warn};
use wirecheck_core::RunnerError;

/// Builds the router over the shared state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/run-tests", get(run_tests).post(run_tests))
        .route("/tests/*label", get(run_single).post(run_single))
        .route("/endpoints/media/:label", get(media_endpoint).post(media_endpoint))
        .route(
            "/endpoints/cxml-fetch/:label",
            get(cxml_fetch_endpoint).post(cxml_fetch_endpoint),
        )
        .route(
            "/endpoints/cxml/playback/:label",
            get(playback_endpoint).post(playback_endpoint),
        )
        .route("/endpoints/cxml/:label", get(cxml_endpoint).post(cxml_endpoint))
        .with_state(state)
}

/// `/run-tests`: the primary entry point for CI.
///
/// Honors the `run_only` selector when configured, otherwise executes the
/// whole registry in order, stopping at the first failure.
async fn run_tests(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    log_request(&method, &uri, &headers);
    let _guard = state.run_lock.lock().await;

    if let Some(label) = &state.config.run_only {
        info!(test = %label, "Run selector configured, running single test");
        return run_label(&state, label).await;
    }

    let report = state.runner.run_all().await;
    if report.all_passed() {
        info!(executed = report.executed(), "All tests have completed successfully");
        (
            StatusCode::OK,
            format!("All {} tests completed successfully.\n", report.executed()),
        )
            .into_response()
    } else {
        let failed = report.first_failure().unwrap_or("<unknown>");
        warn!(test = %failed, "Tests have completed - some errors have occurred");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!(
                "Test {failed} failed after {} of the registered tests ran.\n",
                report.executed()
            ),
        )
            .into_response()
    }
}

/// `/tests/{suite}/{label}`: run one driver directly.
async fn run_single(
    State(state): State<Arc<AppState>>,
    Path(label): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    log_request(&method, &uri, &headers);
    let _guard = state.run_lock.lock().await;
    run_label(&state, &label).await
}

async fn run_label(state: &AppState, label: &str) -> Response {
    match state.runner.run_one(label).await {
        Ok(outcome) if outcome.passed() => (
            StatusCode::OK,
            format!("Test {} completed successfully.\n", outcome.label),
        )
            .into_response(),
        Ok(outcome) => {
            let err = outcome
                .result
                .as_ref()
                .err()
                .map(ToString::to_string)
                .unwrap_or_default();
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Test {} failed: {err}\n", outcome.label),
            )
                .into_response()
        }
        // Not-found is distinct from a failing test.
        Err(err @ RunnerError::UnknownTest(_)) | Err(err @ RunnerError::NoDriver(_)) => {
            (StatusCode::NOT_FOUND, format!("{err}\n")).into_response()
        }
    }
}
