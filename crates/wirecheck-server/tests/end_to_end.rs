//! Full-loop tests: harness HTTP surface plus a simulated control plane.
//!
//! The simulated control plane accepts call-creation requests the way the
//! real API does, fetches the document URL it was handed, and (when asked)
//! fires the status callback so correlated tests complete.

use axum::extract::Form;
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use wirecheck_core::HarnessConfig;
use wirecheck_server::{build_router, build_state};

/// How the simulated control plane treats status callbacks.
#[derive(Clone, Copy)]
enum CallbackMode {
    Fire,
    Ignore,
}

/// Serves a minimal call-creation endpoint on an ephemeral port.
///
/// Each accepted request spawns the platform side of the call: fetch the
/// document, then (in `Fire` mode) post back to the status callback URL.
async fn spawn_control_plane(mode: CallbackMode) -> SocketAddr {
    let app = Router::new().route(
        "/api/laml/2010-04-01/Accounts/:project/Calls",
        post(move |Form(form): Form<HashMap<String, String>>| async move {
            let http = reqwest::Client::new();
            let fetch_url = form.get("Url").cloned().unwrap_or_default();
            let callback = form.get("StatusCallback").cloned();
            tokio::spawn(async move {
                let _ = http.get(&fetch_url).send().await;
                if let (CallbackMode::Fire, Some(url)) = (mode, callback) {
                    let _ = http
                        .post(&url)
                        .form(&[("CallStatus", "answered")])
                        .send()
                        .await;
                }
            });
            (StatusCode::CREATED, "{\"status\":\"queued\"}")
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Boots a full harness wired against the given control plane.
async fn spawn_harness(control_plane: SocketAddr, media_dir: &str) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let mut config = HarnessConfig::default();
    config.telephony.project_id = "proj-e2e".into();
    config.telephony.space_id = format!("http://{control_plane}");
    config.telephony.api_token = "tok-e2e".into();
    config.target.hostname = "127.0.0.1".into();
    config.target.ip = "127.0.0.1".into();
    config.target.http_port = addr.port();
    config.call.to_number = "+15550001111".into();
    config.call.from_number = "+15550002222".into();
    config.response.callback_timeout_secs = 2;
    config.response.media_dir = media_dir.to_string();
    assert!(config.drivers_ready());

    let state = build_state(config).unwrap();
    let app = build_router(Arc::clone(&state));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn uncorrelated_fetch_test_passes_on_accepted_trigger() {
    let control_plane = spawn_control_plane(CallbackMode::Fire).await;
    let harness = spawn_harness(control_plane, "media").await;

    let response = reqwest::get(format!("http://{harness}/tests/cxml-fetch/hostname"))
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("cxml-fetch/hostname"), "body: {body}");
}

#[tokio::test]
async fn correlated_playback_test_completes_on_status_callback() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("file_example_MP3_1MG.mp3"), b"mp3-bytes").unwrap();

    let control_plane = spawn_control_plane(CallbackMode::Fire).await;
    let harness = spawn_harness(control_plane, dir.path().to_str().unwrap()).await;

    let response = reqwest::get(format!("http://{harness}/tests/cxml/playback/mp3"))
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    // The play document the control plane fetched points at hosted media.
    let media = reqwest::get(format!("http://{harness}/endpoints/media/mp3"))
        .await
        .unwrap();
    assert_eq!(media.status(), reqwest::StatusCode::OK);
    assert_eq!(
        media.headers()[reqwest::header::CONTENT_TYPE],
        "audio/mpeg3"
    );
    assert_eq!(media.bytes().await.unwrap().as_ref(), b"mp3-bytes");
}

#[tokio::test]
async fn correlated_test_fails_loudly_when_no_callback_arrives() {
    let control_plane = spawn_control_plane(CallbackMode::Ignore).await;
    let harness = spawn_harness(control_plane, "media").await;

    let response = reqwest::get(format!("http://{harness}/tests/cxml/playback/mp3"))
        .await
        .unwrap();
    assert_eq!(
        response.status(),
        reqwest::StatusCode::INTERNAL_SERVER_ERROR
    );
    let body = response.text().await.unwrap();
    assert!(body.contains("callback"), "body: {body}");
}

#[tokio::test]
async fn unknown_and_driverless_labels_are_not_found() {
    let control_plane = spawn_control_plane(CallbackMode::Fire).await;
    let harness = spawn_harness(control_plane, "media").await;

    let unknown = reqwest::get(format!("http://{harness}/tests/no-such-suite/nope"))
        .await
        .unwrap();
    assert_eq!(unknown.status(), reqwest::StatusCode::NOT_FOUND);

    // Responder-only labels exist but cannot be run.
    let driverless = reqwest::get(format!("http://{harness}/tests/cxml/ok"))
        .await
        .unwrap();
    assert_eq!(driverless.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn responders_answer_without_any_control_plane() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    // No credentials at all: the responder surface must still work.
    let mut config = HarnessConfig::default();
    config.target.hostname = "127.0.0.1".into();
    config.target.http_port = addr.port();
    config.response.delay_ms = 10;
    config.response.override_body = Some("<response>custom</response>".into());

    let state = build_state(config).unwrap();
    let app = build_router(Arc::clone(&state));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let ok = reqwest::get(format!("http://{addr}/endpoints/cxml/ok"))
        .await
        .unwrap();
    assert_eq!(ok.status(), reqwest::StatusCode::OK);
    assert_eq!(ok.headers()[reqwest::header::CONTENT_TYPE], "application/xml");
    assert_eq!(ok.text().await.unwrap(), "<response>OK</response>");

    let custom = reqwest::get(format!("http://{addr}/endpoints/cxml/custom-response"))
        .await
        .unwrap();
    assert_eq!(custom.text().await.unwrap(), "<response>custom</response>");

    let play = reqwest::get(format!("http://{addr}/endpoints/cxml/playback/mp3"))
        .await
        .unwrap();
    assert_eq!(play.status(), reqwest::StatusCode::OK);
    let doc = play.text().await.unwrap();
    assert!(doc.contains(&format!(
        "<Play>http://127.0.0.1:{}/endpoints/media/mp3</Play>",
        addr.port()
    )));

    let missing = reqwest::get(format!("http://{addr}/endpoints/cxml-fetch/bogus"))
        .await
        .unwrap();
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn run_tests_reports_first_failure() {
    // Control plane that never fires callbacks: the fetch variants still
    // pass (trigger-only), the first correlated test fails the run.
    let control_plane = spawn_control_plane(CallbackMode::Ignore).await;
    let harness = spawn_harness(control_plane, "media").await;

    let response = reqwest::get(format!("http://{harness}/run-tests"))
        .await
        .unwrap();
    assert_eq!(
        response.status(),
        reqwest::StatusCode::INTERNAL_SERVER_ERROR
    );
    let body = response.text().await.unwrap();
    assert!(body.contains("cxml/playback/avi"), "body: {body}");
}
