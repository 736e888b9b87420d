//! Addon HTTP facade tests
//!
//! Drives the real router over a local socket and verifies the JSON
//! envelope guarantees: Stremio resource endpoints answer HTTP 200 with a
//! well-formed body whatever the downstream failure, and the authorization
//! endpoints always emit JSON.

use std::sync::Arc;

use mockito::{Server, ServerGuard};
use seedrio::api::{CinemetaClient, DeviceAuthClient};
use seedrio::auth::{AuthFlow, CredentialStore};
use seedrio::models::Credential;
use seedrio::server::{router, AppState, Settings};
use serde_json::Value;

// =============================================================================
// Test Harness
// =============================================================================

fn test_state(backend_url: &str, credential: Option<Credential>) -> AppState {
    let settings = Settings {
        seedr_base_url: backend_url.to_string(),
        persist_tokens: false,
    };
    let credentials = Arc::new(CredentialStore::with_credential(credential));
    let device = DeviceAuthClient::with_endpoints(
        "stremio-addon",
        format!("{}/oauth/device", backend_url),
        format!("{}/oauth/token", backend_url),
    );
    let auth = AuthFlow::new(device, Arc::clone(&credentials));
    let metadata = CinemetaClient::with_base_url(backend_url);
    AppState::new(settings, credentials, auth, metadata)
}

/// Serve the router on an ephemeral port and return its base URL
async fn spawn_app(state: AppState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.expect("serve");
    });
    format!("http://{}", addr)
}

async fn get_json(url: &str) -> (reqwest::StatusCode, Value) {
    let response = reqwest::get(url).await.expect("request");
    let status = response.status();
    let body: Value = response.json().await.expect("valid JSON body");
    (status, body)
}

fn single_file_listing() -> &'static str {
    r#"{
        "folders": [],
        "files": [
            {"folder_file_id": 42, "name": "The.Matrix.1999.1080p.mkv", "size": 4509715660, "play_video": true}
        ]
    }"#
}

async fn mock_single_file(server: &mut ServerGuard) {
    server
        .mock("GET", "/folder")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(single_file_listing())
        .create_async()
        .await;
    server
        .mock("GET", "/file/42")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"url": "https://edge.seedr.cc/ff/42.mkv"}"#)
        .create_async()
        .await;
}

// =============================================================================
// Manifest and Root
// =============================================================================

#[tokio::test]
async fn test_manifest_shape() {
    let server = Server::new_async().await;
    let app = spawn_app(test_state(&server.url(), None)).await;

    let (status, body) = get_json(&format!("{}/manifest.json", app)).await;

    assert_eq!(status, 200);
    assert_eq!(body["id"], "org.seedr.stremio");
    assert!(body["resources"]
        .as_array()
        .unwrap()
        .iter()
        .any(|r| r == "stream"));
    assert!(body["idPrefixes"].as_array().unwrap().iter().any(|p| p == "tt"));
    assert!(body["catalogs"].is_array());
}

#[tokio::test]
async fn test_root_reports_running() {
    let server = Server::new_async().await;
    let app = spawn_app(test_state(&server.url(), None)).await;

    let (status, body) = get_json(&app).await;

    assert_eq!(status, 200);
    assert_eq!(body["status"], "running");
    assert_eq!(body["manifest"], "/manifest.json");
}

// =============================================================================
// Stream Endpoint Envelope Guarantees
// =============================================================================

#[tokio::test]
async fn test_stream_without_credential_is_wellformed() {
    let server = Server::new_async().await;
    let app = spawn_app(test_state(&server.url(), None)).await;

    let (status, body) = get_json(&format!("{}/stream/movie/tt0133093.json", app)).await;

    assert_eq!(status, 200);
    assert_eq!(body["streams"], serde_json::json!([]));
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_stream_survives_backend_failure() {
    let mut server = Server::new_async().await;

    // Fault injection: every storage call blows up with a 500
    server
        .mock("GET", "/folder")
        .with_status(500)
        .with_body("backend exploded")
        .create_async()
        .await;

    let state = test_state(&server.url(), Some(Credential::bearer("tok")));
    let app = spawn_app(state).await;

    let (status, body) = get_json(&format!("{}/stream/movie/x.json", app)).await;

    // Still HTTP 200 with a streams array, plus an error string
    assert_eq!(status, 200);
    assert!(body["streams"].as_array().unwrap().is_empty());
    assert!(body["error"].as_str().unwrap().contains("500"));
}

#[tokio::test]
async fn test_stream_resolves_direct_id() {
    let mut server = Server::new_async().await;
    mock_single_file(&mut server).await;

    let state = test_state(&server.url(), Some(Credential::bearer("tok")));
    let app = spawn_app(state).await;

    let (status, body) = get_json(&format!("{}/stream/movie/seedr:42.json", app)).await;

    assert_eq!(status, 200);
    let streams = body["streams"].as_array().unwrap();
    assert_eq!(streams.len(), 1);
    assert_eq!(streams[0]["name"], "Seedr");
    assert_eq!(streams[0]["title"], "The.Matrix.1999.1080p.mkv");
    assert_eq!(streams[0]["url"], "https://edge.seedr.cc/ff/42.mkv");
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn test_stream_resolves_imdb_id() {
    let mut server = Server::new_async().await;
    mock_single_file(&mut server).await;
    server
        .mock("GET", "/meta/movie/tt0133093.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"meta": {"name": "The Matrix", "year": "1999"}}"#)
        .create_async()
        .await;

    let state = test_state(&server.url(), Some(Credential::bearer("tok")));
    let app = spawn_app(state).await;

    let (status, body) = get_json(&format!("{}/stream/movie/tt0133093.json", app)).await;

    assert_eq!(status, 200);
    assert_eq!(body["streams"].as_array().unwrap().len(), 1);
}

// =============================================================================
// Catalog and Meta Endpoints
// =============================================================================

#[tokio::test]
async fn test_catalog_lists_playable_files() {
    let mut server = Server::new_async().await;
    mock_single_file(&mut server).await;

    let state = test_state(&server.url(), Some(Credential::bearer("tok")));
    let app = spawn_app(state).await;

    let (status, body) = get_json(&format!("{}/catalog/other/seedr-cloud.json", app)).await;

    assert_eq!(status, 200);
    let metas = body["metas"].as_array().unwrap();
    assert_eq!(metas.len(), 1);
    assert_eq!(metas[0]["id"], "seedr:42");
    assert_eq!(metas[0]["type"], "other");
    assert_eq!(metas[0]["name"], "The.Matrix.1999.1080p.mkv");
}

#[tokio::test]
async fn test_catalog_survives_backend_failure() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/folder")
        .with_status(502)
        .with_body("bad gateway")
        .create_async()
        .await;

    let state = test_state(&server.url(), Some(Credential::bearer("tok")));
    let app = spawn_app(state).await;

    let (status, body) = get_json(&format!("{}/catalog/other/seedr-cloud.json", app)).await;

    assert_eq!(status, 200);
    assert!(body["metas"].as_array().unwrap().is_empty());
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_meta_found_and_missing() {
    let mut server = Server::new_async().await;
    mock_single_file(&mut server).await;

    let state = test_state(&server.url(), Some(Credential::bearer("tok")));
    let app = spawn_app(state).await;

    let (status, body) = get_json(&format!("{}/meta/other/seedr:42.json", app)).await;
    assert_eq!(status, 200);
    assert_eq!(body["meta"]["id"], "seedr:42");
    assert_eq!(body["meta"]["name"], "The.Matrix.1999.1080p.mkv");

    let (status, body) = get_json(&format!("{}/meta/other/seedr:999.json", app)).await;
    assert_eq!(status, 200);
    assert!(body["meta"].is_null());
}

// =============================================================================
// Authorization Endpoints
// =============================================================================

#[tokio::test]
async fn test_authorize_and_poll_roundtrip() {
    let mut server = Server::new_async().await;

    server
        .mock("POST", "/oauth/device")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"device_code": "dev-1", "user_code": "ABCD-1234", "expires_in": 900, "interval": 5}"#,
        )
        .create_async()
        .await;
    server
        .mock("POST", "/oauth/token")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": "authorization_pending"}"#)
        .create_async()
        .await;

    let state = test_state(&server.url(), None);
    let app = spawn_app(state).await;

    let (status, body) = get_json(&format!("{}/authorize", app)).await;
    assert_eq!(status, 200);
    assert_eq!(body["user_code"], "ABCD-1234");
    assert_eq!(body["device_code"], "dev-1");
    assert!(body["message"].as_str().unwrap().contains("enter this code"));

    let (status, body) = get_json(&format!("{}/authorize/dev-1", app)).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["interval"], 5);
}

#[tokio::test]
async fn test_poll_unknown_code_is_404_json() {
    let server = Server::new_async().await;
    let app = spawn_app(test_state(&server.url(), None)).await;

    let (status, body) = get_json(&format!("{}/authorize/never-issued", app)).await;

    assert_eq!(status, 404);
    assert_eq!(body["error"], "unknown device_code");
}

#[tokio::test]
async fn test_authorize_failure_is_json() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/oauth/device")
        .with_status(500)
        .with_body("oauth down")
        .create_async()
        .await;

    let app = spawn_app(test_state(&server.url(), None)).await;

    let (status, body) = get_json(&format!("{}/authorize", app)).await;

    assert_eq!(status, 502);
    assert!(body["error"].as_str().unwrap().contains("authorize failed"));
}

// =============================================================================
// Debug Endpoint
// =============================================================================

#[tokio::test]
async fn test_debug_files_lists_records() {
    let mut server = Server::new_async().await;
    mock_single_file(&mut server).await;

    let state = test_state(&server.url(), Some(Credential::bearer("tok")));
    let app = spawn_app(state).await;

    let (status, body) = get_json(&format!("{}/debug/files", app)).await;

    assert_eq!(status, 200);
    let files = body.as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["id"], 42);
    assert_eq!(files[0]["playable"], true);
}

#[tokio::test]
async fn test_debug_files_requires_credential() {
    let server = Server::new_async().await;
    let app = spawn_app(test_state(&server.url(), None)).await;

    let (status, body) = get_json(&format!("{}/debug/files", app)).await;

    assert_eq!(status, 401);
    assert_eq!(body["error"], "unauthorized");
}
