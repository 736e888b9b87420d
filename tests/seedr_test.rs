//! Seedr storage client tests
//!
//! Tests listing, file resolution, authentication headers, and error
//! mapping against a mock Seedr API.

use mockito::Server;
use seedrio::api::seedr::SeedrError;
use seedrio::models::Credential;
use seedrio::SeedrClient;

fn client(server: &Server, credential: Credential) -> SeedrClient {
    SeedrClient::with_base_url(credential, server.url())
}

// =============================================================================
// Listing Tests
// =============================================================================

#[tokio::test]
async fn test_list_root_parses_files_and_folders() {
    let mut server = Server::new_async().await;

    let mock_response = r#"{
        "space_max": 5368709120,
        "space_used": 4821002000,
        "folders": [
            {"id": 111, "name": "Movies", "size": 4509715660}
        ],
        "files": [
            {
                "folder_file_id": 42,
                "name": "The.Matrix.1999.1080p.mkv",
                "size": 4509715660,
                "play_video": true,
                "thumb": "https://thumbs.seedr.cc/42.jpg"
            },
            {
                "folder_file_id": 43,
                "name": "readme.txt",
                "size": 1024,
                "play_video": false
            }
        ]
    }"#;

    let mock = server
        .mock("GET", "/folder")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(mock_response)
        .create_async()
        .await;

    let listing = client(&server, Credential::bearer("tok"))
        .list_contents(None)
        .await
        .unwrap();

    mock.assert_async().await;

    assert_eq!(listing.files.len(), 2);
    assert_eq!(listing.files[0].id, 42);
    assert_eq!(listing.files[0].name, "The.Matrix.1999.1080p.mkv");
    assert!(listing.files[0].playable);
    assert_eq!(
        listing.files[0].thumbnail.as_deref(),
        Some("https://thumbs.seedr.cc/42.jpg")
    );
    assert!(!listing.files[1].playable);
    assert!(listing.files[1].thumbnail.is_none());

    assert_eq!(listing.folders.len(), 1);
    assert_eq!(listing.folders[0].id, 111);
    assert_eq!(listing.folders[0].name, "Movies");
}

#[tokio::test]
async fn test_list_subfolder_hits_folder_path() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/folder/111")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"files": [], "folders": []}"#)
        .create_async()
        .await;

    let listing = client(&server, Credential::bearer("tok"))
        .list_contents(Some(111))
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(listing.is_empty());
}

#[tokio::test]
async fn test_list_tolerates_missing_arrays() {
    let mut server = Server::new_async().await;

    // Some payload shapes omit empty arrays entirely
    let mock = server
        .mock("GET", "/folder")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"space_max": 1}"#)
        .create_async()
        .await;

    let listing = client(&server, Credential::bearer("tok"))
        .list_contents(None)
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(listing.files.is_empty());
    assert!(listing.folders.is_empty());
}

// =============================================================================
// File Resolution Tests
// =============================================================================

#[tokio::test]
async fn test_fetch_file_returns_url() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/file/42")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"url": "https://edge.seedr.cc/ff/42.mkv", "name": "The.Matrix.1999.1080p.mkv"}"#)
        .create_async()
        .await;

    let link = client(&server, Credential::bearer("tok"))
        .fetch_file(42)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(link.url, "https://edge.seedr.cc/ff/42.mkv");
}

#[tokio::test]
async fn test_fetch_file_rejects_empty_url() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/file/42")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"url": ""}"#)
        .create_async()
        .await;

    let result = client(&server, Credential::bearer("tok")).fetch_file(42).await;

    mock.assert_async().await;
    assert!(matches!(result, Err(SeedrError::InvalidResponse(_))));
}

// =============================================================================
// Authentication Tests
// =============================================================================

#[tokio::test]
async fn test_sends_bearer_token() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/folder")
        .match_header("Authorization", "Bearer secret-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"files": [], "folders": []}"#)
        .create_async()
        .await;

    let _ = client(&server, Credential::bearer("secret-token"))
        .list_contents(None)
        .await;

    mock.assert_async().await;
}

#[tokio::test]
async fn test_sends_session_cookie() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/folder")
        .match_header("Cookie", "RSESSID=abc123")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"files": [], "folders": []}"#)
        .create_async()
        .await;

    let _ = client(&server, Credential::cookie("RSESSID=abc123"))
        .list_contents(None)
        .await;

    mock.assert_async().await;
}

// =============================================================================
// Error Handling Tests
// =============================================================================

#[tokio::test]
async fn test_unauthorized_maps_to_typed_error() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/folder")
        .with_status(401)
        .with_body(r#"{"error": "invalid_token"}"#)
        .create_async()
        .await;

    let result = client(&server, Credential::bearer("revoked"))
        .list_contents(None)
        .await;

    mock.assert_async().await;
    assert!(matches!(result, Err(SeedrError::Unauthorized)));
}

#[tokio::test]
async fn test_not_found_maps_to_typed_error() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/file/999")
        .with_status(404)
        .with_body("Not Found")
        .create_async()
        .await;

    let result = client(&server, Credential::bearer("tok")).fetch_file(999).await;

    mock.assert_async().await;
    assert!(matches!(result, Err(SeedrError::NotFound)));
}

#[tokio::test]
async fn test_server_error_is_remote_and_not_retried() {
    let mut server = Server::new_async().await;

    // Non-2xx is surfaced immediately; exactly one request must arrive
    let mock = server
        .mock("GET", "/folder")
        .with_status(500)
        .with_body("Internal Server Error")
        .expect(1)
        .create_async()
        .await;

    let result = client(&server, Credential::bearer("tok"))
        .list_contents(None)
        .await;

    mock.assert_async().await;
    match result {
        Err(SeedrError::Remote { status, body }) => {
            assert_eq!(status, 500);
            assert!(body.contains("Internal Server Error"));
        }
        other => panic!("expected Remote error, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_handles_invalid_json() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/folder")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("not valid json {{{")
        .create_async()
        .await;

    let result = client(&server, Credential::bearer("tok"))
        .list_contents(None)
        .await;

    mock.assert_async().await;
    assert!(matches!(result, Err(SeedrError::InvalidResponse(_))));
}
