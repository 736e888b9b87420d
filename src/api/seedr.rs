//! Seedr REST API client
//!
//! Thin authenticated wrapper over the Seedr storage endpoints
//! (`/folder`, `/file/{id}`), normalizing responses into typed records.
//! Read-only: delete and upload endpoints exist upstream but are not wrapped.

use reqwest::{header, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::models::{Credential, FileLink, FileRecord, FolderListing, FolderRecord};

/// Default Seedr REST base URL
pub const DEFAULT_BASE_URL: &str = "https://www.seedr.cc/rest";

/// User-Agent sent on every Seedr request
pub(crate) const USER_AGENT: &str = concat!("seedrio/", env!("CARGO_PKG_VERSION"));

const MAX_ATTEMPTS: u32 = 3;
const RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// Seedr API error types
#[derive(Error, Debug)]
pub enum SeedrError {
    #[error("Unauthorized (token missing, invalid, or revoked)")]
    Unauthorized,

    #[error("Resource not found (404)")]
    NotFound,

    #[error("Seedr returned HTTP {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("Transient network error, retries exhausted: {0}")]
    Transient(#[source] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl SeedrError {
    /// Map a non-2xx status plus body into the right variant
    fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SeedrError::Unauthorized,
            StatusCode::NOT_FOUND => SeedrError::NotFound,
            _ => SeedrError::Remote {
                status: status.as_u16(),
                body,
            },
        }
    }
}

/// True when the failure is worth one more attempt
fn is_transient(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

/// Seedr storage client
pub struct SeedrClient {
    base_url: String,
    credential: Credential,
    http: reqwest::Client,
}

impl SeedrClient {
    /// Create a client against the production Seedr API
    pub fn new(credential: Credential) -> Self {
        Self::with_base_url(credential, DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing)
    pub fn with_base_url(credential: Credential, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            credential,
            http: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
        }
    }

    /// List one directory level; root when `folder_id` is omitted
    pub async fn list_contents(&self, folder_id: Option<u64>) -> Result<FolderListing, SeedrError> {
        let path = match folder_id {
            Some(id) => format!("/folder/{}", id),
            None => "/folder".to_string(),
        };
        let raw: RawListing = self.get(&path).await?;
        Ok(raw.into_listing())
    }

    /// Fetch the direct playable URL for one file
    pub async fn fetch_file(&self, file_id: u64) -> Result<FileLink, SeedrError> {
        let raw: RawLink = self.get(&format!("/file/{}", file_id)).await?;
        if raw.url.is_empty() {
            return Err(SeedrError::InvalidResponse(
                "file endpoint returned an empty url".to_string(),
            ));
        }
        Ok(FileLink { url: raw.url })
    }

    /// Authenticated GET with bounded retry for transient network failures
    ///
    /// Non-2xx responses are surfaced immediately and never retried.
    async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, SeedrError> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt = 1;

        loop {
            let mut request = self.http.get(&url).header(header::ACCEPT, "application/json");
            request = if self.credential.is_cookie() {
                request.header(header::COOKIE, &self.credential.token)
            } else {
                request.bearer_auth(&self.credential.token)
            };

            let response = match request.send().await {
                Ok(response) => response,
                Err(err) if is_transient(&err) && attempt < MAX_ATTEMPTS => {
                    tracing::debug!(%url, attempt, "transient Seedr failure, retrying");
                    attempt += 1;
                    tokio::time::sleep(RETRY_BACKOFF).await;
                    continue;
                }
                Err(err) => return Err(SeedrError::Transient(err)),
            };

            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(SeedrError::Transient)?;

            if !status.is_success() {
                return Err(SeedrError::from_status(status, body));
            }

            return serde_json::from_str(&body)
                .map_err(|e| SeedrError::InvalidResponse(format!("JSON parse error: {}", e)));
        }
    }
}

// =============================================================================
// Response Structures (internal deserialization)
// =============================================================================

#[derive(Debug, Deserialize)]
struct RawListing {
    #[serde(default)]
    files: Vec<RawFile>,
    #[serde(default)]
    folders: Vec<RawFolder>,
}

impl RawListing {
    fn into_listing(self) -> FolderListing {
        FolderListing {
            files: self.files.into_iter().map(RawFile::into_record).collect(),
            folders: self
                .folders
                .into_iter()
                .map(|f| FolderRecord { id: f.id, name: f.name })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawFile {
    // Listings call it folder_file_id; some payloads use plain id
    #[serde(alias = "id")]
    folder_file_id: u64,
    name: String,
    #[serde(default)]
    size: u64,
    #[serde(default, alias = "playable")]
    play_video: bool,
    #[serde(default)]
    thumb: Option<String>,
}

impl RawFile {
    fn into_record(self) -> FileRecord {
        FileRecord {
            id: self.folder_file_id,
            name: self.name,
            size: self.size,
            playable: self.play_video,
            thumbnail: self.thumb.filter(|t| !t.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawFolder {
    id: u64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawLink {
    #[serde(default)]
    url: String,
}
