//! Cinemeta metadata client
//!
//! Looks up a title/year pair for an IMDb id from a Cinemeta-compatible
//! Stremio addon. Only the two fields the resolver's matching heuristic
//! needs are kept.

use regex::Regex;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use super::seedr::USER_AGENT;

/// Default public Cinemeta instance
pub const DEFAULT_BASE_URL: &str = "https://v3-cinemeta.strem.io";

/// Metadata lookup error types
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Metadata service returned HTTP {0}")]
    Remote(u16),

    #[error("Invalid metadata response: {0}")]
    InvalidResponse(String),

    #[error("Metadata request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
}

/// Title/year pair for one IMDb id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleMeta {
    pub name: String,
    /// 4-digit release year as a string, when the service reports one
    pub year: Option<String>,
}

/// Cinemeta addon client
pub struct CinemetaClient {
    base_url: String,
    http: reqwest::Client,
}

impl CinemetaClient {
    /// Client against the public Cinemeta instance
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Client with a custom base URL (for testing)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(Duration::from_secs(15))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Look up title and year for one IMDb id
    ///
    /// An unknown id (404 or `meta: null`) is `Ok(None)`, not an error.
    pub async fn lookup(
        &self,
        media_type: &str,
        imdb_id: &str,
    ) -> Result<Option<TitleMeta>, MetadataError> {
        let url = format!("{}/meta/{}/{}.json", self.base_url, media_type, imdb_id);
        let response = self.http.get(&url).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(MetadataError::Remote(status.as_u16()));
        }

        let body = response.text().await?;
        let parsed: MetaEnvelope = serde_json::from_str(&body)
            .map_err(|e| MetadataError::InvalidResponse(format!("JSON parse error: {}", e)))?;

        Ok(parsed.meta.map(RawMeta::into_title_meta))
    }
}

impl Default for CinemetaClient {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Response Structures (internal deserialization)
// =============================================================================

#[derive(Debug, Deserialize)]
struct MetaEnvelope {
    #[serde(default)]
    meta: Option<RawMeta>,
}

#[derive(Debug, Deserialize)]
struct RawMeta {
    name: String,
    // Movies carry "year": "1999"; series use ranges like "2008-2013",
    // and some entries only fill releaseInfo
    #[serde(default)]
    year: Option<String>,
    #[serde(default, rename = "releaseInfo")]
    release_info: Option<String>,
}

impl RawMeta {
    fn into_title_meta(self) -> TitleMeta {
        let year = self
            .year
            .as_deref()
            .and_then(leading_year)
            .or_else(|| self.release_info.as_deref().and_then(leading_year));
        TitleMeta {
            name: self.name,
            year,
        }
    }
}

/// First 4-digit run in a year or release-info string
fn leading_year(s: &str) -> Option<String> {
    let re = Regex::new(r"\d{4}").ok()?;
    re.find(s).map(|m| m.as_str().to_string())
}
