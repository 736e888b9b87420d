//! Seedr device-code authorization client
//!
//! Issues the two HTTP calls behind the OAuth-style device grant: request a
//! device/user code pair, then exchange the device code for an access token
//! once the user has approved it at the verification URI. The polling loop
//! and session bookkeeping live in [`crate::auth`].

use reqwest::header;
use serde::Deserialize;
use std::time::Duration;

use super::seedr::{SeedrError, USER_AGENT};

/// Default endpoint that hands out device/user code pairs
pub const DEFAULT_DEVICE_URL: &str = "https://www.seedr.cc/oauth/device";
/// Default endpoint that exchanges an approved device code for a token
pub const DEFAULT_TOKEN_URL: &str = "https://www.seedr.cc/oauth/token";
/// Where the user enters the user code
pub const DEFAULT_VERIFICATION_URI: &str = "https://www.seedr.cc/devices";

const DEVICE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// A freshly issued device/user code pair
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceCodeGrant {
    pub device_code: String,
    pub user_code: String,
    #[serde(default = "default_verification_uri")]
    pub verification_uri: String,
    pub expires_in: u64,
    pub interval: u64,
}

fn default_verification_uri() -> String {
    DEFAULT_VERIFICATION_URI.to_string()
}

/// Outcome of one token-exchange attempt
#[derive(Debug, Clone)]
pub enum TokenPoll {
    /// The user approved the code; token issued
    Authorized { access_token: String },
    /// Not approved yet; ask again after the advertised interval
    Pending,
}

/// Client for the device authorization endpoints
pub struct DeviceAuthClient {
    device_url: String,
    token_url: String,
    client_id: String,
    http: reqwest::Client,
}

impl DeviceAuthClient {
    /// Client against the production Seedr OAuth endpoints
    pub fn new(client_id: impl Into<String>) -> Self {
        Self::with_endpoints(client_id, DEFAULT_DEVICE_URL, DEFAULT_TOKEN_URL)
    }

    /// Client with custom endpoints (for testing)
    pub fn with_endpoints(
        client_id: impl Into<String>,
        device_url: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        Self {
            device_url: device_url.into(),
            token_url: token_url.into(),
            client_id: client_id.into(),
            http: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Request a new device/user code pair
    pub async fn request_device_code(&self) -> Result<DeviceCodeGrant, SeedrError> {
        let response = self
            .http
            .post(&self.device_url)
            .header(header::ACCEPT, "application/json")
            .form(&[("client_id", self.client_id.as_str()), ("scope", "user")])
            .send()
            .await
            .map_err(SeedrError::Transient)?;

        let status = response.status();
        let body = response.text().await.map_err(SeedrError::Transient)?;
        if !status.is_success() {
            return Err(SeedrError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| SeedrError::InvalidResponse(format!("device code payload: {}", e)))
    }

    /// Try to exchange a device code for an access token
    ///
    /// A still-unapproved code answers with an OAuth error payload, which
    /// maps to [`TokenPoll::Pending`]; any HTTP failure is a real error.
    pub async fn exchange(&self, device_code: &str) -> Result<TokenPoll, SeedrError> {
        let response = self
            .http
            .post(&self.token_url)
            .header(header::ACCEPT, "application/json")
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("grant_type", DEVICE_GRANT_TYPE),
                ("device_code", device_code),
            ])
            .send()
            .await
            .map_err(SeedrError::Transient)?;

        let status = response.status();
        let body = response.text().await.map_err(SeedrError::Transient)?;

        // Seedr answers pending polls with an OAuth error object; depending
        // on the deployment that arrives as 200 or 400, so parse before
        // rejecting on status.
        match serde_json::from_str::<RawTokenResponse>(&body) {
            Ok(parsed) => {
                if let Some(token) = parsed.access_token.filter(|t| !t.is_empty()) {
                    return Ok(TokenPoll::Authorized {
                        access_token: token,
                    });
                }
                if parsed.error.is_some() {
                    return Ok(TokenPoll::Pending);
                }
                if !status.is_success() {
                    return Err(SeedrError::Remote {
                        status: status.as_u16(),
                        body,
                    });
                }
                Err(SeedrError::InvalidResponse(
                    "token payload carries neither access_token nor error".to_string(),
                ))
            }
            Err(_) if !status.is_success() => Err(SeedrError::Remote {
                status: status.as_u16(),
                body,
            }),
            Err(e) => Err(SeedrError::InvalidResponse(format!("token payload: {}", e))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawTokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    error: Option<String>,
}
