//! Configuration management for seedrio
//!
//! Handles config file loading/saving and credential selection.
//! Config is stored at ~/.config/seedrio/config.toml; environment
//! variables take precedence over file contents.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::api::cinemeta;
use crate::api::device;
use crate::api::seedr;
use crate::models::Credential;

/// Client identity presented to the Seedr OAuth endpoints
const DEFAULT_CLIENT_ID: &str = "stremio-addon";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Seedr access token (device flow result or pasted bearer token)
    pub access_token: Option<String>,
    /// Raw browser session cookie, used instead of a token when set
    pub session_cookie: Option<String>,
    /// OAuth client id for the device flow
    pub client_id: Option<String>,
    /// Seedr REST base URL override
    pub seedr_base_url: Option<String>,
    /// Device-code endpoint override
    pub oauth_device_url: Option<String>,
    /// Token-exchange endpoint override
    pub oauth_token_url: Option<String>,
    /// Metadata (Cinemeta-compatible) base URL override
    pub metadata_base_url: Option<String>,
    /// HTTP listen port
    pub port: Option<u16>,
}

impl Config {
    /// Get config file path (~/.config/seedrio/config.toml)
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("seedrio").join("config.toml"))
    }

    /// Load config from file, or return default if not found
    pub fn load() -> Self {
        Self::path()
            .and_then(|p| std::fs::read_to_string(p).ok())
            .and_then(|s| toml::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::path().ok_or_else(|| anyhow::anyhow!("Could not determine config path"))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml = toml::to_string_pretty(self)?;
        std::fs::write(path, toml)?;
        Ok(())
    }

    /// Select the active credential, if any
    ///
    /// Precedence: `SEEDR_TOKEN` env, `SEEDR_COOKIE` env, config token,
    /// config cookie. None means the device flow has to run first.
    pub fn credential(&self) -> Option<Credential> {
        if let Ok(token) = std::env::var("SEEDR_TOKEN") {
            if !token.is_empty() {
                return Some(Credential::bearer(token));
            }
        }
        if let Ok(cookie) = std::env::var("SEEDR_COOKIE") {
            if !cookie.is_empty() {
                return Some(Credential::cookie(cookie));
            }
        }
        if let Some(token) = self.access_token.as_deref().filter(|t| !t.is_empty()) {
            return Some(Credential::bearer(token));
        }
        if let Some(cookie) = self.session_cookie.as_deref().filter(|c| !c.is_empty()) {
            return Some(Credential::cookie(cookie));
        }
        None
    }

    /// OAuth client id (`SEEDR_CLIENT_ID` env, config, default)
    pub fn client_id(&self) -> String {
        std::env::var("SEEDR_CLIENT_ID")
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.client_id.clone())
            .unwrap_or_else(|| DEFAULT_CLIENT_ID.to_string())
    }

    /// Seedr REST base URL
    pub fn seedr_base_url(&self) -> String {
        self.seedr_base_url
            .clone()
            .unwrap_or_else(|| seedr::DEFAULT_BASE_URL.to_string())
    }

    /// Device-code endpoint
    pub fn oauth_device_url(&self) -> String {
        self.oauth_device_url
            .clone()
            .unwrap_or_else(|| device::DEFAULT_DEVICE_URL.to_string())
    }

    /// Token-exchange endpoint
    pub fn oauth_token_url(&self) -> String {
        self.oauth_token_url
            .clone()
            .unwrap_or_else(|| device::DEFAULT_TOKEN_URL.to_string())
    }

    /// Metadata lookup base URL
    pub fn metadata_base_url(&self) -> String {
        self.metadata_base_url
            .clone()
            .unwrap_or_else(|| cinemeta::DEFAULT_BASE_URL.to_string())
    }

    /// Listen port (`PORT` env, config, 7000)
    pub fn port(&self) -> u16 {
        std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .or(self.port)
            .unwrap_or(7000)
    }

    /// Best-effort persistence of a freshly acquired device-flow token
    pub fn persist_token(token: &str) {
        let mut config = Config::load();
        config.access_token = Some(token.to_string());
        if let Err(e) = config.save() {
            tracing::warn!("could not persist access token: {}", e);
        }
    }
}
