//! Data structures and types for seedrio
//!
//! Contains all shared models used across the application organized by domain:
//! - **Credentials**: access tokens and how to present them to Seedr
//! - **Storage**: folder listings and file records from the Seedr REST API
//! - **Streams**: resolved playable URLs in Stremio's stream shape

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Credential Models
// =============================================================================

/// Where a credential came from, which also decides how it is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialSource {
    /// Token obtained through the device-code flow
    DeviceFlow,
    /// Bearer token pasted by the user
    BearerToken,
    /// Browser session cookie pasted by the user
    SessionCookie,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::DeviceFlow => write!(f, "device flow"),
            CredentialSource::BearerToken => write!(f, "bearer token"),
            CredentialSource::SessionCookie => write!(f, "session cookie"),
        }
    }
}

/// An opaque Seedr credential
///
/// Created by the device authorization flow or taken verbatim from
/// configuration. Revocation is only detected when a remote call fails
/// with an auth error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub source: CredentialSource,
}

impl Credential {
    /// Credential from a completed device-code authorization
    pub fn device_flow(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            source: CredentialSource::DeviceFlow,
        }
    }

    /// Credential from a pasted bearer token
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            source: CredentialSource::BearerToken,
        }
    }

    /// Credential from a pasted browser cookie
    pub fn cookie(value: impl Into<String>) -> Self {
        Self {
            token: value.into(),
            source: CredentialSource::SessionCookie,
        }
    }

    /// True when the token travels as a Cookie header instead of Bearer auth
    pub fn is_cookie(&self) -> bool {
        self.source == CredentialSource::SessionCookie
    }
}

// =============================================================================
// Storage Models (Seedr)
// =============================================================================

/// A single file in the Seedr account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: u64,
    pub name: String,
    pub size: u64,
    pub playable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl FileRecord {
    /// Format size for display
    pub fn format_size(&self) -> String {
        const GB: u64 = 1024 * 1024 * 1024;
        const MB: u64 = 1024 * 1024;
        match self.size {
            s if s >= GB => format!("{:.1} GB", s as f64 / GB as f64),
            s if s >= MB => format!("{:.0} MB", s as f64 / MB as f64),
            s => format!("{} KB", s / 1024),
        }
    }
}

impl fmt::Display for FileRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.playable { "▶" } else { " " };
        write!(f, "{} {} ({})", marker, self.name, self.format_size())
    }
}

/// A folder in the Seedr account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderRecord {
    pub id: u64,
    pub name: String,
}

impl fmt::Display for FolderRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "📁 {}", self.name)
    }
}

/// Contents of one directory level, in API order
///
/// Never cached; refetched on every resolving request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FolderListing {
    pub files: Vec<FileRecord>,
    pub folders: Vec<FolderRecord>,
}

impl FolderListing {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.folders.is_empty()
    }
}

/// Direct playable URL for a single file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileLink {
    pub url: String,
}

// =============================================================================
// Stream Models (Stremio)
// =============================================================================

/// Addon source label shown by Stremio next to each stream
pub const STREAM_SOURCE_NAME: &str = "Seedr";

/// A resolved stream in Stremio's wire shape
///
/// Derived per request, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedStream {
    pub name: String,
    pub title: String,
    pub url: String,
}

impl ResolvedStream {
    /// Build a stream entry for a matched file
    pub fn for_file(file: &FileRecord, url: impl Into<String>) -> Self {
        Self {
            name: STREAM_SOURCE_NAME.to_string(),
            title: file.name.clone(),
            url: url.into(),
        }
    }
}

impl fmt::Display for ResolvedStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} → {}", self.name, self.title, self.url)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
