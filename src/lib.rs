//! seedrio - Stremio addon server for Seedr.cc cloud storage
//!
//! Bridges a Seedr account into Stremio: obtain a credential through the
//! device-code flow (or a pasted token/cookie), list the account's folder
//! tree, match a requested media id against the playable files, and answer
//! with direct stream URLs in Stremio's JSON shapes.
//!
//! # Modules
//!
//! - `models` - Data structures for credentials, listings, streams
//! - `api` - API clients (Seedr storage, device auth, Cinemeta metadata)
//! - `auth` - Device session store and authorization flow
//! - `resolver` - Folder traversal and id/title matching
//! - `server` - Addon HTTP facade (axum)
//! - `config` - Config file and environment handling

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod models;
pub mod resolver;
pub mod server;

// Re-export commonly used types
pub use models::{
    Credential, CredentialSource, FileLink, FileRecord, FolderListing, FolderRecord,
    ResolvedStream,
};

pub use api::{CinemetaClient, DeviceAuthClient, SeedrClient, SeedrError};
pub use auth::{AuthFlow, CredentialStore, DeviceSession, PollOutcome, SessionStore};
pub use resolver::{FolderWalker, Target};
