//! Addon HTTP facade
//!
//! Pure request→component-call→response mapping over axum. The Stremio
//! resource endpoints (`catalog`, `meta`, `stream`) always answer HTTP 200
//! with a structurally valid JSON envelope, whatever the downstream
//! failure; the authorization and debug endpoints use real status codes
//! but still always emit JSON.

pub mod manifest;

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use crate::api::cinemeta::CinemetaClient;
use crate::api::device::DeviceAuthClient;
use crate::api::seedr::{SeedrClient, SeedrError};
use crate::auth::{AuthFlow, CredentialStore, PollOutcome};
use crate::config::Config;
use crate::models::FileRecord;
use crate::resolver::{self, ID_PREFIX};

use self::manifest::get_manifest;

/// Resolved runtime settings for the facade
#[derive(Debug, Clone)]
pub struct Settings {
    pub seedr_base_url: String,
    /// Write device-flow tokens back to the config file
    pub persist_tokens: bool,
}

impl Settings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            seedr_base_url: config.seedr_base_url(),
            persist_tokens: true,
        }
    }
}

/// Shared per-request dependencies, injected instead of global state
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub credentials: Arc<CredentialStore>,
    pub auth: Arc<AuthFlow>,
    pub metadata: Arc<CinemetaClient>,
}

impl AppState {
    /// Assemble state from explicit parts (used directly by tests)
    pub fn new(
        settings: Settings,
        credentials: Arc<CredentialStore>,
        auth: AuthFlow,
        metadata: CinemetaClient,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            credentials,
            auth: Arc::new(auth),
            metadata: Arc::new(metadata),
        }
    }

    /// Assemble state from loaded configuration
    pub fn from_config(config: &Config) -> Self {
        let credentials = Arc::new(CredentialStore::with_credential(config.credential()));
        let device_client = DeviceAuthClient::with_endpoints(
            config.client_id(),
            config.oauth_device_url(),
            config.oauth_token_url(),
        );
        let auth = AuthFlow::new(device_client, Arc::clone(&credentials));
        let metadata = CinemetaClient::with_base_url(config.metadata_base_url());
        Self::new(Settings::from_config(config), credentials, auth, metadata)
    }

    /// Storage client for the active credential, if one exists
    fn seedr_client(&self) -> Option<SeedrClient> {
        self.credentials
            .get()
            .map(|cred| SeedrClient::with_base_url(cred, self.settings.seedr_base_url.clone()))
    }
}

/// Build the addon router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_root))
        .route("/manifest.json", get(handle_manifest))
        .route("/catalog/{type}/{id}", get(handle_catalog))
        .route("/meta/{type}/{id}", get(handle_meta))
        .route("/stream/{type}/{id}", get(handle_stream))
        .route("/authorize", get(handle_authorize))
        .route("/authorize/{device_code}", get(handle_poll))
        .route("/debug/files", get(handle_debug_files))
        .with_state(state)
}

/// Bind and serve until shutdown
pub async fn serve(state: AppState, bind: &str, port: u16) -> anyhow::Result<()> {
    let addr = format!("{}:{}", bind, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "addon server listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

async fn handle_root() -> Json<Value> {
    Json(json!({
        "name": "seedrio",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "manifest": "/manifest.json",
        "authorize": "/authorize",
    }))
}

async fn handle_manifest() -> Json<manifest::Manifest> {
    Json(get_manifest())
}

async fn handle_catalog(
    State(state): State<AppState>,
    Path((type_, id_ext)): Path<(String, String)>,
) -> Json<Value> {
    let _catalog_id = strip_json_suffix(&id_ext);

    let Some(client) = state.seedr_client() else {
        return Json(json!({ "metas": [], "error": "unauthorized" }));
    };

    match resolver::collect_playable(&client).await {
        Ok(files) => {
            let metas: Vec<Value> = files.iter().map(|f| file_meta(f, &type_)).collect();
            Json(json!({ "metas": metas }))
        }
        Err(e) => {
            tracing::warn!("catalog listing failed: {}", e);
            Json(json!({ "metas": [], "error": e.to_string() }))
        }
    }
}

async fn handle_meta(
    State(state): State<AppState>,
    Path((type_, id_ext)): Path<(String, String)>,
) -> Json<Value> {
    let id = strip_json_suffix(&id_ext);
    let file_id = id.strip_prefix(ID_PREFIX).unwrap_or(id);

    let Some(client) = state.seedr_client() else {
        return Json(json!({ "meta": null, "error": "unauthorized" }));
    };

    match resolver::collect_playable(&client).await {
        Ok(files) => {
            let found = files.iter().find(|f| f.id.to_string() == file_id);
            match found {
                Some(file) => {
                    let mut meta = file_meta(file, &type_);
                    meta["description"] =
                        Value::String(format!("Seedr file, {}", file.format_size()));
                    Json(json!({ "meta": meta }))
                }
                None => Json(json!({ "meta": null })),
            }
        }
        Err(e) => {
            tracing::warn!("meta lookup failed: {}", e);
            Json(json!({ "meta": null, "error": e.to_string() }))
        }
    }
}

async fn handle_stream(
    State(state): State<AppState>,
    Path((type_, id_ext)): Path<(String, String)>,
) -> Json<Value> {
    let id = strip_json_suffix(&id_ext);

    let Some(client) = state.seedr_client() else {
        return Json(json!({ "streams": [], "error": "unauthorized" }));
    };

    match resolver::resolve(&client, &state.metadata, &type_, id).await {
        Ok(streams) => Json(json!({ "streams": streams })),
        Err(e) => {
            tracing::warn!(target_id = %id, "stream resolution failed: {}", e);
            Json(json!({ "streams": [], "error": e.to_string() }))
        }
    }
}

async fn handle_authorize(State(state): State<AppState>) -> impl IntoResponse {
    match state.auth.start().await {
        Ok(session) => (
            StatusCode::OK,
            Json(json!({
                "message": format!(
                    "Go to {} and enter this code",
                    session.verification_uri
                ),
                "device_code": session.device_code,
                "user_code": session.user_code,
                "verification_uri": session.verification_uri,
                "expires_in": session.expires_in,
                "interval": session.interval,
            })),
        ),
        Err(e) => {
            tracing::error!("device authorization start failed: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": format!("authorize failed: {}", e) })),
            )
        }
    }
}

async fn handle_poll(
    State(state): State<AppState>,
    Path(device_code): Path<String>,
) -> impl IntoResponse {
    match state.auth.poll(&device_code).await {
        Ok(PollOutcome::Authorized { access_token }) => {
            if state.settings.persist_tokens {
                Config::persist_token(&access_token);
            }
            (
                StatusCode::OK,
                Json(json!({ "status": "authorized", "access_token": access_token })),
            )
        }
        Ok(PollOutcome::Pending { interval }) => (
            StatusCode::OK,
            Json(json!({ "status": "pending", "interval": interval })),
        ),
        Ok(PollOutcome::UnknownCode) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "unknown device_code" })),
        ),
        Err(e) => {
            tracing::error!("device authorization poll failed: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": format!("poll failed: {}", e) })),
            )
        }
    }
}

async fn handle_debug_files(State(state): State<AppState>) -> impl IntoResponse {
    let Some(client) = state.seedr_client() else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "unauthorized" })),
        );
    };

    match resolver::collect_playable(&client).await {
        Ok(files) => (StatusCode::OK, Json(json!(files))),
        Err(e @ SeedrError::Unauthorized) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": e.to_string() })),
        ),
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            Json(json!({ "error": e.to_string() })),
        ),
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Stremio clients request resources with a `.json` suffix
fn strip_json_suffix(id: &str) -> &str {
    id.strip_suffix(".json").unwrap_or(id)
}

/// Catalog/meta entry for one file
fn file_meta(file: &FileRecord, type_: &str) -> Value {
    json!({
        "id": format!("{}{}", ID_PREFIX, file.id),
        "type": type_,
        "name": file.name,
        "poster": file.thumbnail,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_suffix() {
        assert_eq!(strip_json_suffix("tt0133093.json"), "tt0133093");
        assert_eq!(strip_json_suffix("tt0133093"), "tt0133093");
        assert_eq!(strip_json_suffix("seedr-cloud.json"), "seedr-cloud");
    }

    #[test]
    fn test_file_meta_prefixes_id() {
        let file = FileRecord {
            id: 42,
            name: "a.mkv".to_string(),
            size: 0,
            playable: true,
            thumbnail: None,
        };
        let meta = file_meta(&file, "other");
        assert_eq!(meta["id"], "seedr:42");
        assert_eq!(meta["type"], "other");
        assert_eq!(meta["poster"], Value::Null);
    }
}
