//! CLI Command Handlers
//!
//! Implements all CLI commands by calling the appropriate backend services.
//! Each handler takes CLI args and Output, returns ExitCode.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::api::{CinemetaClient, DeviceAuthClient, SeedrClient};
use crate::auth::{AuthFlow, CredentialStore, PollOutcome};
use crate::cli::{AuthorizeCmd, ExitCode, FilesCmd, Output, ResolveCmd, ServeCmd};
use crate::config::Config;
use crate::resolver;
use crate::server::{AppState, serve};

// =============================================================================
// Serve Command
// =============================================================================

pub async fn serve_cmd(cmd: ServeCmd, output: &Output) -> ExitCode {
    let config = Config::load();
    let port = cmd.port.unwrap_or_else(|| config.port());
    let state = AppState::from_config(&config);

    if config.credential().is_none() {
        output.info("No credential configured; visit /authorize to link a Seedr account");
    }

    match serve(state, &cmd.bind, port).await {
        Ok(()) => ExitCode::Success,
        Err(e) => output.error(format!("Server failed: {}", e), ExitCode::Error),
    }
}

// =============================================================================
// Authorize Command
// =============================================================================

/// Result of a completed authorization, for --json consumers
#[derive(Debug, Serialize)]
struct AuthorizeResult {
    user_code: String,
    verification_uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
}

pub async fn authorize_cmd(cmd: AuthorizeCmd, output: &Output) -> ExitCode {
    let config = Config::load();
    let credentials = Arc::new(CredentialStore::new());
    let client = DeviceAuthClient::with_endpoints(
        config.client_id(),
        config.oauth_device_url(),
        config.oauth_token_url(),
    );
    let flow = AuthFlow::new(client, Arc::clone(&credentials));

    let session = match flow.start().await {
        Ok(session) => session,
        Err(e) => {
            return output.error(format!("Authorize failed: {}", e), ExitCode::NetworkError)
        }
    };

    output.info(format!(
        "Go to {} and enter the code: {}",
        session.verification_uri, session.user_code
    ));

    if cmd.no_wait {
        let result = AuthorizeResult {
            user_code: session.user_code,
            verification_uri: session.verification_uri,
            access_token: None,
        };
        if let Err(e) = output.print(&result) {
            return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
        }
        return ExitCode::Success;
    }

    // The flow itself never schedules polling; this loop is the caller-side
    // driver, paced by the advertised interval until the grant expires.
    let deadline = Instant::now() + Duration::from_secs(session.expires_in);
    let interval = Duration::from_secs(session.interval.max(1));

    while Instant::now() < deadline {
        tokio::time::sleep(interval).await;

        match flow.poll(&session.device_code).await {
            Ok(PollOutcome::Authorized { access_token }) => {
                Config::persist_token(&access_token);
                output.info("Authorization complete; token saved");
                let result = AuthorizeResult {
                    user_code: session.user_code,
                    verification_uri: session.verification_uri,
                    access_token: Some(access_token),
                };
                if let Err(e) = output.print(&result) {
                    return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
                }
                return ExitCode::Success;
            }
            Ok(PollOutcome::Pending { .. }) => {
                output.info("Waiting for approval...");
            }
            Ok(PollOutcome::UnknownCode) => {
                return output.error("Authorization expired", ExitCode::Unauthorized);
            }
            Err(e) => {
                return output.error(format!("Polling failed: {}", e), ExitCode::NetworkError);
            }
        }
    }

    output.error("Authorization timed out before approval", ExitCode::Unauthorized)
}

// =============================================================================
// Files Command
// =============================================================================

pub async fn files_cmd(cmd: FilesCmd, output: &Output) -> ExitCode {
    let config = Config::load();
    let Some(credential) = config.credential() else {
        return output.error(
            "No credential configured; run `seedrio authorize` first",
            ExitCode::Unauthorized,
        );
    };

    let client = SeedrClient::with_base_url(credential, config.seedr_base_url());
    match resolver::collect_playable(&client).await {
        Ok(mut files) => {
            files.truncate(cmd.limit);
            output.info(format!("{} playable file(s)", files.len()));
            if let Err(e) = output.print(&files) {
                return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
            }
            ExitCode::Success
        }
        Err(e) => output.error(format!("Listing failed: {}", e), ExitCode::NetworkError),
    }
}

// =============================================================================
// Resolve Command
// =============================================================================

pub async fn resolve_cmd(cmd: ResolveCmd, output: &Output) -> ExitCode {
    let config = Config::load();
    let Some(credential) = config.credential() else {
        return output.error(
            "No credential configured; run `seedrio authorize` first",
            ExitCode::Unauthorized,
        );
    };

    let seedr = SeedrClient::with_base_url(credential, config.seedr_base_url());
    let metadata = CinemetaClient::with_base_url(config.metadata_base_url());

    output.info(format!("Resolving {}...", cmd.id));

    match resolver::resolve(&seedr, &metadata, &cmd.media_type, &cmd.id).await {
        Ok(streams) if streams.is_empty() => {
            output.error(format!("No streams matched {}", cmd.id), ExitCode::NoStreams)
        }
        Ok(streams) => {
            if let Err(e) = output.print(&streams) {
                return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
            }
            ExitCode::Success
        }
        Err(e) => output.error(format!("Resolution failed: {}", e), ExitCode::NetworkError),
    }
}
