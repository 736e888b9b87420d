//! seedrio - Stremio addon server for Seedr.cc cloud storage
//!
//! Exposes a Seedr account as a Stremio addon: manifest, catalog, meta and
//! stream endpoints over HTTP, plus a device-code authorization flow.
//!
//! # Usage
//!
//! ```bash
//! # Start the addon server
//! seedrio
//!
//! # One-off workflows
//! seedrio authorize
//! seedrio files --limit 10
//! seedrio resolve tt0133093 --json
//! ```

// Some shared models/helpers are only reachable through the library crate
#![allow(dead_code)]

mod api;
mod auth;
mod cli;
mod commands;
mod config;
mod models;
mod resolver;
mod server;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{validate_media_id, Cli, Command, ExitCode, Output, ServeCmd};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "seedrio=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let output = Output::new(&cli);

    let exit_code = match cli.command {
        Some(Command::Serve(cmd)) => commands::serve_cmd(cmd, &output).await,

        Some(Command::Authorize(cmd)) => commands::authorize_cmd(cmd, &output).await,

        Some(Command::Files(cmd)) => commands::files_cmd(cmd, &output).await,

        Some(Command::Resolve(cmd)) => {
            if let Err(e) = validate_media_id(&cmd.id) {
                output.error(e, ExitCode::InvalidArgs)
            } else {
                commands::resolve_cmd(cmd, &output).await
            }
        }

        // No subcommand: serve with defaults
        None => {
            commands::serve_cmd(
                ServeCmd {
                    bind: "0.0.0.0".to_string(),
                    port: None,
                },
                &output,
            )
            .await
        }
    };

    std::process::exit(exit_code.into());
}
