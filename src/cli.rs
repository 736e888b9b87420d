//! CLI - Command Line Interface for seedrio
//!
//! Run without arguments to start the addon server. Subcommands cover the
//! offline workflows: authorizing the account, inspecting files, and
//! resolving an id without going through HTTP. All output is
//! JSON-parseable with --json.

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;

// =============================================================================
// Exit Codes
// =============================================================================

/// Exit codes for CLI operations (semantic for scripting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    Error = 1,
    /// Invalid arguments
    InvalidArgs = 2,
    /// Network error
    NetworkError = 3,
    /// No credential configured or authorization incomplete
    Unauthorized = 4,
    /// No streams matched the requested id
    NoStreams = 5,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

// =============================================================================
// Main CLI Structure
// =============================================================================

/// seedrio - Stremio addon server for Seedr.cc cloud storage
///
/// Run without arguments to start the server.
/// Use subcommands for automation and one-off tasks.
#[derive(Parser, Debug)]
#[command(
    name = "seedrio",
    version,
    about = "Stremio addon server for Seedr.cc cloud storage",
    after_help = "EXAMPLES:\n\
                  seedrio                         Start the addon server\n\
                  seedrio serve --port 8080       Start on a custom port\n\
                  seedrio authorize               Link a Seedr account\n\
                  seedrio files                   List playable cloud files\n\
                  seedrio resolve tt0133093       Resolve an IMDb id to streams"
)]
pub struct Cli {
    /// Output format as JSON (default for non-TTY)
    #[arg(long, short = 'j', global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Subcommand to run (omit to serve)
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Check if JSON output should be used
    pub fn should_json(&self) -> bool {
        self.json || !std::io::stdout().is_terminal()
    }
}

// =============================================================================
// Subcommands
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the addon HTTP server (default)
    Serve(ServeCmd),

    /// Link a Seedr account with the device-code flow
    #[command(visible_alias = "auth")]
    Authorize(AuthorizeCmd),

    /// List the playable files in the account
    #[command(visible_alias = "ls")]
    Files(FilesCmd),

    /// Resolve a media id to playable streams
    #[command(visible_alias = "r")]
    Resolve(ResolveCmd),
}

/// Run the addon HTTP server
#[derive(Args, Debug)]
pub struct ServeCmd {
    /// Address to bind
    #[arg(long, short = 'b', default_value = "0.0.0.0")]
    pub bind: String,

    /// Port to listen on (overrides config and PORT env)
    #[arg(long, short = 'p')]
    pub port: Option<u16>,
}

/// Link a Seedr account with the device-code flow
#[derive(Args, Debug)]
pub struct AuthorizeCmd {
    /// Print the codes and exit instead of polling until approval
    #[arg(long)]
    pub no_wait: bool,
}

/// List the playable files in the account
#[derive(Args, Debug)]
pub struct FilesCmd {
    /// Maximum number of files to print
    #[arg(long, short = 'l', default_value = "50")]
    pub limit: usize,
}

/// Resolve a media id to playable streams
#[derive(Args, Debug)]
pub struct ResolveCmd {
    /// IMDb id (tt0133093), internal file id, or derived title id
    #[arg(required = true)]
    pub id: String,

    /// Stremio media type used for the metadata lookup
    #[arg(long, short = 't', default_value = "movie")]
    pub media_type: String,
}

// =============================================================================
// JSON Output Types
// =============================================================================

/// Generic JSON output wrapper with status
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "is_zero")]
    pub exit_code: i32,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

impl<T: Serialize> JsonOutput<T> {
    /// Create success output with data
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            exit_code: 0,
        }
    }

    /// Create error output (no data)
    pub fn error_msg(msg: impl Into<String>, code: ExitCode) -> JsonOutput<()> {
        JsonOutput::<()> {
            data: None,
            error: Some(msg.into()),
            exit_code: code.into(),
        }
    }
}

// =============================================================================
// Output Helpers
// =============================================================================

/// Output handler for consistent formatting
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

impl Output {
    pub fn new(cli: &Cli) -> Self {
        Self {
            json: cli.should_json(),
            quiet: cli.quiet,
        }
    }

    /// Print success data
    pub fn print<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        if self.json {
            let output = JsonOutput::success(data);
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Ok(())
    }

    /// Print error and return exit code
    pub fn error(&self, msg: impl Into<String>, code: ExitCode) -> ExitCode {
        let msg = msg.into();
        if self.json {
            let output = JsonOutput::<()>::error_msg(&msg, code);
            if let Ok(json) = serde_json::to_string_pretty(&output) {
                eprintln!("{}", json);
            }
        } else if !self.quiet {
            eprintln!("Error: {}", msg);
        }
        code
    }

    /// Print info message (suppressed in quiet mode)
    pub fn info(&self, msg: impl std::fmt::Display) {
        if !self.quiet && !self.json {
            eprintln!("{}", msg);
        }
    }
}

// =============================================================================
// Media ID Validation
// =============================================================================

/// Validate a requested media id (IMDb id, internal id, or derived id)
pub fn validate_media_id(id: &str) -> Result<&str, &'static str> {
    if id.is_empty() || id.chars().any(char::is_whitespace) {
        return Err("Invalid media id (must be non-empty, without whitespace)");
    }
    if id.starts_with("tt") && !id[2..].chars().take_while(|c| *c != ':').any(|c| c.is_ascii_digit())
    {
        return Err("Invalid IMDb id format (expected tt followed by digits)");
    }
    Ok(id)
}
