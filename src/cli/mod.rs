//! CLI entry point for device-auth.

pub mod login;

use clap::{Parser, Subcommand};

/// device-auth CLI
#[derive(Parser, Debug)]
#[command(name = "device-auth", version, about = "OAuth2 device-authorization login client")]
pub struct Cli {
    /// Backend URL (overrides config file and DEVICE_AUTH_URL)
    #[arg(long, global = true)]
    pub url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in with the device flow
    Login(LoginArgs),
    /// Show organization permission flags for the current session
    Permissions(PermissionsArgs),
}

/// Arguments for `device-auth login`.
#[derive(Parser, Debug)]
pub struct LoginArgs {
    /// OAuth2 state issued by the backend
    #[arg(long)]
    pub state: Option<String>,
}

/// Arguments for `device-auth permissions`.
#[derive(Parser, Debug)]
pub struct PermissionsArgs {
    /// Organization ID
    pub organization_id: String,
}
