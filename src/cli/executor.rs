//! Command executor for dispatching CLI commands
//!
//! This module provides the main entry point for executing CLI commands
//! after parsing and configuration loading.

use super::handlers::ServeCommandHandler;
use super::parser::{Cli, Commands};
use crate::config::settings::Settings;
use crate::error::AppResult;

/// Execute a CLI command with the given settings
///
/// Running without a subcommand is the same as `serve`.
///
/// # Errors
/// Returns errors from command handlers, including server startup failures
pub async fn execute_command(cli: &Cli, settings: Settings) -> AppResult<()> {
    warn_on_risky_bind(&settings);

    match &cli.command {
        Some(Commands::Serve { dry_run, .. }) => {
            ServeCommandHandler::new(settings).execute(*dry_run).await
        }
        None => ServeCommandHandler::new(settings).execute(false).await,
    }
}

/// Warn about bind settings that usually need elevated privileges.
fn warn_on_risky_bind(settings: &Settings) {
    let server = &settings.server;
    if server.port < 1024 && server.host == "0.0.0.0" {
        tracing::warn!(
            port = server.port,
            "Binding to 0.0.0.0 on a privileged port typically requires root privileges"
        );
    }
}
