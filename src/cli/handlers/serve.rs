//! Serve command handler
//!
//! Handles the serve command including dry-run validation and server startup.

use std::sync::Arc;

use crate::config::settings::Settings;
use crate::error::AppResult;
use crate::server::Server;
use crate::services::Services;
use crate::services::notifications::ChannelStatus;

/// Handler for the serve command
pub struct ServeCommandHandler {
    config: Settings,
}

impl ServeCommandHandler {
    /// Create a new serve command handler
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Execute the serve command with optional dry-run support
    ///
    /// # Arguments
    /// * `dry_run` - If true, validates configuration and exits without starting server
    ///
    /// # Errors
    /// - Configuration validation errors
    /// - Server startup errors (if not dry-run)
    pub async fn execute(self, dry_run: bool) -> AppResult<()> {
        if dry_run {
            self.validate_only().map(|_| ())
        } else {
            Server::new(Arc::new(self.config)).run().await?;
            Ok(())
        }
    }

    /// Validate configuration and report channel setup without binding.
    pub fn validate_only(&self) -> AppResult<ChannelStatus> {
        self.config.validate()?;
        let channels = Services::new(&self.config)?.notifications.channel_status();

        println!("✓ Configuration is valid");
        println!("✓ Environment: {}", self.config.environment);
        println!("✓ Server would bind to: {}", self.config.server.address());
        println!("✓ Logger level: {}", self.config.logger.level);
        println!(
            "{} Teams webhook: {}",
            mark(channels.teams),
            describe(channels.teams)
        );
        println!(
            "{} SMTP relay: {}",
            mark(channels.email),
            describe(channels.email)
        );

        if channels.all_configured() {
            println!("Dry run completed successfully - configuration is ready for deployment");
        } else {
            println!(
                "Dry run completed - unconfigured channels will answer 503 until their settings are provided"
            );
        }

        Ok(channels)
    }

    /// Get the configuration
    pub fn config(&self) -> &Settings {
        &self.config
    }
}

fn mark(configured: bool) -> &'static str {
    if configured { "✓" } else { "✗" }
}

fn describe(configured: bool) -> &'static str {
    if configured {
        "configured"
    } else {
        "not configured"
    }
}
