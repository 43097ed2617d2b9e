//! Server module for managing HTTP server lifecycle
//!
//! This module handles server initialization, startup, and graceful shutdown.

use std::sync::Arc;

use crate::api::routes::create_router;
use crate::config::settings::Settings;
use crate::state::AppState;
use tokio::net::TcpListener;
use tokio::signal;

/// HTTP server manager
pub struct Server {
    settings: Arc<Settings>,
}

impl Server {
    /// Create a new server with the given settings
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }

    /// Start the server and run until shutdown signal
    ///
    /// This method:
    /// 1. Logs startup information (never secrets)
    /// 2. Builds the channel providers and application state
    /// 3. Binds to configured address
    /// 4. Starts the HTTP server with graceful shutdown
    ///
    /// # Errors
    /// - HTTP client construction errors
    /// - Address binding errors
    /// - Server runtime errors
    pub async fn run(self) -> anyhow::Result<()> {
        let settings = &self.settings;

        tracing::info!(
            app_name = %settings.application.name,
            app_version = %settings.application.version,
            environment = %settings.environment,
            debug = settings.application.debug,
            "Application starting"
        );

        tracing::info!(
            host = %settings.server.host,
            port = settings.server.port,
            cors_origins = ?settings.cors.allowed_origins,
            "Server configuration loaded"
        );

        tracing::info!(
            level = %settings.logger.level,
            console_enabled = settings.logger.console.enabled,
            file_enabled = settings.logger.file.enabled,
            "Logger configuration loaded"
        );

        tracing::info!(
            webhook_configured = settings.teams.is_configured(),
            timeout_seconds = settings.teams.timeout_seconds,
            "Teams configuration loaded"
        );

        tracing::info!(
            smtp_configured = settings.smtp.is_configured(),
            host = %settings.smtp.host,
            port = settings.smtp.port,
            use_tls = settings.smtp.use_tls,
            credentials_configured = settings.smtp.has_credentials(),
            timeout_seconds = settings.smtp.timeout_seconds,
            "SMTP configuration loaded"
        );

        let state = AppState::new(self.settings.clone())
            .map_err(|e| anyhow::anyhow!("Failed to build application state: {}", e))?;
        let channels = state.services.notifications.channel_status();
        if !channels.all_configured() {
            tracing::warn!(
                teams = channels.teams,
                email = channels.email,
                "Some notification channels are not configured and will answer 503"
            );
        }
        tracing::info!("Application state created");

        let router = create_router(state);
        tracing::info!("Router configured");

        let address = settings.server.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!(error = %e, address = %address, "Failed to bind to address");
            anyhow::anyhow!("Failed to bind to {}: {}", address, e)
        })?;

        tracing::info!(address = %address, "Server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}

/// Waits for a shutdown signal (Ctrl+C or SIGTERM).
///
/// A signal handler that cannot be installed never fires; the other one
/// still can.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
