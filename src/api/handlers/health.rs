//! Health check and service info handlers.
//!
//! None of these touch a downstream channel; readiness only reports whether
//! each channel has the settings it needs.

use crate::api::doc::{GENERAL_TAG, HEALTH_TAG};
use crate::api::dto::{HealthResponse, HealthStatus, ReadinessResponse, ServiceInfo};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::Json};
use jiff::Timestamp;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Path of the Swagger UI when API docs are enabled.
pub const DOCS_PATH: &str = "/docs";

/// Creates health check and service info routes.
///
/// # Routes
/// - `GET /` - Service information
/// - `GET /health` - Basic health check
/// - `GET /health/live` - Liveness probe
/// - `GET /health/ready` - Readiness probe
pub fn health_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(service_info))
        .routes(routes!(health_check))
        .routes(routes!(liveness_check))
        .routes(routes!(readiness_check))
}

/// Service information.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service information", body = ServiceInfo)
    ),
    tag = GENERAL_TAG
)]
pub async fn service_info(State(state): State<AppState>) -> Json<ServiceInfo> {
    let application = &state.settings.application;
    let docs_url = if application.debug {
        DOCS_PATH.to_string()
    } else {
        "disabled".to_string()
    };

    Json(ServiceInfo {
        service: application.name.clone(),
        version: application.version.clone(),
        status: "running".to_string(),
        environment: state.settings.environment,
        docs_url,
        timestamp: Timestamp::now(),
    })
}

/// Basic health check endpoint.
///
/// Answers as long as the process is serving requests.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = HEALTH_TAG
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: HealthStatus::Healthy,
        version: state.settings.application.version.clone(),
        environment: state.settings.environment,
        timestamp: Timestamp::now(),
    })
}

/// Liveness probe endpoint.
#[utoipa::path(
    get,
    path = "/health/live",
    responses(
        (status = 200, description = "Service is alive")
    ),
    tag = HEALTH_TAG
)]
pub async fn liveness_check() -> StatusCode {
    StatusCode::OK
}

/// Readiness probe endpoint.
///
/// Reports `degraded` when a channel is not configured. The status code
/// stays 200 because the other channel can still serve traffic.
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Service is ready, possibly degraded", body = ReadinessResponse)
    ),
    tag = HEALTH_TAG
)]
pub async fn readiness_check(State(state): State<AppState>) -> Json<ReadinessResponse> {
    let checks = state.services.notifications.channel_status();
    if !checks.all_configured() {
        tracing::debug!(teams = checks.teams, email = checks.email, "Readiness degraded");
    }

    Json(ReadinessResponse::from_checks(
        state.settings.application.version.clone(),
        checks,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Environment, Settings, TeamsConfig};
    use std::sync::Arc;

    fn state(settings: Settings) -> AppState {
        AppState::new(Arc::new(settings)).unwrap()
    }

    #[tokio::test]
    async fn test_liveness_check() {
        assert_eq!(liveness_check().await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_service_info_reports_docs_state() {
        let mut settings = Settings::default();
        settings.environment = Environment::Staging;

        let Json(info) = service_info(State(state(settings.clone()))).await;
        assert_eq!(info.service, "notify-relay");
        assert_eq!(info.status, "running");
        assert_eq!(info.environment, Environment::Staging);
        assert_eq!(info.docs_url, "disabled");

        settings.application.debug = true;
        let Json(info) = service_info(State(state(settings))).await;
        assert_eq!(info.docs_url, DOCS_PATH);
    }

    #[tokio::test]
    async fn test_health_check_is_healthy_without_channels() {
        let Json(health) = health_check(State(state(Settings::default()))).await;
        assert_eq!(health.status, HealthStatus::Healthy);
        assert_eq!(health.version, crate::pkg_version());
    }

    #[tokio::test]
    async fn test_readiness_reflects_channel_settings() {
        let Json(ready) = readiness_check(State(state(Settings::default()))).await;
        assert_eq!(ready.status, HealthStatus::Degraded);
        assert!(!ready.checks.teams);
        assert!(!ready.checks.email);

        let settings = Settings {
            teams: TeamsConfig {
                webhook_url: "https://example.webhook.office.com/webhookb2/abc".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let Json(ready) = readiness_check(State(state(settings))).await;
        assert!(ready.checks.teams);
        assert!(!ready.checks.email);
    }
}
