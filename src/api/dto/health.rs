//! Health check DTOs for API responses.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::Environment;
use crate::services::notifications::ChannelStatus;

/// Health status enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// All systems operational
    Healthy,
    /// Serving, but at least one channel is not configured
    Degraded,
}

/// Liveness response returned by `GET /health`.
#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "status": "healthy",
    "version": "0.1.0",
    "environment": "production",
    "timestamp": "2024-01-01T12:00:00Z"
}))]
pub struct HealthResponse {
    pub status: HealthStatus,
    /// Application version
    pub version: String,
    #[schema(value_type = String)]
    pub environment: Environment,
    /// Time of the check (RFC 3339)
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: Timestamp,
}

/// Service information returned by `GET /`.
#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "service": "notify-relay",
    "version": "0.1.0",
    "status": "running",
    "environment": "development",
    "docs_url": "/docs",
    "timestamp": "2024-01-01T12:00:00Z"
}))]
pub struct ServiceInfo {
    pub service: String,
    pub version: String,
    /// Always `running`
    pub status: String,
    #[schema(value_type = String)]
    pub environment: Environment,
    /// `/docs` when API docs are enabled, `disabled` otherwise
    pub docs_url: String,
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: Timestamp,
}

/// Readiness response returned by `GET /health/ready`.
///
/// A channel without settings degrades readiness but never fails it; the
/// service still answers requests for the other channel.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadinessResponse {
    pub status: HealthStatus,
    pub version: String,
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: Timestamp,
    /// Whether each channel has the settings it needs
    pub checks: ChannelStatus,
}

impl ReadinessResponse {
    pub fn from_checks(version: impl Into<String>, checks: ChannelStatus) -> Self {
        let status = if checks.all_configured() {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        };

        Self {
            status,
            version: version.into(),
            timestamp: Timestamp::now(),
            checks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_serialization() {
        assert_eq!(
            serde_json::to_string(&HealthStatus::Healthy).unwrap(),
            "\"healthy\""
        );
        assert_eq!(
            serde_json::to_string(&HealthStatus::Degraded).unwrap(),
            "\"degraded\""
        );
    }

    #[test]
    fn test_readiness_degrades_when_a_channel_is_missing() {
        let ready = ReadinessResponse::from_checks(
            "0.1.0",
            ChannelStatus {
                teams: true,
                email: true,
            },
        );
        assert_eq!(ready.status, HealthStatus::Healthy);

        let degraded = ReadinessResponse::from_checks(
            "0.1.0",
            ChannelStatus {
                teams: true,
                email: false,
            },
        );
        assert_eq!(degraded.status, HealthStatus::Degraded);

        let body = serde_json::to_value(&degraded).unwrap();
        assert_eq!(body["checks"]["teams"], true);
        assert_eq!(body["checks"]["email"], false);
    }

    #[test]
    fn test_health_response_shape() {
        let response = HealthResponse {
            status: HealthStatus::Healthy,
            version: "0.1.0".to_string(),
            environment: Environment::Production,
            timestamp: Timestamp::UNIX_EPOCH,
        };

        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["environment"], "production");
        assert_eq!(body["timestamp"], "1970-01-01T00:00:00Z");
    }
}
