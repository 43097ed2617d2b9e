use utoipa::OpenApi;

pub const GENERAL_TAG: &str = "General";
pub const HEALTH_TAG: &str = "Health";
pub const NOTIFICATION_TAG: &str = "Notifications";

/// Path the OpenAPI document is served from when API docs are enabled.
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Notify Relay",
        description = "Relays notifications to a Teams webhook and to email over SMTP",
    ),
    components(
        schemas(
            crate::api::dto::ErrorResponse,
            crate::error::ValidationFieldError,
            crate::models::Severity,
        )
    ),
    tags(
        (name = GENERAL_TAG, description = "Service information"),
        (name = HEALTH_TAG, description = "Health check endpoints"),
        (name = NOTIFICATION_TAG, description = "Notification dispatch endpoints"),
    )
)]
pub struct ApiDoc;
