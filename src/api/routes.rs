//! Router configuration for the API.
//!
//! This module provides centralized route registration and middleware
//! configuration for the application.

use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware,
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowHeaders, AllowOrigin, Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::doc::{ApiDoc, OPENAPI_PATH};
use crate::api::handlers;
use crate::api::handlers::health::DOCS_PATH;
use crate::api::middleware::{global_error_handler, logging_middleware, request_id_middleware};
use crate::config::CorsConfig;
use crate::state::AppState;

/// Creates the main application router with all routes and middleware.
///
/// # Middleware Order
/// Middleware is applied in reverse order of declaration (last added runs first):
/// 1. Request ID middleware (runs first) - generates/propagates request IDs
/// 2. Logging middleware - logs requests with request IDs
/// 3. CORS and response compression
/// 4. Global error handler (runs last) - normalizes error bodies
///
/// # Routes
/// - `/`, `/health`, `/health/live`, `/health/ready`
/// - `POST /notify`, `POST /notify/email`
/// - `/docs` and `/api-docs/openapi.json` when `application.debug` is set
pub fn create_router(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(handlers::health::health_routes())
        .merge(handlers::notifications::notification_routes())
        .split_for_parts();

    let router = if state.settings.application.debug {
        tracing::debug!(docs = DOCS_PATH, openapi = OPENAPI_PATH, "API docs enabled");
        router.merge(SwaggerUi::new(DOCS_PATH).url(OPENAPI_PATH, api))
    } else {
        router
    };

    let cors = cors_layer(&state.settings.cors);

    router
        // Middleware is applied in reverse order - last added runs first
        .layer(middleware::from_fn(global_error_handler))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// Builds the CORS layer.
///
/// `*` allows any origin without credentials; an explicit list allows only
/// those origins, with credentials.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
