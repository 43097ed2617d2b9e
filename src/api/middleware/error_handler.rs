//! Error handler for converting AppError to HTTP responses.
//!
//! Every error leaving the API shares the [`ErrorResponse`] body. Handler
//! errors are rendered by the `IntoResponse` impl below; framework errors
//! without a JSON body (unknown route, wrong method) are rewritten by
//! [`global_error_handler`], which also stamps the request id.

use axum::{
    Json,
    body::to_bytes,
    extract::Request,
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use super::RequestId;
use crate::api::dto::ErrorResponse;
use crate::error::AppError;

/// Largest error body the global handler will buffer when rewriting.
const MAX_ERROR_BODY_BYTES: usize = 64 * 1024;

impl IntoResponse for AppError {
    /// Converts an AppError into an HTTP response.
    ///
    /// # Status Code Mapping
    /// - Validation / ValidationErrors / UnprocessableContent → 422
    /// - BadRequest → 400
    /// - ChannelNotConfigured → 503
    /// - Transport / UpstreamRejection → 502
    /// - Configuration / Internal → 500
    fn into_response(self) -> Response {
        let status = error_to_status_code(&self);
        let code = error_to_code(&self);

        match &self {
            AppError::Configuration { key, source } => {
                tracing::error!(key = %key, error = %source, "Configuration error while serving request");
            }
            AppError::Internal { source } => {
                tracing::error!(error = ?source, "Internal error while serving request");
            }
            AppError::ChannelNotConfigured { channel, setting } => {
                tracing::warn!(channel = channel.as_str(), setting = %setting, "Channel not configured");
            }
            AppError::Transport { channel, reason } => {
                tracing::warn!(channel = channel.as_str(), reason = %reason, "Notification dispatch failed");
            }
            AppError::UpstreamRejection {
                channel,
                status,
                reason,
            } => {
                tracing::warn!(
                    channel = channel.as_str(),
                    upstream_status = ?status,
                    reason = %reason,
                    "Notification rejected upstream"
                );
            }
            _ => {}
        }

        let error_response = match self {
            AppError::Validation { field, reason } => {
                let detail = format!("Validation failed for {}: {}", field, reason);
                ErrorResponse::new(code, detail).with_errors(vec![
                    crate::error::ValidationFieldError {
                        field,
                        message: reason,
                    },
                ])
            }
            AppError::ValidationErrors { errors } => {
                let detail = format!("Validation failed for {} field(s)", errors.len());
                ErrorResponse::new(code, detail).with_errors(errors)
            }
            AppError::BadRequest { message } | AppError::UnprocessableContent { message } => {
                ErrorResponse::new(code, message)
            }
            AppError::Configuration { key, .. } => {
                ErrorResponse::new(code, format!("Configuration error: {}", key))
            }
            AppError::Internal { .. } => ErrorResponse::new(code, "An internal error occurred"),
            dispatch => ErrorResponse::new(code, dispatch.to_string()),
        };

        (status, Json(error_response)).into_response()
    }
}

/// Maps an AppError variant to its corresponding HTTP status code.
pub fn error_to_status_code(error: &AppError) -> StatusCode {
    match error {
        AppError::Validation { .. }
        | AppError::ValidationErrors { .. }
        | AppError::UnprocessableContent { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        AppError::ChannelNotConfigured { .. } => StatusCode::SERVICE_UNAVAILABLE,
        AppError::Transport { .. } | AppError::UpstreamRejection { .. } => StatusCode::BAD_GATEWAY,
        AppError::Configuration { .. } | AppError::Internal { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Maps an AppError variant to its error code string.
pub fn error_to_code(error: &AppError) -> &'static str {
    match error {
        AppError::Validation { .. } | AppError::ValidationErrors { .. } => "VALIDATION_ERROR",
        AppError::UnprocessableContent { .. } => "UNPROCESSABLE_CONTENT",
        AppError::BadRequest { .. } => "BAD_REQUEST",
        AppError::ChannelNotConfigured { .. } => "CHANNEL_NOT_CONFIGURED",
        AppError::Transport { .. } => "TRANSPORT_ERROR",
        AppError::UpstreamRejection { .. } => "UPSTREAM_REJECTED",
        AppError::Configuration { .. } => "CONFIGURATION_ERROR",
        AppError::Internal { .. } => "INTERNAL_ERROR",
    }
}

/// Global error handling middleware.
///
/// Error responses that already carry JSON get the request id added; any
/// other 4xx/5xx response is replaced by an [`ErrorResponse`] for its status.
pub async fn global_error_handler(request: Request, next: Next) -> Response {
    let request_id = request.extensions().get::<RequestId>().map(|r| r.0.clone());
    let response = next.run(request).await;

    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"));

    let (parts, body) = response.into_parts();
    let body_bytes = to_bytes(body, MAX_ERROR_BODY_BYTES).await.unwrap_or_default();

    if is_json {
        return match serde_json::from_slice::<Value>(&body_bytes) {
            Ok(Value::Object(mut object)) => {
                if let Some(id) = request_id {
                    object
                        .entry("request_id")
                        .or_insert_with(|| Value::String(id));
                }
                (status, Json(Value::Object(object))).into_response()
            }
            _ => Response::from_parts(parts, body_bytes.into()),
        };
    }

    let original_message = String::from_utf8_lossy(&body_bytes).trim().to_string();
    let mut error_response = fallback_error(status, original_message);
    if let Some(id) = request_id {
        error_response = error_response.with_request_id(&id);
    }

    (status, Json(error_response)).into_response()
}

fn fallback_error(status: StatusCode, original_message: String) -> ErrorResponse {
    let (code, default_detail) = match status {
        StatusCode::BAD_REQUEST => ("BAD_REQUEST", "Bad request - invalid or malformed request"),
        StatusCode::NOT_FOUND => ("NOT_FOUND", "The requested resource was not found"),
        StatusCode::METHOD_NOT_ALLOWED => {
            ("METHOD_NOT_ALLOWED", "HTTP method not allowed for this endpoint")
        }
        StatusCode::UNSUPPORTED_MEDIA_TYPE => ("UNSUPPORTED_MEDIA_TYPE", "Unsupported media type"),
        StatusCode::PAYLOAD_TOO_LARGE => ("PAYLOAD_TOO_LARGE", "Request payload too large"),
        StatusCode::UNPROCESSABLE_ENTITY => ("UNPROCESSABLE_CONTENT", "Unprocessable content"),
        StatusCode::REQUEST_TIMEOUT => ("REQUEST_TIMEOUT", "Request timeout"),
        StatusCode::INTERNAL_SERVER_ERROR => {
            ("INTERNAL_SERVER_ERROR", "An internal server error occurred")
        }
        StatusCode::BAD_GATEWAY => ("BAD_GATEWAY", "Bad gateway"),
        StatusCode::SERVICE_UNAVAILABLE => ("SERVICE_UNAVAILABLE", "Service temporarily unavailable"),
        StatusCode::GATEWAY_TIMEOUT => ("GATEWAY_TIMEOUT", "Gateway timeout"),
        _ => ("UNKNOWN_ERROR", "An unknown error occurred"),
    };

    let detail = if original_message.is_empty() {
        default_detail.to_string()
    } else {
        original_message
    };

    ErrorResponse::new(code, detail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Channel, ValidationFieldError};
    use axum::{Router, body::Body, http::Request as HttpRequest, middleware, routing::get};
    use tower::ServiceExt;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_code_mapping() {
        let cases = [
            (
                AppError::Validation {
                    field: "subject".into(),
                    reason: "required".into(),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AppError::UnprocessableContent {
                    message: "bad".into(),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AppError::BadRequest {
                    message: "bad".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::not_configured(Channel::Teams, "teams.webhook_url"),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                AppError::Transport {
                    channel: Channel::Email,
                    reason: "SMTP connection failed: refused".into(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (
                AppError::UpstreamRejection {
                    channel: Channel::Teams,
                    status: Some(400),
                    reason: "Webhook returned HTTP 400: nope".into(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (
                AppError::Internal {
                    source: anyhow::anyhow!("boom"),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error_to_status_code(&error), expected, "{:?}", error);
        }
    }

    #[tokio::test]
    async fn test_dispatch_error_body() {
        let error = AppError::UpstreamRejection {
            channel: Channel::Teams,
            status: Some(400),
            reason: "Webhook returned HTTP 400: Bad payload".into(),
        };

        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = body_json(response).await;
        assert_eq!(
            body["detail"],
            "Failed to send Teams notification: Webhook returned HTTP 400: Bad payload"
        );
        assert_eq!(body["code"], "UPSTREAM_REJECTED");
    }

    #[tokio::test]
    async fn test_validation_error_body_lists_fields() {
        let error = AppError::ValidationErrors {
            errors: vec![ValidationFieldError {
                field: "to_emails".into(),
                message: "Invalid email address: nope".into(),
            }],
        };

        let body = body_json(error.into_response()).await;
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["errors"][0]["field"], "to_emails");
        assert_eq!(body["errors"][0]["message"], "Invalid email address: nope");
    }

    #[tokio::test]
    async fn test_internal_error_is_sanitized() {
        let error = AppError::Internal {
            source: anyhow::anyhow!("secret connection string"),
        };

        let body = body_json(error.into_response()).await;
        assert_eq!(body["detail"], "An internal error occurred");
    }

    fn app() -> Router {
        Router::new()
            .route("/ok", get(|| async { "ok" }))
            .route(
                "/fail",
                get(|| async { AppError::BadRequest { message: "nope".into() } }),
            )
            .layer(middleware::from_fn(global_error_handler))
            .layer(middleware::from_fn(super::super::request_id_middleware))
    }

    #[tokio::test]
    async fn test_global_error_handler_normalizes_not_found() {
        let response = app()
            .oneshot(
                HttpRequest::builder()
                    .uri("/missing")
                    .header("x-request-id", "req-404")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["detail"], "The requested resource was not found");
        assert_eq!(body["request_id"], "req-404");
    }

    #[tokio::test]
    async fn test_global_error_handler_adds_request_id_to_json_errors() {
        let response = app()
            .oneshot(
                HttpRequest::builder()
                    .uri("/fail")
                    .header("x-request-id", "req-400")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["detail"], "nope");
        assert_eq!(body["request_id"], "req-400");
    }

    #[tokio::test]
    async fn test_global_error_handler_passes_success_through() {
        let response = app()
            .oneshot(HttpRequest::builder().uri("/ok").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"ok");
    }

    #[test]
    fn test_fallback_error_keeps_original_message() {
        let error = fallback_error(StatusCode::METHOD_NOT_ALLOWED, "Use POST".to_string());
        assert_eq!(error.code, "METHOD_NOT_ALLOWED");
        assert_eq!(error.detail, "Use POST");
    }
}
