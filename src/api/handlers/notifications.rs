//! Notification API handlers.
//!
//! Each handler validates its body, dispatches exactly once and maps the
//! outcome to the response; dispatch failures surface as [`crate::error::AppError`]s.

use crate::api::doc::NOTIFICATION_TAG;
use crate::api::dto::{ChatNotificationResponse, EmailNotificationResponse, ErrorResponse};
use crate::error::AppResult;
use crate::models::{ChatNotificationRequest, EmailNotificationRequest};
use crate::state::AppState;
use crate::utils::ValidatedJson;
use axum::{Json, extract::State};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Creates notification routes.
///
/// Routes:
/// - POST /notify        - Send a Teams message card
/// - POST /notify/email  - Send an email
pub fn notification_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(send_chat_notification))
        .routes(routes!(send_email_notification))
}

/// POST /notify - Send a Teams notification
///
/// Formats the request as a MessageCard and posts it to the configured
/// webhook.
#[utoipa::path(
    post,
    path = "/notify",
    tag = NOTIFICATION_TAG,
    request_body = ChatNotificationRequest,
    responses(
        (status = 200, description = "Notification delivered", body = ChatNotificationResponse),
        (status = 422, description = "Invalid request body", body = ErrorResponse),
        (status = 502, description = "Webhook unreachable or rejected the card", body = ErrorResponse),
        (status = 503, description = "Teams webhook not configured", body = ErrorResponse)
    )
)]
async fn send_chat_notification(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ChatNotificationRequest>,
) -> AppResult<Json<ChatNotificationResponse>> {
    tracing::info!(
        title = %payload.title(),
        severity = %payload.severity(),
        "Received chat notification request"
    );

    let details = state.services.notifications.notify_chat(&payload).await?;
    Ok(Json(ChatNotificationResponse::new(details, payload)))
}

/// POST /notify/email - Send an email notification
///
/// Sends a multipart (plain text and HTML) message through the configured
/// SMTP server. BCC recipients only appear in the envelope.
#[utoipa::path(
    post,
    path = "/notify/email",
    tag = NOTIFICATION_TAG,
    request_body = EmailNotificationRequest,
    responses(
        (status = 200, description = "Email delivered", body = EmailNotificationResponse),
        (status = 422, description = "Invalid request body", body = ErrorResponse),
        (status = 502, description = "SMTP server unreachable or rejected the message", body = ErrorResponse),
        (status = 503, description = "SMTP not configured", body = ErrorResponse)
    )
)]
async fn send_email_notification(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<EmailNotificationRequest>,
) -> AppResult<Json<EmailNotificationResponse>> {
    tracing::info!(
        to_count = payload.to_emails.len(),
        cc_count = payload.cc().len(),
        bcc_count = payload.bcc().len(),
        "Received email notification request"
    );

    let details = state.services.notifications.notify_email(&payload).await?;
    Ok(Json(EmailNotificationResponse::new(details)))
}
