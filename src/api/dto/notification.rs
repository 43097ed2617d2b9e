//! Notification response DTOs.
//!
//! Request bodies live in [`crate::models`]; these wrap a successful dispatch
//! for the HTTP response.

use jiff::Timestamp;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::ChatNotificationRequest;
use crate::services::notifications::DispatchResult;

/// Response for a delivered chat notification.
#[derive(Debug, Serialize, ToSchema)]
pub struct ChatNotificationResponse {
    /// Always `success`
    #[schema(example = "success")]
    pub status: String,
    #[schema(example = "Notification sent to Teams successfully")]
    pub message: String,
    /// Outcome reported by the webhook dispatcher
    pub details: DispatchResult,
    /// The request as received
    pub payload: ChatNotificationRequest,
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: Timestamp,
}

impl ChatNotificationResponse {
    pub fn new(details: DispatchResult, payload: ChatNotificationRequest) -> Self {
        Self {
            status: "success".to_string(),
            message: "Notification sent to Teams successfully".to_string(),
            details,
            payload,
            timestamp: Timestamp::now(),
        }
    }
}

/// Response for a delivered email notification.
#[derive(Debug, Serialize, ToSchema)]
pub struct EmailNotificationResponse {
    /// Always `success`
    #[schema(example = "success")]
    pub status: String,
    #[schema(example = "Email sent successfully")]
    pub message: String,
    /// Outcome reported by the SMTP dispatcher, including recipient counts
    pub details: DispatchResult,
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: Timestamp,
}

impl EmailNotificationResponse {
    pub fn new(details: DispatchResult) -> Self {
        Self {
            status: "success".to_string(),
            message: "Email sent successfully".to_string(),
            details,
            timestamp: Timestamp::now(),
        }
    }
}
