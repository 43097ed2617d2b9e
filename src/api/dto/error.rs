//! Error response DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ValidationFieldError;

/// Standard error response format.
///
/// `detail` is always present; `errors` lists field-level failures for
/// validation errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "detail": "Failed to send Teams notification: Webhook returned HTTP 400: Bad payload",
    "code": "UPSTREAM_REJECTED",
    "request_id": "0b6f8c2e-3f4d-4a55-9f1e-5c1d2b3a4e5f"
}))]
pub struct ErrorResponse {
    pub detail: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ValidationFieldError>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorResponse {
    /// Creates a new error response with code and detail.
    pub fn new(code: &str, detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            code: code.to_string(),
            errors: None,
            request_id: None,
        }
    }

    /// Attaches field-level validation failures.
    pub fn with_errors(mut self, errors: Vec<ValidationFieldError>) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Adds request ID to the error response for correlation.
    pub fn with_request_id(mut self, request_id: &str) -> Self {
        self.request_id = Some(request_id.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_are_omitted() {
        let body = serde_json::to_value(ErrorResponse::new("BAD_REQUEST", "nope")).unwrap();
        assert_eq!(body, serde_json::json!({"detail": "nope", "code": "BAD_REQUEST"}));
    }

    #[test]
    fn test_builder_sets_errors_and_request_id() {
        let response = ErrorResponse::new("VALIDATION_ERROR", "Validation failed for 1 field(s)")
            .with_errors(vec![ValidationFieldError {
                field: "to_emails".to_string(),
                message: "Invalid email address: nope".to_string(),
            }])
            .with_request_id("req-1");

        let body = serde_json::to_value(response).unwrap();
        assert_eq!(body["errors"][0]["field"], "to_emails");
        assert_eq!(body["request_id"], "req-1");
    }
}
