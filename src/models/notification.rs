//! Notification request models.
//!
//! These are the typed bodies accepted by the notification endpoints. Field
//! validation happens through `validator` before any formatting is attempted.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidateEmail, ValidationError};

// ============================================================================
// Severity
// ============================================================================

/// Notification severity, controls the card accent color.
///
/// Unknown values on the wire resolve to [`Severity::Info`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
    Success,
    #[default]
    #[serde(other)]
    Info,
}

impl Severity {
    /// Accent color used for the card theme
    pub fn color(&self) -> &'static str {
        match self {
            Severity::Info => "#0078D4",
            Severity::Warning => "#FFA500",
            Severity::Error => "#D13438",
            Severity::Success => "#28A745",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Severity::Info => "Info",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
            Severity::Success => "Success",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Card title used when none is given
pub const DEFAULT_TITLE: &str = "Notification";

/// Chat card notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "url": "https://example.com/deployments/42",
    "message": "Deployment completed successfully",
    "title": "Deploy",
    "severity": "success",
    "additional_facts": {"Environment": "production", "Version": "1.4.2"}
}))]
pub struct ChatNotificationRequest {
    /// Link opened by the card action
    pub url: String,

    /// Body text
    pub message: String,

    /// Defaults to "Notification" when absent, `null` or blank
    #[serde(default)]
    pub title: Option<String>,

    /// Defaults to `info`; unknown values are treated as `info`
    #[serde(default)]
    pub severity: Option<Severity>,

    /// Extra fact rows, rendered in the given order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_facts: Option<IndexMap<String, String>>,
}

impl ChatNotificationRequest {
    pub fn title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|title| !title.trim().is_empty())
            .unwrap_or(DEFAULT_TITLE)
    }

    pub fn severity(&self) -> Severity {
        self.severity.unwrap_or_default()
    }
}

/// Multipart email notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "to_emails": ["oncall@example.com"],
    "subject": "Disk usage above 90%",
    "message": "db-01 is running out of disk space",
    "cc_emails": ["team@example.com"],
    "url": "https://grafana.example.com/d/disk",
    "additional_info": {"Host": "db-01", "Usage": "93%"}
}))]
pub struct EmailNotificationRequest {
    #[validate(
        length(min = 1, message = "At least one recipient is required"),
        custom(function = "validate_email_list")
    )]
    pub to_emails: Vec<String>,

    pub subject: String,

    /// Plain-text body
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_email_list"))]
    pub cc_emails: Option<Vec<String>>,

    /// Envelope-only recipients, never rendered into headers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_email_list"))]
    pub bcc_emails: Option<Vec<String>>,

    /// Replaces the generated HTML part verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_message: Option<String>,

    /// Call-to-action link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<IndexMap<String, String>>,
}

impl EmailNotificationRequest {
    pub fn cc(&self) -> &[String] {
        self.cc_emails.as_deref().unwrap_or_default()
    }

    pub fn bcc(&self) -> &[String] {
        self.bcc_emails.as_deref().unwrap_or_default()
    }
}

fn validate_email_list(emails: &[String]) -> Result<(), ValidationError> {
    match emails.iter().find(|email| !email.validate_email()) {
        Some(invalid) => {
            let mut error = ValidationError::new("email");
            error.message = Some(format!("Invalid email address: {}", invalid).into());
            error.add_param("value".into(), invalid);
            Err(error)
        }
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_severity_colors() {
        assert_eq!(Severity::Info.color(), "#0078D4");
        assert_eq!(Severity::Warning.color(), "#FFA500");
        assert_eq!(Severity::Error.color(), "#D13438");
        assert_eq!(Severity::Success.color(), "#28A745");
    }

    #[test]
    fn test_chat_request_defaults() {
        let request: ChatNotificationRequest = serde_json::from_value(json!({
            "url": "https://example.com",
            "message": "Deployment completed successfully"
        }))
        .unwrap();

        assert_eq!(request.title(), "Notification");
        assert_eq!(request.severity(), Severity::Info);
        assert!(request.additional_facts.is_none());
    }

    #[test]
    fn test_chat_request_null_and_blank_title_fall_back() {
        for title in [json!(null), json!(""), json!("   ")] {
            let request: ChatNotificationRequest = serde_json::from_value(json!({
                "url": "https://example.com", "message": "m", "title": title
            }))
            .unwrap();
            assert_eq!(request.title(), "Notification");
        }

        let request: ChatNotificationRequest = serde_json::from_value(json!({
            "url": "https://example.com", "message": "m", "title": "Deploy"
        }))
        .unwrap();
        assert_eq!(request.title(), "Deploy");
    }

    #[test]
    fn test_chat_request_null_and_unknown_severity() {
        let request: ChatNotificationRequest = serde_json::from_value(json!({
            "url": "", "message": "m", "severity": null
        }))
        .unwrap();
        assert_eq!(request.severity(), Severity::Info);

        let request: ChatNotificationRequest = serde_json::from_value(json!({
            "url": "", "message": "m", "severity": "critical"
        }))
        .unwrap();
        assert_eq!(request.severity(), Severity::Info);
    }

    #[test]
    fn test_chat_request_missing_message_is_rejected() {
        let result: Result<ChatNotificationRequest, _> =
            serde_json::from_value(json!({"url": "https://example.com"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_additional_facts_keep_insertion_order() {
        let request: ChatNotificationRequest = serde_json::from_str(
            r#"{"url":"u","message":"m","additional_facts":{"zeta":"1","alpha":"2","mid":"3"}}"#,
        )
        .unwrap();
        let keys: Vec<_> = request.additional_facts.unwrap().into_keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_email_request_validation() {
        let valid: EmailNotificationRequest = serde_json::from_value(json!({
            "to_emails": ["a@x.com"], "subject": "S", "message": "M"
        }))
        .unwrap();
        assert!(valid.validate().is_ok());
        assert!(valid.cc().is_empty());
        assert!(valid.bcc().is_empty());

        let empty = EmailNotificationRequest {
            to_emails: vec![],
            ..valid.clone()
        };
        let errors = empty.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("to_emails"));

        let bad_bcc = EmailNotificationRequest {
            bcc_emails: Some(vec!["ok@x.com".to_string(), "nope".to_string()]),
            ..valid
        };
        let errors = bad_bcc.validate().unwrap_err();
        let failures = &errors.field_errors()["bcc_emails"];
        assert_eq!(
            failures[0].message.as_deref(),
            Some("Invalid email address: nope")
        );
    }

    proptest! {
        #[test]
        fn prop_severity_wire_names_resolve(name in "[a-z]{1,12}") {
            let parsed: Severity = serde_json::from_value(json!(name.clone())).unwrap();
            let expected = match name.as_str() {
                "warning" => Severity::Warning,
                "error" => Severity::Error,
                "success" => Severity::Success,
                _ => Severity::Info,
            };
            prop_assert_eq!(parsed, expected);
        }
    }
}
