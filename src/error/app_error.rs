use std::fmt;

use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::config::error::ConfigError;

/// Downstream channel a dispatch error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Teams,
    Email,
}

impl Channel {
    /// Short identifier used in logs and health checks
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Teams => "teams",
            Channel::Email => "email",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Teams => f.write_str("Teams notification"),
            Channel::Email => f.write_str("email notification"),
        }
    }
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ValidationFieldError {
    /// Name of the offending field
    pub field: String,
    /// Human readable failure description
    pub message: String,
}

/// Application-wide error type.
///
/// Dispatch failures keep the channel they belong to so the HTTP boundary can
/// render `Failed to send <channel>: <reason>` without re-classifying them.
#[derive(Error, Debug)]
pub enum AppError {
    /// Validation error for a single field
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Validation errors collected from a request body
    #[error("Validation failed for {} field(s)", errors.len())]
    ValidationErrors { errors: Vec<ValidationFieldError> },

    /// Bad request error with descriptive message
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// Request body could not be interpreted
    #[error("Unprocessable content: {message}")]
    UnprocessableContent { message: String },

    /// A channel was called but its required settings are missing
    #[error("Failed to send {channel}: channel not configured ({setting} is not set)")]
    ChannelNotConfigured { channel: Channel, setting: String },

    /// The downstream channel could not be reached
    #[error("Failed to send {channel}: {reason}")]
    Transport { channel: Channel, reason: String },

    /// The downstream channel was reached but refused the payload
    #[error("Failed to send {channel}: {reason}")]
    UpstreamRejection {
        channel: Channel,
        status: Option<u16>,
        reason: String,
    },

    /// Configuration error with key information
    #[error("Configuration error: {key}")]
    Configuration {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// Internal error for unexpected failures
    #[error("Internal error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    pub fn not_configured(channel: Channel, setting: impl Into<String>) -> Self {
        AppError::ChannelNotConfigured {
            channel,
            setting: setting.into(),
        }
    }

    /// Channel the error belongs to, if it came from a dispatch.
    pub fn channel(&self) -> Option<Channel> {
        match self {
            AppError::ChannelNotConfigured { channel, .. }
            | AppError::Transport { channel, .. }
            | AppError::UpstreamRejection { channel, .. } => Some(*channel),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

impl From<ConfigError> for AppError {
    fn from(error: ConfigError) -> Self {
        let key = match &error {
            ConfigError::ValidationError { field, .. } => field.clone(),
            _ => "settings".to_string(),
        };
        AppError::Configuration {
            key,
            source: anyhow::Error::new(error),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut errors: Vec<ValidationFieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, failures)| {
                failures.iter().map(move |failure| ValidationFieldError {
                    field: field.to_string(),
                    message: failure
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| failure.code.to_string()),
                })
            })
            .collect();
        errors.sort_by(|a, b| a.field.cmp(&b.field));

        AppError::ValidationErrors { errors }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => AppError::UnprocessableContent {
                message: err.body_text(),
            },
            JsonRejection::JsonSyntaxError(err) => AppError::UnprocessableContent {
                message: err.body_text(),
            },
            JsonRejection::MissingJsonContentType(_) => AppError::BadRequest {
                message: "Expected request with `Content-Type: application/json`".to_string(),
            },
            other => AppError::BadRequest {
                message: other.body_text(),
            },
        }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Debug, Validate)]
    struct Probe {
        #[validate(length(min = 1, message = "subject is required"))]
        subject: String,
        #[validate(email)]
        sender: String,
    }

    #[test]
    fn test_dispatch_errors_render_channel_label() {
        let error = AppError::Transport {
            channel: Channel::Teams,
            reason: "Request error: connection refused".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to send Teams notification: Request error: connection refused"
        );

        let error = AppError::not_configured(Channel::Email, "smtp.host");
        assert_eq!(
            error.to_string(),
            "Failed to send email notification: channel not configured (smtp.host is not set)"
        );
        assert_eq!(error.channel(), Some(Channel::Email));
    }

    #[test]
    fn test_validation_errors_are_flattened_and_sorted() {
        let probe = Probe {
            subject: String::new(),
            sender: "not-an-address".to_string(),
        };
        let error: AppError = probe.validate().unwrap_err().into();

        match error {
            AppError::ValidationErrors { errors } => {
                assert_eq!(errors.len(), 2);
                assert_eq!(errors[0].field, "sender");
                assert_eq!(errors[0].message, "email");
                assert_eq!(errors[1].field, "subject");
                assert_eq!(errors[1].message, "subject is required");
            }
            other => panic!("Expected ValidationErrors, got {:?}", other),
        }
    }

    #[test]
    fn test_config_error_keeps_field_as_key() {
        let error: AppError = ConfigError::validation("teams.timeout_seconds", "must be > 0").into();
        match error {
            AppError::Configuration { key, .. } => assert_eq!(key, "teams.timeout_seconds"),
            other => panic!("Expected Configuration, got {:?}", other),
        }
    }

    #[test]
    fn test_channel_identifiers() {
        assert_eq!(Channel::Teams.as_str(), "teams");
        assert_eq!(Channel::Email.as_str(), "email");
        assert_eq!(serde_json::to_string(&Channel::Email).unwrap(), "\"email\"");
    }
}
