//! Configuration validation logic
//!
//! Unset channel settings are accepted here; a channel without a webhook URL
//! or SMTP host is reported as not configured when it is first used.

use validator::{ValidateEmail, ValidateUrl};

use crate::config::error::ConfigError;
use crate::config::settings::{
    CorsConfig, FileSettings, LoggerSettings, ServerConfig, Settings, SmtpConfig, TeamsConfig,
};

/// Valid log levels
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid log formats
const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

impl ServerConfig {
    /// Validate server configuration
    ///
    /// # Validation Rules
    /// - Port must be between 1 and 65535
    /// - Host must not be empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "Port must be between 1 and 65535. Please specify a valid port number.",
            ));
        }

        if self.host.trim().is_empty() {
            return Err(ConfigError::validation(
                "server.host",
                "Host is required. Use 0.0.0.0 to listen on all interfaces.",
            ));
        }

        Ok(())
    }
}

impl FileSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled.",
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.file.format".to_string(),
                message: format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            });
        }

        Ok(())
    }
}

impl LoggerSettings {
    /// Validate logger settings
    ///
    /// # Validation Rules
    /// - Log level must be one of: trace, debug, info, warn, error
    /// - If file logging is enabled, path must not be empty
    /// - Log format must be one of: full, compact, json
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        self.file.validate()?;

        Ok(())
    }
}

impl CorsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(index) = self
            .allowed_origins
            .iter()
            .position(|origin| origin.trim().is_empty())
        {
            return Err(ConfigError::ValidationError {
                field: format!("cors.allowed_origins[{}]", index),
                message: "Allowed origins must be non-empty strings.".to_string(),
            });
        }

        Ok(())
    }
}

impl TeamsConfig {
    /// Validate webhook settings
    ///
    /// An empty webhook URL is allowed; anything else must be an http(s) URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_seconds == 0 {
            return Err(ConfigError::validation(
                "teams.timeout_seconds",
                "Webhook timeout must be greater than 0 seconds.",
            ));
        }

        let url = self.webhook_url.trim();
        if !url.is_empty() {
            let has_http_scheme = url.starts_with("http://") || url.starts_with("https://");
            if !has_http_scheme || !url.validate_url() {
                return Err(ConfigError::validation(
                    "teams.webhook_url",
                    "Webhook URL must be an absolute http:// or https:// URL.",
                ));
            }
        }

        Ok(())
    }
}

impl SmtpConfig {
    /// Validate SMTP settings
    ///
    /// # Validation Rules
    /// - Port must be between 1 and 65535
    /// - Timeout must be greater than 0
    /// - Username and password must be set together
    /// - A non-empty sender email must be a valid address
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::validation(
                "smtp.port",
                "SMTP port must be between 1 and 65535.",
            ));
        }

        if self.timeout_seconds == 0 {
            return Err(ConfigError::validation(
                "smtp.timeout_seconds",
                "SMTP timeout must be greater than 0 seconds.",
            ));
        }

        if self.username.is_some() != self.password.is_some() {
            return Err(ConfigError::validation(
                "smtp.username",
                "SMTP username and password must be configured together.",
            ));
        }

        let sender = self.sender_email.trim();
        if !sender.is_empty() && !sender.validate_email() {
            return Err(ConfigError::ValidationError {
                field: "smtp.sender_email".to_string(),
                message: format!("Invalid sender email address '{}'.", sender),
            });
        }

        Ok(())
    }
}

impl Settings {
    /// Validate all configuration settings
    ///
    /// Returns the first validation error encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.logger.validate()?;
        self.cors.validate()?;
        self.teams.validate()?;
        self.smtp.validate()?;
        Ok(())
    }
}
