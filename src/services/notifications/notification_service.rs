//! Notification service for business logic.
//!
//! Formats incoming requests for their channel, dispatches them once and
//! converts failed dispatches into typed errors.

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use super::card::format_card;
use super::email_provider::EmailProvider;
use super::mail::format_mail;
use super::provider::{DispatchResult, NotificationProvider};
use super::teams_provider::TeamsProvider;
use crate::error::AppResult;
use crate::models::{ChatNotificationRequest, EmailNotificationRequest};

/// Whether each channel has the settings it needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct ChannelStatus {
    pub teams: bool,
    pub email: bool,
}

impl ChannelStatus {
    pub fn all_configured(&self) -> bool {
        self.teams && self.email
    }
}

/// Notification service handling formatting and dispatch
#[derive(Clone)]
pub struct NotificationService {
    teams: Arc<TeamsProvider>,
    email: Arc<EmailProvider>,
}

impl NotificationService {
    pub fn new(teams: TeamsProvider, email: EmailProvider) -> Self {
        Self {
            teams: Arc::new(teams),
            email: Arc::new(email),
        }
    }

    /// Send a chat card built from `request`.
    pub async fn notify_chat(&self, request: &ChatNotificationRequest) -> AppResult<DispatchResult> {
        let card = format_card(request);

        tracing::debug!(
            channel = self.teams.name(),
            severity = %request.severity(),
            facts = card.sections.first().map_or(0, |s| s.facts.len()),
            "Dispatching chat notification"
        );

        let result = self.teams.send(&card).await?;
        result.into_result(self.teams.channel())
    }

    /// Send an email built from `request`.
    pub async fn notify_email(
        &self,
        request: &EmailNotificationRequest,
    ) -> AppResult<DispatchResult> {
        let mail = format_mail(request, &self.email.sender())?;

        tracing::debug!(
            channel = self.email.name(),
            to_count = mail.to.len(),
            cc_count = mail.cc.len(),
            bcc_count = mail.bcc_count,
            "Dispatching email notification"
        );

        let result = self.email.send(&mail).await?;
        result.into_result(self.email.channel())
    }

    pub fn channel_status(&self) -> ChannelStatus {
        ChannelStatus {
            teams: self.teams.is_configured(),
            email: self.email.is_configured(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SmtpConfig, TeamsConfig};
    use crate::error::{AppError, Channel};
    use crate::services::notifications::email_provider::MailTransportError;
    use crate::services::notifications::email_provider::tests::{
        RecordingTransport, configured_smtp,
    };
    use crate::services::notifications::teams_provider::tests::spawn_webhook;
    use axum::http::StatusCode;

    fn unconfigured_teams() -> TeamsProvider {
        TeamsProvider::new(&TeamsConfig::default(), reqwest::Client::new())
    }

    fn chat_request() -> ChatNotificationRequest {
        ChatNotificationRequest {
            url: "https://example.com".to_string(),
            message: "m".to_string(),
            title: None,
            severity: None,
            additional_facts: None,
        }
    }

    fn email_request() -> EmailNotificationRequest {
        EmailNotificationRequest {
            to_emails: vec!["a@x.com".to_string()],
            subject: "S".to_string(),
            message: "M".to_string(),
            cc_emails: None,
            bcc_emails: None,
            html_message: None,
            url: None,
            additional_info: None,
        }
    }

    #[tokio::test]
    async fn test_notify_chat_rejection_becomes_error() {
        let (url, _) = spawn_webhook(StatusCode::BAD_REQUEST, "invalid card").await;
        let teams = TeamsProvider::new(
            &TeamsConfig {
                webhook_url: url,
                timeout_seconds: 5,
            },
            reqwest::Client::new(),
        );
        let email = EmailProvider::with_transport(
            SmtpConfig::default(),
            Arc::new(RecordingTransport::default()),
        );
        let service = NotificationService::new(teams, email);

        let error = service.notify_chat(&chat_request()).await.unwrap_err();
        match error {
            AppError::UpstreamRejection {
                channel,
                status,
                reason,
            } => {
                assert_eq!(channel, Channel::Teams);
                assert_eq!(status, Some(400));
                assert!(reason.contains("400"));
            }
            other => panic!("Expected UpstreamRejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_notify_email_success() {
        let transport = Arc::new(RecordingTransport::default());
        let email = EmailProvider::with_transport(configured_smtp(), transport.clone());
        let service = NotificationService::new(unconfigured_teams(), email);

        let result = service.notify_email(&email_request()).await.unwrap();
        assert!(result.success);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_notify_email_connection_failure_becomes_transport_error() {
        let transport = Arc::new(RecordingTransport::failing(MailTransportError::Connection(
            "timed out".to_string(),
        )));
        let email = EmailProvider::with_transport(configured_smtp(), transport);
        let service = NotificationService::new(unconfigured_teams(), email);

        let error = service.notify_email(&email_request()).await.unwrap_err();
        assert!(matches!(error, AppError::Transport { channel: Channel::Email, .. }));
    }

    #[test]
    fn test_channel_status() {
        let email = EmailProvider::with_transport(
            configured_smtp(),
            Arc::new(RecordingTransport::default()),
        );
        let service = NotificationService::new(unconfigured_teams(), email);

        let status = service.channel_status();
        assert!(!status.teams);
        assert!(status.email);
        assert!(!status.all_configured());
    }
}
