//! SMTP email provider.
//!
//! Each send opens a fresh SMTP session (STARTTLS when enabled, AUTH when
//! credentials are configured) and closes it before returning.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lettre::address::Envelope;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use thiserror::Error;

use super::mail::{MailDocument, SenderIdentity};
use super::provider::{DispatchResult, FailureKind, NotificationProvider, RecipientSummary};
use crate::config::SmtpConfig;
use crate::error::{AppError, AppResult, Channel};

/// SMTP reply codes that mean the credentials were refused
const AUTH_FAILURE_CODES: &[u16] = &[530, 534, 535, 538];

/// Failure of a single SMTP transaction
#[derive(Debug, Error)]
pub enum MailTransportError {
    #[error("SMTP authentication failed: {0}")]
    Authentication(String),

    #[error("SMTP server rejected the message: {0}")]
    Rejected(String),

    #[error("SMTP connection failed: {0}")]
    Connection(String),
}

impl MailTransportError {
    pub fn kind(&self) -> FailureKind {
        match self {
            MailTransportError::Authentication(_) | MailTransportError::Rejected(_) => {
                FailureKind::Rejected
            }
            MailTransportError::Connection(_) => FailureKind::Transport,
        }
    }
}

impl From<lettre::transport::smtp::Error> for MailTransportError {
    fn from(error: lettre::transport::smtp::Error) -> Self {
        let code = error
            .status()
            .and_then(|code| code.to_string().parse::<u16>().ok());
        classify(code, error.is_client(), error.to_string())
    }
}

/// Sort an SMTP failure by reply code.
///
/// Without a reply code, client-side authentication failures (no shared
/// mechanism) still count as authentication; everything else is a
/// connection problem.
fn classify(code: Option<u16>, client_error: bool, message: String) -> MailTransportError {
    match code {
        Some(code) if AUTH_FAILURE_CODES.contains(&code) => {
            MailTransportError::Authentication(message)
        }
        Some(_) => MailTransportError::Rejected(message),
        None if client_error && message.to_lowercase().contains("authentication") => {
            MailTransportError::Authentication(message)
        }
        None => MailTransportError::Connection(message),
    }
}

/// Delivers a rendered message to an envelope.
///
/// Swappable so dispatch logic can be exercised without a mail server.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, envelope: &Envelope, message: &[u8]) -> Result<(), MailTransportError>;
}

/// lettre-backed transport, one connection per call
pub struct SmtpMailTransport {
    host: String,
    port: u16,
    use_tls: bool,
    credentials: Option<(String, String)>,
    timeout: Duration,
}

impl SmtpMailTransport {
    pub fn new(config: &SmtpConfig) -> Self {
        let credentials = match (&config.username, &config.password) {
            (Some(username), Some(password)) => Some((username.clone(), password.clone())),
            _ => None,
        };

        Self {
            host: config.host.trim().to_string(),
            port: config.port,
            use_tls: config.use_tls,
            credentials,
            timeout: config.timeout(),
        }
    }

    fn build(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, MailTransportError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.host)
            .port(self.port)
            .timeout(Some(self.timeout));

        if self.use_tls {
            let parameters = TlsParameters::new(self.host.clone())
                .map_err(|e| MailTransportError::Connection(e.to_string()))?;
            builder = builder.tls(Tls::Required(parameters));
        }

        if let Some((username, password)) = &self.credentials {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(builder.build())
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send(&self, envelope: &Envelope, message: &[u8]) -> Result<(), MailTransportError> {
        let transport = self.build()?;
        transport.send_raw(envelope, message).await?;
        Ok(())
    }
}

/// Email channel
pub struct EmailProvider {
    config: SmtpConfig,
    transport: Arc<dyn MailTransport>,
}

impl EmailProvider {
    pub fn new(config: SmtpConfig) -> Self {
        let transport = Arc::new(SmtpMailTransport::new(&config));
        Self { config, transport }
    }

    /// Use a custom transport instead of a live SMTP connection.
    pub fn with_transport(config: SmtpConfig, transport: Arc<dyn MailTransport>) -> Self {
        Self { config, transport }
    }

    pub fn sender(&self) -> SenderIdentity {
        SenderIdentity::from(&self.config)
    }

    fn ensure_configured(&self) -> AppResult<()> {
        if self.config.host.trim().is_empty() {
            return Err(AppError::not_configured(Channel::Email, "smtp.host"));
        }
        if self.config.sender_email.trim().is_empty() {
            return Err(AppError::not_configured(Channel::Email, "smtp.sender_email"));
        }
        Ok(())
    }

    /// Send `mail` to its envelope recipients.
    ///
    /// Fails with `ChannelNotConfigured` before any I/O when the relay host or
    /// sender address is missing.
    pub async fn send_mail(&self, mail: &MailDocument) -> AppResult<DispatchResult> {
        self.ensure_configured()?;

        let (message, envelope) = mail.to_message()?;
        let start = Instant::now();
        let outcome = self.transport.send(&envelope, &message.formatted()).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(()) => {
                tracing::info!(
                    channel = "email",
                    to_count = mail.to.len(),
                    cc_count = mail.cc.len(),
                    bcc_count = mail.bcc_count,
                    duration_ms,
                    "Email sent successfully"
                );

                let mut result = DispatchResult::succeeded("Email sent successfully", duration_ms);
                result.recipients = Some(RecipientSummary {
                    to: mail.to.clone(),
                    cc: mail.cc.clone(),
                    bcc_count: mail.bcc_count,
                });
                result.subject = Some(mail.subject.clone());
                Ok(result)
            }
            Err(e) => {
                tracing::error!(
                    channel = "email",
                    host = %self.config.host,
                    port = self.config.port,
                    duration_ms,
                    error = %e,
                    "Email dispatch failed"
                );

                let mut result = DispatchResult::failed(e.kind(), e.to_string(), duration_ms);
                result.subject = Some(mail.subject.clone());
                Ok(result)
            }
        }
    }
}

#[async_trait]
impl NotificationProvider for EmailProvider {
    type Payload = MailDocument;

    async fn send(&self, payload: &MailDocument) -> AppResult<DispatchResult> {
        self.send_mail(payload).await
    }

    fn channel(&self) -> Channel {
        Channel::Email
    }

    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }
}
