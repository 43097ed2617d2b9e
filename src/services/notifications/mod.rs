//! Notification system with pluggable providers.
//!
//! Requests are formatted into the channel's native payload (a MessageCard
//! for Teams, a multipart email for SMTP) and handed to a
//! [`NotificationProvider`] for a single delivery attempt.

pub mod card;
pub mod email_provider;
pub mod mail;
mod provider;
pub mod teams_provider;

pub mod notification_service;

pub use card::{MessageCard, format_card};
pub use email_provider::{EmailProvider, MailTransport, MailTransportError, SmtpMailTransport};
pub use mail::{MailDocument, SenderIdentity, format_mail};
pub use notification_service::{ChannelStatus, NotificationService};
pub use provider::{DispatchResult, FailureKind, NotificationProvider, RecipientSummary};
pub use teams_provider::TeamsProvider;
