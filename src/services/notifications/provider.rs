//! Core notification provider trait and types.
//!
//! Each downstream channel implements [`NotificationProvider`] for its own
//! payload type and reports the outcome as a [`DispatchResult`].

use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult, Channel};

/// Why a dispatch did not succeed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The downstream could not be reached (DNS, TLS, refused, timeout)
    Transport,
    /// The downstream answered and refused the payload
    Rejected,
}

/// Recipients of a delivered email; BCC addresses are only counted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RecipientSummary {
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc_count: usize,
}

/// Outcome of a single dispatch attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DispatchResult {
    /// Whether the downstream accepted the payload
    pub success: bool,

    /// Upstream HTTP status, webhook dispatches only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    /// Success message or failure reason
    pub message: String,

    #[schema(value_type = String, format = DateTime)]
    pub timestamp: Timestamp,

    /// Time spent in the dispatch call
    pub duration_ms: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipients: Option<RecipientSummary>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    #[serde(skip)]
    pub failure: Option<FailureKind>,
}

impl DispatchResult {
    pub fn succeeded(message: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            success: true,
            status_code: None,
            message: message.into(),
            timestamp: Timestamp::now(),
            duration_ms,
            recipients: None,
            subject: None,
            failure: None,
        }
    }

    pub fn failed(kind: FailureKind, message: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            success: false,
            status_code: None,
            message: message.into(),
            timestamp: Timestamp::now(),
            duration_ms,
            recipients: None,
            subject: None,
            failure: Some(kind),
        }
    }

    pub fn with_status_code(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    /// Turn a failed dispatch into the matching [`AppError`] for `channel`.
    pub fn into_result(self, channel: Channel) -> AppResult<DispatchResult> {
        if self.success {
            return Ok(self);
        }

        match self.failure.unwrap_or(FailureKind::Transport) {
            FailureKind::Transport => Err(AppError::Transport {
                channel,
                reason: self.message,
            }),
            FailureKind::Rejected => Err(AppError::UpstreamRejection {
                channel,
                status: self.status_code,
                reason: self.message,
            }),
        }
    }
}

/// Trait for notification channels (chat webhook, email, ...)
///
/// Transport-level failures are reported as `Ok` with `success = false` so the
/// caller sees timing and status; `Err` is reserved for requests that never
/// reached the network (missing configuration, unrenderable payload).
#[async_trait]
pub trait NotificationProvider: Send + Sync {
    /// Channel-native payload this provider delivers
    type Payload: Send + Sync;

    /// Deliver one payload; exactly one attempt is made.
    async fn send(&self, payload: &Self::Payload) -> AppResult<DispatchResult>;

    /// Channel this provider serves
    fn channel(&self) -> Channel;

    /// Whether the settings required to dispatch are present
    fn is_configured(&self) -> bool;

    /// Returns the provider name for logging
    fn name(&self) -> &'static str {
        self.channel().as_str()
    }
}
