//! Teams incoming-webhook provider.
//!
//! POSTs a [`MessageCard`] to the configured webhook with a single, bounded
//! attempt.

use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::card::MessageCard;
use super::provider::{DispatchResult, FailureKind, NotificationProvider};
use crate::config::TeamsConfig;
use crate::error::{AppError, AppResult, Channel};

/// Upstream error bodies are cut to this many characters
const MAX_ERROR_BODY_CHARS: usize = 500;

pub struct TeamsProvider {
    client: reqwest::Client,
    webhook_url: String,
    timeout: Duration,
}

impl TeamsProvider {
    pub fn new(config: &TeamsConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            webhook_url: config.webhook_url.trim().to_string(),
            timeout: config.timeout(),
        }
    }

    /// POST `card` to the webhook.
    ///
    /// Non-2xx answers and transport failures come back as `Ok` with
    /// `success = false`; only a missing webhook URL is an `Err`.
    pub async fn send_card(&self, card: &MessageCard) -> AppResult<DispatchResult> {
        if self.webhook_url.is_empty() {
            return Err(AppError::not_configured(Channel::Teams, "teams.webhook_url"));
        }

        let start = Instant::now();
        let response = self
            .client
            .post(&self.webhook_url)
            .timeout(self.timeout)
            .json(card)
            .send()
            .await;

        let result = match response {
            Ok(resp) => {
                let status = resp.status();
                if status.is_success() {
                    DispatchResult::succeeded("Notification sent successfully", elapsed_ms(start))
                        .with_status_code(status.as_u16())
                } else {
                    let body = resp.text().await.unwrap_or_default();
                    DispatchResult::failed(
                        FailureKind::Rejected,
                        format!(
                            "Webhook returned HTTP {}: {}",
                            status.as_u16(),
                            truncate(body.trim(), MAX_ERROR_BODY_CHARS)
                        ),
                        elapsed_ms(start),
                    )
                    .with_status_code(status.as_u16())
                }
            }
            Err(e) if e.is_timeout() => DispatchResult::failed(
                FailureKind::Transport,
                format!("Request timed out after {}ms", self.timeout.as_millis()),
                elapsed_ms(start),
            ),
            Err(e) => DispatchResult::failed(
                FailureKind::Transport,
                format!("Request error: {}", e),
                elapsed_ms(start),
            ),
        };

        if result.success {
            tracing::info!(
                channel = "teams",
                status = ?result.status_code,
                duration_ms = result.duration_ms,
                "Teams notification sent"
            );
        } else {
            tracing::error!(
                channel = "teams",
                status = ?result.status_code,
                duration_ms = result.duration_ms,
                error = %result.message,
                "Teams notification failed"
            );
        }

        Ok(result)
    }
}

#[async_trait]
impl NotificationProvider for TeamsProvider {
    type Payload = MessageCard;

    async fn send(&self, payload: &MessageCard) -> AppResult<DispatchResult> {
        self.send_card(payload).await
    }

    fn channel(&self) -> Channel {
        Channel::Teams
    }

    fn is_configured(&self) -> bool {
        !self.webhook_url.is_empty()
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

fn truncate(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((index, _)) => format!("{}...", &body[..index]),
        None => body.to_string(),
    }
}
