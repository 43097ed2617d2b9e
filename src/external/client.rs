use std::time::Duration;

use crate::error::{AppError, AppResult};

/// User-Agent sent with every outbound webhook call
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Build the shared HTTP client used for webhook dispatch.
///
/// The client is pooled and cheap to clone; `timeout` bounds every request
/// made with it.
///
/// # Features
/// - **Timeouts**: `timeout` per request, connect bounded by the same value
/// - **Compression**: gzip, deflate, brotli and zstd responses
/// - **Security**: Rustls for TLS (no OpenSSL dependency)
pub fn build_http_client(timeout: Duration) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .gzip(true)
        .deflate(true)
        .brotli(true)
        .zstd(true)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| AppError::Internal {
            source: anyhow::Error::new(e).context("Failed to build HTTP client"),
        })
}
