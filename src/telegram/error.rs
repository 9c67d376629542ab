//! Telegram error types

use std::time::Duration;
use thiserror::Error;

/// Bot API error with classification
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TelegramError {
    pub kind: TelegramErrorKind,
    pub message: String,
    pub retry_after: Option<Duration>,
}

impl TelegramError {
    pub fn new(kind: TelegramErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn with_retry_after(mut self, duration: Duration) -> Self {
        self.retry_after = Some(duration);
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(TelegramErrorKind::Network, message)
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(TelegramErrorKind::RateLimit, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(TelegramErrorKind::ServerError, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(TelegramErrorKind::Auth, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(TelegramErrorKind::InvalidRequest, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(TelegramErrorKind::Unknown, message)
    }

    /// Classify a failed call by its HTTP status (or the envelope's `error_code`)
    pub fn from_status(status: u16, description: &str, retry_after: Option<u64>) -> Self {
        match status {
            401 | 403 => Self::auth(format!("Unauthorized: {description}")),
            429 => {
                let err = Self::rate_limit(format!("Rate limited: {description}"));
                match retry_after {
                    Some(secs) => err.with_retry_after(Duration::from_secs(secs)),
                    None => err,
                }
            }
            400 | 404 => Self::invalid_request(format!("Bad request: {description}")),
            500..=599 => Self::server_error(format!("Server error: {description}")),
            _ => Self::unknown(format!("HTTP {status}: {description}")),
        }
    }

    /// Map a transport error. The URL is stripped since it carries the bot token.
    pub fn from_reqwest(e: reqwest::Error) -> Self {
        let e = e.without_url();
        if e.is_timeout() {
            Self::network(format!("Request timeout: {e}"))
        } else if e.is_connect() {
            Self::network(format!("Connection failed: {e}"))
        } else if e.is_decode() {
            Self::unknown(format!("Failed to parse response: {e}"))
        } else {
            Self::network(format!("Request failed: {e}"))
        }
    }
}

/// Error classification for retry logic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelegramErrorKind {
    /// Network issues, timeouts - retryable
    Network,
    /// Rate limited (429) - retryable after `retry_after`
    RateLimit,
    /// Server error (5xx) - retryable
    ServerError,
    /// Bad or revoked token (401, 403) - not retryable
    Auth,
    /// Bad request, e.g. chat not found (400) - not retryable
    InvalidRequest,
    Unknown,
}

impl TelegramErrorKind {
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::RateLimit | Self::ServerError)
    }
}
