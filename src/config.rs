//! Process configuration from environment variables

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_HTTP_PORT: u16 = 8080;
/// The status API exposes answers, so it stays on loopback unless told otherwise
const DEFAULT_HTTP_BIND: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("BOT_TOKEN must be set to the Telegram bot token")]
    MissingToken,
}

/// Everything the bot needs at startup
#[derive(Clone)]
pub struct BotConfig {
    pub bot_token: String,
    pub quiz_data_path: PathBuf,
    pub images_dir: PathBuf,
    pub telegram_api_url: String,
    pub poll_timeout: Duration,
    pub http_bind: IpAddr,
    pub http_port: u16,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bot_token = lookup("BOT_TOKEN")
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let poll_timeout_secs = lookup("TELEGRAM_POLL_TIMEOUT_SECS")
            .and_then(|secs| secs.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_POLL_TIMEOUT_SECS);

        let http_port = lookup("QUIZ_HTTP_PORT")
            .and_then(|port| port.trim().parse::<u16>().ok())
            .filter(|port| *port != 0)
            .unwrap_or(DEFAULT_HTTP_PORT);

        let http_bind = lookup("QUIZ_HTTP_BIND")
            .and_then(|addr| addr.trim().parse::<IpAddr>().ok())
            .unwrap_or(DEFAULT_HTTP_BIND);

        Ok(Self {
            bot_token,
            quiz_data_path: lookup("QUIZ_DATA_PATH")
                .map_or_else(|| PathBuf::from("quiz_data.json"), PathBuf::from),
            images_dir: lookup("QUIZ_IMAGES_DIR").map_or_else(|| PathBuf::from("images"), PathBuf::from),
            telegram_api_url: lookup("TELEGRAM_API_URL")
                .unwrap_or_else(|| "https://api.telegram.org".to_string()),
            poll_timeout: Duration::from_secs(poll_timeout_secs),
            http_bind,
            http_port,
        })
    }
}

// Keeps the token out of logs
impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("bot_token", &"[REDACTED]")
            .field("quiz_data_path", &self.quiz_data_path)
            .field("images_dir", &self.images_dir)
            .field("telegram_api_url", &self.telegram_api_url)
            .field("poll_timeout", &self.poll_timeout)
            .field("http_bind", &self.http_bind)
            .field("http_port", &self.http_port)
            .finish()
    }
}
