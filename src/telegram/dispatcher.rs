//! Long-polling update loop
//!
//! Pulls updates, turns each text message into a session event and hands it
//! to the session manager. Ordering per chat is preserved because updates are
//! forwarded in `update_id` order into that chat's runtime queue.

use super::types::Update;
use super::{TelegramClient, TelegramError, TelegramErrorKind};
use crate::runtime::SessionManager;
use crate::session::SessionId;
use crate::state_machine::Event;
use std::sync::Arc;
use std::time::Duration;

const MIN_POLL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_POLL_BACKOFF: Duration = Duration::from_secs(30);

/// Map an incoming update to the session event it represents.
/// Updates without a text message produce nothing.
pub fn route_update(update: &Update) -> Option<(SessionId, Event)> {
    let message = update.message.as_ref()?;
    let text = message.text.as_deref()?;
    Some((SessionId::from(message.chat.id), parse_text(text)))
}

/// `/start` and `/help` (optionally addressed as `/cmd@bot`, with arguments)
/// are commands; any other text, including unknown commands, is an answer.
fn parse_text(text: &str) -> Event {
    let command = text
        .strip_prefix('/')
        .and_then(|rest| rest.split_whitespace().next())
        .map(|word| word.split_once('@').map_or(word, |(name, _bot)| name));

    match command {
        Some("start") => Event::Start,
        Some("help") => Event::Help,
        _ => Event::text(text),
    }
}

pub struct PollingDispatcher {
    client: Arc<TelegramClient>,
    sessions: Arc<SessionManager>,
    offset: i64,
}

impl PollingDispatcher {
    pub fn new(client: Arc<TelegramClient>, sessions: Arc<SessionManager>) -> Self {
        Self {
            client,
            sessions,
            offset: 0,
        }
    }

    /// Poll until the token is rejected. Every other failure is retried with
    /// backoff.
    pub async fn run(mut self) -> Result<(), TelegramError> {
        tracing::info!("Polling for updates");
        let mut backoff = MIN_POLL_BACKOFF;

        loop {
            match self.client.get_updates(self.offset).await {
                Ok(updates) => {
                    backoff = MIN_POLL_BACKOFF;
                    for update in updates {
                        self.dispatch(&update).await;
                    }
                }
                Err(e) if e.kind == TelegramErrorKind::Auth => {
                    tracing::error!(error = %e, "Bot token rejected, stopping polling");
                    return Err(e);
                }
                Err(e) => {
                    let delay = e.retry_after.unwrap_or(backoff);
                    tracing::warn!(
                        error = %e,
                        retryable = e.kind.is_retryable(),
                        delay_ms = %delay.as_millis(),
                        "getUpdates failed"
                    );
                    tokio::time::sleep(delay).await;
                    backoff = (backoff * 2).min(MAX_POLL_BACKOFF);
                }
            }
        }
    }

    async fn dispatch(&mut self, update: &Update) {
        // Acknowledge even updates we skip, so they are not redelivered
        self.offset = self.offset.max(update.update_id + 1);

        let Some((session_id, event)) = route_update(update) else {
            tracing::debug!(update_id = update.update_id, "Skipping non-text update");
            return;
        };

        if let Some(user) = update.message.as_ref().and_then(|m| m.from.as_ref()) {
            tracing::debug!(
                session_id = %session_id,
                user_id = user.id,
                username = user.username.as_deref().unwrap_or(""),
                event = event.name(),
                "Received message"
            );
        }

        // Only enqueues; a session busy delivering never holds up polling
        if let Err(e) = self.sessions.send_event(session_id, event).await {
            tracing::error!(session_id = %session_id, error = %e, "Failed to queue event");
        }
    }
}
