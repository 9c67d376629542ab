//! Bot API HTTP client

use super::types::{
    ApiResponse, GetUpdatesRequest, Message, ReplyKeyboardMarkup, SendMessageRequest, Update,
};
use super::TelegramError;
use reqwest::{multipart, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::future::Future;
use std::time::Duration;

/// Attempts per send, including the first
const MAX_SEND_ATTEMPTS: u32 = 3;

/// Timeout for everything except long polling
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Slack on top of the long-poll timeout before the HTTP request gives up
const POLL_GRACE: Duration = Duration::from_secs(10);

/// Client for one bot token. Not `Debug`: the base URL embeds the token.
pub struct TelegramClient {
    client: Client,
    base_url: String,
    poll_timeout: Duration,
    retry_base: Duration,
}

impl TelegramClient {
    pub fn new(api_url: &str, token: &str, poll_timeout: Duration) -> Result<Self, TelegramError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(TelegramError::from_reqwest)?;

        Ok(Self {
            client,
            base_url: format!("{}/bot{token}", api_url.trim_end_matches('/')),
            poll_timeout,
            retry_base: Duration::from_secs(1),
        })
    }

    /// First retry delay; later retries double it
    pub fn with_retry_base(mut self, delay: Duration) -> Self {
        self.retry_base = delay;
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{method}", self.base_url)
    }

    pub async fn delete_webhook(&self, drop_pending_updates: bool) -> Result<(), TelegramError> {
        let request = self
            .client
            .post(self.method_url("deleteWebhook"))
            .json(&json!({ "drop_pending_updates": drop_pending_updates }));
        let _: bool = self.call(request).await?;
        Ok(())
    }

    /// Long-poll for updates with `update_id >= offset`. Not retried here; the
    /// dispatcher owns polling backoff.
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, TelegramError> {
        let request = self
            .client
            .post(self.method_url("getUpdates"))
            .timeout(self.poll_timeout + POLL_GRACE)
            .json(&GetUpdatesRequest {
                offset,
                timeout: self.poll_timeout.as_secs(),
                allowed_updates: &["message"],
            });
        self.call(request).await
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&ReplyKeyboardMarkup>,
    ) -> Result<Message, TelegramError> {
        self.with_retry("sendMessage", || {
            let request = self
                .client
                .post(self.method_url("sendMessage"))
                .json(&SendMessageRequest {
                    chat_id,
                    text,
                    reply_markup: keyboard,
                });
            self.call(request)
        })
        .await
    }

    /// Upload a photo with a caption as multipart form data
    pub async fn send_photo(
        &self,
        chat_id: i64,
        photo: &[u8],
        file_name: &str,
        caption: &str,
    ) -> Result<Message, TelegramError> {
        self.with_retry("sendPhoto", || {
            // The form is consumed by each send, so it is rebuilt per attempt
            let form = multipart::Form::new()
                .text("chat_id", chat_id.to_string())
                .text("caption", caption.to_string())
                .part(
                    "photo",
                    multipart::Part::bytes(photo.to_vec()).file_name(file_name.to_string()),
                );
            let request = self.client.post(self.method_url("sendPhoto")).multipart(form);
            self.call(request)
        })
        .await
    }

    async fn call<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, TelegramError> {
        let response = request.send().await.map_err(TelegramError::from_reqwest)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TelegramError::network(format!("Failed to read response: {}", e.without_url())))?;

        let Ok(envelope) = serde_json::from_str::<ApiResponse<T>>(&body) else {
            if status.is_success() {
                return Err(TelegramError::unknown(format!(
                    "Failed to parse response: {body}"
                )));
            }
            return Err(TelegramError::from_status(status.as_u16(), &body, None));
        };

        if !envelope.ok || !status.is_success() {
            return Err(TelegramError::from_status(
                envelope.error_code.unwrap_or(status.as_u16()),
                envelope.description.as_deref().unwrap_or("no description"),
                envelope.parameters.and_then(|p| p.retry_after),
            ));
        }

        envelope
            .result
            .ok_or_else(|| TelegramError::unknown("Response marked ok but has no result"))
    }

    /// Retry retryable failures with exponential backoff, or the server's
    /// `retry_after` when it sends one
    async fn with_retry<T, F, Fut>(&self, method: &'static str, mut op: F) -> Result<T, TelegramError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, TelegramError>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.kind.is_retryable() && attempt < MAX_SEND_ATTEMPTS => {
                    let delay = e
                        .retry_after
                        .unwrap_or_else(|| self.retry_base * (1 << (attempt - 1)));
                    tracing::warn!(
                        method,
                        attempt,
                        delay_ms = %delay.as_millis(),
                        error = %e,
                        "Telegram request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
