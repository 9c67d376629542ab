//! Delivery of session intents as Bot API messages

use super::types::ReplyKeyboardMarkup;
use super::{TelegramClient, TelegramError};
use crate::quiz::{BotMessages, Question, ScoredResult};
use crate::runtime::{Delivery, DeliveryError, ImageResolver};
use crate::session::SessionId;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

impl From<TelegramError> for DeliveryError {
    fn from(e: TelegramError) -> Self {
        DeliveryError(e.to_string())
    }
}

pub struct TelegramDelivery {
    client: Arc<TelegramClient>,
    images: Arc<dyn ImageResolver>,
    messages: BotMessages,
}

impl TelegramDelivery {
    pub fn new(
        client: Arc<TelegramClient>,
        images: Arc<dyn ImageResolver>,
        messages: BotMessages,
    ) -> Self {
        Self {
            client,
            images,
            messages,
        }
    }

    async fn send_text(&self, session: SessionId, text: &str) -> Result<(), DeliveryError> {
        let message = self.client.send_message(session.0, text, None).await?;
        tracing::debug!(session_id = %session, message_id = message.message_id, "Message sent");
        Ok(())
    }
}

/// Upload name for a result image
fn photo_file_name(key: &str, image: Option<&str>) -> String {
    image
        .and_then(|image| Path::new(image).file_name())
        .map_or_else(
            || format!("{key}.jpg"),
            |name| name.to_string_lossy().into_owned(),
        )
}

#[async_trait]
impl Delivery for TelegramDelivery {
    async fn present_greeting(&self, session: SessionId) -> Result<(), DeliveryError> {
        self.send_text(session, &self.messages.greeting).await
    }

    async fn present_question(
        &self,
        session: SessionId,
        index: usize,
        question: &Question,
    ) -> Result<(), DeliveryError> {
        let keyboard = ReplyKeyboardMarkup::one_per_row(&question.answers);
        let message = self
            .client
            .send_message(session.0, &question.text, Some(&keyboard))
            .await?;
        tracing::debug!(session_id = %session, index, message_id = message.message_id, "Question sent");
        Ok(())
    }

    async fn present_result(
        &self,
        session: SessionId,
        result: &ScoredResult,
    ) -> Result<(), DeliveryError> {
        let text = self
            .messages
            .render_result(&result.key, &result.description);

        let photo = self
            .images
            .resolve(&result.key, result.image.as_deref())
            .await;

        let sent_photo = match photo {
            Some(bytes) => {
                let file_name = photo_file_name(&result.key, result.image.as_deref());
                match self
                    .client
                    .send_photo(session.0, &bytes, &file_name, &text)
                    .await
                {
                    Ok(_) => true,
                    Err(e) => {
                        tracing::warn!(
                            session_id = %session,
                            result = %result.key,
                            error = %e,
                            "Failed to send result photo, falling back to text"
                        );
                        false
                    }
                }
            }
            None => false,
        };

        if !sent_photo {
            self.send_text(session, &text).await?;
        }

        self.send_text(session, &self.messages.help_prompt).await
    }

    async fn present_undetermined(&self, session: SessionId) -> Result<(), DeliveryError> {
        self.send_text(session, &self.messages.undetermined).await
    }

    async fn present_help(&self, session: SessionId) -> Result<(), DeliveryError> {
        self.send_text(session, &self.messages.help).await
    }
}
