//! Bot API wire types
//!
//! Only the fields the bot reads or sends are modelled; everything else in
//! Telegram's payloads is ignored on deserialization.

use serde::{Deserialize, Serialize};

/// Envelope of every Bot API response
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<u16>,
    pub parameters: Option<ResponseParameters>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseParameters {
    /// Seconds to wait before repeating a rate-limited request
    pub retry_after: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
}

// ============================================================================
// Outgoing
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyboardButton {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyKeyboardMarkup {
    pub keyboard: Vec<Vec<KeyboardButton>>,
    pub resize_keyboard: bool,
    pub one_time_keyboard: bool,
}

impl ReplyKeyboardMarkup {
    /// One-time keyboard with each option on its own row
    pub fn one_per_row<S: AsRef<str>>(options: &[S]) -> Self {
        Self {
            keyboard: options
                .iter()
                .map(|option| {
                    vec![KeyboardButton {
                        text: option.as_ref().to_string(),
                    }]
                })
                .collect(),
            resize_keyboard: true,
            one_time_keyboard: true,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct SendMessageRequest<'a> {
    pub chat_id: i64,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<&'a ReplyKeyboardMarkup>,
}

#[derive(Debug, Serialize)]
pub(super) struct GetUpdatesRequest {
    pub offset: i64,
    pub timeout: u64,
    pub allowed_updates: &'static [&'static str],
}
