//! Telegram Bot API transport
//!
//! A small hand-rolled client over `reqwest`: long polling for updates in,
//! text, keyboards and photos out.

mod client;
mod delivery;
mod dispatcher;
mod error;
pub mod types;

pub use client::TelegramClient;
pub use delivery::TelegramDelivery;
pub use dispatcher::PollingDispatcher;
pub use error::{TelegramError, TelegramErrorKind};
