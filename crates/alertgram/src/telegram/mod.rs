mod client;
mod types;

use async_trait::async_trait;

use crate::Result;

pub use client::{TelegramClient, DEFAULT_API_BASE};
pub use types::{BotUser, Chat, ChatKind, IncomingMessage, OutgoingMessage, ParseMode, Receipt, Update};

/// The chat platform as the rest of the crate sees it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send one message.
    async fn send_message(&self, message: &OutgoingMessage) -> Result<Receipt>;

    /// Long-poll for updates with `update_id >= offset`.
    async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>>;

    /// The bot account behind the token.
    async fn get_me(&self) -> Result<BotUser>;
}
