//! Outbound chat notifications.
//!
//! Uses teloxide `Bot` directly (send-only, no dispatcher).

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::Recipient;
use tracing::debug;

/// Delivers a text message to the student.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send one message.
    ///
    /// # Errors
    ///
    /// Returns an error if delivery fails.
    async fn send(&self, text: &str) -> anyhow::Result<()>;
}

/// Telegram notifier bound to a single chat.
pub struct TelegramNotifier {
    bot: Bot,
    recipient: Recipient,
}

impl TelegramNotifier {
    /// Create a notifier for `chat_id` (numeric id or `@channel`).
    pub fn new(bot_token: &str, chat_id: &str) -> Self {
        Self {
            bot: Bot::new(bot_token),
            recipient: parse_recipient(chat_id),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> anyhow::Result<()> {
        self.bot
            .send_message(self.recipient.clone(), text)
            .await
            .map_err(|e| anyhow::anyhow!("failed to send Telegram message: {e}"))?;
        debug!(message = %text, "message sent");
        Ok(())
    }
}

/// Numeric ids become [`ChatId`]; anything else is treated as a channel username.
pub fn parse_recipient(chat_id: &str) -> Recipient {
    let trimmed = chat_id.trim();
    match trimmed.parse::<i64>() {
        Ok(id) => Recipient::Id(ChatId(id)),
        Err(_) => Recipient::ChannelUsername(trimmed.to_owned()),
    }
}
