//! Telegram delivery for deregistration alerts
//!
//! Uses the teloxide crate for Telegram Bot API integration. Permission is
//! granted once the bot token authenticates (`getMe`) and denied otherwise.

use super::types::{Notification, NotificationPermission, Notifier};
use crate::errors::{MonitorError, MonitorResult};
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use parking_lot::Mutex;
use teloxide::prelude::*;
use teloxide::types::{ChatId, ParseMode};
use teloxide::utils::html;

/// Telegram notifier for sending messages
pub struct TelegramNotifier {
    bot: Bot,
    chat_id: ChatId,
    permission: Mutex<NotificationPermission>,
}

impl TelegramNotifier {
    /// Create a new Telegram notifier
    ///
    /// # Arguments
    /// * `bot_token` - Telegram bot token from @BotFather
    /// * `chat_id` - Chat ID to send notifications to
    pub fn new(bot_token: &str, chat_id: &str) -> MonitorResult<Self> {
        if bot_token.is_empty() {
            return Err(MonitorError::Config("Bot token is empty".to_string()));
        }

        if chat_id.is_empty() {
            return Err(MonitorError::Config("Chat ID is empty".to_string()));
        }

        let chat_id_parsed: i64 = chat_id
            .trim()
            .parse()
            .map_err(|e| MonitorError::Config(format!("Invalid chat ID '{}': {}", chat_id, e)))?;

        Ok(Self {
            bot: Bot::new(bot_token),
            chat_id: ChatId(chat_id_parsed),
            permission: Mutex::new(NotificationPermission::Default),
        })
    }

    fn format_notification(notification: &Notification) -> String {
        format!(
            "⚠️ <b>{}</b>\n\n{}",
            html::escape(&notification.title),
            html::escape(&notification.body)
        )
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &'static str {
        "telegram"
    }

    fn permission(&self) -> NotificationPermission {
        *self.permission.lock()
    }

    async fn request_permission(&self) -> NotificationPermission {
        let granted = match self.bot.get_me().send().await {
            Ok(me) => {
                logger::info(
                    LogTag::Notifications,
                    &format!("Telegram bot authenticated as @{}", me.username()),
                );
                NotificationPermission::Granted
            }
            Err(e) => {
                logger::warning(
                    LogTag::Notifications,
                    &format!("Telegram bot rejected, alerts disabled: {}", e),
                );
                NotificationPermission::Denied
            }
        };
        *self.permission.lock() = granted;
        granted
    }

    async fn deliver(&self, notification: &Notification) -> MonitorResult<()> {
        let message = Self::format_notification(notification);
        self.bot
            .send_message(self.chat_id, message.clone())
            .parse_mode(ParseMode::Html)
            .send()
            .await
            .map_err(|e| {
                MonitorError::Notification(format!("Failed to send Telegram message: {}", e))
            })?;

        logger::debug(
            LogTag::Notifications,
            &format!("Sent Telegram notification (length={})", message.len()),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_credentials() {
        assert!(TelegramNotifier::new("", "1").is_err());
        assert!(TelegramNotifier::new("123:abc", "").is_err());
        assert!(TelegramNotifier::new("123:abc", "not-a-number").is_err());
    }

    #[test]
    fn test_starts_without_permission_and_escapes_body() {
        let notifier = TelegramNotifier::new("123:abc", "-100200").unwrap();
        assert_eq!(notifier.permission(), NotificationPermission::Default);

        let text = TelegramNotifier::format_notification(&Notification::deregistration_alert(
            "uid <7> deregistered",
        ));
        assert!(text.contains("<b>Miner Deregistration Alert</b>"));
        assert!(text.contains("uid &lt;7&gt; deregistered"));
    }

    fn offline_notifier() -> TelegramNotifier {
        // Reserve a port, then free it so every request is refused
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let api = url::Url::parse(&format!("http://{}/", addr)).unwrap();

        TelegramNotifier {
            bot: Bot::new("123:abc").set_api_url(api),
            chat_id: ChatId(-100200),
            permission: Mutex::new(NotificationPermission::Default),
        }
    }

    #[tokio::test]
    async fn test_unreachable_api_denies_and_fails_delivery() {
        let notifier = offline_notifier();

        assert_eq!(notifier.request_permission().await, NotificationPermission::Denied);
        assert_eq!(notifier.permission(), NotificationPermission::Denied);

        let err = notifier
            .deliver(&Notification::deregistration_alert("uid 7 deregistered"))
            .await
            .unwrap_err();
        assert!(matches!(err, MonitorError::Notification(_)));
    }
}
