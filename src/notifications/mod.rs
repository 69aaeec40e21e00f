//! Deregistration alerts: backend feed -> permission check -> notifiers

pub mod bridge;
pub mod console;
#[cfg(feature = "telegram")]
pub mod telegram;
pub mod types;

pub use bridge::{DeliveryReport, NotificationBridge};
pub use console::ConsoleNotifier;
#[cfg(feature = "telegram")]
pub use telegram::TelegramNotifier;
pub use types::{Notification, NotificationPermission, Notifier, DEREGISTRATION_ALERT_TITLE};

use crate::config::NotificationsConfig;
use crate::logger::{self, LogTag};
use std::sync::Arc;

/// Notifiers enabled by configuration; the console sink is always present
pub fn build_notifiers(config: &NotificationsConfig) -> Vec<Arc<dyn Notifier>> {
    let mut notifiers: Vec<Arc<dyn Notifier>> = vec![Arc::new(ConsoleNotifier::new())];

    if config.telegram_enabled {
        #[cfg(feature = "telegram")]
        match TelegramNotifier::new(&config.telegram_bot_token, &config.telegram_chat_id) {
            Ok(notifier) => notifiers.push(Arc::new(notifier)),
            Err(e) => logger::warning(
                LogTag::Notifications,
                &format!("Telegram notifier disabled: {}", e),
            ),
        }

        #[cfg(not(feature = "telegram"))]
        logger::warning(
            LogTag::Notifications,
            "telegram_enabled is set but this build has no telegram support",
        );
    }

    notifiers
}
