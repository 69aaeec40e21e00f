// Log-sink notifier, always permitted

use super::types::{Notification, NotificationPermission, Notifier};
use crate::errors::MonitorResult;
use crate::logger::{self, LogTag};
use async_trait::async_trait;

#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    fn name(&self) -> &'static str {
        "console"
    }

    fn permission(&self) -> NotificationPermission {
        NotificationPermission::Granted
    }

    async fn request_permission(&self) -> NotificationPermission {
        NotificationPermission::Granted
    }

    async fn deliver(&self, notification: &Notification) -> MonitorResult<()> {
        logger::info(
            LogTag::Notifications,
            &format!("🔔 {}: {}", notification.title, notification.body),
        );
        Ok(())
    }
}
