use crate::logger::{self, LogTag};
use crate::notifications::NotificationBridge;
use crate::services::{Service, ServiceHealth};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Notification timer, independent of the data timer
pub struct NotificationsService {
    bridge: Arc<NotificationBridge>,
    interval: Duration,
    enabled: bool,
    last_error: Arc<Mutex<Option<String>>>,
}

impl NotificationsService {
    pub fn new(bridge: Arc<NotificationBridge>, interval: Duration, enabled: bool) -> Self {
        Self {
            bridge,
            interval,
            enabled,
            last_error: Arc::new(Mutex::new(None)),
        }
    }
}

#[async_trait]
impl Service for NotificationsService {
    fn name(&self) -> &'static str {
        "notifications"
    }

    fn priority(&self) -> i32 {
        30
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn start(&mut self, shutdown: Arc<Notify>) -> Result<Vec<JoinHandle<()>>, String> {
        let bridge = Arc::clone(&self.bridge);
        let last_error = Arc::clone(&self.last_error);
        let interval = self.interval;

        let shutdown_signal = shutdown.notified_owned();

        let handle = tokio::spawn(async move {
            tokio::pin!(shutdown_signal);

            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = &mut shutdown_signal => {
                        logger::debug(LogTag::Notifications, "Notification loop received shutdown signal");
                        break;
                    }
                    _ = ticker.tick() => {
                        match bridge.check().await {
                            Ok(_) => *last_error.lock() = None,
                            Err(e) => {
                                logger::warning(
                                    LogTag::Notifications,
                                    &format!("Failed to fetch notifications: {}", e),
                                );
                                *last_error.lock() = Some(e.to_string());
                            }
                        }
                    }
                }
            }
        });

        logger::info(
            LogTag::Notifications,
            &format!(
                "Checking deregistration alerts every {}s via {} notifier(s)",
                interval.as_secs(),
                self.bridge.notifiers().len()
            ),
        );
        Ok(vec![handle])
    }

    async fn health(&self) -> ServiceHealth {
        match self.last_error.lock().clone() {
            Some(message) => ServiceHealth::Degraded(message),
            None => ServiceHealth::Healthy,
        }
    }
}
