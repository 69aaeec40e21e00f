/// Notification bridge
///
/// Pulls the backend alert feed and hands every message to each notifier.
/// Permission is resolved per notifier right before delivery:
/// `Granted` delivers, `Default` asks first, `Denied` drops silently.
/// Delivery failures are logged and never abort the remaining messages.
/// A feed response is delivered only if no newer check started meanwhile.
use super::types::{Notification, NotificationPermission, Notifier};
use crate::apis::backend::BackendApi;
use crate::dashboard::{FetchKind, RequestGenerations};
use crate::errors::MonitorResult;
use crate::logger::{self, LogTag};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeliveryReport {
    pub messages: usize,
    pub delivered: usize,
    pub dropped: usize,
    pub failed: usize,
    /// A newer check superseded this one; nothing was delivered
    pub stale: bool,
}

enum Outcome {
    Delivered,
    Dropped,
    Failed,
}

pub struct NotificationBridge {
    backend: Arc<dyn BackendApi>,
    notifiers: Vec<Arc<dyn Notifier>>,
    generations: RequestGenerations,
}

impl NotificationBridge {
    pub fn new(backend: Arc<dyn BackendApi>, notifiers: Vec<Arc<dyn Notifier>>) -> Self {
        Self {
            backend,
            notifiers,
            generations: RequestGenerations::new(),
        }
    }

    pub fn notifiers(&self) -> &[Arc<dyn Notifier>] {
        &self.notifiers
    }

    /// Fetch the feed once and deliver every message
    pub async fn check(&self) -> MonitorResult<DeliveryReport> {
        let generation = self.generations.issue(FetchKind::Notifications);
        let result = self.backend.fetch_notifications().await;

        if !self.generations.is_current(FetchKind::Notifications, generation) {
            logger::debug(
                LogTag::Notifications,
                &format!(
                    "Discarding stale notifications response (generation {} < {})",
                    generation,
                    self.generations.current(FetchKind::Notifications)
                ),
            );
            return Ok(DeliveryReport {
                stale: true,
                ..DeliveryReport::default()
            });
        }

        let messages = result?;
        let mut report = DeliveryReport {
            messages: messages.len(),
            ..DeliveryReport::default()
        };

        for message in messages {
            let notification = Notification::deregistration_alert(message);
            let tasks = self
                .notifiers
                .iter()
                .map(|notifier| Self::deliver_one(notifier.as_ref(), &notification));

            for outcome in futures::future::join_all(tasks).await {
                match outcome {
                    Outcome::Delivered => report.delivered += 1,
                    Outcome::Dropped => report.dropped += 1,
                    Outcome::Failed => report.failed += 1,
                }
            }
        }

        if report.messages > 0 {
            logger::debug(
                LogTag::Notifications,
                &format!(
                    "Processed {} alerts: delivered={} dropped={} failed={}",
                    report.messages, report.delivered, report.dropped, report.failed
                ),
            );
        }
        Ok(report)
    }

    async fn deliver_one(notifier: &dyn Notifier, notification: &Notification) -> Outcome {
        if !Self::ensure_permission(notifier).await {
            return Outcome::Dropped;
        }
        match notifier.deliver(notification).await {
            Ok(()) => Outcome::Delivered,
            Err(e) => {
                logger::warning(
                    LogTag::Notifications,
                    &format!("{} delivery failed: {}", notifier.name(), e),
                );
                Outcome::Failed
            }
        }
    }

    async fn ensure_permission(notifier: &dyn Notifier) -> bool {
        match notifier.permission() {
            NotificationPermission::Granted => true,
            NotificationPermission::Denied => false,
            NotificationPermission::Default => {
                let permission = notifier.request_permission().await;
                logger::debug(
                    LogTag::Notifications,
                    &format!("Permission for {} resolved to {}", notifier.name(), permission),
                );
                permission == NotificationPermission::Granted
            }
        }
    }
}
