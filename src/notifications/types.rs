//! Notification types for deregistration alerts
//!
//! Defines the alert payload, the per-sink permission state and the
//! `Notifier` trait every delivery channel implements.

use crate::errors::MonitorResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEREGISTRATION_ALERT_TITLE: &str = "Miner Deregistration Alert";

/// Permission to show notifications on a sink
///
/// Mirrors the browser model: `Default` means nobody asked yet, so the
/// permission is requested lazily right before the first delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationPermission {
    Default,
    Granted,
    Denied,
}

impl std::fmt::Display for NotificationPermission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationPermission::Default => write!(f, "default"),
            NotificationPermission::Granted => write!(f, "granted"),
            NotificationPermission::Denied => write!(f, "denied"),
        }
    }
}

/// A notification ready for delivery
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            timestamp: Utc::now(),
        }
    }

    /// Alert for one message of the backend feed
    pub fn deregistration_alert(message: impl Into<String>) -> Self {
        Self::new(DEREGISTRATION_ALERT_TITLE, message)
    }
}

/// A delivery channel
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &'static str;

    /// Current permission, without prompting
    fn permission(&self) -> NotificationPermission;

    /// Ask for permission; only called while the state is `Default`
    async fn request_permission(&self) -> NotificationPermission;

    async fn deliver(&self, notification: &Notification) -> MonitorResult<()>;
}
