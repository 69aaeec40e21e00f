use crate::dashboard::PollingController;
use crate::logger::{self, LogTag};
use crate::services::{Service, ServiceHealth};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Data timer: one refresh at startup, then every `interval`
pub struct PollerService {
    controller: Arc<PollingController>,
    interval: Duration,
}

impl PollerService {
    pub fn new(controller: Arc<PollingController>, interval: Duration) -> Self {
        Self {
            controller,
            interval,
        }
    }
}

#[async_trait]
impl Service for PollerService {
    fn name(&self) -> &'static str {
        "poller"
    }

    fn priority(&self) -> i32 {
        20
    }

    async fn start(&mut self, shutdown: Arc<Notify>) -> Result<Vec<JoinHandle<()>>, String> {
        let controller = Arc::clone(&self.controller);
        let interval = self.interval;

        let shutdown_signal = shutdown.notified_owned();

        let handle = tokio::spawn(async move {
            tokio::pin!(shutdown_signal);

            // First tick fires immediately, giving the startup refresh
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = &mut shutdown_signal => {
                        logger::debug(LogTag::Poller, "Poller received shutdown signal");
                        break;
                    }
                    _ = ticker.tick() => {
                        let report = controller.refresh().await;
                        if !report.is_success() {
                            logger::warning(
                                LogTag::Poller,
                                &format!("Refresh finished with {} failed fetches", report.failed.len()),
                            );
                        }
                    }
                }
            }
        });

        logger::info(
            LogTag::Poller,
            &format!("Polling backend every {}s", interval.as_secs()),
        );
        Ok(vec![handle])
    }

    async fn health(&self) -> ServiceHealth {
        match self.controller.error_banner() {
            Some(message) => ServiceHealth::Degraded(message),
            None => ServiceHealth::Healthy,
        }
    }
}
