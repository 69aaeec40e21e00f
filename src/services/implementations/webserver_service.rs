use crate::config::WebserverConfig;
use crate::logger::{self, LogTag};
use crate::services::{Service, ServiceHealth};
use crate::webserver::{self, AppState};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

pub struct WebserverService {
    config: WebserverConfig,
    state: Arc<AppState>,
}

impl WebserverService {
    pub fn new(config: WebserverConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }
}

#[async_trait]
impl Service for WebserverService {
    fn name(&self) -> &'static str {
        "webserver"
    }

    fn priority(&self) -> i32 {
        40
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec!["poller"]
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    async fn start(&mut self, shutdown: Arc<Notify>) -> Result<Vec<JoinHandle<()>>, String> {
        // Pre-flight: bind now so a bad address stops startup
        let listener = webserver::bind(&self.config).await?;
        let state = Arc::clone(&self.state);
        let shutdown_signal = shutdown.notified_owned();

        let handle = tokio::spawn(async move {
            if let Err(e) = webserver::serve(listener, state, shutdown_signal).await {
                logger::error(LogTag::Webserver, &format!("Webserver failed: {}", e));
            }
        });

        Ok(vec![handle])
    }

    async fn health(&self) -> ServiceHealth {
        ServiceHealth::Healthy
    }
}
