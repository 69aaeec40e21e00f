/// Shared application state for the webserver
///
/// Handlers reach the dashboard only through the polling controller, which
/// owns the backend client and the injected note and history stores.
use crate::config::HistoryConfig;
use crate::dashboard::PollingController;
use std::sync::Arc;

/// Shared application state passed to all route handlers
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<PollingController>,

    /// Chart shaping defaults
    pub history: Arc<HistoryConfig>,

    /// Page auto-reload period, follows the data timer
    pub refresh_secs: u64,

    /// Server startup time
    pub startup_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(controller: Arc<PollingController>, history: HistoryConfig, refresh_secs: u64) -> Self {
        Self {
            controller,
            history: Arc::new(history),
            refresh_secs,
            startup_time: chrono::Utc::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        (chrono::Utc::now() - self.startup_time)
            .num_seconds()
            .max(0) as u64
    }
}
